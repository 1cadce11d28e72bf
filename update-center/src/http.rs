//! Authenticated HTTP client abstraction.
//!
//! Every request made against the repository goes through [`HttpClient`], so
//! the resolver can be exercised in tests with an in-memory implementation.
//! The production implementation is [`ReqwestClient`], a blocking client that
//! attaches HTTP Basic credentials to every request. There is no retry.

use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::repository::{RepositoryError, RepositoryResult};

/// Buffer size for streaming response bodies (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("update-center/", env!("CARGO_PKG_VERSION"));

/// Repository credentials for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of streaming a response body into a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The body was written; carries the number of bytes.
    Written(u64),
    /// The server answered with a non-success status; nothing was written.
    Status(u16),
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs a GET request and returns the whole body.
    ///
    /// A non-success status is an error ([`RepositoryError::HttpStatus`]).
    fn get(&self, url: &str) -> RepositoryResult<Vec<u8>>;

    /// Performs a GET request and streams the body into `sink`.
    ///
    /// A non-success status is reported as [`StreamOutcome::Status`] rather
    /// than an error so callers can decide whether it is fatal.
    fn stream_to(&self, url: &str, sink: &mut dyn Write) -> RepositoryResult<StreamOutcome>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: Client,
    credentials: Credentials,
    timeout: Option<Duration>,
}

impl ReqwestClient {
    /// Creates a new client.
    ///
    /// When `timeout` is `None` the reqwest default applies.
    pub fn new(credentials: Credentials, timeout: Option<Duration>) -> RepositoryResult<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RepositoryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            timeout,
        })
    }

    fn send(&self, url: &str) -> RepositoryResult<reqwest::blocking::Response> {
        self.client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .map_err(|e| self.request_error(url, e))
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> RepositoryError {
        if e.is_timeout() {
            RepositoryError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
            }
        } else {
            RepositoryError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> RepositoryResult<Vec<u8>> {
        let response = self.send(url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepositoryError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| self.request_error(url, e))
    }

    fn stream_to(&self, url: &str, sink: &mut dyn Write) -> RepositoryResult<StreamOutcome> {
        let mut response = self.send(url)?;

        let status = response.status();
        if !status.is_success() {
            return Ok(StreamOutcome::Status(status.as_u16()));
        }

        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut written = 0u64;

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| RepositoryError::Http {
                    url: url.to_string(),
                    reason: format!("read error: {}", e),
                })?;

            if bytes_read == 0 {
                break;
            }

            sink.write_all(&buffer[..bytes_read])
                .map_err(|e| RepositoryError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("write error: {}", e),
                })?;

            written += bytes_read as u64;
        }

        sink.flush().map_err(|e| RepositoryError::DownloadFailed {
            url: url.to_string(),
            reason: format!("write error: {}", e),
        })?;

        Ok(StreamOutcome::Written(written))
    }
}
