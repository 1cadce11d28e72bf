//! Error types for repository operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while indexing, resolving or fetching artifacts.
///
/// Expected absences (an artifact missing from the index, a missing checksum,
/// an archive without a manifest) are not errors; they surface as `None` or
/// empty values from the resolver.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// The server answered a required request with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Failed to build the HTTP client.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The search endpoint returned a document that could not be parsed.
    #[error("failed to parse search response from {url}: {reason}")]
    SearchParse { url: String, reason: String },

    /// A checksum reported by the repository is not valid hex.
    #[error("malformed checksum '{value}': {reason}")]
    InvalidChecksum { value: String, reason: String },

    /// A downloaded file does not match the checksum in the index.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// The artifact is not present in the remote index.
    #[error("artifact not found in repository index: {0}")]
    AssetNotFound(String),

    /// Downloading a required artifact failed.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Failed to read a file.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a temporary file.
    #[error("failed to create temporary file: {0}")]
    TempFile(#[source] io::Error),

    /// The archive could not be opened or an entry could not be read.
    #[error("failed to extract from {}: {reason}", .path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// A manifest header line could not be parsed.
    #[error("malformed manifest at line {line}: {reason}")]
    ManifestParse { line: usize, reason: String },

    /// Repository credentials are not configured.
    #[error("repository credentials missing: {0} must be set")]
    MissingCredentials(String),

    /// The remote index was initialized twice.
    #[error("remote index re-initialized")]
    ReInitialized,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation not supported by this repository backend.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}
