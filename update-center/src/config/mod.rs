//! Resolver configuration.
//!
//! [`RepositoryConfig`] is built once (from code, the INI file, or both) and
//! handed to [`NexusRepository`](crate::repository::NexusRepository). There
//! is no process-wide configuration state.

mod file;
mod parser;

pub use file::{
    config_directory, config_file_path, BatchSettings, ConfigFile, ConfigFileError,
    LoggingSettings, RepositorySettings, SearchSettings,
};

use std::path::PathBuf;
use std::time::Duration;

use crate::http::Credentials;
use crate::local::default_local_repository;
use crate::repository::nexus::SearchQuery;
use crate::repository::{RepositoryError, RepositoryResult};

/// Default repository manager REST endpoint.
pub const DEFAULT_API_URL: &str = "https://repo.sonatype.com/service/rest/v1/";

/// Environment variable holding the repository user name.
pub const USERNAME_ENV: &str = "NXRM_USERNAME";

/// Environment variable holding the repository password.
pub const PASSWORD_ENV: &str = "NXRM_PASSWORD";

/// Configuration for a Nexus-backed repository.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Base URL of the REST API; always ends with `/`.
    pub api_url: String,

    /// Credentials sent with every request.
    pub credentials: Credentials,

    /// HTTP request timeout; `None` keeps the client default.
    pub timeout: Option<Duration>,

    /// Root of the local Maven-layout repository.
    pub local_repository: PathBuf,

    /// Query used to list plugin archives.
    pub plugin_search: SearchQuery,

    /// Query used to list core web archives.
    pub core_search: SearchQuery,

    /// Whether to check the SHA-256 of downloaded artifacts.
    pub verify_downloads: bool,

    /// Directory for temporary downloads; `None` uses the system default.
    pub temp_dir: Option<PathBuf>,
}

impl RepositoryConfig {
    /// Create a configuration with default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials,
            timeout: None,
            local_repository: default_local_repository(),
            plugin_search: SearchQuery::plugins(),
            core_search: SearchQuery::core_wars(),
            verify_downloads: true,
            temp_dir: None,
        }
    }

    /// Create a configuration with credentials from the environment.
    pub fn from_env() -> RepositoryResult<Self> {
        Ok(Self::new(credentials_from_env()?))
    }

    /// Set the REST API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.api_url = url;
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the local repository root.
    pub fn with_local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_repository = path.into();
        self
    }

    /// Restrict the plugin query to one group.
    pub fn with_plugin_group(mut self, group: &str) -> Self {
        self.plugin_search = self.plugin_search.with("maven.groupId", group);
        self
    }

    /// Change the group and artifact of the core query.
    pub fn with_core_artifact(mut self, group: &str, artifact: &str) -> Self {
        self.core_search = self
            .core_search
            .with("maven.groupId", group)
            .with("maven.artifactId", artifact);
        self
    }

    /// Enable or disable download verification.
    pub fn with_verify_downloads(mut self, verify: bool) -> Self {
        self.verify_downloads = verify;
        self
    }

    /// Set the temporary download directory.
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// URL of the search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}search", self.api_url)
    }

    /// Apply the settings from a loaded config file.
    pub fn with_file(mut self, file: &ConfigFile) -> Self {
        let repo = &file.repository;
        if let Some(url) = &repo.api_url {
            self = self.with_api_url(url.clone());
        }
        if let Some(secs) = repo.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = &repo.local_repository {
            self.local_repository = path.clone();
        }
        if let Some(dir) = &repo.temp_dir {
            self.temp_dir = Some(dir.clone());
        }
        self.verify_downloads = repo.verify_downloads;

        let search = &file.search;
        if let Some(group) = &search.plugin_group {
            self = self.with_plugin_group(group);
        }
        if let (Some(group), Some(artifact)) = (&search.core_group, &search.core_artifact) {
            self = self.with_core_artifact(group, artifact);
        }
        self
    }
}

/// Read credentials from `NXRM_USERNAME` and `NXRM_PASSWORD`.
pub fn credentials_from_env() -> RepositoryResult<Credentials> {
    credentials_from(|name| std::env::var(name).ok())
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> RepositoryResult<Credentials> {
    let read = |name: &str| {
        lookup(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RepositoryError::MissingCredentials(name.to_string()))
    };
    Ok(Credentials::new(read(USERNAME_ENV)?, read(PASSWORD_ENV)?))
}
