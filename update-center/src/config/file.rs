//! Configuration file handling for ~/.update-center/config.ini.
//!
//! Every key is optional; a missing file yields the defaults. Parsing lives
//! in [`super::parser`].
//!
//! ```ini
//! [repository]
//! api_url = https://repo.sonatype.com/service/rest/v1/
//! timeout = 60
//! local_repository = ~/.m2/repository
//! temp_dir = /var/tmp
//! verify_downloads = true
//!
//! [search]
//! plugin_group = io.jenkins.plugins
//! core_group = org.jenkins-ci.main
//! core_artifact = jenkins
//!
//! [logging]
//! directory = logs
//! file = update-center.log
//!
//! [batch]
//! threads = 8
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[repository]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub local_repository: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub verify_downloads: bool,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: None,
            local_repository: None,
            temp_dir: None,
            verify_downloads: true,
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSettings {
    pub plugin_group: Option<String>,
    pub core_group: Option<String>,
    pub core_artifact: Option<String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(crate::logging::default_log_dir()),
            file: crate::logging::default_log_file().to_string(),
        }
    }
}

/// `[batch]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSettings {
    /// Worker threads; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub repository: RepositorySettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
    pub batch: BatchSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.update-center/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.update-center).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".update-center")
}

/// Get the path to the config file (~/.update-center/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
