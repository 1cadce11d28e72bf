//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and repository
//! creation so command handlers only deal with their own output.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::info;
use update_center::config::{ConfigFile, RepositoryConfig};
use update_center::logging::{init_logging, LoggingGuard};
use update_center::repository::NexusRepository;

use crate::error::CliError;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Config file (defaults to ~/.update-center/config.ini)
    #[arg(long, global = true, env = "UPDATE_CENTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository REST API base URL
    #[arg(long, global = true, env = "NXRM_API_URL")]
    pub api_url: Option<String>,

    /// Local Maven repository root
    #[arg(long, global = true)]
    pub local_repository: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip SHA-256 verification of downloads
    #[arg(long, global = true)]
    pub no_verify: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    options: GlobalOptions,
}

impl CliRunner {
    /// Load config and initialize logging.
    pub fn new(options: GlobalOptions) -> Result<Self, CliError> {
        let config = match &options.config {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let level = if options.verbose { "debug" } else { "info" };
        let logging_guard = init_logging(&config.logging.directory, &config.logging.file, level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            options,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("update-center v{}", update_center::VERSION);
        info!("update-center CLI: {} command", command);
    }

    /// Create the repository; credentials come from the environment.
    pub fn create_repository(&self) -> Result<NexusRepository, CliError> {
        let config = repository_config(&self.config, &self.options)?;
        info!(api_url = %config.api_url, "Using repository");
        Ok(NexusRepository::new(&config)?)
    }
}

/// Combine defaults, the config file and command-line overrides, in that
/// order of precedence.
pub fn repository_config(
    file: &ConfigFile,
    options: &GlobalOptions,
) -> Result<RepositoryConfig, CliError> {
    let config = RepositoryConfig::from_env()?.with_file(file);
    Ok(apply_options(config, options))
}

fn apply_options(mut config: RepositoryConfig, options: &GlobalOptions) -> RepositoryConfig {
    if let Some(url) = &options.api_url {
        config = config.with_api_url(url.clone());
    }
    if let Some(path) = &options.local_repository {
        config = config.with_local_repository(path.clone());
    }
    if let Some(secs) = options.timeout {
        config = config.with_timeout(Some(Duration::from_secs(secs)));
    }
    if options.no_verify {
        config = config.with_verify_downloads(false);
    }
    config
}
