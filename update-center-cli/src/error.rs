//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use update_center::config::ConfigFileError;
use update_center::coord::CoordinateParseError;
use update_center::repository::RepositoryError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Coordinate argument could not be parsed
    Coordinate(CoordinateParseError),
    /// Repository operation failed
    Repository(RepositoryError),
    /// Failed to write output
    FileWrite { path: String, error: std::io::Error },
    /// Failed to serialize output
    Serialize(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Repository(RepositoryError::MissingCredentials(_)) => {
                eprintln!();
                eprintln!("Set the repository credentials in the environment:");
                eprintln!("  export NXRM_USERNAME=<user>");
                eprintln!("  export NXRM_PASSWORD=<password>");
            }
            CliError::Repository(RepositoryError::HttpStatus { status: 401, .. }) => {
                eprintln!();
                eprintln!("The repository rejected the credentials.");
                eprintln!("Check NXRM_USERNAME and NXRM_PASSWORD.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Coordinate(e) => write!(f, "Invalid coordinate: {}", e),
            CliError::Repository(e) => write!(f, "{}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Serialize(e) => write!(f, "Failed to serialize output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Coordinate(e) => Some(e),
            CliError::Repository(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Serialize(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CoordinateParseError> for CliError {
    fn from(e: CoordinateParseError) -> Self {
        CliError::Coordinate(e)
    }
}

impl From<RepositoryError> for CliError {
    fn from(e: RepositoryError) -> Self {
        CliError::Repository(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialize(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_message_passes_through() {
        let error = CliError::from(RepositoryError::AssetNotFound("a:b:1:hpi".to_string()));
        assert_eq!(
            error.to_string(),
            "artifact not found in repository index: a:b:1:hpi"
        );
    }

    #[test]
    fn test_coordinate_error_has_source() {
        let parse_error = "nonsense"
            .parse::<update_center::coord::Coordinate>()
            .unwrap_err();
        let error = CliError::from(parse_error);
        assert!(error.to_string().starts_with("Invalid coordinate: "));
        assert!(std::error::Error::source(&error).is_some());
    }
}
