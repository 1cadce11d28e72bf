//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [repository] section
    if let Some(section) = ini.section(Some("repository")) {
        config.repository.api_url = non_empty(section, "api_url").map(str::to_string);
        if let Some(v) = non_empty(section, "timeout") {
            let secs: u64 = parse_value("repository", "timeout", v, "must be a whole number of seconds")?;
            if secs == 0 {
                return Err(invalid("repository", "timeout", v, "must be greater than zero"));
            }
            config.repository.timeout_secs = Some(secs);
        }
        config.repository.local_repository = non_empty(section, "local_repository").map(expand_tilde);
        config.repository.temp_dir = non_empty(section, "temp_dir").map(expand_tilde);
        if let Some(v) = non_empty(section, "verify_downloads") {
            config.repository.verify_downloads =
                parse_value("repository", "verify_downloads", v, "must be true or false")?;
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        config.search.plugin_group = non_empty(section, "plugin_group").map(str::to_string);
        config.search.core_group = non_empty(section, "core_group").map(str::to_string);
        config.search.core_artifact = non_empty(section, "core_artifact").map(str::to_string);

        if config.search.core_group.is_some() != config.search.core_artifact.is_some() {
            let (key, value) = match &config.search.core_group {
                Some(group) => ("core_group", group.clone()),
                None => ("core_artifact", config.search.core_artifact.clone().unwrap_or_default()),
            };
            return Err(invalid(
                "search",
                key,
                &value,
                "core_group and core_artifact must be set together",
            ));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
    }

    // [batch] section
    if let Some(section) = ini.section(Some("batch")) {
        if let Some(v) = non_empty(section, "threads") {
            let threads: usize = parse_value("batch", "threads", v, "must be a positive integer")?;
            if threads == 0 {
                return Err(invalid("batch", "threads", v, "must be a positive integer"));
            }
            config.batch.threads = Some(threads);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .to_lowercase()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        parse_ini(&Ini::load_from_str(text).unwrap())
    }

    #[test]
    fn test_empty_ini_is_default() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_repository_section() {
        let config = parse(
            "[repository]\n\
             api_url = https://nexus.internal/service/rest/v1/\n\
             timeout = 45\n\
             local_repository = /srv/m2\n\
             verify_downloads = False\n",
        )
        .unwrap();

        assert_eq!(
            config.repository.api_url.as_deref(),
            Some("https://nexus.internal/service/rest/v1/")
        );
        assert_eq!(config.repository.timeout_secs, Some(45));
        assert_eq!(config.repository.local_repository, Some(PathBuf::from("/srv/m2")));
        assert!(!config.repository.verify_downloads);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = parse("[repository]\napi_url =\ntimeout =   \n").unwrap();
        assert!(config.repository.api_url.is_none());
        assert!(config.repository.timeout_secs.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        let result = parse("[repository]\ntimeout = soon\n");
        assert!(matches!(
            result,
            Err(ConfigFileError::InvalidValue { ref key, .. }) if key == "timeout"
        ));

        assert!(parse("[repository]\ntimeout = 0\n").is_err());
    }

    #[test]
    fn test_core_search_requires_both_keys() {
        let result = parse("[search]\ncore_group = org.example\n");
        assert!(matches!(
            result,
            Err(ConfigFileError::InvalidValue { ref key, .. }) if key == "core_group"
        ));

        let config = parse("[search]\ncore_group = org.example\ncore_artifact = runtime\n").unwrap();
        assert_eq!(config.search.core_artifact.as_deref(), Some("runtime"));
    }

    #[test]
    fn test_logging_and_batch_sections() {
        let config = parse("[logging]\ndirectory = /var/log/uc\nfile = run.log\n\n[batch]\nthreads = 16\n")
            .unwrap();
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/uc"));
        assert_eq!(config.logging.file, "run.log");
        assert_eq!(config.batch.threads, Some(16));

        assert!(parse("[batch]\nthreads = 0\n").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/.m2/repository");
        assert!(expanded.ends_with(".m2/repository"));
        assert!(!expanded.starts_with("~"));
        assert_eq!(expand_tilde("/abs"), PathBuf::from("/abs"));
    }
}
