//! Artifact coordinates.
//!
//! A [`Coordinate`] identifies a single artifact in a Maven-layout repository
//! by group, artifact id, version and packaging. The canonical repository path
//! derived from it is used both as the remote index key and as the location
//! probed in the local artifact store.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// File extension of plugin archives.
pub const PLUGIN_EXTENSION: &str = "hpi";

/// File extension of web archives (the hosting runtime).
pub const WAR_EXTENSION: &str = "war";

/// Immutable artifact coordinate.
///
/// # Example
///
/// ```
/// use update_center::coord::Coordinate;
///
/// let coord = Coordinate::new("org.example", "foo", "1.0", "hpi");
/// assert_eq!(coord.repository_path(), "org/example/foo/1.0/foo-1.0.hpi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coordinate {
    group: String,
    artifact: String,
    version: String,
    packaging: String,
}

/// Errors produced when parsing a coordinate string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateParseError {
    /// Wrong number of `:`-separated components.
    #[error("expected group:artifact:version[:packaging], got '{0}'")]
    WrongShape(String),

    /// One of the components was empty.
    #[error("empty {component} in coordinate '{input}'")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            packaging: packaging.into(),
        }
    }

    /// Create a plugin archive coordinate.
    pub fn plugin(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group, artifact, version, PLUGIN_EXTENSION)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    /// File name of the artifact: `artifact-version.packaging`.
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.artifact, self.version, self.packaging)
    }

    /// Canonical repository-relative path.
    ///
    /// Format: `group/with/slashes/artifact/version/artifact-version.packaging`
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.file_name()
        )
    }

    /// Key of this coordinate in the remote asset index (leading `/`).
    pub fn index_key(&self) -> String {
        format!("/{}", self.repository_path())
    }

    /// Recover a coordinate from a repository path.
    ///
    /// The path must follow the standard layout, with or without a leading
    /// `/`. Returns `None` if the file name does not match the artifact and
    /// version directories.
    pub fn from_repository_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if segments.len() < 4 {
            return None;
        }

        let n = segments.len();
        let file_name = segments[n - 1];
        let version = segments[n - 2];
        let artifact = segments[n - 3];
        let group = segments[..n - 3].join(".");

        let stem = format!("{}-{}.", artifact, version);
        let packaging = file_name.strip_prefix(&stem)?;
        if packaging.is_empty() || group.is_empty() {
            return None;
        }

        Some(Self::new(group, artifact, version, packaging))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group, self.artifact, self.version, self.packaging
        )
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateParseError;

    /// Parse `group:artifact:version[:packaging]`; packaging defaults to `hpi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let (group, artifact, version, packaging) = match parts.as_slice() {
            [g, a, v] => (*g, *a, *v, PLUGIN_EXTENSION),
            [g, a, v, p] => (*g, *a, *v, *p),
            _ => return Err(CoordinateParseError::WrongShape(s.to_string())),
        };

        for (component, value) in [
            ("group", group),
            ("artifact", artifact),
            ("version", version),
            ("packaging", packaging),
        ] {
            if value.is_empty() {
                return Err(CoordinateParseError::EmptyComponent {
                    component,
                    input: s.to_string(),
                });
            }
        }

        Ok(Self::new(group, artifact, version, packaging))
    }
}
