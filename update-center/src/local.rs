//! Local artifact store probe.
//!
//! Artifacts already materialized in a Maven-layout directory tree (by default
//! `~/.m2/repository`) are served from disk instead of being downloaded again.
//! Only content resolution consults the local store; metadata always comes
//! from the remote index.

use std::path::{Path, PathBuf};

use crate::coord::Coordinate;

/// Probe for artifacts present in a local Maven-layout repository.
#[derive(Debug, Clone)]
pub struct LocalCacheProbe {
    root: PathBuf,
}

impl LocalCacheProbe {
    /// Create a probe rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the local repository.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the artifact would have in the local repository.
    pub fn local_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.root.join(coordinate.repository_path())
    }

    /// Return the local file for `coordinate` if it exists.
    ///
    /// Absence is not an error.
    pub fn try_local(&self, coordinate: &Coordinate) -> Option<PathBuf> {
        let path = self.local_path(coordinate);
        if path.is_file() {
            tracing::debug!(%coordinate, path = %path.display(), "Local repository hit");
            Some(path)
        } else {
            None
        }
    }
}

impl Default for LocalCacheProbe {
    fn default() -> Self {
        Self::new(default_local_repository())
    }
}

/// Default local repository root (`~/.m2/repository`).
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}
