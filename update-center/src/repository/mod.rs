//! Artifact repository abstraction.
//!
//! [`MavenRepository`] is the contract the catalog builder consumes: list the
//! plugin and core artifacts, resolve checksum-backed metadata, read the
//! embedded manifest, and obtain the artifact bytes. Backends that cannot
//! serve an operation answer it with [`RepositoryError::NotImplemented`].
//!
//! # Architecture
//!
//! ```text
//! NexusRepository (MavenRepository)
//!         │
//!         ├── RemoteIndex ──────── HttpClient (search queries, once)
//!         │       └── IndexSnapshot (path → AssetRecord, plugins, wars)
//!         │
//!         ├── ArchiveFetcher ───── HttpClient (downloads)
//!         │       └── ArchiveOpener (zip)
//!         │
//!         └── LocalCacheProbe (~/.m2/repository)
//! ```

mod error;
pub mod nexus;

pub use error::{RepositoryError, RepositoryResult};
pub use nexus::NexusRepository;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::coord::Coordinate;
use crate::manifest::Manifest;

/// Verified metadata for one artifact.
///
/// Checksums are base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMetadata {
    /// Base64 SHA-1 of the artifact.
    pub sha1: String,

    /// Base64 SHA-256 of the artifact.
    pub sha256: String,

    /// Last-modified time in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// Size in bytes.
    pub size: u64,
}

/// Artifact bytes on disk.
#[derive(Debug)]
pub enum ResolvedArtifact {
    /// Served from the local repository; the file is not owned by the caller.
    Local(PathBuf),

    /// Downloaded to a temporary file, deleted when this value is dropped.
    Downloaded(NamedTempFile),
}

impl ResolvedArtifact {
    /// Path of the artifact file.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedArtifact::Local(path) => path,
            ResolvedArtifact::Downloaded(file) => file.path(),
        }
    }

    /// Whether the artifact came from the local repository.
    pub fn is_local(&self) -> bool {
        matches!(self, ResolvedArtifact::Local(_))
    }

    /// Persist the artifact and return its path.
    ///
    /// A downloaded file is no longer deleted on drop; removing it becomes
    /// the caller's responsibility.
    pub fn keep(self) -> RepositoryResult<PathBuf> {
        match self {
            ResolvedArtifact::Local(path) => Ok(path),
            ResolvedArtifact::Downloaded(file) => file
                .keep()
                .map(|(_, path)| path)
                .map_err(|e| RepositoryError::TempFile(e.error)),
        }
    }
}

/// Read access to a Maven-layout artifact repository.
///
/// Implementations are shared across threads; any one-time setup they need
/// must be internally synchronized.
pub trait MavenRepository: Send + Sync {
    /// Perform any one-time setup now rather than on first use.
    ///
    /// Idempotent. The default does nothing.
    fn ensure_initialized(&self) -> RepositoryResult<()> {
        Ok(())
    }

    /// All plugin archive coordinates known to the repository.
    fn list_all_plugins(&self) -> RepositoryResult<BTreeSet<Coordinate>>;

    /// All core web archive coordinates, optionally narrowed to `group_id`.
    fn list_all_wars(&self, group_id: &str) -> RepositoryResult<BTreeSet<Coordinate>>;

    /// Checksums, timestamp and size of an artifact.
    ///
    /// `Ok(None)` when the repository has no usable record for it.
    fn get_metadata(&self, coordinate: &Coordinate) -> RepositoryResult<Option<ArtifactMetadata>>;

    /// Manifest embedded in the artifact; empty if the artifact has none.
    fn get_manifest(&self, coordinate: &Coordinate) -> RepositoryResult<Manifest>;

    /// The artifact bytes, from the local repository when available.
    fn resolve(&self, coordinate: &Coordinate) -> RepositoryResult<ResolvedArtifact>;

    /// Bytes of a single entry inside the artifact.
    fn get_zip_file_entry(
        &self,
        coordinate: &Coordinate,
        path: &str,
    ) -> RepositoryResult<Option<Vec<u8>>>;
}
