//! Artifact download and single-entry extraction.
//!
//! [`ArchiveFetcher`] streams an artifact to a fresh temporary file and can
//! pull one named entry out of it. Temporary files are returned as
//! [`NamedTempFile`] values: they are deleted when dropped, so every exit path
//! (success, soft failure, error) releases the disk space unless the caller
//! explicitly keeps the file.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::{Builder, NamedTempFile};

use crate::archive::{self, ArchiveOpener, ZipOpener};
use crate::http::{HttpClient, StreamOutcome};
use crate::repository::{RepositoryError, RepositoryResult};

/// Prefix used for every temporary file the fetcher creates.
const TEMP_PREFIX: &str = "update-center-";

/// Downloads artifacts and extracts entries from them.
pub struct ArchiveFetcher {
    client: Arc<dyn HttpClient>,
    opener: Arc<dyn ArchiveOpener>,
    temp_dir: Option<PathBuf>,
}

impl ArchiveFetcher {
    /// Create a fetcher reading zip-family archives.
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            opener: Arc::new(ZipOpener),
            temp_dir: None,
        }
    }

    /// Create temporary files under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    fn temp_file(&self, suffix: &str) -> RepositoryResult<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(RepositoryError::TempFile)
    }

    /// Download `url` into a new temporary file.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the server answered with a non-success status; the
    /// caller decides whether that is fatal.
    ///
    /// # Errors
    ///
    /// Transport and filesystem failures. A partially written file is
    /// removed when the error propagates.
    pub fn download(&self, url: &str) -> RepositoryResult<Option<NamedTempFile>> {
        tracing::info!(url, "Downloading");

        let file = self.temp_file(".zip")?;
        let mut writer = BufWriter::new(file.as_file());

        let outcome = self.client.stream_to(url, &mut writer)?;
        writer.flush().map_err(|e| RepositoryError::WriteFailed {
            path: file.path().to_path_buf(),
            source: e,
        })?;
        drop(writer);

        match outcome {
            StreamOutcome::Written(bytes) => {
                tracing::debug!(url, bytes, path = %file.path().display(), "Download complete");
                Ok(Some(file))
            }
            StreamOutcome::Status(status) => {
                tracing::warn!(url, status, "Received HTTP error response");
                Ok(None)
            }
        }
    }

    /// Extract `entry_path` from `archive` into a new temporary file.
    ///
    /// One level of nested archives is traversed (see [`archive::read_entry`]).
    /// Returns `Ok(None)` when the entry does not exist.
    pub fn extract_entry(
        &self,
        archive: &Path,
        entry_path: &str,
    ) -> RepositoryResult<Option<NamedTempFile>> {
        let Some(bytes) = archive::read_entry(self.opener.as_ref(), archive, entry_path)? else {
            tracing::debug!(archive = %archive.display(), entry_path, "Entry not present");
            return Ok(None);
        };

        let mut file = self.temp_file(".entry")?;
        file.write_all(&bytes)
            .and_then(|_| file.flush())
            .map_err(|e| RepositoryError::WriteFailed {
                path: file.path().to_path_buf(),
                source: e,
            })?;

        Ok(Some(file))
    }

    /// Download `url` and return the bytes of `entry_path` inside it.
    ///
    /// Both the downloaded archive and the extracted entry are deleted before
    /// returning. `Ok(None)` when the download was answered with an error
    /// status or the entry is missing.
    pub fn fetch_entry(&self, url: &str, entry_path: &str) -> RepositoryResult<Option<Vec<u8>>> {
        let Some(downloaded) = self.download(url)? else {
            return Ok(None);
        };
        let Some(entry) = self.extract_entry(downloaded.path(), entry_path)? else {
            return Ok(None);
        };

        let bytes = fs::read(entry.path()).map_err(|e| RepositoryError::ReadFailed {
            path: entry.path().to_path_buf(),
            source: e,
        })?;
        Ok(Some(bytes))
    }
}
