//! Zip-format archive access (jar, hpi, war).

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use super::{ArchiveEntries, ArchiveOpener};
use crate::repository::{RepositoryError, RepositoryResult};

/// Upper bound on buffer preallocation taken from an entry header (1MB).
const MAX_PREALLOCATION: u64 = 1024 * 1024;

/// Opens zip-family archives using the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    fn open(&self, path: &Path) -> RepositoryResult<Box<dyn ArchiveEntries>> {
        let file = File::open(path).map_err(|e| RepositoryError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let entries = ZipEntries::new(BufReader::new(file), path)?;
        Ok(Box::new(entries))
    }

    fn open_bytes(
        &self,
        bytes: Vec<u8>,
        origin: &Path,
    ) -> RepositoryResult<Box<dyn ArchiveEntries>> {
        let entries = ZipEntries::new(Cursor::new(bytes), origin)?;
        Ok(Box::new(entries))
    }
}

/// An opened zip archive.
struct ZipEntries<R> {
    archive: ZipArchive<R>,
    path: PathBuf,
}

impl<R: Read + Seek> ZipEntries<R> {
    fn new(reader: R, path: &Path) -> RepositoryResult<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| RepositoryError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: format!("not a zip archive: {}", e),
        })?;

        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }
}

impl<R: Read + Seek> ArchiveEntries for ZipEntries<R> {
    fn contains(&mut self, entry: &str) -> bool {
        match self.archive.by_name(entry) {
            Ok(file) => file.is_file(),
            Err(_) => false,
        }
    }

    fn read_entry(&mut self, entry: &str) -> RepositoryResult<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(entry) {
            Ok(file) if file.is_file() => file,
            Ok(_) | Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(RepositoryError::ExtractionFailed {
                    path: self.path.clone(),
                    reason: format!("{}: {}", entry, e),
                })
            }
        };

        let mut contents = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut contents)
            .map_err(|e| RepositoryError::ExtractionFailed {
                path: self.path.clone(),
                reason: format!("{}: {}", entry, e),
            })?;

        Ok(Some(contents))
    }
}

/// Preallocation for an entry whose header declares `declared` bytes.
///
/// The header is archive-controlled, so the hint is capped and the buffer
/// grows as data is actually read.
fn capacity_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATION) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build_zip;

    #[test]
    fn test_open_bytes_and_read() {
        let zip = build_zip(&[("a/b.txt", b"hello")]);
        let mut entries = ZipOpener.open_bytes(zip, Path::new("mem.zip")).unwrap();

        assert!(entries.contains("a/b.txt"));
        assert!(!entries.contains("a/c.txt"));
        assert_eq!(entries.read_entry("a/b.txt").unwrap(), Some(b"hello".to_vec()));
        assert_eq!(entries.read_entry("a/c.txt").unwrap(), None);
    }

    #[test]
    fn test_capacity_hint_is_capped() {
        assert_eq!(capacity_hint(0), 0);
        assert_eq!(capacity_hint(512), 512);
        assert_eq!(capacity_hint(u64::MAX), MAX_PREALLOCATION as usize);
    }

    #[test]
    fn test_open_non_zip_fails() {
        let result = ZipOpener.open_bytes(b"not a zip".to_vec(), Path::new("bogus.hpi"));
        assert!(matches!(
            result,
            Err(RepositoryError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = ZipOpener.open(Path::new("/nonexistent/foo.hpi"));
        assert!(matches!(result, Err(RepositoryError::ReadFailed { .. })));
    }
}
