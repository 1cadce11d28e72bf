//! Archive access for downloaded artifacts.
//!
//! Reading a single entry out of a package is expressed through two small
//! capability traits so the extraction logic does not depend on a particular
//! container format:
//!
//! - [`ArchiveOpener`] opens an archive from a file or from in-memory bytes
//! - [`ArchiveEntries`] checks for and reads entries by path
//!
//! [`read_entry`] adds one level of nested-archive traversal on top: an entry
//! path such as `WEB-INF/lib/core-2.0.jar/META-INF/MANIFEST.MF` reads the
//! manifest out of the jar stored inside the outer archive.
//!
//! # Example
//!
//! ```ignore
//! use update_center::archive::{read_entry, ZipOpener};
//!
//! let bytes = read_entry(&ZipOpener, archive_path, "META-INF/MANIFEST.MF")?;
//! ```

mod zip_format;

pub use zip_format::ZipOpener;

use std::path::Path;

use crate::repository::RepositoryResult;

/// Extensions recognised as nested archives inside an entry path.
pub const NESTED_ARCHIVE_EXTENSIONS: &[&str] = &["jar", "hpi", "war", "zip"];

/// Opens archives of one container format.
pub trait ArchiveOpener: Send + Sync {
    /// Open the archive stored at `path`.
    fn open(&self, path: &Path) -> RepositoryResult<Box<dyn ArchiveEntries>>;

    /// Open an archive held in memory.
    ///
    /// `origin` is only used in error messages.
    fn open_bytes(&self, bytes: Vec<u8>, origin: &Path)
        -> RepositoryResult<Box<dyn ArchiveEntries>>;
}

/// Entry-level access to an opened archive.
pub trait ArchiveEntries {
    /// Whether a file entry exists at `entry`.
    fn contains(&mut self, entry: &str) -> bool;

    /// Read the file entry at `entry`; `None` if there is no such entry.
    fn read_entry(&mut self, entry: &str) -> RepositoryResult<Option<Vec<u8>>>;
}

/// Read `entry_path` from the archive at `archive`, descending into at most
/// one nested archive.
///
/// The entry is looked up directly first. If it is not present and a prefix
/// of the path names an entry with a nested-archive extension, the remainder
/// of the path is read from inside that entry. A missing entry at any level
/// yields `Ok(None)`.
pub fn read_entry(
    opener: &dyn ArchiveOpener,
    archive: &Path,
    entry_path: &str,
) -> RepositoryResult<Option<Vec<u8>>> {
    let entry_path = entry_path.trim_start_matches('/');
    let mut outer = opener.open(archive)?;

    if outer.contains(entry_path) {
        return outer.read_entry(entry_path);
    }

    let Some((inner_name, rest)) = split_nested(entry_path) else {
        return Ok(None);
    };

    match outer.read_entry(inner_name)? {
        Some(bytes) => {
            tracing::debug!(
                archive = %archive.display(),
                inner = inner_name,
                entry = rest,
                "Reading entry from nested archive"
            );
            let mut inner = opener.open_bytes(bytes, &archive.join(inner_name))?;
            inner.read_entry(rest)
        }
        None => Ok(None),
    }
}

/// Split an entry path at the first segment that looks like an archive.
///
/// Returns `(archive_entry, remainder)`; the remainder is never empty.
fn split_nested(entry_path: &str) -> Option<(&str, &str)> {
    entry_path
        .match_indices('/')
        .map(|(i, _)| (&entry_path[..i], &entry_path[i + 1..]))
        .find(|(prefix, rest)| !rest.is_empty() && has_archive_extension(prefix))
}

fn has_archive_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            NESTED_ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use ::zip::write::SimpleFileOptions;
    use ::zip::ZipWriter;
    use tempfile::TempDir;

    /// Build an in-memory zip archive from `(name, contents)` pairs.
    pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn write_archive(temp: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = temp.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_split_nested() {
        assert_eq!(
            split_nested("WEB-INF/lib/core.jar/META-INF/MANIFEST.MF"),
            Some(("WEB-INF/lib/core.jar", "META-INF/MANIFEST.MF"))
        );
        assert_eq!(split_nested("META-INF/MANIFEST.MF"), None);
        assert_eq!(split_nested("lib/core.jar/"), None);
        assert_eq!(split_nested("lib/core.jar"), None);
    }

    #[test]
    fn test_read_direct_entry() {
        let temp = TempDir::new().unwrap();
        let zip = build_zip(&[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n")]);
        let path = write_archive(&temp, "foo.hpi", &zip);

        let bytes = read_entry(&ZipOpener, &path, "/META-INF/MANIFEST.MF").unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"Manifest-Version: 1.0\n"[..]));
    }

    #[test]
    fn test_read_missing_entry_is_none() {
        let temp = TempDir::new().unwrap();
        let zip = build_zip(&[("index.jelly", b"<div/>")]);
        let path = write_archive(&temp, "foo.hpi", &zip);

        let bytes = read_entry(&ZipOpener, &path, "META-INF/MANIFEST.MF").unwrap();
        assert!(bytes.is_none());
    }

    #[test]
    fn test_read_nested_entry() {
        let temp = TempDir::new().unwrap();
        let inner = build_zip(&[("META-INF/MANIFEST.MF", b"Jenkins-Version: 2.423\n")]);
        let outer = build_zip(&[
            ("WEB-INF/lib/core-2.423.jar", &inner),
            ("index.html", b"<html/>"),
        ]);
        let path = write_archive(&temp, "jenkins.war", &outer);

        let bytes = read_entry(
            &ZipOpener,
            &path,
            "WEB-INF/lib/core-2.423.jar/META-INF/MANIFEST.MF",
        )
        .unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"Jenkins-Version: 2.423\n"[..]));
    }

    #[test]
    fn test_read_nested_missing_inner_archive_is_none() {
        let temp = TempDir::new().unwrap();
        let outer = build_zip(&[("index.html", b"<html/>")]);
        let path = write_archive(&temp, "jenkins.war", &outer);

        let bytes = read_entry(&ZipOpener, &path, "WEB-INF/lib/missing.jar/META-INF/MANIFEST.MF")
            .unwrap();
        assert!(bytes.is_none());
    }
}
