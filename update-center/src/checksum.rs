//! Checksum normalization and file digests.
//!
//! The repository reports checksums as lowercase hex; catalog consumers expect
//! base64. This module converts between the two and computes SHA-256 digests
//! of downloaded files for verification.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::repository::{RepositoryError, RepositoryResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Re-encode a hex checksum as standard base64.
///
/// # Errors
///
/// Returns [`RepositoryError::InvalidChecksum`] if `hex` is not valid hex or
/// encodes no bytes.
/// A malformed value is upstream data corruption, not an absent field.
///
/// # Example
///
/// ```
/// use update_center::checksum::hex_to_base64;
///
/// assert_eq!(hex_to_base64("aa").unwrap(), "qg==");
/// assert!(hex_to_base64("zz").is_err());
/// ```
pub fn hex_to_base64(hex: &str) -> RepositoryResult<String> {
    let bytes = hex::decode(hex.trim()).map_err(|e| RepositoryError::InvalidChecksum {
        value: hex.to_string(),
        reason: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(RepositoryError::InvalidChecksum {
            value: hex.to_string(),
            reason: "empty checksum".to_string(),
        });
    }
    Ok(STANDARD.encode(bytes))
}

/// Calculate the SHA-256 checksum of a file.
///
/// # Returns
///
/// The lowercase hexadecimal SHA-256 hash of the file contents.
pub fn calculate_file_sha256(path: &Path) -> RepositoryResult<String> {
    let mut file = File::open(path).map_err(|e| RepositoryError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| RepositoryError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify that a file matches an expected SHA-256 checksum (hex, any case).
pub fn verify_sha256(path: &Path, expected: &str) -> RepositoryResult<()> {
    let actual = calculate_file_sha256(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(RepositoryError::ChecksumMismatch {
            filename: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_hex_to_base64_known_values() {
        assert_eq!(hex_to_base64("aa").unwrap(), "qg==");
        assert_eq!(hex_to_base64("bb").unwrap(), "uw==");
        // SHA-1 of the empty string
        assert_eq!(
            hex_to_base64("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap(),
            "2jmj7l5rSw0yVb/vlWAYkK/YBwk="
        );
    }

    #[test]
    fn test_hex_to_base64_accepts_uppercase() {
        assert_eq!(hex_to_base64("AA").unwrap(), "qg==");
    }

    #[test]
    fn test_hex_to_base64_rejects_malformed() {
        assert!(matches!(
            hex_to_base64("not-hex"),
            Err(RepositoryError::InvalidChecksum { .. })
        ));
        // Odd length
        assert!(hex_to_base64("abc").is_err());
    }

    #[test]
    fn test_hex_to_base64_rejects_blank() {
        assert!(matches!(
            hex_to_base64(""),
            Err(RepositoryError::InvalidChecksum { .. })
        ));
        assert!(hex_to_base64("   ").is_err());
    }

    proptest! {
        #[test]
        fn prop_base64_decodes_back_to_hex_bytes(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
            let hex = hex::encode(&bytes);
            let b64 = hex_to_base64(&hex).unwrap();
            let decoded = STANDARD.decode(b64).unwrap();
            prop_assert_eq!(hex::encode(decoded), hex);
        }
    }

    #[test]
    fn test_calculate_file_sha256() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("test.txt");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"hello world").unwrap();

        let checksum = calculate_file_sha256(&file_path).unwrap();

        // SHA-256 of "hello world"
        assert_eq!(
            checksum,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_calculate_nonexistent_file() {
        let result = calculate_file_sha256(Path::new("/nonexistent/file.hpi"));
        assert!(matches!(result, Err(RepositoryError::ReadFailed { .. })));
    }

    #[test]
    fn test_verify_sha256_mismatch() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("foo-1.0.hpi");
        std::fs::write(&file_path, b"hello world").unwrap();

        assert!(verify_sha256(
            &file_path,
            "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9"
        )
        .is_ok());

        match verify_sha256(&file_path, "wrong_checksum") {
            Err(RepositoryError::ChecksumMismatch { filename, .. }) => {
                assert_eq!(filename, "foo-1.0.hpi");
            }
            other => panic!("Expected ChecksumMismatch error, got {:?}", other),
        }
    }
}
