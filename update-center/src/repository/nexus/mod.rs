//! Nexus Repository Manager backend.
//!
//! [`NexusRepository`] answers every [`MavenRepository`] operation from a
//! [`RemoteIndex`] built by two search queries, plus on-demand downloads for
//! manifests and artifact content. Expected absences are reported as
//! `Ok(None)` or an empty [`Manifest`] and logged at warn level; malformed
//! repository data and transport failures are errors.

mod index;
mod search;

pub use index::{IndexSnapshot, RemoteIndex};
pub use search::{AssetRecord, SearchQuery};

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::checksum;
use crate::config::RepositoryConfig;
use crate::coord::Coordinate;
use crate::fetch::ArchiveFetcher;
use crate::http::{HttpClient, ReqwestClient};
use crate::local::LocalCacheProbe;
use crate::manifest::{Manifest, MANIFEST_PATH};
use crate::repository::{
    ArtifactMetadata, MavenRepository, RepositoryError, RepositoryResult, ResolvedArtifact,
};

/// Artifact repository backed by a Nexus search API.
pub struct NexusRepository {
    index: RemoteIndex,
    fetcher: ArchiveFetcher,
    local: LocalCacheProbe,
    verify_downloads: bool,
}

impl NexusRepository {
    /// Create a repository using a reqwest client configured from `config`.
    pub fn new(config: &RepositoryConfig) -> RepositoryResult<Self> {
        let client = ReqwestClient::new(config.credentials.clone(), config.timeout)?;
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Create a repository with default settings and credentials from the
    /// environment.
    pub fn from_env() -> RepositoryResult<Self> {
        Self::new(&RepositoryConfig::from_env()?)
    }

    /// Create a repository that sends every request through `client`.
    pub fn with_client(client: Arc<dyn HttpClient>, config: &RepositoryConfig) -> Self {
        let index = RemoteIndex::new(
            Arc::clone(&client),
            config.search_url(),
            config.plugin_search.clone(),
            config.core_search.clone(),
        );
        let fetcher = ArchiveFetcher::new(client).with_temp_dir(config.temp_dir.clone());

        Self {
            index,
            fetcher,
            local: LocalCacheProbe::new(config.local_repository.clone()),
            verify_downloads: config.verify_downloads,
        }
    }

    /// The remote index.
    pub fn index(&self) -> &RemoteIndex {
        &self.index
    }

    /// Build the index now instead of on first use.
    ///
    /// Fails with [`RepositoryError::ReInitialized`] when it is already built.
    pub fn initialize(&self) -> RepositoryResult<()> {
        self.index.initialize().map(|_| ())
    }

    fn require_asset(&self, coordinate: &Coordinate) -> RepositoryResult<AssetRecord> {
        let snapshot = self.index.ensure_initialized()?;
        snapshot
            .asset_for(coordinate)
            .cloned()
            .ok_or_else(|| RepositoryError::AssetNotFound(coordinate.to_string()))
    }
}

impl MavenRepository for NexusRepository {
    fn ensure_initialized(&self) -> RepositoryResult<()> {
        self.index.ensure_initialized().map(|_| ())
    }

    fn list_all_plugins(&self) -> RepositoryResult<BTreeSet<Coordinate>> {
        Ok(self.index.ensure_initialized()?.plugins().clone())
    }

    fn list_all_wars(&self, group_id: &str) -> RepositoryResult<BTreeSet<Coordinate>> {
        // The core query already selects the group; the argument is not applied again
        tracing::debug!(group_id, "Listing core archives without group filtering");
        Ok(self.index.ensure_initialized()?.wars().clone())
    }

    fn get_metadata(&self, coordinate: &Coordinate) -> RepositoryResult<Option<ArtifactMetadata>> {
        let snapshot = self.index.ensure_initialized()?;

        let Some(asset) = snapshot.asset_for(coordinate) else {
            tracing::warn!(%coordinate, "Artifact not in repository index");
            return Ok(None);
        };

        let Some(sha1_hex) = asset.sha1_hex.as_deref().filter(|s| !s.trim().is_empty()) else {
            tracing::warn!(%coordinate, path = %asset.path, "No SHA-1 checksum");
            return Ok(None);
        };
        let sha1 = checksum::hex_to_base64(sha1_hex)?;

        let Some(sha256_hex) = asset.sha256_hex.as_deref().filter(|s| !s.trim().is_empty()) else {
            tracing::warn!(%coordinate, path = %asset.path, "No SHA-256 checksum");
            return Ok(None);
        };
        let sha256 = checksum::hex_to_base64(sha256_hex)?;

        let Some(timestamp) = asset.last_modified_millis else {
            tracing::warn!(%coordinate, path = %asset.path, "No last-modified time");
            return Ok(None);
        };

        Ok(Some(ArtifactMetadata {
            sha1,
            sha256,
            timestamp,
            size: asset.size_bytes,
        }))
    }

    fn get_manifest(&self, coordinate: &Coordinate) -> RepositoryResult<Manifest> {
        let asset = self.require_asset(coordinate)?;

        match self.fetcher.fetch_entry(&asset.download_url, MANIFEST_PATH)? {
            Some(bytes) => Manifest::parse(&bytes),
            None => {
                tracing::warn!(%coordinate, "No manifest available");
                Ok(Manifest::default())
            }
        }
    }

    fn resolve(&self, coordinate: &Coordinate) -> RepositoryResult<ResolvedArtifact> {
        if let Some(path) = self.local.try_local(coordinate) {
            return Ok(ResolvedArtifact::Local(path));
        }

        let asset = self.require_asset(coordinate)?;
        let file = self.fetcher.download(&asset.download_url)?.ok_or_else(|| {
            RepositoryError::DownloadFailed {
                url: asset.download_url.clone(),
                reason: "server returned an error status".to_string(),
            }
        })?;

        if self.verify_downloads {
            match asset.sha256_hex.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(expected) => checksum::verify_sha256(file.path(), expected)?,
                None => {
                    tracing::warn!(%coordinate, "No SHA-256 in index, download not verified")
                }
            }
        }

        Ok(ResolvedArtifact::Downloaded(file))
    }

    fn get_zip_file_entry(
        &self,
        _coordinate: &Coordinate,
        _path: &str,
    ) -> RepositoryResult<Option<Vec<u8>>> {
        Err(RepositoryError::NotImplemented("get_zip_file_entry"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::build_zip;
    use crate::http::tests::MockHttpClient;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use sha2::{Digest, Sha256};
    use std::fs;
    use tempfile::TempDir;

    const API_URL: &str = "https://repo.example.org/service/rest/v1/";
    const FOO_PATH: &str = "/org/example/foo/1.0/foo-1.0.hpi";
    const FOO_URL: &str = "https://repo.example.org/repository/releases/org/example/foo/1.0/foo-1.0.hpi";

    struct Fixture {
        repo: NexusRepository,
        mock: Arc<MockHttpClient>,
        _local: TempDir,
    }

    fn config(local: &TempDir) -> RepositoryConfig {
        RepositoryConfig::new(crate::http::Credentials::new("user", "pass"))
            .with_api_url(API_URL)
            .with_local_repository(local.path())
    }

    fn search_url(query: SearchQuery) -> String {
        query.url(&format!("{}search", API_URL), None).unwrap()
    }

    fn foo_asset(checksum: &str) -> String {
        format!(
            r#"{{"items":[{{"assets":[{{
                "downloadUrl": "{}",
                "path": "{}",
                "checksum": {},
                "lastModified": "2023-09-12T14:23:43.000+00:00",
                "fileSize": 42,
                "maven2": {{"groupId":"org.example","artifactId":"foo","version":"1.0","extension":"hpi"}}
            }}]}}],"continuationToken":null}}"#,
            FOO_URL, FOO_PATH, checksum
        )
    }

    fn fixture(plugin_page: &str, extra: impl FnOnce(MockHttpClient) -> MockHttpClient) -> Fixture {
        let local = TempDir::new().unwrap();
        let mock = MockHttpClient::new()
            .with_body(&search_url(SearchQuery::plugins()), plugin_page)
            .with_body(&search_url(SearchQuery::core_wars()), r#"{"items":[]}"#);
        let mock = Arc::new(extra(mock));
        let repo = NexusRepository::with_client(mock.clone(), &config(&local));
        Fixture {
            repo,
            mock,
            _local: local,
        }
    }

    fn foo() -> Coordinate {
        Coordinate::plugin("org.example", "foo", "1.0")
    }

    #[test]
    fn test_metadata_end_to_end() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        let metadata = f.repo.get_metadata(&foo()).unwrap().unwrap();
        assert_eq!(metadata.sha1, "qg==");
        assert_eq!(metadata.sha256, "uw==");
        assert_eq!(metadata.timestamp, 1_694_528_623_000);
        assert_eq!(metadata.size, 42);
    }

    #[test]
    fn test_metadata_checksums_decode_to_index_hex() {
        let sha1 = "83933f0b6c9bf4ba2d6d7ef1e1ecb0a7c6bca4c0";
        let sha256 = "05ee1e9b1ac3e0bc3b8ff0a2e8ef2f25b4a3c2b1d6f0e9a8b7c6d5e4f3a2b1c0";
        let f = fixture(
            &foo_asset(&format!(r#"{{"sha1":"{}","sha256":"{}"}}"#, sha1, sha256)),
            |m| m,
        );

        let metadata = f.repo.get_metadata(&foo()).unwrap().unwrap();
        assert_eq!(hex::encode(STANDARD.decode(metadata.sha1).unwrap()), sha1);
        assert_eq!(hex::encode(STANDARD.decode(metadata.sha256).unwrap()), sha256);
    }

    #[test]
    fn test_metadata_unknown_coordinate_is_none() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        let missing = Coordinate::plugin("org.example", "bar", "1.0");
        assert!(f.repo.get_metadata(&missing).unwrap().is_none());
    }

    #[test]
    fn test_metadata_without_sha256_is_none() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa"}"#), |m| m);
        assert!(f.repo.get_metadata(&foo()).unwrap().is_none());
    }

    #[test]
    fn test_metadata_with_null_sha1_is_none() {
        let f = fixture(&foo_asset(r#"{"sha1":null,"sha256":"bb"}"#), |m| m);
        assert!(f.repo.get_metadata(&foo()).unwrap().is_none());
    }

    #[test]
    fn test_metadata_with_blank_checksums_is_none() {
        let f = fixture(&foo_asset(r#"{"sha1":"   ","sha256":"bb"}"#), |m| m);
        assert!(f.repo.get_metadata(&foo()).unwrap().is_none());

        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":" \t "}"#), |m| m);
        assert!(f.repo.get_metadata(&foo()).unwrap().is_none());
    }

    #[test]
    fn test_metadata_with_malformed_sha1_is_error() {
        let f = fixture(&foo_asset(r#"{"sha1":"not-hex","sha256":"bb"}"#), |m| m);
        assert!(matches!(
            f.repo.get_metadata(&foo()),
            Err(RepositoryError::InvalidChecksum { .. })
        ));
    }

    #[test]
    fn test_metadata_with_malformed_sha256_is_error() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"xyz"}"#), |m| m);
        assert!(matches!(
            f.repo.get_metadata(&foo()),
            Err(RepositoryError::InvalidChecksum { .. })
        ));
    }

    #[test]
    fn test_index_built_once_across_operations() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        for _ in 0..3 {
            f.repo.get_metadata(&foo()).unwrap();
        }
        f.repo.list_all_plugins().unwrap();
        f.repo.list_all_wars("ignored.group").unwrap();

        assert_eq!(f.mock.calls(), 2);
    }

    #[test]
    fn test_initialize_after_use_is_error() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        f.repo.list_all_plugins().unwrap();
        assert!(matches!(
            f.repo.initialize(),
            Err(RepositoryError::ReInitialized)
        ));
    }

    #[test]
    fn test_list_all_plugins() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        let plugins = f.repo.list_all_plugins().unwrap();
        assert_eq!(plugins.into_iter().collect::<Vec<_>>(), vec![foo()]);
        assert!(f.repo.list_all_wars("org.jenkins-ci.main").unwrap().is_empty());
    }

    #[test]
    fn test_manifest_from_download() {
        let zip = build_zip(&[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\nShort-Name: foo\n")]);
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| {
            m.with_body(FOO_URL, zip)
        });

        let manifest = f.repo.get_manifest(&foo()).unwrap();
        assert_eq!(manifest.get("Short-Name"), Some("foo"));
    }

    #[test]
    fn test_manifest_missing_entry_is_empty() {
        let zip = build_zip(&[("index.jelly", b"<div/>")]);
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| {
            m.with_body(FOO_URL, zip)
        });

        let manifest = f.repo.get_manifest(&foo()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_manifest_failed_download_is_empty() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| {
            m.with_status(FOO_URL, 500)
        });

        assert!(f.repo.get_manifest(&foo()).unwrap().is_empty());
    }

    #[test]
    fn test_manifest_for_unknown_coordinate_is_error() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        let missing = Coordinate::plugin("org.example", "bar", "1.0");
        assert!(matches!(
            f.repo.get_manifest(&missing),
            Err(RepositoryError::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_local_hit_makes_no_remote_call() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);
        let local_path = f.repo.local.local_path(&foo());
        fs::create_dir_all(local_path.parent().unwrap()).unwrap();
        fs::write(&local_path, b"local bytes").unwrap();

        let artifact = f.repo.resolve(&foo()).unwrap();
        assert!(artifact.is_local());
        assert_eq!(artifact.path(), local_path);
        assert_eq!(f.mock.calls(), 0);
    }

    #[test]
    fn test_resolve_downloads_and_verifies() {
        let body = b"remote bytes".to_vec();
        let digest = hex::encode(Sha256::digest(&body));
        let f = fixture(
            &foo_asset(&format!(r#"{{"sha1":"aa","sha256":"{}"}}"#, digest)),
            |m| m.with_body(FOO_URL, body.clone()),
        );

        let artifact = f.repo.resolve(&foo()).unwrap();
        assert!(!artifact.is_local());
        assert_eq!(fs::read(artifact.path()).unwrap(), body);
        assert_eq!(f.mock.calls(), 3);
    }

    #[test]
    fn test_resolve_checksum_mismatch() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| {
            m.with_body(FOO_URL, b"remote bytes".to_vec())
        });

        assert!(matches!(
            f.repo.resolve(&foo()),
            Err(RepositoryError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_resolve_without_verification() {
        let local = TempDir::new().unwrap();
        let mock = Arc::new(
            MockHttpClient::new()
                .with_body(
                    &search_url(SearchQuery::plugins()),
                    foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#),
                )
                .with_body(&search_url(SearchQuery::core_wars()), r#"{"items":[]}"#)
                .with_body(FOO_URL, b"remote bytes".to_vec()),
        );
        let repo = NexusRepository::with_client(
            mock,
            &config(&local).with_verify_downloads(false),
        );

        assert!(repo.resolve(&foo()).is_ok());
    }

    #[test]
    fn test_resolve_error_status_is_error() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| {
            m.with_status(FOO_URL, 403)
        });

        assert!(matches!(
            f.repo.resolve(&foo()),
            Err(RepositoryError::DownloadFailed { .. })
        ));
    }

    #[test]
    fn test_zip_file_entry_not_implemented() {
        let f = fixture(&foo_asset(r#"{"sha1":"aa","sha256":"bb"}"#), |m| m);

        assert!(matches!(
            f.repo.get_zip_file_entry(&foo(), "META-INF/MANIFEST.MF"),
            Err(RepositoryError::NotImplemented(_))
        ));
        assert_eq!(f.mock.calls(), 0);
    }
}
