//! Search API documents and queries.
//!
//! The search endpoint returns items grouped by component; each item carries
//! the assets (files) stored for it:
//!
//! ```json
//! {
//!   "items": [{ "assets": [{
//!     "downloadUrl": "https://repo.example.org/repository/releases/org/example/foo/1.0/foo-1.0.hpi",
//!     "path": "org/example/foo/1.0/foo-1.0.hpi",
//!     "checksum": { "sha1": "83933f…", "sha256": "05ee1e…" },
//!     "lastModified": "2023-09-12T14:23:43.000+00:00",
//!     "fileSize": 1593423,
//!     "maven2": { "groupId": "org.example", "artifactId": "foo", "version": "1.0", "extension": "hpi" }
//!   }]}],
//!   "continuationToken": null
//! }
//! ```

use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;

use crate::coord::{Coordinate, PLUGIN_EXTENSION, WAR_EXTENSION};
use crate::http::HttpClient;
use crate::repository::{RepositoryError, RepositoryResult};

/// Safety limit on the number of pages followed for one query.
const MAX_PAGES: usize = 10_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    assets: Vec<JsonAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonAsset {
    download_url: String,
    path: String,
    checksum: Option<JsonChecksum>,
    last_modified: Option<String>,
    #[serde(default)]
    file_size: u64,
    maven2: Option<JsonCoords>,
}

#[derive(Debug, Deserialize)]
struct JsonChecksum {
    sha1: Option<String>,
    sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCoords {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    extension: Option<String>,
}

/// Repository metadata about one stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Repository path with a leading `/`.
    pub path: String,

    /// Where the file can be downloaded.
    pub download_url: String,

    /// Hex SHA-1, as reported.
    pub sha1_hex: Option<String>,

    /// Hex SHA-256, as reported.
    pub sha256_hex: Option<String>,

    /// Last-modified time in milliseconds since the Unix epoch.
    pub last_modified_millis: Option<i64>,

    /// Size in bytes.
    pub size_bytes: u64,

    /// Coordinate of the file, from the search facet or parsed from the path.
    pub coordinate: Option<Coordinate>,
}

impl AssetRecord {
    /// Whether the path names a plugin archive.
    pub fn is_plugin(&self) -> bool {
        has_extension(&self.path, PLUGIN_EXTENSION)
    }

    /// Whether the path names a web archive.
    pub fn is_war(&self) -> bool {
        has_extension(&self.path, WAR_EXTENSION)
    }

    fn from_json(asset: JsonAsset, url: &str) -> RepositoryResult<Self> {
        let path = if asset.path.starts_with('/') {
            asset.path
        } else {
            format!("/{}", asset.path)
        };

        let last_modified_millis = asset
            .last_modified
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|dt| dt.timestamp_millis())
                    .map_err(|e| RepositoryError::SearchParse {
                        url: url.to_string(),
                        reason: format!("invalid lastModified '{}' for {}: {}", value, path, e),
                    })
            })
            .transpose()?;

        let coordinate = asset
            .maven2
            .and_then(JsonCoords::into_coordinate)
            .or_else(|| Coordinate::from_repository_path(&path));

        let (sha1_hex, sha256_hex) = match asset.checksum {
            Some(checksum) => (checksum.sha1, checksum.sha256),
            None => (None, None),
        };

        Ok(Self {
            path,
            download_url: asset.download_url,
            sha1_hex,
            sha256_hex,
            last_modified_millis,
            size_bytes: asset.file_size,
            coordinate,
        })
    }
}

impl JsonCoords {
    fn into_coordinate(self) -> Option<Coordinate> {
        Some(Coordinate::new(
            self.group_id?,
            self.artifact_id?,
            self.version?,
            self.extension?,
        ))
    }
}

fn has_extension(path: &str, extension: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| ext == extension)
        .unwrap_or(false)
}

/// One search query: a list of query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    params: Vec<(String, String)>,
}

impl SearchQuery {
    /// Query sorted by version, newest first, with no constraints.
    pub fn sorted_by_version() -> Self {
        Self {
            params: vec![
                ("sort".to_string(), "version".to_string()),
                ("direction".to_string(), "desc".to_string()),
            ],
        }
    }

    /// Default plugin query: every plugin archive.
    pub fn plugins() -> Self {
        Self::sorted_by_version().with("maven.extension", PLUGIN_EXTENSION)
    }

    /// Default core query: the platform web archive.
    pub fn core_wars() -> Self {
        Self::sorted_by_version()
            .with("maven.groupId", "org.jenkins-ci.main")
            .with("maven.artifactId", "jenkins")
            .with("maven.extension", WAR_EXTENSION)
    }

    /// Add or replace a query parameter.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Query parameters in order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Full request URL for this query against `search_url`.
    pub fn url(&self, search_url: &str, continuation: Option<&str>) -> RepositoryResult<String> {
        let mut params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(token) = continuation {
            params.push(("continuationToken", token));
        }

        Url::parse_with_params(search_url, &params)
            .map(String::from)
            .map_err(|e| RepositoryError::InvalidConfig(format!("search URL {}: {}", search_url, e)))
    }
}

/// Run `query`, following continuation tokens, and hand every asset to `sink`.
///
/// Returns the number of pages fetched.
pub(crate) fn run_query(
    client: &dyn HttpClient,
    search_url: &str,
    query: &SearchQuery,
    mut sink: impl FnMut(AssetRecord),
) -> RepositoryResult<usize> {
    let mut continuation: Option<String> = None;
    let mut pages = 0;

    loop {
        let url = query.url(search_url, continuation.as_deref())?;
        let body = client.get(&url)?;
        let page: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| RepositoryError::SearchParse {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        pages += 1;

        let mut assets = 0;
        for item in page.items {
            for asset in item.assets {
                sink(AssetRecord::from_json(asset, &url)?);
                assets += 1;
            }
        }
        tracing::debug!(url = %url, assets, "Search page merged");

        match page.continuation_token.filter(|t| !t.is_empty()) {
            Some(token) if continuation.as_deref() == Some(token.as_str()) => {
                tracing::warn!(url = %url, "Search returned the same continuation token twice");
                break;
            }
            Some(_) if pages >= MAX_PAGES => {
                tracing::warn!(url = %url, pages, "Search page limit reached");
                break;
            }
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    Ok(pages)
}
