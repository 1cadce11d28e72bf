//! One-shot remote index.
//!
//! The index is built from exactly two search queries (plugins and core) the
//! first time any operation needs it. Concurrent callers block on the build
//! lock until the winning thread finishes; a failed build leaves the cell
//! empty so the next caller tries again. Once built, lookups read the cell
//! without locking.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use super::search::{self, AssetRecord, SearchQuery};
use crate::coord::Coordinate;
use crate::http::HttpClient;
use crate::repository::{RepositoryError, RepositoryResult};

/// Immutable result of indexing the repository.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    assets: HashMap<String, AssetRecord>,
    plugins: BTreeSet<Coordinate>,
    wars: BTreeSet<Coordinate>,
}

impl IndexSnapshot {
    /// Build a snapshot from assets in arrival order.
    ///
    /// On duplicate paths the later record wins. Plugin and core sets are
    /// derived from the path extension only.
    pub fn from_assets(records: impl IntoIterator<Item = AssetRecord>) -> Self {
        let mut assets = HashMap::new();
        for record in records {
            assets.insert(record.path.clone(), record);
        }

        let mut plugins = BTreeSet::new();
        let mut wars = BTreeSet::new();
        let mut skipped = 0usize;
        for record in assets.values() {
            let target = if record.is_plugin() {
                &mut plugins
            } else if record.is_war() {
                &mut wars
            } else {
                continue;
            };
            match &record.coordinate {
                Some(coordinate) => {
                    target.insert(coordinate.clone());
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, "Assets without usable coordinates left out of the index");
        }

        Self {
            assets,
            plugins,
            wars,
        }
    }

    /// Asset stored at `path` (leading `/`).
    pub fn asset(&self, path: &str) -> Option<&AssetRecord> {
        self.assets.get(path)
    }

    /// Asset for `coordinate`.
    pub fn asset_for(&self, coordinate: &Coordinate) -> Option<&AssetRecord> {
        self.asset(&coordinate.index_key())
    }

    pub fn plugins(&self) -> &BTreeSet<Coordinate> {
        &self.plugins
    }

    pub fn wars(&self) -> &BTreeSet<Coordinate> {
        &self.wars
    }

    /// Number of indexed assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Lazily built, shared index of the remote repository.
pub struct RemoteIndex {
    client: Arc<dyn HttpClient>,
    search_url: String,
    plugin_query: SearchQuery,
    core_query: SearchQuery,
    snapshot: OnceLock<Arc<IndexSnapshot>>,
    build_lock: Mutex<()>,
}

impl RemoteIndex {
    /// Create an index that queries `search_url`.
    pub fn new(
        client: Arc<dyn HttpClient>,
        search_url: impl Into<String>,
        plugin_query: SearchQuery,
        core_query: SearchQuery,
    ) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            plugin_query,
            core_query,
            snapshot: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    /// Return the snapshot, building it on first use.
    ///
    /// At most one build runs at a time; callers arriving during a build wait
    /// for it and share its result.
    pub fn ensure_initialized(&self) -> RepositoryResult<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.snapshot.get() {
            return Ok(Arc::clone(snapshot));
        }

        let _building = self.build_lock.lock();
        if let Some(snapshot) = self.snapshot.get() {
            return Ok(Arc::clone(snapshot));
        }
        Ok(self.store(self.build()?))
    }

    /// Build the snapshot now.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::ReInitialized`] if a snapshot already exists, or
    /// any error from the search queries.
    pub fn initialize(&self) -> RepositoryResult<Arc<IndexSnapshot>> {
        let _building = self.build_lock.lock();
        if self.snapshot.get().is_some() {
            return Err(RepositoryError::ReInitialized);
        }
        Ok(self.store(self.build()?))
    }

    /// Whether the snapshot has been built.
    pub fn is_initialized(&self) -> bool {
        self.snapshot.get().is_some()
    }

    // Callers hold the build lock, so the cell is still empty here.
    fn store(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        Arc::clone(self.snapshot.get_or_init(|| Arc::new(snapshot)))
    }

    fn build(&self) -> RepositoryResult<IndexSnapshot> {
        tracing::info!(search_url = %self.search_url, "Initializing remote index");

        let mut records = Vec::new();
        let plugin_pages = search::run_query(
            self.client.as_ref(),
            &self.search_url,
            &self.plugin_query,
            |record| records.push(record),
        )?;
        let core_pages = search::run_query(
            self.client.as_ref(),
            &self.search_url,
            &self.core_query,
            |record| records.push(record),
        )?;

        let snapshot = IndexSnapshot::from_assets(records);
        tracing::info!(
            assets = snapshot.len(),
            plugins = snapshot.plugins().len(),
            wars = snapshot.wars().len(),
            pages = plugin_pages + core_pages,
            "Remote index ready"
        );
        Ok(snapshot)
    }
}
