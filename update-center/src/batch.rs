//! Parallel metadata resolution.
//!
//! Resolves metadata for many coordinates against one shared repository. The
//! repository is initialized up front, so an indexing failure aborts the run
//! before any work is scheduled; after that, each coordinate is independent:
//! soft absences and per-coordinate errors are collected into the report
//! instead of stopping the batch.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;

use crate::coord::Coordinate;
use crate::repository::{ArtifactMetadata, MavenRepository, RepositoryError, RepositoryResult};

/// Metadata for one coordinate, as emitted in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// `group:artifact:version:packaging`
    pub coordinate: String,

    #[serde(flatten)]
    pub metadata: ArtifactMetadata,
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Coordinates with complete metadata.
    pub entries: Vec<CatalogEntry>,

    /// Coordinates the repository had no usable record for.
    pub missing: Vec<Coordinate>,

    /// Coordinates whose lookup failed, with the error message.
    pub failed: Vec<(Coordinate, String)>,
}

impl BatchReport {
    /// Number of coordinates processed.
    pub fn total(&self) -> usize {
        self.entries.len() + self.missing.len() + self.failed.len()
    }
}

enum Outcome {
    Found(CatalogEntry),
    Missing(Coordinate),
    Failed(Coordinate, String),
}

/// Resolves metadata for many coordinates concurrently.
pub struct BatchResolver<'a> {
    repository: &'a dyn MavenRepository,
    threads: Option<usize>,
}

impl<'a> BatchResolver<'a> {
    pub fn new(repository: &'a dyn MavenRepository) -> Self {
        Self {
            repository,
            threads: None,
        }
    }

    /// Use a dedicated pool of `threads` workers instead of the global pool.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Resolve metadata for every coordinate.
    ///
    /// # Errors
    ///
    /// Only repository initialization errors and thread pool creation
    /// failures; per-coordinate errors are recorded in the report.
    pub fn resolve_all(&self, coordinates: &[Coordinate]) -> RepositoryResult<BatchReport> {
        self.repository.ensure_initialized()?;

        tracing::info!(
            coordinates = coordinates.len(),
            threads = ?self.threads,
            "Resolving metadata"
        );

        let outcomes = match self.threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| RepositoryError::InvalidConfig(format!("thread pool: {}", e)))?;
                pool.install(|| self.resolve_parallel(coordinates))
            }
            None => self.resolve_parallel(coordinates),
        };

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Found(entry) => report.entries.push(entry),
                Outcome::Missing(coordinate) => report.missing.push(coordinate),
                Outcome::Failed(coordinate, error) => report.failed.push((coordinate, error)),
            }
        }

        tracing::info!(
            resolved = report.entries.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            "Metadata resolution complete"
        );
        Ok(report)
    }

    fn resolve_parallel(&self, coordinates: &[Coordinate]) -> Vec<Outcome> {
        coordinates
            .par_iter()
            .map(|coordinate| match self.repository.get_metadata(coordinate) {
                Ok(Some(metadata)) => Outcome::Found(CatalogEntry {
                    coordinate: coordinate.to_string(),
                    metadata,
                }),
                Ok(None) => Outcome::Missing(coordinate.clone()),
                Err(e) => {
                    tracing::warn!(%coordinate, error = %e, "Metadata lookup failed");
                    Outcome::Failed(coordinate.clone(), e.to_string())
                }
            })
            .collect()
    }
}
