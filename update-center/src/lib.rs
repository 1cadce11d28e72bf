//! Update Center - artifact metadata resolution for plugin catalogs
//!
//! This library turns artifact coordinates into checksum-backed metadata,
//! manifests and artifact bytes by querying a Nexus repository manager, with
//! a local Maven repository as the first stop for artifact content.
//!
//! # High-Level API
//!
//! The [`repository`] module provides the resolver facade:
//!
//! ```ignore
//! use update_center::config::RepositoryConfig;
//! use update_center::coord::Coordinate;
//! use update_center::repository::{MavenRepository, NexusRepository};
//!
//! let config = RepositoryConfig::from_env()?;
//! let repository = NexusRepository::new(&config)?;
//!
//! let coordinate: Coordinate = "org.example:foo:1.0".parse()?;
//! if let Some(metadata) = repository.get_metadata(&coordinate)? {
//!     println!("{} {}", metadata.sha256, metadata.size);
//! }
//! let manifest = repository.get_manifest(&coordinate)?;
//! ```

pub mod archive;
pub mod batch;
pub mod checksum;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod http;
pub mod local;
pub mod logging;
pub mod manifest;
pub mod repository;

/// Version of the update-center library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
