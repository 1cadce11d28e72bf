//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`artifact`] - Single-artifact operations (metadata, manifest, resolve)
//! - [`catalog`] - Metadata for every listed artifact as JSON lines
//! - [`list`] - Plugin and core listings

pub mod artifact;
pub mod catalog;
pub mod list;
