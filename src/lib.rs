//! Taxonomy: In-Memory Token Taxonomy Repository
//!
//! Loads token taxonomy artifacts (bases, behaviors, behavior groups, property
//! sets and token templates) from a descriptor tree into symbol-keyed
//! collections, serves lookups and paginated listings, applies validated
//! mutations persisted back to the tree, and caches versioned snapshots.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod model;
pub mod mutation;
pub mod query;
pub mod repository;
pub mod service;
pub mod store;
pub mod symbol;
pub mod tooling;
pub mod types;

pub use error::TaxonomyError;
pub use loader::ArtifactLoader;
pub use model::{AnyArtifact, Taxonomy};
pub use service::TaxonomyService;
pub use store::TaxonomyStore;
pub use types::{ArtifactSymbol, ArtifactType};
