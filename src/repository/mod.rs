//! Persistence ports for the mutation pipeline.
//!
//! The in-memory store is authoritative for reads; these ports make a change
//! durable (descriptor files) and publish it (version control).

pub mod fs;
pub mod version_control;

use crate::error::TaxonomyError;
use crate::model::AnyArtifact;
use crate::types::ArtifactType;
use std::path::PathBuf;

pub use fs::FsArtifactRepository;
pub use version_control::{DisabledVersionControl, GitVersionControl, VersionControl};

/// Durable storage of artifact descriptors, one directory per artifact
pub trait ArtifactRepository: Send + Sync {
    /// Directory holding the artifact `folder` of `artifact_type`
    fn path_for(&self, artifact_type: ArtifactType, folder: &str) -> Result<PathBuf, TaxonomyError>;
    /// Write the descriptor and any attached file blobs, returning the descriptor path.
    ///
    /// On error nothing of this call may remain on disk.
    fn save(&self, folder: &str, record: &AnyArtifact) -> Result<PathBuf, TaxonomyError>;
    /// Remove the artifact directory
    fn delete(&self, artifact_type: ArtifactType, folder: &str) -> Result<(), TaxonomyError>;
}

/// Directory name for an artifact that has none on disk yet
pub fn folder_for_new(name: &str) -> String {
    let folder: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_whitespace() => '-',
            c => c,
        })
        .collect();
    if folder.is_empty() || folder == "." || folder == ".." {
        "artifact".to_string()
    } else {
        folder
    }
}
