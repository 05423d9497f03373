//! Version-control port used to publish persisted changes.

use crate::error::TaxonomyError;
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

/// Commit/pull primitives over the artifact tree
pub trait VersionControl: Send + Sync {
    fn commit(&self, message: &str) -> Result<(), TaxonomyError>;
    fn pull(&self) -> Result<(), TaxonomyError>;
}

/// Backend for trees that are not under version control
#[derive(Debug, Default)]
pub struct DisabledVersionControl;

impl VersionControl for DisabledVersionControl {
    fn commit(&self, _message: &str) -> Result<(), TaxonomyError> {
        Err(TaxonomyError::PersistenceError(
            "Version control is not configured".to_string(),
        ))
    }

    fn pull(&self) -> Result<(), TaxonomyError> {
        Err(TaxonomyError::PersistenceError(
            "Version control is not configured".to_string(),
        ))
    }
}

/// `git` command line in the working copy holding the artifact tree
#[derive(Debug)]
pub struct GitVersionControl {
    work_dir: PathBuf,
}

impl GitVersionControl {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, TaxonomyError> {
        let command = format!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| TaxonomyError::PersistenceError(format!("{}: {}", command, e)))?;

        if !output.status.success() {
            return Err(TaxonomyError::PersistenceError(format!(
                "{} failed: {}",
                command,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VersionControl for GitVersionControl {
    fn commit(&self, message: &str) -> Result<(), TaxonomyError> {
        if message.trim().is_empty() {
            return Err(TaxonomyError::InvalidArgument(
                "Commit message must not be empty".to_string(),
            ));
        }
        self.run(&["add", "--all", "."])?;
        let summary = self.run(&["commit", "--message", message])?;
        info!(work_dir = %self.work_dir.display(), "Committed local updates: {}", summary);
        Ok(())
    }

    fn pull(&self) -> Result<(), TaxonomyError> {
        let summary = self.run(&["pull", "--ff-only"])?;
        info!(work_dir = %self.work_dir.display(), "Pulled updates: {}", summary);
        Ok(())
    }
}
