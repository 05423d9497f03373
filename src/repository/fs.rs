//! Filesystem artifact repository writing into the loader's tree layout.

use super::ArtifactRepository;
use crate::error::TaxonomyError;
use crate::model::AnyArtifact;
use crate::types::ArtifactType;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct FsArtifactRepository {
    root: PathBuf,
    descriptor_extension: String,
}

impl FsArtifactRepository {
    pub fn new(root: impl Into<PathBuf>, descriptor_extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            descriptor_extension: descriptor_extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Existing descriptor in `dir`, or `<folder>.<ext>` for a new one
    fn descriptor_path(&self, dir: &Path, folder: &str) -> Result<PathBuf, TaxonomyError> {
        if dir.is_dir() {
            let mut existing: Vec<PathBuf> = std::fs::read_dir(dir)
                .map_err(|e| persistence(format!("Failed to read {}: {}", dir.display(), e)))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .and_then(|e| e.to_str())
                            .map(|e| e.eq_ignore_ascii_case(&self.descriptor_extension))
                            .unwrap_or(false)
                })
                .collect();
            existing.sort();
            if let Some(path) = existing.into_iter().next() {
                return Ok(path);
            }
        }
        Ok(dir.join(format!("{}.{}", folder, self.descriptor_extension)))
    }

    fn write_artifact(
        &self,
        dir: &Path,
        folder: &str,
        record: &AnyArtifact,
        journal: &mut WriteJournal,
    ) -> Result<PathBuf, TaxonomyError> {
        let descriptor = self.descriptor_path(dir, folder)?;
        let json = record.to_descriptor()?;
        journal.write(&descriptor, json.as_bytes()).map_err(|e| {
            persistence(format!("Failed to write descriptor {}: {}", descriptor.display(), e))
        })?;

        for file in &record.artifact().artifact_files {
            if file.file_data.is_empty() {
                continue;
            }
            let path = dir.join(&file.file_name);
            if path.parent() != Some(dir) || path == descriptor {
                debug!("Skipping artifact file {:?}", file.file_name);
                continue;
            }
            journal.write(&path, &file.file_data).map_err(|e| {
                persistence(format!("Failed to write artifact file {}: {}", path.display(), e))
            })?;
        }
        Ok(descriptor)
    }
}

/// Files written during one save, with the bytes they replaced
#[derive(Default)]
struct WriteJournal {
    entries: Vec<(PathBuf, Option<Vec<u8>>)>,
}

impl WriteJournal {
    fn write(&mut self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let previous = if path.is_file() {
            Some(std::fs::read(path)?)
        } else {
            None
        };
        self.entries.push((path.to_path_buf(), previous));
        std::fs::write(path, data)
    }

    /// Put every touched file back the way it was, newest first
    fn restore(self) {
        for (path, previous) in self.entries.into_iter().rev() {
            let result = match previous {
                Some(bytes) => std::fs::write(&path, bytes),
                None if path.exists() => std::fs::remove_file(&path),
                None => Ok(()),
            };
            if let Err(e) = result {
                warn!(path = %path.display(), "Failed to restore artifact file: {}", e);
            }
        }
    }
}

fn persistence(message: String) -> TaxonomyError {
    TaxonomyError::PersistenceError(message)
}

impl ArtifactRepository for FsArtifactRepository {
    fn path_for(&self, artifact_type: ArtifactType, folder: &str) -> Result<PathBuf, TaxonomyError> {
        if folder.is_empty() || folder.contains(['/', '\\']) || folder == "." || folder == ".." {
            return Err(TaxonomyError::InvalidArgument(format!(
                "Invalid artifact folder name: {:?}",
                folder
            )));
        }
        Ok(self.root.join(artifact_type.folder_name()).join(folder))
    }

    /// Write the descriptor and any file blobs carrying data.
    ///
    /// All or nothing: on failure a directory created by this call is removed,
    /// and files overwritten in an existing directory get their old bytes back.
    fn save(&self, folder: &str, record: &AnyArtifact) -> Result<PathBuf, TaxonomyError> {
        let dir = self.path_for(record.artifact_type(), folder)?;
        let created = !dir.exists();
        std::fs::create_dir_all(&dir).map_err(|e| {
            persistence(format!("Failed to create artifact directory {}: {}", dir.display(), e))
        })?;

        let mut journal = WriteJournal::default();
        let descriptor = match self.write_artifact(&dir, folder, record, &mut journal) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                if created {
                    if let Err(cleanup) = std::fs::remove_dir_all(&dir) {
                        warn!(dir = %dir.display(), "Failed to remove partial artifact directory: {}", cleanup);
                    }
                } else {
                    journal.restore();
                }
                return Err(e);
            }
        };

        info!(
            artifact_type = %record.artifact_type(),
            tooling = %record.tooling(),
            path = %descriptor.display(),
            "Saved artifact"
        );
        Ok(descriptor)
    }

    fn delete(&self, artifact_type: ArtifactType, folder: &str) -> Result<(), TaxonomyError> {
        let dir = self.path_for(artifact_type, folder)?;
        if !dir.is_dir() {
            return Err(persistence(format!(
                "Artifact directory not found: {}",
                dir.display()
            )));
        }
        std::fs::remove_dir_all(&dir).map_err(|e| {
            persistence(format!("Failed to delete artifact directory {}: {}", dir.display(), e))
        })?;
        info!(artifact_type = %artifact_type, path = %dir.display(), "Deleted artifact");
        Ok(())
    }
}
