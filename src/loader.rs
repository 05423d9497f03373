//! Artifact Loader
//!
//! Walks an artifact tree and builds a [`Taxonomy`]. Layout:
//!
//! ```text
//! <root>/<manifest>.json
//! <root>/base/<artifact-dir>/<descriptor>.json
//! <root>/behaviors/<artifact-dir>/...
//! ```
//!
//! Only the manifest is mandatory. A bad artifact directory is logged and
//! skipped; a missing collection folder skips that collection.

use crate::config::LoaderConfig;
use crate::error::TaxonomyError;
use crate::model::{
    AnyArtifact, ArtifactContent, ArtifactFile, Taxonomy, TaxonomyManifest,
};
use crate::types::ArtifactType;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Builds a taxonomy from an artifact directory tree
pub struct ArtifactLoader {
    root: PathBuf,
    config: LoaderConfig,
}

impl ArtifactLoader {
    pub fn new(root: impl Into<PathBuf>, config: LoaderConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the whole tree.
    ///
    /// Fails only when the root or its manifest is unusable.
    pub fn load(&self) -> Result<Taxonomy, TaxonomyError> {
        if !self.root.is_dir() {
            return Err(TaxonomyError::FolderMissing(format!(
                "Artifact root not found: {}",
                self.root.display()
            )));
        }

        let manifest = self.read_manifest()?;
        info!(
            root = %self.root.display(),
            version = %manifest.version,
            "Loading taxonomy"
        );

        let mut taxonomy = Taxonomy::new(manifest.version);
        for artifact_type in ArtifactType::ALL {
            self.load_collection(&mut taxonomy, artifact_type);
        }

        for template in taxonomy.token_templates.values_mut() {
            if template.formula.is_empty() {
                template.formula = template.derive_formula();
            }
        }
        taxonomy.rebuild_template_tree();
        if let Some(cycle) = taxonomy.template_tree().find_cycle() {
            warn!(cycle = %cycle.join(" -> "), "Token template tree contains a cycle");
        }

        let counts = taxonomy.counts();
        info!(
            bases = counts.bases,
            behaviors = counts.behaviors,
            behavior_groups = counts.behavior_groups,
            property_sets = counts.property_sets,
            token_templates = counts.token_templates,
            "Taxonomy loaded"
        );
        Ok(taxonomy)
    }

    /// The single descriptor at the root
    fn read_manifest(&self) -> Result<TaxonomyManifest, TaxonomyError> {
        let candidates = self.descriptors_in(&self.root)?;
        let path = match candidates.as_slice() {
            [] => {
                return Err(TaxonomyError::FolderMissing(format!(
                    "No taxonomy manifest in {}",
                    self.root.display()
                )))
            }
            [single] => single,
            _ => {
                return Err(TaxonomyError::ParseError(format!(
                    "Ambiguous taxonomy manifest in {}: {} candidates",
                    self.root.display(),
                    candidates.len()
                )))
            }
        };

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            TaxonomyError::ParseError(format!("Invalid manifest {}: {}", path.display(), e))
        })
    }

    fn load_collection(&self, taxonomy: &mut Taxonomy, artifact_type: ArtifactType) {
        let folder = self.root.join(artifact_type.folder_name());
        if !folder.is_dir() {
            warn!(
                folder = %folder.display(),
                "Collection folder missing, skipping {}", artifact_type
            );
            return;
        }

        let entries = WalkDir::new(&folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read entry in {}: {}", folder.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            let record = match self.load_artifact(dir, artifact_type) {
                Ok(record) => record,
                Err(e) => {
                    warn!(dir = %dir.display(), "Skipping artifact: {}", e);
                    continue;
                }
            };

            let tooling = record.tooling();
            if let Some(existing) = taxonomy.find_artifact(artifact_type, tooling) {
                warn!(
                    dir = %dir.display(),
                    kept = existing.folder.as_deref().unwrap_or_default(),
                    "Skipping artifact: duplicate {} tooling symbol {}", artifact_type, tooling
                );
                continue;
            }
            let name = &record.artifact().name;
            if taxonomy.artifacts(artifact_type).any(|a| &a.name == name) {
                warn!(
                    dir = %dir.display(),
                    "Skipping artifact: duplicate {} name {}", artifact_type, name
                );
                continue;
            }

            debug!(dir = %dir.display(), tooling = %tooling, "Loaded {}", artifact_type);
            taxonomy.insert(record);
        }
    }

    /// Parse one artifact directory into a record of `artifact_type`
    pub fn load_artifact(
        &self,
        dir: &Path,
        artifact_type: ArtifactType,
    ) -> Result<AnyArtifact, TaxonomyError> {
        let descriptors = self.descriptors_in(dir)?;
        let descriptor = match descriptors.as_slice() {
            [single] => single,
            [] => {
                return Err(TaxonomyError::ParseError(format!(
                    "no descriptor in {}",
                    dir.display()
                )))
            }
            _ => {
                return Err(TaxonomyError::ParseError(format!(
                    "{} descriptors in {}",
                    descriptors.len(),
                    dir.display()
                )))
            }
        };

        let json = std::fs::read_to_string(descriptor)?;
        let mut record = AnyArtifact::from_descriptor(artifact_type, &json).map_err(|e| {
            TaxonomyError::ParseError(format!("{}: {}", descriptor.display(), e))
        })?;

        if record.tooling().is_empty() {
            return Err(TaxonomyError::ParseError(format!(
                "{} has no tooling symbol",
                descriptor.display()
            )));
        }

        let artifact = record.artifact_mut();
        if artifact.artifact_type != artifact_type {
            warn!(
                descriptor = %descriptor.display(),
                "Descriptor declares type {}, stored as {}", artifact.artifact_type, artifact_type
            );
            artifact.artifact_type = artifact_type;
        }
        artifact.folder = dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        artifact.artifact_files.clear();
        artifact.control_uri.clear();

        for path in self.files_in(dir)? {
            if path == *descriptor {
                continue;
            }
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping non UTF8 file name: {:?}", path);
                    continue;
                }
            };
            let content = self.classify(&path);
            let data = std::fs::read(&path)?;
            if content == ArtifactContent::Control && artifact.control_uri.is_empty() {
                artifact.control_uri = file_name.clone();
            }
            artifact
                .artifact_files
                .push(ArtifactFile::new(file_name, content, data));
        }

        Ok(record)
    }

    /// Extension based classification of a supporting file
    pub fn classify(&self, path: &Path) -> ArtifactContent {
        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return ArtifactContent::Other,
        };
        if self.config.control_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            ArtifactContent::Control
        } else if self.config.uml_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            ArtifactContent::Uml
        } else {
            ArtifactContent::Other
        }
    }

    fn is_descriptor(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.config.descriptor_extension))
            .unwrap_or(false)
    }

    fn descriptors_in(&self, dir: &Path) -> Result<Vec<PathBuf>, TaxonomyError> {
        Ok(self
            .files_in(dir)?
            .into_iter()
            .filter(|p| self.is_descriptor(p))
            .collect())
    }

    /// Regular files directly inside `dir`, sorted by name
    fn files_in(&self, dir: &Path) -> Result<Vec<PathBuf>, TaxonomyError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                TaxonomyError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to read {}: {}", dir.display(), e),
                ))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}
