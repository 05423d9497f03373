//! Mutation Pipeline
//!
//! Create, update and delete against a [`TaxonomyStore`], persisted through an
//! [`ArtifactRepository`]. The store's write lock is held from validation until
//! persistence returns, so readers never observe a change that failed to
//! persist. A persistence failure restores the previous in-memory state; the
//! repository undoes its own partial writes.
//!
//! Failures are reported in the response (`success == false` plus a reason),
//! never as an error.

use crate::error::TaxonomyError;
use crate::model::{AnyArtifact, ArtifactFile, Taxonomy};
use crate::repository::{folder_for_new, ArtifactRepository};
use crate::store::TaxonomyStore;
use crate::symbol;
use crate::types::{ArtifactSymbol, ArtifactType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtifactRequest {
    pub artifact: AnyArtifact,
    /// Rename a colliding artifact instead of rejecting it
    #[serde(default)]
    pub resolve_collisions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtifactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The stored record, after any collision renaming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<AnyArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtifactRequest {
    pub artifact: AnyArtifact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteArtifactRequest {
    pub artifact_type: ArtifactType,
    pub symbol: ArtifactSymbol,
}

/// Outcome of an update, delete or version-control call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub type UpdateArtifactResponse = MutationResponse;
pub type DeleteArtifactResponse = MutationResponse;

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    pub fn failed(err: &TaxonomyError) -> Self {
        Self {
            success: false,
            reason: Some(err.to_string()),
        }
    }
}

impl From<Result<(), TaxonomyError>> for MutationResponse {
    fn from(result: Result<(), TaxonomyError>) -> Self {
        match result {
            Ok(()) => MutationResponse::ok(),
            Err(e) => MutationResponse::failed(&e),
        }
    }
}

impl NewArtifactResponse {
    fn created(artifact: AnyArtifact) -> Self {
        Self {
            success: true,
            reason: None,
            artifact: Some(artifact),
        }
    }

    fn failed(err: &TaxonomyError) -> Self {
        Self {
            success: false,
            reason: Some(err.to_string()),
            artifact: None,
        }
    }
}

/// Replace the entry sharing `record`'s tooling symbol, or insert it.
///
/// Returns the replaced record, `None` for a pure insert.
pub fn add_or_update_in_memory_artifact(taxonomy: &mut Taxonomy, record: AnyArtifact) -> Option<AnyArtifact> {
    let previous = taxonomy.remove(record.artifact_type(), record.tooling());
    taxonomy.insert(record);
    previous
}

pub struct MutationPipeline {
    repository: Arc<dyn ArtifactRepository>,
    max_unique_attempts: usize,
}

impl MutationPipeline {
    pub fn new(repository: Arc<dyn ArtifactRepository>, max_unique_attempts: usize) -> Self {
        Self {
            repository,
            max_unique_attempts,
        }
    }

    pub fn create(&self, store: &TaxonomyStore, request: NewArtifactRequest) -> NewArtifactResponse {
        match self.try_create(store, request) {
            Ok(record) => NewArtifactResponse::created(record),
            Err(e) => {
                warn!("Create rejected: {}", e);
                NewArtifactResponse::failed(&e)
            }
        }
    }

    pub fn update(&self, store: &TaxonomyStore, request: UpdateArtifactRequest) -> UpdateArtifactResponse {
        let result = self.try_update(store, request);
        if let Err(e) = &result {
            warn!("Update rejected: {}", e);
        }
        result.into()
    }

    pub fn delete(&self, store: &TaxonomyStore, request: DeleteArtifactRequest) -> DeleteArtifactResponse {
        let result = self.try_delete(store, request);
        if let Err(e) = &result {
            warn!("Delete rejected: {}", e);
        }
        result.into()
    }

    fn try_create(&self, store: &TaxonomyStore, request: NewArtifactRequest) -> Result<AnyArtifact, TaxonomyError> {
        let mut record = normalize(request.artifact)?;
        let mut taxonomy = store.write();

        if !symbol::check_unique_record(&taxonomy, &record) {
            if !request.resolve_collisions {
                return Err(TaxonomyError::Collision(format!(
                    "{} {} ({}) already exists",
                    record.artifact_type(),
                    record.artifact().name,
                    record.tooling()
                )));
            }
            record = symbol::make_unique(&taxonomy, &record, self.max_unique_attempts);
            info!(tooling = %record.tooling(), "Resolved collision with generated symbol");
        }

        let folder = self.unused_folder(&taxonomy, &record)?;
        record.artifact_mut().folder = Some(folder.clone());
        add_or_update_in_memory_artifact(&mut taxonomy, record.clone());

        if let Err(e) = self.repository.save(&folder, &record) {
            taxonomy.remove(record.artifact_type(), record.tooling());
            error!(tooling = %record.tooling(), "Create rolled back: {}", e);
            return Err(e);
        }

        info!(artifact_type = %record.artifact_type(), tooling = %record.tooling(), "Created artifact");
        Ok(record)
    }

    fn try_update(&self, store: &TaxonomyStore, request: UpdateArtifactRequest) -> Result<(), TaxonomyError> {
        let mut record = normalize(request.artifact)?;
        let artifact_type = record.artifact_type();
        let mut taxonomy = store.write();

        let existing = taxonomy.record(artifact_type, record.tooling()).ok_or_else(|| {
            TaxonomyError::NotFound(format!("{} with tooling symbol {}", artifact_type, record.tooling()))
        })?;

        let name = &record.artifact().name;
        let renamed_onto_other = taxonomy
            .artifacts(artifact_type)
            .any(|a| &a.name == name && a.tooling() != record.tooling());
        if renamed_onto_other {
            return Err(TaxonomyError::Collision(format!(
                "{} name {} is used by another artifact",
                artifact_type, name
            )));
        }

        let folder = existing
            .artifact()
            .folder
            .clone()
            .unwrap_or_else(|| symbol::resolve_folder_name(&taxonomy, artifact_type, record.tooling()));
        {
            let artifact = record.artifact_mut();
            artifact.folder = Some(folder.clone());
            let requested = std::mem::take(&mut artifact.artifact_files);
            artifact.artifact_files = merge_files(&existing.artifact().artifact_files, requested);
            if artifact.control_uri.is_empty() {
                let control_uri = artifact.control_file().map(|f| f.file_name.clone());
                artifact.control_uri = control_uri.unwrap_or_default();
            }
        }

        add_or_update_in_memory_artifact(&mut taxonomy, record.clone());
        if let Err(e) = self.repository.save(&folder, &record) {
            add_or_update_in_memory_artifact(&mut taxonomy, existing);
            error!(tooling = %record.tooling(), "Update rolled back: {}", e);
            return Err(e);
        }

        info!(artifact_type = %artifact_type, tooling = %record.tooling(), "Updated artifact");
        Ok(())
    }

    fn try_delete(&self, store: &TaxonomyStore, request: DeleteArtifactRequest) -> Result<(), TaxonomyError> {
        let artifact_type = request.artifact_type;
        let tooling = request.symbol.tooling.as_str();
        let mut taxonomy = store.write();

        let folder = symbol::resolve_folder_name(&taxonomy, artifact_type, tooling);
        let removed = taxonomy.remove(artifact_type, tooling).ok_or_else(|| {
            TaxonomyError::NotFound(format!("{} with tooling symbol {}", artifact_type, tooling))
        })?;

        if let Err(e) = self.repository.delete(artifact_type, &folder) {
            taxonomy.insert(removed);
            error!(tooling = %tooling, "Delete rolled back: {}", e);
            return Err(e);
        }

        info!(artifact_type = %artifact_type, tooling = %tooling, "Deleted artifact");
        Ok(())
    }

    /// Folder derived from the name, suffixed until no artifact of the type uses it
    fn unused_folder(&self, taxonomy: &Taxonomy, record: &AnyArtifact) -> Result<String, TaxonomyError> {
        let base = folder_for_new(&record.artifact().name);
        let artifact_type = record.artifact_type();
        let taken = |candidate: &str| -> Result<bool, TaxonomyError> {
            let in_memory = taxonomy
                .artifacts(artifact_type)
                .any(|a| a.folder.as_deref() == Some(candidate));
            Ok(in_memory || self.repository.path_for(artifact_type, candidate)?.exists())
        };

        if !taken(&base)? {
            return Ok(base);
        }
        let mut n = 2u64;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !taken(&candidate)? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Stored blobs overlaid with the request's blobs that carry data.
///
/// Saving never deletes files, so a blob missing from the request (or listed
/// without bytes) keeps its stored copy.
fn merge_files(stored: &[ArtifactFile], requested: Vec<ArtifactFile>) -> Vec<ArtifactFile> {
    let mut files = stored.to_vec();
    for file in requested {
        if file.file_data.is_empty() {
            continue;
        }
        match files.iter_mut().find(|f| f.file_name == file.file_name) {
            Some(current) => *current = file,
            None => files.push(file),
        }
    }
    files
}

/// Envelope checks shared by create and update
fn normalize(mut record: AnyArtifact) -> Result<AnyArtifact, TaxonomyError> {
    let artifact_type = record.artifact_type();
    if let AnyArtifact::TokenTemplate(template) = &mut record {
        if template.formula.trim().is_empty() {
            template.formula = template.derive_formula();
        }
    }

    let artifact = record.artifact_mut();
    if artifact.tooling().trim().is_empty() {
        return Err(TaxonomyError::InvalidArgument(
            "Artifact tooling symbol must not be empty".to_string(),
        ));
    }
    if artifact.name.trim().is_empty() {
        return Err(TaxonomyError::InvalidArgument(
            "Artifact name must not be empty".to_string(),
        ));
    }
    artifact.artifact_type = artifact_type;
    Ok(record)
}
