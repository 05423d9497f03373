//! Symbol and uniqueness rules
//!
//! Name and tooling symbol are each unique within a collection. The checks here
//! are plain predicates over a taxonomy view; [`make_unique`] produces a
//! collision-free copy of a record without touching the store.

use crate::model::{AnyArtifact, Taxonomy};
use crate::types::ArtifactType;
use rand::Rng;
use tracing::debug;

/// True when neither `tooling` nor `name` is taken in `artifact_type`'s collection
pub fn check_unique(taxonomy: &Taxonomy, artifact_type: ArtifactType, name: &str, tooling: &str) -> bool {
    if taxonomy.find_artifact(artifact_type, tooling).is_some() {
        return false;
    }
    !taxonomy.artifacts(artifact_type).any(|a| a.name == name)
}

/// Uniqueness of a new template keyed by its formula id
pub fn check_unique_template(taxonomy: &Taxonomy, formula_id: &str, name: &str) -> bool {
    check_unique(taxonomy, ArtifactType::TokenTemplate, name, formula_id)
}

/// Uniqueness of a whole record within its own collection
pub fn check_unique_record(taxonomy: &Taxonomy, record: &AnyArtifact) -> bool {
    let artifact = record.artifact();
    check_unique(
        taxonomy,
        record.artifact_type(),
        &artifact.name,
        artifact.tooling(),
    )
}

/// Clone `record` with a random suffix on name, visual and tooling symbol.
///
/// The suffix widens by one digit every `max_attempts` collisions, so the loop
/// terminates for any finite collection.
pub fn make_unique(taxonomy: &Taxonomy, record: &AnyArtifact, max_attempts: usize) -> AnyArtifact {
    let max_attempts = max_attempts.max(1);
    let mut rng = rand::thread_rng();
    let original = record.artifact();
    let mut attempt = 0usize;

    loop {
        let digits = (3 + attempt / max_attempts).min(18) as u32;
        let low = 10u64.pow(digits - 1);
        let high = 10u64.pow(digits);
        let suffix = rng.gen_range(low..high);

        let mut candidate = record.clone();
        let artifact = candidate.artifact_mut();
        artifact.name = format!("{} {}", original.name, suffix);
        artifact.artifact_symbol.tooling = format!("{}{}", original.artifact_symbol.tooling, suffix);
        artifact.artifact_symbol.visual = format!("{}{}", original.artifact_symbol.visual, suffix);
        artifact.folder = None;

        if check_unique_record(taxonomy, &candidate) {
            debug!(
                tooling = %candidate.tooling(),
                attempts = attempt + 1,
                "Generated unique artifact"
            );
            return candidate;
        }
        attempt += 1;
    }
}

/// On-disk directory of the artifact keyed by `tooling`.
///
/// Empty when the symbol does not resolve, which callers read as "no folder yet".
pub fn resolve_folder_name(taxonomy: &Taxonomy, artifact_type: ArtifactType, tooling: &str) -> String {
    match taxonomy.find_artifact(artifact_type, tooling) {
        Some(artifact) => artifact
            .folder
            .clone()
            .unwrap_or_else(|| artifact.name.clone()),
        None => {
            debug!("No {} folder for tooling symbol {}", artifact_type, tooling);
            String::new()
        }
    }
}
