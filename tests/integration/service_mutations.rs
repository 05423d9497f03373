//! Mutations, refresh and caching through the service against a real tree.

use super::support::{artifact, ArtifactTree};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use taxonomy::config::TaxonomyConfig;
use taxonomy::mutation::{DeleteArtifactRequest, NewArtifactRequest, UpdateArtifactRequest};
use taxonomy::query::QueryOptions;
use taxonomy::model::{ArtifactContent, ArtifactFile};
use taxonomy::types::{ArtifactSymbol, ArtifactType};
use taxonomy::AnyArtifact;

fn behavior_record(name: &str, tooling: &str) -> AnyArtifact {
    let descriptor = json!({ "artifact": artifact(name, tooling) }).to_string();
    AnyArtifact::from_descriptor(ArtifactType::Behavior, &descriptor).unwrap()
}

#[test]
fn create_persists_and_survives_refresh() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let response = service.create_artifact(NewArtifactRequest {
        artifact: behavior_record("Pausable", "p"),
        resolve_collisions: false,
    });
    assert!(response.success, "{:?}", response.reason);
    assert!(tree.dir("behaviors", "Pausable").join("Pausable.json").is_file());

    service.refresh_taxonomy().unwrap();
    let pausable = service
        .get_behavior_artifact(&ArtifactSymbol::tooling("p"))
        .unwrap();
    assert_eq!(pausable.artifact.name, "Pausable");
    assert_eq!(service.resolve_folder_name(ArtifactType::Behavior, "p"), "Pausable");
}

#[test]
fn create_collision_is_reported_not_raised() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let response = service.create_artifact(NewArtifactRequest {
        artifact: behavior_record("Divisible", "d2"),
        resolve_collisions: false,
    });
    assert!(!response.success);
    assert!(response.reason.unwrap().contains("Collision"));
    assert_eq!(service.live().read().len(ArtifactType::Behavior), 4);

    let resolved = service.create_artifact(NewArtifactRequest {
        artifact: behavior_record("Divisible", "d"),
        resolve_collisions: true,
    });
    assert!(resolved.success);
    let created = resolved.artifact.unwrap();
    assert!(created.artifact().name.starts_with("Divisible "));
    assert_eq!(service.live().read().len(ArtifactType::Behavior), 5);
}

#[test]
fn update_rewrites_descriptor_and_keeps_files() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let response = service.update_artifact(UpdateArtifactRequest {
        artifact: behavior_record("Divisible Units", "d"),
    });
    assert!(response.success, "{:?}", response.reason);

    let descriptor =
        std::fs::read_to_string(tree.dir("behaviors", "divisible").join("divisible.json")).unwrap();
    assert!(descriptor.contains("Divisible Units"));
    assert!(tree.dir("behaviors", "divisible").join("divisible.proto").is_file());

    let divisible = service
        .get_behavior_artifact(&ArtifactSymbol::tooling("d"))
        .unwrap();
    assert_eq!(divisible.artifact.name, "Divisible Units");
    assert_eq!(divisible.artifact.control_uri, "divisible.proto");
}

fn with_unwritable_blob(mut record: AnyArtifact) -> AnyArtifact {
    record
        .artifact_mut()
        .artifact_files
        .push(ArtifactFile::new("bad\0.md", ArtifactContent::Uml, b"# Bad".to_vec()));
    record
}

#[test]
fn failed_create_does_not_reappear_after_refresh() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let failed = service.create_artifact(NewArtifactRequest {
        artifact: with_unwritable_blob(behavior_record("Ghost", "g")),
        resolve_collisions: false,
    });
    assert!(!failed.success);
    assert!(!tree.dir("behaviors", "Ghost").exists());

    let created = service.create_artifact(NewArtifactRequest {
        artifact: behavior_record("Pausable", "p"),
        resolve_collisions: false,
    });
    assert!(created.success, "{:?}", created.reason);
    assert!(service
        .get_behavior_artifact(&ArtifactSymbol::tooling("g"))
        .unwrap_err()
        .is_not_found());

    service.refresh_taxonomy().unwrap();
    assert_eq!(service.live().read().len(ArtifactType::Behavior), 5);
}

#[test]
fn failed_update_keeps_previous_descriptor_on_disk() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let failed = service.update_artifact(UpdateArtifactRequest {
        artifact: with_unwritable_blob(behavior_record("Divisible Units", "d")),
    });
    assert!(!failed.success);

    service.refresh_taxonomy().unwrap();
    let divisible = service
        .get_behavior_artifact(&ArtifactSymbol::tooling("d"))
        .unwrap();
    assert_eq!(divisible.artifact.name, "Divisible");
}

#[test]
fn update_request_carries_file_bytes() {
    let tree = ArtifactTree::standard();
    let mut config = TaxonomyConfig::default();
    config.mutation.refresh_after_persist = false;
    let service = tree.service_with(config);

    let request: UpdateArtifactRequest = serde_json::from_value(json!({
        "artifact": {
            "type": "Behavior",
            "record": {
                "artifact": {
                    "name": "Divisible",
                    "artifactSymbol": { "toolingSymbol": "d", "visualSymbol": "d" },
                    "artifactFiles": [
                        { "fileName": "divisible.md", "content": "Uml" },
                        { "fileName": "notes.txt", "content": "Other", "fileData": "aGVsbG8=" }
                    ]
                }
            }
        }
    }))
    .unwrap();
    let response = service.update_artifact(request);
    assert!(response.success, "{:?}", response.reason);

    let notes = tree.dir("behaviors", "divisible").join("notes.txt");
    assert_eq!(std::fs::read(notes).unwrap(), b"hello");

    let divisible = service
        .get_behavior_artifact(&ArtifactSymbol::tooling("d"))
        .unwrap();
    let uml = divisible
        .artifact
        .artifact_files
        .iter()
        .find(|f| f.file_name == "divisible.md")
        .unwrap();
    assert_eq!(uml.text(), Some("# Divisible"));
    assert_eq!(divisible.artifact.control_uri, "divisible.proto");

    let wire = serde_json::to_value(&divisible).unwrap();
    let files = wire["artifact"]["artifactFiles"].as_array().unwrap();
    assert!(files.iter().any(|f| f["fileData"] == "aGVsbG8="));
}

#[test]
fn update_of_unknown_symbol_fails() {
    let tree = ArtifactTree::standard();
    let service = tree.service();
    let response = service.update_artifact(UpdateArtifactRequest {
        artifact: behavior_record("Ghost", "ghost"),
    });
    assert!(!response.success);
}

#[test]
fn delete_removes_directory_and_entry() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let response = service.delete_artifact(DeleteArtifactRequest {
        artifact_type: ArtifactType::Behavior,
        symbol: ArtifactSymbol::tooling("b"),
    });
    assert!(response.success, "{:?}", response.reason);
    assert!(!tree.dir("behaviors", "burnable").exists());
    assert!(service
        .get_behavior_artifact(&ArtifactSymbol::tooling("b"))
        .unwrap_err()
        .is_not_found());

    let again = service.delete_artifact(DeleteArtifactRequest {
        artifact_type: ArtifactType::Behavior,
        symbol: ArtifactSymbol::tooling("b"),
    });
    assert!(!again.success);
}

#[test]
fn in_memory_mode_updates_cache_without_reload() {
    let tree = ArtifactTree::standard();
    let mut config = TaxonomyConfig::default();
    config.mutation.refresh_after_persist = false;
    let service = tree.service_with(config);

    let response = service.create_artifact(NewArtifactRequest {
        artifact: behavior_record("Pausable", "p"),
        resolve_collisions: false,
    });
    assert!(response.success);

    let cached = service.cache().get("1.0").unwrap();
    assert!(cached.behaviors.contains_key("p"));
}

#[test]
fn older_versions_are_served_from_cache() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    tree.set_version("2.0");
    tree.behavior("pausable", "Pausable", "p");
    assert_eq!(service.refresh_taxonomy().unwrap(), "2.0");

    let current = service.get_full_taxonomy("2.0").unwrap();
    assert!(current.behaviors.contains_key("p"));
    let previous = service.get_full_taxonomy("1.0").unwrap();
    assert!(!previous.behaviors.contains_key("p"));
    assert!(service.get_full_taxonomy("0.9").is_err());
}

#[test]
fn list_by_type_pages_through_service() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let first = service
        .list_by_type(&QueryOptions::for_type(ArtifactType::Behavior, 3, 0))
        .unwrap();
    assert_eq!(first.artifact_collection.symbols(), vec!["b", "d", "m"]);
    assert_eq!(first.total_items_in_collection, 4);

    let second = service
        .list_by_type(&QueryOptions::for_type(
            ArtifactType::Behavior,
            3,
            (first.last_item_index + 1) as usize,
        ))
        .unwrap();
    assert_eq!(second.artifact_collection.symbols(), vec!["t"]);
    assert_eq!(second.first_item_index, 3);
    assert_eq!(second.last_item_index, 3);

    let invalid = service.list_by_type(&QueryOptions {
        artifact_type: "gadgets".to_string(),
        max_item_return: 3,
        last_item_index: 0,
    });
    assert!(invalid.is_err());
}

#[test]
fn readers_see_consistent_pages_during_writes() {
    let tree = ArtifactTree::standard();
    let service = Arc::new(tree.service());

    let writer = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            for i in 0..10 {
                let response = service.create_artifact(NewArtifactRequest {
                    artifact: behavior_record(&format!("Extra {}", i), &format!("x{}", i)),
                    resolve_collisions: false,
                });
                assert!(response.success, "{:?}", response.reason);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..20 {
                    let page = service
                        .list_by_type(&QueryOptions::for_type(ArtifactType::Behavior, 100, 0))
                        .unwrap();
                    assert_eq!(page.artifact_collection.len(), page.total_items_in_collection);
                    assert_eq!(
                        page.last_item_index,
                        page.total_items_in_collection as i64 - 1
                    );
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(service.live().read().len(ArtifactType::Behavior), 14);
}
