//! Loading artifact trees from disk and reading them back through the service.

use super::support::ArtifactTree;
use taxonomy::config::LoaderConfig;
use taxonomy::model::{ArtifactContent, TaxonomyRecord};
use taxonomy::types::{ArtifactSymbol, ArtifactType};
use taxonomy::{ArtifactLoader, Taxonomy, TaxonomyError};

fn load(tree: &ArtifactTree) -> Taxonomy {
    ArtifactLoader::new(tree.root(), LoaderConfig::default())
        .load()
        .unwrap()
}

fn keys_match<T: TaxonomyRecord>(taxonomy: &Taxonomy) -> bool {
    taxonomy
        .collection::<T>()
        .iter()
        .all(|(key, record)| key == record.artifact().tooling())
}

#[test]
fn single_base_is_served_by_tooling_symbol() {
    let tree = ArtifactTree::new("1.0");
    tree.base("fungible", "Fungible", "F");
    let service = tree.service();

    let base = service
        .get_base_artifact(&ArtifactSymbol::tooling("F"))
        .unwrap();
    assert_eq!(base.artifact.name, "Fungible");
    assert_eq!(base.decimals, 2);

    let err = service
        .get_base_artifact(&ArtifactSymbol::tooling("X"))
        .unwrap_err();
    assert!(matches!(err, TaxonomyError::NotFound(_)));
}

#[test]
fn duplicate_behavior_symbol_keeps_first_directory() {
    let tree = ArtifactTree::new("1.0");
    tree.behavior("alpha", "Alpha", "B1")
        .behavior("beta", "Beta", "B1");
    let taxonomy = load(&tree);

    assert_eq!(taxonomy.len(ArtifactType::Behavior), 1);
    let kept = &taxonomy.behaviors["B1"];
    assert_eq!(kept.artifact.name, "Alpha");
    assert_eq!(kept.artifact.folder.as_deref(), Some("alpha"));
}

#[test]
fn every_collection_is_keyed_by_its_own_tooling_symbol() {
    let tree = ArtifactTree::standard();
    let taxonomy = load(&tree);

    let counts = taxonomy.counts();
    assert_eq!(counts.bases, 2);
    assert_eq!(counts.behaviors, 4);
    assert_eq!(counts.behavior_groups, 1);
    assert_eq!(counts.property_sets, 1);
    assert_eq!(counts.token_templates, 2);

    assert!(keys_match::<taxonomy::model::Base>(&taxonomy));
    assert!(keys_match::<taxonomy::model::Behavior>(&taxonomy));
    assert!(keys_match::<taxonomy::model::BehaviorGroup>(&taxonomy));
    assert!(keys_match::<taxonomy::model::PropertySet>(&taxonomy));
    assert!(keys_match::<taxonomy::model::TokenTemplate>(&taxonomy));
}

#[test]
fn supporting_files_are_attached_and_classified() {
    let tree = ArtifactTree::standard();
    let taxonomy = load(&tree);

    let divisible = &taxonomy.behaviors["d"].artifact;
    assert_eq!(divisible.control_uri, "divisible.proto");
    assert_eq!(divisible.artifact_files.len(), 2);
    assert!(divisible
        .artifact_files
        .iter()
        .all(|f| f.file_name != "divisible.json"));
    let uml = divisible
        .artifact_files
        .iter()
        .find(|f| f.content == ArtifactContent::Uml)
        .unwrap();
    assert_eq!(uml.text(), Some("# Divisible"));
}

#[test]
fn missing_collection_folder_is_not_fatal() {
    let tree = ArtifactTree::new("1.0");
    tree.behavior("divisible", "Divisible", "d");
    let taxonomy = load(&tree);

    assert_eq!(taxonomy.len(ArtifactType::Base), 0);
    assert_eq!(taxonomy.len(ArtifactType::Behavior), 1);
}

#[test]
fn missing_manifest_aborts_load() {
    let tree = ArtifactTree::new("1.0");
    tree.behavior("divisible", "Divisible", "d");
    std::fs::remove_file(tree.root().join("taxonomy.json")).unwrap();

    let err = ArtifactLoader::new(tree.root(), LoaderConfig::default())
        .load()
        .unwrap_err();
    assert!(matches!(err, TaxonomyError::FolderMissing(_)));
}

#[test]
fn template_views_resolve_through_the_store() {
    let tree = ArtifactTree::standard();
    let service = tree.service();

    let formula = service
        .get_template_formula_artifact("tF{d,t,SC}+phSKU")
        .unwrap();
    assert_eq!(formula.formula, "tF{d,t,SC}+phSKU");
    assert_eq!(formula.child_tokens[0].tooling, "tF{t}");

    let definition = service
        .get_template_definition_artifact("tF{d,t,SC}+phSKU")
        .unwrap();
    assert_eq!(definition.base.artifact.name, "Fungible");
    assert_eq!(definition.property_sets[0].properties[0].name, "SKU");

    let spec = service
        .get_token_specification("tF{d,t,SC}+phSKU")
        .unwrap();
    let behaviors: Vec<&str> = spec
        .behaviors
        .iter()
        .map(|b| b.artifact.tooling())
        .collect();
    assert_eq!(behaviors, vec!["d", "t", "m", "b"]);
    assert_eq!(spec.child_tokens.len(), 1);
    assert_eq!(spec.child_tokens[0].artifact.name, "Whole Token");

    let template = service.get_token_template("tF{t}").unwrap();
    assert_eq!(template.formula, "tF{t}");
    assert!(service.get_token_template("tN{x}").unwrap_err().is_not_found());
}

#[test]
fn cyclic_templates_load_but_fail_specification() {
    let tree = ArtifactTree::new("1.0");
    tree.base("fungible", "Fungible", "tF")
        .template("a", "A", "A", "tF", &[], &[], &[], &["B"])
        .template("b", "B", "B", "tF", &[], &[], &[], &["A"]);
    let service = tree.service();

    assert!(service.get_template_definition_artifact("A").is_ok());
    let err = service.get_token_specification("A").unwrap_err();
    assert!(matches!(err, TaxonomyError::TemplateCycle(_)));
}
