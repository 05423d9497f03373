//! CLI command output over a fixture workspace.

use super::support::ArtifactTree;
use taxonomy::config::TaxonomyConfig;
use taxonomy::tooling::cli::{CliContext, Commands};

fn context(tree: &ArtifactTree) -> CliContext {
    let config = TaxonomyConfig::with_artifact_path(tree.root());
    CliContext::new(&tree.root(), config).unwrap()
}

#[test]
fn summary_json_reports_counts() {
    let tree = ArtifactTree::standard();
    let output = context(&tree)
        .execute(&Commands::Summary {
            format: "json".to_string(),
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["counts"]["behaviors"], 4);
    assert_eq!(value["counts"]["token_templates"], 2);
}

#[test]
fn list_text_shows_page_bounds() {
    let tree = ArtifactTree::standard();
    let output = context(&tree)
        .execute(&Commands::List {
            artifact_type: "behaviors".to_string(),
            max: 2,
            start: 2,
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.contains("Mintable"));
    assert!(output.contains("Transferable"));
    assert!(!output.contains("Burnable"));
    assert!(output.contains("Items 2..3 of 4"));
}

#[test]
fn get_unknown_symbol_is_an_error() {
    let tree = ArtifactTree::standard();
    let result = context(&tree).execute(&Commands::Get {
        artifact_type: "base".to_string(),
        symbol: "nope".to_string(),
        format: "text".to_string(),
    });
    assert!(result.unwrap_err().is_not_found());
}

#[test]
fn check_reports_taken_symbol() {
    let tree = ArtifactTree::standard();
    let output = context(&tree)
        .execute(&Commands::Check {
            artifact_type: "behavior".to_string(),
            name: "Anything".to_string(),
            symbol: "d".to_string(),
        })
        .unwrap();
    assert!(output.contains("already taken"));
}

#[test]
fn spec_text_renders_children() {
    let tree = ArtifactTree::standard();
    let output = context(&tree)
        .execute(&Commands::Spec {
            id: "tF{d,t,SC}+phSKU".to_string(),
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.starts_with("Loyalty [tF{d,t,SC}+phSKU]"));
    assert!(output.contains("  Whole Token [tF{t}]"));
    assert!(output.contains("behavior: Burnable (b)"));
}
