//! Artifact tree fixtures written to a temporary workspace.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taxonomy::config::TaxonomyConfig;
use taxonomy::repository::{DisabledVersionControl, FsArtifactRepository};
use taxonomy::TaxonomyService;
use tempfile::TempDir;

pub struct ArtifactTree {
    workspace: TempDir,
}

impl ArtifactTree {
    pub fn new(version: &str) -> Self {
        let tree = Self {
            workspace: TempDir::new().unwrap(),
        };
        std::fs::create_dir_all(tree.root()).unwrap();
        tree.set_version(version);
        tree
    }

    pub fn root(&self) -> PathBuf {
        self.workspace.path().join("artifacts")
    }

    pub fn set_version(&self, version: &str) {
        write(
            &self.root().join("taxonomy.json"),
            &json!({ "version": version }).to_string(),
        );
    }

    pub fn dir(&self, folder: &str, artifact: &str) -> PathBuf {
        self.root().join(folder).join(artifact)
    }

    /// Write `<folder>/<dir>/<dir>.json`
    pub fn descriptor(&self, folder: &str, dir: &str, body: Value) -> &Self {
        write(
            &self.dir(folder, dir).join(format!("{}.json", dir)),
            &serde_json::to_string_pretty(&body).unwrap(),
        );
        self
    }

    pub fn file(&self, folder: &str, dir: &str, name: &str, content: &[u8]) -> &Self {
        let path = self.dir(folder, dir).join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn base(&self, dir: &str, name: &str, tooling: &str) -> &Self {
        self.descriptor(
            "base",
            dir,
            json!({ "artifact": artifact(name, tooling), "tokenType": "Fungible", "decimals": 2 }),
        )
    }

    pub fn behavior(&self, dir: &str, name: &str, tooling: &str) -> &Self {
        self.descriptor("behaviors", dir, json!({ "artifact": artifact(name, tooling) }))
    }

    pub fn behavior_group(&self, dir: &str, name: &str, tooling: &str, members: &[&str]) -> &Self {
        self.descriptor(
            "behavior-groups",
            dir,
            json!({ "artifact": artifact(name, tooling), "behaviorSymbols": symbols(members) }),
        )
    }

    pub fn property_set(&self, dir: &str, name: &str, tooling: &str) -> &Self {
        self.descriptor(
            "property-sets",
            dir,
            json!({
                "artifact": artifact(name, tooling),
                "properties": [{ "name": "SKU", "valueDescription": "Stock keeping unit" }]
            }),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn template(
        &self,
        dir: &str,
        name: &str,
        tooling: &str,
        base: &str,
        behaviors: &[&str],
        groups: &[&str],
        property_sets: &[&str],
        children: &[&str],
    ) -> &Self {
        self.descriptor(
            "token-templates",
            dir,
            json!({
                "artifact": artifact(name, tooling),
                "base": { "toolingSymbol": base },
                "behaviors": symbols(behaviors),
                "behaviorGroups": symbols(groups),
                "propertySets": symbols(property_sets),
                "childTokens": symbols(children)
            }),
        )
    }

    /// A small complete taxonomy
    pub fn standard() -> Self {
        let tree = Self::new("1.0");
        tree.base("fungible", "Fungible", "tF")
            .base("non-fungible", "Non-Fungible", "tN")
            .behavior("divisible", "Divisible", "d")
            .behavior("transferable", "Transferable", "t")
            .behavior("mintable", "Mintable", "m")
            .behavior("burnable", "Burnable", "b")
            .behavior_group("supply-control", "Supply Control", "SC", &["m", "b"])
            .property_set("sku", "SKU", "phSKU")
            .template("whole", "Whole Token", "tF{t}", "tF", &["t"], &[], &[], &[])
            .template(
                "loyalty",
                "Loyalty",
                "tF{d,t,SC}+phSKU",
                "tF",
                &["d", "t"],
                &["SC"],
                &["phSKU"],
                &["tF{t}"],
            )
            .file("behaviors", "divisible", "divisible.proto", b"syntax = \"proto3\";")
            .file("behaviors", "divisible", "divisible.md", b"# Divisible");
        tree
    }

    pub fn service(&self) -> TaxonomyService {
        self.service_with(TaxonomyConfig::default())
    }

    pub fn service_with(&self, config: TaxonomyConfig) -> TaxonomyService {
        let root = self.root();
        TaxonomyService::with_backends(
            config,
            &root,
            Arc::new(FsArtifactRepository::new(&root, "json")),
            Arc::new(DisabledVersionControl),
        )
        .unwrap()
    }
}

pub fn artifact(name: &str, tooling: &str) -> Value {
    json!({
        "name": name,
        "artifactSymbol": { "toolingSymbol": tooling, "visualSymbol": tooling },
        "artifactDefinition": { "businessDescription": format!("{} artifact", name) }
    })
}

fn symbols(tooling: &[&str]) -> Value {
    Value::Array(
        tooling
            .iter()
            .map(|t| json!({ "toolingSymbol": t }))
            .collect(),
    )
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
