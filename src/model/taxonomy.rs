//! Taxonomy aggregate root
//!
//! Holds the version string and five symbol-keyed collections plus the template
//! arena derived from the token-template collection.

use super::artifact::Artifact;
use super::core::{Base, Behavior, BehaviorGroup, PropertySet, TokenTemplate};
use super::template_tree::TemplateTree;
use crate::error::TaxonomyError;
use crate::types::{ArtifactType, SymbolMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Top-level manifest descriptor at the artifact root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyManifest {
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub version: String,
    #[serde(default)]
    pub base_token_types: SymbolMap<Base>,
    #[serde(default)]
    pub behaviors: SymbolMap<Behavior>,
    #[serde(default)]
    pub behavior_groups: SymbolMap<BehaviorGroup>,
    #[serde(default)]
    pub property_sets: SymbolMap<PropertySet>,
    #[serde(default)]
    pub token_templates: SymbolMap<TokenTemplate>,
    #[serde(skip)]
    template_tree: TemplateTree,
}

/// Per-collection sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionCounts {
    pub bases: usize,
    pub behaviors: usize,
    pub behavior_groups: usize,
    pub property_sets: usize,
    pub token_templates: usize,
}

impl Taxonomy {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    /// Exact-match lookup by tooling symbol
    pub fn get<T: TaxonomyRecord>(&self, tooling: &str) -> Result<&T, TaxonomyError> {
        T::collection(self).get(tooling).ok_or_else(|| {
            TaxonomyError::NotFound(format!("{} with tooling symbol {}", T::ARTIFACT_TYPE, tooling))
        })
    }

    pub fn collection<T: TaxonomyRecord>(&self) -> &SymbolMap<T> {
        T::collection(self)
    }

    pub fn len(&self, artifact_type: ArtifactType) -> usize {
        match artifact_type {
            ArtifactType::Base => self.base_token_types.len(),
            ArtifactType::Behavior => self.behaviors.len(),
            ArtifactType::BehaviorGroup => self.behavior_groups.len(),
            ArtifactType::PropertySet => self.property_sets.len(),
            ArtifactType::TokenTemplate => self.token_templates.len(),
        }
    }

    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            bases: self.base_token_types.len(),
            behaviors: self.behaviors.len(),
            behavior_groups: self.behavior_groups.len(),
            property_sets: self.property_sets.len(),
            token_templates: self.token_templates.len(),
        }
    }

    /// Envelopes of every artifact in one collection
    pub fn artifacts(&self, artifact_type: ArtifactType) -> Box<dyn Iterator<Item = &Artifact> + '_> {
        match artifact_type {
            ArtifactType::Base => Box::new(self.base_token_types.values().map(|r| &r.artifact)),
            ArtifactType::Behavior => Box::new(self.behaviors.values().map(|r| &r.artifact)),
            ArtifactType::BehaviorGroup => {
                Box::new(self.behavior_groups.values().map(|r| &r.artifact))
            }
            ArtifactType::PropertySet => Box::new(self.property_sets.values().map(|r| &r.artifact)),
            ArtifactType::TokenTemplate => {
                Box::new(self.token_templates.values().map(|r| &r.artifact))
            }
        }
    }

    /// Envelope of the artifact keyed by `tooling` in one collection
    pub fn find_artifact(&self, artifact_type: ArtifactType, tooling: &str) -> Option<&Artifact> {
        match artifact_type {
            ArtifactType::Base => self.base_token_types.get(tooling).map(|r| &r.artifact),
            ArtifactType::Behavior => self.behaviors.get(tooling).map(|r| &r.artifact),
            ArtifactType::BehaviorGroup => self.behavior_groups.get(tooling).map(|r| &r.artifact),
            ArtifactType::PropertySet => self.property_sets.get(tooling).map(|r| &r.artifact),
            ArtifactType::TokenTemplate => self.token_templates.get(tooling).map(|r| &r.artifact),
        }
    }

    /// Clone a stored record out as a tagged variant
    pub fn record(&self, artifact_type: ArtifactType, tooling: &str) -> Option<AnyArtifact> {
        match artifact_type {
            ArtifactType::Base => self.base_token_types.get(tooling).cloned().map(AnyArtifact::Base),
            ArtifactType::Behavior => self.behaviors.get(tooling).cloned().map(AnyArtifact::Behavior),
            ArtifactType::BehaviorGroup => self
                .behavior_groups
                .get(tooling)
                .cloned()
                .map(AnyArtifact::BehaviorGroup),
            ArtifactType::PropertySet => self
                .property_sets
                .get(tooling)
                .cloned()
                .map(AnyArtifact::PropertySet),
            ArtifactType::TokenTemplate => self
                .token_templates
                .get(tooling)
                .cloned()
                .map(AnyArtifact::TokenTemplate),
        }
    }

    pub fn template_tree(&self) -> &TemplateTree {
        &self.template_tree
    }

    /// Recompute the template arena after the template collection changed
    pub fn rebuild_template_tree(&mut self) {
        self.template_tree = TemplateTree::build(&self.token_templates);
    }

    /// Insert a record keyed by its own tooling symbol, returning the one it replaced
    pub(crate) fn insert(&mut self, record: AnyArtifact) -> Option<AnyArtifact> {
        match record {
            AnyArtifact::Base(r) => insert_into(&mut self.base_token_types, r).map(AnyArtifact::Base),
            AnyArtifact::Behavior(r) => {
                insert_into(&mut self.behaviors, r).map(AnyArtifact::Behavior)
            }
            AnyArtifact::BehaviorGroup(r) => {
                insert_into(&mut self.behavior_groups, r).map(AnyArtifact::BehaviorGroup)
            }
            AnyArtifact::PropertySet(r) => {
                insert_into(&mut self.property_sets, r).map(AnyArtifact::PropertySet)
            }
            AnyArtifact::TokenTemplate(r) => {
                let replaced = insert_into(&mut self.token_templates, r);
                self.rebuild_template_tree();
                replaced.map(AnyArtifact::TokenTemplate)
            }
        }
    }

    /// Remove the record keyed by `tooling`, returning it when present
    pub(crate) fn remove(&mut self, artifact_type: ArtifactType, tooling: &str) -> Option<AnyArtifact> {
        match artifact_type {
            ArtifactType::Base => self.base_token_types.remove(tooling).map(AnyArtifact::Base),
            ArtifactType::Behavior => self.behaviors.remove(tooling).map(AnyArtifact::Behavior),
            ArtifactType::BehaviorGroup => self
                .behavior_groups
                .remove(tooling)
                .map(AnyArtifact::BehaviorGroup),
            ArtifactType::PropertySet => {
                self.property_sets.remove(tooling).map(AnyArtifact::PropertySet)
            }
            ArtifactType::TokenTemplate => {
                let removed = self.token_templates.remove(tooling);
                if removed.is_some() {
                    self.rebuild_template_tree();
                }
                removed.map(AnyArtifact::TokenTemplate)
            }
        }
    }
}

fn insert_into<T: TaxonomyRecord>(collection: &mut SymbolMap<T>, record: T) -> Option<T> {
    let key = record.artifact().tooling().to_string();
    collection.insert(key, record)
}

/// A record type stored in one of the taxonomy collections
pub trait TaxonomyRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const ARTIFACT_TYPE: ArtifactType;

    fn artifact(&self) -> &Artifact;
    fn artifact_mut(&mut self) -> &mut Artifact;
    fn collection(taxonomy: &Taxonomy) -> &SymbolMap<Self>;
    fn into_any(self) -> AnyArtifact;
}

impl TaxonomyRecord for Base {
    const ARTIFACT_TYPE: ArtifactType = ArtifactType::Base;

    fn artifact(&self) -> &Artifact {
        &self.artifact
    }
    fn artifact_mut(&mut self) -> &mut Artifact {
        &mut self.artifact
    }
    fn collection(taxonomy: &Taxonomy) -> &SymbolMap<Self> {
        &taxonomy.base_token_types
    }
    fn into_any(self) -> AnyArtifact {
        AnyArtifact::Base(self)
    }
}

impl TaxonomyRecord for Behavior {
    const ARTIFACT_TYPE: ArtifactType = ArtifactType::Behavior;

    fn artifact(&self) -> &Artifact {
        &self.artifact
    }
    fn artifact_mut(&mut self) -> &mut Artifact {
        &mut self.artifact
    }
    fn collection(taxonomy: &Taxonomy) -> &SymbolMap<Self> {
        &taxonomy.behaviors
    }
    fn into_any(self) -> AnyArtifact {
        AnyArtifact::Behavior(self)
    }
}

impl TaxonomyRecord for BehaviorGroup {
    const ARTIFACT_TYPE: ArtifactType = ArtifactType::BehaviorGroup;

    fn artifact(&self) -> &Artifact {
        &self.artifact
    }
    fn artifact_mut(&mut self) -> &mut Artifact {
        &mut self.artifact
    }
    fn collection(taxonomy: &Taxonomy) -> &SymbolMap<Self> {
        &taxonomy.behavior_groups
    }
    fn into_any(self) -> AnyArtifact {
        AnyArtifact::BehaviorGroup(self)
    }
}

impl TaxonomyRecord for PropertySet {
    const ARTIFACT_TYPE: ArtifactType = ArtifactType::PropertySet;

    fn artifact(&self) -> &Artifact {
        &self.artifact
    }
    fn artifact_mut(&mut self) -> &mut Artifact {
        &mut self.artifact
    }
    fn collection(taxonomy: &Taxonomy) -> &SymbolMap<Self> {
        &taxonomy.property_sets
    }
    fn into_any(self) -> AnyArtifact {
        AnyArtifact::PropertySet(self)
    }
}

impl TaxonomyRecord for TokenTemplate {
    const ARTIFACT_TYPE: ArtifactType = ArtifactType::TokenTemplate;

    fn artifact(&self) -> &Artifact {
        &self.artifact
    }
    fn artifact_mut(&mut self) -> &mut Artifact {
        &mut self.artifact
    }
    fn collection(taxonomy: &Taxonomy) -> &SymbolMap<Self> {
        &taxonomy.token_templates
    }
    fn into_any(self) -> AnyArtifact {
        AnyArtifact::TokenTemplate(self)
    }
}

/// Any taxonomy record, tagged with its collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "record")]
pub enum AnyArtifact {
    Base(Base),
    Behavior(Behavior),
    BehaviorGroup(BehaviorGroup),
    PropertySet(PropertySet),
    TokenTemplate(TokenTemplate),
}

impl AnyArtifact {
    /// Parse a descriptor document for the given collection
    pub fn from_descriptor(artifact_type: ArtifactType, json: &str) -> Result<Self, TaxonomyError> {
        let record = match artifact_type {
            ArtifactType::Base => AnyArtifact::Base(serde_json::from_str(json)?),
            ArtifactType::Behavior => AnyArtifact::Behavior(serde_json::from_str(json)?),
            ArtifactType::BehaviorGroup => AnyArtifact::BehaviorGroup(serde_json::from_str(json)?),
            ArtifactType::PropertySet => AnyArtifact::PropertySet(serde_json::from_str(json)?),
            ArtifactType::TokenTemplate => AnyArtifact::TokenTemplate(serde_json::from_str(json)?),
        };
        Ok(record)
    }

    /// Serialize the record as a descriptor document, without file bytes
    pub fn to_descriptor(&self) -> Result<String, TaxonomyError> {
        let mut stripped = self.clone();
        for file in &mut stripped.artifact_mut().artifact_files {
            file.file_data.clear();
        }
        let json = match &stripped {
            AnyArtifact::Base(r) => serde_json::to_string_pretty(r)?,
            AnyArtifact::Behavior(r) => serde_json::to_string_pretty(r)?,
            AnyArtifact::BehaviorGroup(r) => serde_json::to_string_pretty(r)?,
            AnyArtifact::PropertySet(r) => serde_json::to_string_pretty(r)?,
            AnyArtifact::TokenTemplate(r) => serde_json::to_string_pretty(r)?,
        };
        Ok(json)
    }

    pub fn artifact_type(&self) -> ArtifactType {
        match self {
            AnyArtifact::Base(_) => ArtifactType::Base,
            AnyArtifact::Behavior(_) => ArtifactType::Behavior,
            AnyArtifact::BehaviorGroup(_) => ArtifactType::BehaviorGroup,
            AnyArtifact::PropertySet(_) => ArtifactType::PropertySet,
            AnyArtifact::TokenTemplate(_) => ArtifactType::TokenTemplate,
        }
    }

    pub fn artifact(&self) -> &Artifact {
        match self {
            AnyArtifact::Base(r) => &r.artifact,
            AnyArtifact::Behavior(r) => &r.artifact,
            AnyArtifact::BehaviorGroup(r) => &r.artifact,
            AnyArtifact::PropertySet(r) => &r.artifact,
            AnyArtifact::TokenTemplate(r) => &r.artifact,
        }
    }

    pub fn artifact_mut(&mut self) -> &mut Artifact {
        match self {
            AnyArtifact::Base(r) => &mut r.artifact,
            AnyArtifact::Behavior(r) => &mut r.artifact,
            AnyArtifact::BehaviorGroup(r) => &mut r.artifact,
            AnyArtifact::PropertySet(r) => &mut r.artifact,
            AnyArtifact::TokenTemplate(r) => &mut r.artifact,
        }
    }

    pub fn tooling(&self) -> &str {
        self.artifact().tooling()
    }
}
