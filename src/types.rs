//! Core types shared by every taxonomy collection.

use crate::error::TaxonomyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Collection keyed by tooling symbol, ordered so pagination is stable
pub type SymbolMap<T> = BTreeMap<String, T>;

/// Artifact type discriminant for the five taxonomy collections
///
/// Serialized in PascalCase; descriptors written with protobuf enum names
/// (`BEHAVIOR_GROUP`) are accepted as well.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ArtifactType {
    #[default]
    #[serde(alias = "BASE")]
    Base,
    #[serde(alias = "BEHAVIOR")]
    Behavior,
    #[serde(alias = "BEHAVIOR_GROUP")]
    BehaviorGroup,
    #[serde(alias = "PROPERTY_SET")]
    PropertySet,
    #[serde(alias = "TOKEN_TEMPLATE", alias = "TEMPLATE_FORMULA", alias = "TEMPLATE_DEFINITION")]
    TokenTemplate,
}

impl ArtifactType {
    pub const ALL: [ArtifactType; 5] = [
        ArtifactType::Base,
        ArtifactType::Behavior,
        ArtifactType::BehaviorGroup,
        ArtifactType::PropertySet,
        ArtifactType::TokenTemplate,
    ];

    /// Subfolder of the artifact root holding this collection
    pub fn folder_name(&self) -> &'static str {
        match self {
            ArtifactType::Base => "base",
            ArtifactType::Behavior => "behaviors",
            ArtifactType::BehaviorGroup => "behavior-groups",
            ArtifactType::PropertySet => "property-sets",
            ArtifactType::TokenTemplate => "token-templates",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactType::Base => "Base",
            ArtifactType::Behavior => "Behavior",
            ArtifactType::BehaviorGroup => "BehaviorGroup",
            ArtifactType::PropertySet => "PropertySet",
            ArtifactType::TokenTemplate => "TokenTemplate",
        };
        f.write_str(name)
    }
}

impl FromStr for ArtifactType {
    type Err = TaxonomyError;

    /// Accepts type names and folder names, case and separator insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "base" | "0" => Ok(ArtifactType::Base),
            "behavior" | "behaviors" | "1" => Ok(ArtifactType::Behavior),
            "behaviorgroup" | "behaviorgroups" | "2" => Ok(ArtifactType::BehaviorGroup),
            "propertyset" | "propertysets" | "3" => Ok(ArtifactType::PropertySet),
            "tokentemplate" | "tokentemplates" | "template" | "4" => {
                Ok(ArtifactType::TokenTemplate)
            }
            _ => Err(TaxonomyError::InvalidArgument(format!(
                "Unrecognized artifact type: {}",
                s
            ))),
        }
    }
}

/// Tooling and visual symbol pair identifying an artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactSymbol {
    /// Machine-usable identifier, unique within its collection
    #[serde(rename = "toolingSymbol", alias = "tooling", default)]
    pub tooling: String,
    /// Display counterpart of the tooling symbol
    #[serde(rename = "visualSymbol", alias = "visual", default)]
    pub visual: String,
}

impl ArtifactSymbol {
    pub fn new(tooling: impl Into<String>, visual: impl Into<String>) -> Self {
        Self {
            tooling: tooling.into(),
            visual: visual.into(),
        }
    }

    /// Symbol whose visual form equals its tooling form
    pub fn tooling(tooling: impl Into<String>) -> Self {
        let tooling = tooling.into();
        Self {
            visual: tooling.clone(),
            tooling,
        }
    }
}
