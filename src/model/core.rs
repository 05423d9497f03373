//! Typed records for the five taxonomy collections.

use super::artifact::Artifact;
use crate::types::ArtifactSymbol;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// Enums accept protobuf JSON value names (`NON_FUNGIBLE`) alongside their
// PascalCase serialization.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[default]
    #[serde(alias = "FUNGIBLE")]
    Fungible,
    #[serde(alias = "NON_FUNGIBLE")]
    NonFungible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepresentationType {
    #[default]
    #[serde(alias = "COMMON")]
    Common,
    #[serde(alias = "UNIQUE")]
    Unique,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    #[serde(alias = "INTRINSIC")]
    Intrinsic,
    #[serde(alias = "REFERENCE")]
    Reference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenUnit {
    #[default]
    #[serde(alias = "FRACTIONAL")]
    Fractional,
    #[serde(alias = "WHOLE")]
    Whole,
    #[serde(alias = "SINGLETON")]
    Singleton,
}

/// Base token type: artifact plus token-economics attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base {
    pub artifact: Artifact,
    #[serde(default)]
    pub token_type: TokenType,
    #[serde(default)]
    pub representation_type: RepresentationType,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub token_unit: TokenUnit,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default, deserialize_with = "u64_from_number_or_string")]
    pub quantity: u64,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub constructor_name: String,
    /// Named properties of the base token
    #[serde(default)]
    pub token_properties: BTreeMap<String, String>,
}

/// Protobuf JSON writes 64-bit integers as strings; accept either form
fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(u64),
        Text(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Number(n) => Ok(n),
        Wire::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationParameter {
    pub name: String,
    pub value_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationRequest {
    pub control_message_name: String,
    pub description: String,
    pub input_parameters: Vec<InvocationParameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationResponse {
    pub control_message_name: String,
    pub description: String,
    pub output_parameters: Vec<InvocationParameter>,
}

/// Request/response pair exposed by a behavior or property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invocation {
    pub name: String,
    pub description: String,
    pub request: InvocationRequest,
    pub response: InvocationResponse,
}

/// Property with its getter/setter invocations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub name: String,
    pub value_description: String,
    pub template_value: String,
    pub property_invocations: Vec<Invocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behavior {
    pub artifact: Artifact,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub constructor_name: String,
    #[serde(default)]
    pub behavior_invocations: Vec<Invocation>,
    #[serde(default)]
    pub behavioral_properties: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorGroup {
    pub artifact: Artifact,
    /// Ordered behavior references
    #[serde(default)]
    pub behavior_symbols: Vec<ArtifactSymbol>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySet {
    pub artifact: Artifact,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Composable definition combining a base, behaviors, behavior groups and
/// property sets. Child templates are referenced by tooling symbol.
///
/// The template's formula id is its tooling symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTemplate {
    pub artifact: Artifact,
    /// Formula expression, e.g. `tF{d,t}+phSKU`
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub base: ArtifactSymbol,
    #[serde(default)]
    pub behaviors: Vec<ArtifactSymbol>,
    #[serde(default)]
    pub behavior_groups: Vec<ArtifactSymbol>,
    #[serde(default)]
    pub property_sets: Vec<ArtifactSymbol>,
    #[serde(default)]
    pub child_tokens: Vec<ArtifactSymbol>,
}

impl TokenTemplate {
    pub fn formula_id(&self) -> &str {
        self.artifact.tooling()
    }

    /// Formula expression derived from the composition: `base{b1,b2,..}+ps1+ps2`
    pub fn derive_formula(&self) -> String {
        let mut formula = self.base.tooling.clone();
        let members: Vec<&str> = self
            .behaviors
            .iter()
            .chain(self.behavior_groups.iter())
            .map(|s| s.tooling.as_str())
            .collect();
        if !members.is_empty() {
            formula.push('{');
            formula.push_str(&members.join(","));
            formula.push('}');
        }
        for property_set in &self.property_sets {
            formula.push('+');
            formula.push_str(&property_set.tooling);
        }
        formula
    }

    /// Formula as stored, or derived when the descriptor left it empty
    pub fn effective_formula(&self) -> String {
        if self.formula.trim().is_empty() {
            self.derive_formula()
        } else {
            self.formula.clone()
        }
    }
}
