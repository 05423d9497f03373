//! Artifact envelope shared by every taxonomy entry.

use crate::types::{ArtifactSymbol, ArtifactType};
use serde::{Deserialize, Serialize};

/// Universal descriptive envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub name: String,
    #[serde(rename = "type", default)]
    pub artifact_type: ArtifactType,
    #[serde(default)]
    pub artifact_symbol: ArtifactSymbol,
    #[serde(default)]
    pub artifact_definition: ArtifactDefinition,
    #[serde(default)]
    pub maps: Maps,
    #[serde(default)]
    pub incompatible_with_symbols: Vec<ArtifactSymbol>,
    #[serde(default)]
    pub influenced_by_symbols: Vec<SymbolInfluence>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// File name of the Control (schema) file, when present
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub control_uri: String,
    #[serde(default)]
    pub artifact_files: Vec<ArtifactFile>,
    /// Directory the artifact was loaded from; not part of the descriptor
    #[serde(skip)]
    pub folder: Option<String>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, artifact_type: ArtifactType, symbol: ArtifactSymbol) -> Self {
        Self {
            name: name.into(),
            artifact_type,
            artifact_symbol: symbol,
            ..Default::default()
        }
    }

    pub fn tooling(&self) -> &str {
        &self.artifact_symbol.tooling
    }

    /// The Control file blob, if one was attached
    pub fn control_file(&self) -> Option<&ArtifactFile> {
        self.artifact_files
            .iter()
            .find(|f| f.content == ArtifactContent::Control)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactDefinition {
    pub business_description: String,
    pub business_example: String,
    pub comments: String,
    pub analogies: Vec<ArtifactAnalogy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactAnalogy {
    pub name: String,
    pub description: String,
}

/// Cross-reference maps to code, implementations and external resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Maps {
    pub code_references: Vec<MapReference>,
    pub implementation_references: Vec<MapReference>,
    pub resources: Vec<MapResourceEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingType {
    #[default]
    #[serde(alias = "SOURCE_CODE")]
    SourceCode,
    #[serde(alias = "IMPLEMENTATION")]
    Implementation,
    #[serde(alias = "RESOURCE")]
    Resource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapReference {
    pub mapping_type: MappingType,
    pub name: String,
    pub platform: String,
    pub reference_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapResourceEntry {
    pub mapping_type: MappingType,
    pub name: String,
    pub description: String,
    pub resource_path: String,
}

/// Symbol whose presence influences this artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolInfluence {
    pub description: String,
    pub symbol: ArtifactSymbol,
}

/// Classification of an embedded file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactContent {
    /// Schema file
    #[serde(alias = "CONTROL")]
    Control,
    /// Markdown
    #[serde(alias = "UML")]
    Uml,
    #[default]
    #[serde(alias = "OTHER")]
    Other,
}

/// File blob embedded in an artifact directory
///
/// Bytes travel base64 encoded (`fileData`) in requests and responses. On disk
/// they live next to the descriptor, never inside it; see
/// [`AnyArtifact::to_descriptor`](super::AnyArtifact::to_descriptor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactFile {
    pub file_name: String,
    #[serde(default)]
    pub content: ArtifactContent,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub file_data: Vec<u8>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

impl ArtifactFile {
    pub fn new(file_name: impl Into<String>, content: ArtifactContent, file_data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            file_data,
        }
    }

    /// File contents as text, for Control and Uml files
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.file_data).ok()
    }
}
