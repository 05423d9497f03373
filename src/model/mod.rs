//! Taxonomy data model
//!
//! Artifact envelope, the five typed record kinds, the aggregate root and the
//! template arena and views built on top of it.

pub mod artifact;
pub mod core;
pub mod taxonomy;
pub mod template;
pub mod template_tree;

pub use artifact::{
    Artifact, ArtifactAnalogy, ArtifactContent, ArtifactDefinition, ArtifactFile, MapReference,
    MapResourceEntry, Maps, MappingType, SymbolInfluence,
};
pub use self::core::{
    Base, Behavior, BehaviorGroup, Invocation, InvocationParameter, InvocationRequest,
    InvocationResponse, Property, PropertySet, RepresentationType, TokenTemplate, TokenType,
    TokenUnit, ValueType,
};
pub use taxonomy::{AnyArtifact, CollectionCounts, Taxonomy, TaxonomyManifest, TaxonomyRecord};
pub use template::{TemplateDefinition, TemplateFormula, TokenSpecification};
pub use template_tree::{TemplateNode, TemplateTree, TreeVisit};
