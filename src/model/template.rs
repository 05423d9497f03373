//! Token template views: formula, definition and fully resolved specification.

use super::artifact::Artifact;
use super::core::{Base, Behavior, BehaviorGroup, PropertySet, TokenTemplate};
use super::taxonomy::{Taxonomy, TaxonomyRecord};
use crate::error::TaxonomyError;
use crate::types::ArtifactSymbol;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unresolved composition of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFormula {
    pub artifact: Artifact,
    pub formula: String,
    pub base: ArtifactSymbol,
    pub behaviors: Vec<ArtifactSymbol>,
    pub behavior_groups: Vec<ArtifactSymbol>,
    pub property_sets: Vec<ArtifactSymbol>,
    pub child_tokens: Vec<ArtifactSymbol>,
}

/// Template with its direct references resolved against the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub artifact: Artifact,
    pub formula: String,
    pub base: Base,
    pub behaviors: Vec<Behavior>,
    pub behavior_groups: Vec<BehaviorGroup>,
    pub property_sets: Vec<PropertySet>,
    pub child_tokens: Vec<ArtifactSymbol>,
}

/// Fully resolved token: group behaviors expanded, children resolved recursively
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSpecification {
    pub artifact: Artifact,
    pub formula: String,
    pub base: Base,
    pub behaviors: Vec<Behavior>,
    pub behavior_groups: Vec<BehaviorGroup>,
    pub property_sets: Vec<PropertySet>,
    pub child_tokens: Vec<TokenSpecification>,
}

impl Taxonomy {
    pub fn template_formula(&self, formula_id: &str) -> Result<TemplateFormula, TaxonomyError> {
        let template: &TokenTemplate = self.get(formula_id)?;
        Ok(TemplateFormula {
            artifact: template.artifact.clone(),
            formula: template.effective_formula(),
            base: template.base.clone(),
            behaviors: template.behaviors.clone(),
            behavior_groups: template.behavior_groups.clone(),
            property_sets: template.property_sets.clone(),
            child_tokens: template.child_tokens.clone(),
        })
    }

    pub fn template_definition(&self, formula_id: &str) -> Result<TemplateDefinition, TaxonomyError> {
        let template: &TokenTemplate = self.get(formula_id)?;
        Ok(TemplateDefinition {
            artifact: template.artifact.clone(),
            formula: template.effective_formula(),
            base: self.resolve_reference::<Base>(formula_id, &template.base)?,
            behaviors: self.resolve_all(formula_id, &template.behaviors)?,
            behavior_groups: self.resolve_all(formula_id, &template.behavior_groups)?,
            property_sets: self.resolve_all(formula_id, &template.property_sets)?,
            child_tokens: template.child_tokens.clone(),
        })
    }

    /// Resolve a template and its descendants.
    ///
    /// Traversal goes through the template arena, so a cycle fails with
    /// `TemplateCycle` and a tree deeper than `max_depth` with `InvalidArgument`.
    pub fn token_specification(
        &self,
        formula_id: &str,
        max_depth: usize,
    ) -> Result<TokenSpecification, TaxonomyError> {
        // Validates the whole subtree before resolving anything.
        self.template_tree().walk(formula_id, max_depth)?;
        self.specification_at(formula_id)
    }

    fn specification_at(&self, formula_id: &str) -> Result<TokenSpecification, TaxonomyError> {
        let definition = self.template_definition(formula_id)?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut behaviors = Vec::new();
        let group_members = definition
            .behavior_groups
            .iter()
            .flat_map(|group| group.behavior_symbols.iter());
        for behavior in definition.behaviors.iter().cloned() {
            if seen.insert(behavior.artifact.tooling().to_string()) {
                behaviors.push(behavior);
            }
        }
        for symbol in group_members {
            if seen.insert(symbol.tooling.clone()) {
                behaviors.push(self.resolve_reference::<Behavior>(formula_id, symbol)?);
            }
        }

        let mut child_tokens = Vec::new();
        for child in self.template_tree().children(formula_id) {
            child_tokens.push(self.specification_at(child)?);
        }

        Ok(TokenSpecification {
            artifact: definition.artifact,
            formula: definition.formula,
            base: definition.base,
            behaviors,
            behavior_groups: definition.behavior_groups,
            property_sets: definition.property_sets,
            child_tokens,
        })
    }

    fn resolve_reference<T: TaxonomyRecord>(
        &self,
        formula_id: &str,
        symbol: &ArtifactSymbol,
    ) -> Result<T, TaxonomyError> {
        self.get::<T>(&symbol.tooling).cloned().map_err(|_| {
            TaxonomyError::NotFound(format!(
                "Template {} references missing {} {}",
                formula_id,
                T::ARTIFACT_TYPE,
                symbol.tooling
            ))
        })
    }

    fn resolve_all<T: TaxonomyRecord>(
        &self,
        formula_id: &str,
        symbols: &[ArtifactSymbol],
    ) -> Result<Vec<T>, TaxonomyError> {
        symbols
            .iter()
            .map(|symbol| self.resolve_reference::<T>(formula_id, symbol))
            .collect()
    }
}
