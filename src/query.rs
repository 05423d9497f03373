//! Query Engine
//!
//! Paginated listing of one collection. Collections iterate in tooling-symbol
//! order, so a page is a contiguous slice of a stable sequence.
//!
//! Paging policy:
//! - a collection no larger than the page returns whole, `first = 0`
//! - otherwise `[last_item_index, last_item_index + max)` is returned
//! - `total_items_in_collection` is always the full collection size
//! - a page starting past the end is empty with `last = first - 1`
//!
//! The type name is the only input that can fail (`InvalidArgument`). Once it
//! parses, paging is total: out-of-range starts produce an empty page and
//! indices saturate at `i64::MAX`.

use crate::error::TaxonomyError;
use crate::model::{Base, Behavior, BehaviorGroup, PropertySet, Taxonomy, TaxonomyRecord, TokenTemplate};
use crate::types::ArtifactType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Paging request for one collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Type name or folder name, parsed with [`ArtifactType::from_str`](std::str::FromStr)
    pub artifact_type: String,
    /// Page size; zero selects the configured default
    #[serde(default)]
    pub max_item_return: usize,
    /// Index of the first item of the requested page
    #[serde(default)]
    pub last_item_index: usize,
}

impl QueryOptions {
    pub fn for_type(artifact_type: ArtifactType, max_item_return: usize, last_item_index: usize) -> Self {
        Self {
            artifact_type: artifact_type.to_string(),
            max_item_return,
            last_item_index,
        }
    }
}

/// Page payload, one variant per collection shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items")]
pub enum ArtifactCollection {
    Bases(Vec<Base>),
    Behaviors(Vec<Behavior>),
    BehaviorGroups(Vec<BehaviorGroup>),
    PropertySets(Vec<PropertySet>),
    TokenTemplates(Vec<TokenTemplate>),
}

impl ArtifactCollection {
    pub fn empty(artifact_type: ArtifactType) -> Self {
        match artifact_type {
            ArtifactType::Base => ArtifactCollection::Bases(Vec::new()),
            ArtifactType::Behavior => ArtifactCollection::Behaviors(Vec::new()),
            ArtifactType::BehaviorGroup => ArtifactCollection::BehaviorGroups(Vec::new()),
            ArtifactType::PropertySet => ArtifactCollection::PropertySets(Vec::new()),
            ArtifactType::TokenTemplate => ArtifactCollection::TokenTemplates(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArtifactCollection::Bases(items) => items.len(),
            ArtifactCollection::Behaviors(items) => items.len(),
            ArtifactCollection::BehaviorGroups(items) => items.len(),
            ArtifactCollection::PropertySets(items) => items.len(),
            ArtifactCollection::TokenTemplates(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tooling symbols of the page, in order
    pub fn symbols(&self) -> Vec<&str> {
        fn of<T: TaxonomyRecord>(items: &[T]) -> Vec<&str> {
            items.iter().map(|r| r.artifact().tooling()).collect()
        }
        match self {
            ArtifactCollection::Bases(items) => of(items),
            ArtifactCollection::Behaviors(items) => of(items),
            ArtifactCollection::BehaviorGroups(items) => of(items),
            ArtifactCollection::PropertySets(items) => of(items),
            ArtifactCollection::TokenTemplates(items) => of(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub artifact_type: ArtifactType,
    pub first_item_index: i64,
    pub last_item_index: i64,
    pub total_items_in_collection: usize,
    pub artifact_collection: ArtifactCollection,
}

/// Page through one collection.
pub fn list_by_type(
    taxonomy: &Taxonomy,
    options: &QueryOptions,
    default_page_size: usize,
) -> Result<QueryResult, TaxonomyError> {
    let artifact_type: ArtifactType = options.artifact_type.parse()?;
    let page_size = if options.max_item_return == 0 {
        default_page_size.max(1)
    } else {
        options.max_item_return
    };

    let result = match artifact_type {
        ArtifactType::Base => page::<Base>(taxonomy, page_size, options.last_item_index, ArtifactCollection::Bases),
        ArtifactType::Behavior => page::<Behavior>(
            taxonomy,
            page_size,
            options.last_item_index,
            ArtifactCollection::Behaviors,
        ),
        ArtifactType::BehaviorGroup => page::<BehaviorGroup>(
            taxonomy,
            page_size,
            options.last_item_index,
            ArtifactCollection::BehaviorGroups,
        ),
        ArtifactType::PropertySet => page::<PropertySet>(
            taxonomy,
            page_size,
            options.last_item_index,
            ArtifactCollection::PropertySets,
        ),
        ArtifactType::TokenTemplate => page::<TokenTemplate>(
            taxonomy,
            page_size,
            options.last_item_index,
            ArtifactCollection::TokenTemplates,
        ),
    };

    debug!(
        artifact_type = %artifact_type,
        first = result.first_item_index,
        last = result.last_item_index,
        total = result.total_items_in_collection,
        "Listed page"
    );
    Ok(result)
}

fn page<T: TaxonomyRecord>(
    taxonomy: &Taxonomy,
    page_size: usize,
    start: usize,
    wrap: fn(Vec<T>) -> ArtifactCollection,
) -> QueryResult {
    let collection = taxonomy.collection::<T>();
    let total = collection.len();

    let (first, items): (usize, Vec<T>) = if total <= page_size {
        (0, collection.values().cloned().collect())
    } else {
        (start, collection.values().skip(start).take(page_size).cloned().collect())
    };

    let first_item_index = index(first);
    QueryResult {
        artifact_type: T::ARTIFACT_TYPE,
        first_item_index,
        last_item_index: first_item_index.saturating_add(index(items.len())) - 1,
        total_items_in_collection: total,
        artifact_collection: wrap(items),
    }
}

fn index(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnyArtifact, Artifact};
    use crate::types::ArtifactSymbol;
    use proptest::prelude::*;

    fn taxonomy_with_behaviors(count: usize) -> Taxonomy {
        let mut taxonomy = Taxonomy::new("1.0");
        for i in 0..count {
            let tooling = format!("b{:03}", i);
            taxonomy.insert(AnyArtifact::Behavior(Behavior {
                artifact: Artifact::new(
                    format!("Behavior {}", i),
                    ArtifactType::Behavior,
                    ArtifactSymbol::tooling(tooling),
                ),
                ..Default::default()
            }));
        }
        taxonomy
    }

    #[test]
    fn test_unknown_type_is_invalid_argument() {
        let taxonomy = taxonomy_with_behaviors(3);
        let options = QueryOptions {
            artifact_type: "Widget".to_string(),
            max_item_return: 10,
            last_item_index: 0,
        };
        let err = list_by_type(&taxonomy, &options, 50).unwrap_err();
        assert!(matches!(err, TaxonomyError::InvalidArgument(_)));
    }

    #[test]
    fn test_small_collection_returned_whole() {
        let taxonomy = taxonomy_with_behaviors(3);
        let options = QueryOptions::for_type(ArtifactType::Behavior, 10, 2);
        let result = list_by_type(&taxonomy, &options, 50).unwrap();
        assert_eq!(result.first_item_index, 0);
        assert_eq!(result.last_item_index, 2);
        assert_eq!(result.total_items_in_collection, 3);
        assert_eq!(result.artifact_collection.symbols(), vec!["b000", "b001", "b002"]);
    }

    #[test]
    fn test_page_slices_from_last_item_index() {
        let taxonomy = taxonomy_with_behaviors(10);
        let options = QueryOptions::for_type(ArtifactType::Behavior, 4, 4);
        let result = list_by_type(&taxonomy, &options, 50).unwrap();
        assert_eq!(result.first_item_index, 4);
        assert_eq!(result.last_item_index, 7);
        assert_eq!(result.total_items_in_collection, 10);
        assert_eq!(
            result.artifact_collection.symbols(),
            vec!["b004", "b005", "b006", "b007"]
        );
    }

    #[test]
    fn test_final_page_is_short_and_past_end_is_empty() {
        let taxonomy = taxonomy_with_behaviors(10);
        let tail = list_by_type(&taxonomy, &QueryOptions::for_type(ArtifactType::Behavior, 4, 8), 50).unwrap();
        assert_eq!(tail.artifact_collection.len(), 2);
        assert_eq!(tail.last_item_index, 9);

        let past = list_by_type(&taxonomy, &QueryOptions::for_type(ArtifactType::Behavior, 4, 12), 50).unwrap();
        assert!(past.artifact_collection.is_empty());
        assert_eq!(past.first_item_index, 12);
        assert_eq!(past.last_item_index, 11);
        assert_eq!(past.total_items_in_collection, 10);
    }

    #[test]
    fn test_zero_max_uses_default_page_size() {
        let taxonomy = taxonomy_with_behaviors(10);
        let result = list_by_type(&taxonomy, &QueryOptions::for_type(ArtifactType::Behavior, 0, 0), 3).unwrap();
        assert_eq!(result.artifact_collection.len(), 3);
        assert_eq!(result.last_item_index, 2);
    }

    #[test]
    fn test_empty_collection() {
        let taxonomy = Taxonomy::new("1.0");
        let result = list_by_type(&taxonomy, &QueryOptions::for_type(ArtifactType::Base, 5, 0), 50).unwrap();
        assert!(matches!(result.artifact_collection, ArtifactCollection::Bases(ref v) if v.is_empty()));
        assert_eq!(result.first_item_index, 0);
        assert_eq!(result.last_item_index, -1);
        assert_eq!(result.total_items_in_collection, 0);
    }

    #[test]
    fn test_start_beyond_i64_saturates_to_empty_page() {
        let taxonomy = taxonomy_with_behaviors(10);
        let options = QueryOptions::for_type(ArtifactType::Behavior, 4, usize::MAX);
        let result = list_by_type(&taxonomy, &options, 50).unwrap();
        assert!(result.artifact_collection.is_empty());
        assert_eq!(result.first_item_index, i64::MAX);
        assert_eq!(result.last_item_index, i64::MAX - 1);
        assert_eq!(result.total_items_in_collection, 10);
    }

    proptest! {
        #![proptest_config(ProptestConfig { max_global_rejects: 16384, ..ProptestConfig::default() })]

        #[test]
        fn prop_large_page_returns_whole_collection(size in 0usize..40, extra in 0usize..10, start in 0usize..50) {
            let taxonomy = taxonomy_with_behaviors(size);
            let options = QueryOptions::for_type(ArtifactType::Behavior, size + extra + 1, start);
            let result = list_by_type(&taxonomy, &options, 50).unwrap();
            prop_assert_eq!(result.first_item_index, 0);
            prop_assert_eq!(result.last_item_index, size as i64 - 1);
            prop_assert_eq!(result.artifact_collection.len(), size);
            prop_assert_eq!(result.total_items_in_collection, size);
        }

        #[test]
        fn prop_small_page_returns_exact_slice(size in 2usize..40, max in 1usize..40, start in 0usize..40) {
            prop_assume!(max < size);
            prop_assume!(start + max <= size);
            let taxonomy = taxonomy_with_behaviors(size);
            let options = QueryOptions::for_type(ArtifactType::Behavior, max, start);
            let result = list_by_type(&taxonomy, &options, 50).unwrap();

            prop_assert_eq!(result.artifact_collection.len(), max);
            prop_assert_eq!(result.first_item_index, start as i64);
            prop_assert_eq!(result.last_item_index, (start + max) as i64 - 1);
            let expected = format!("b{:03}", start);
            prop_assert_eq!(result.artifact_collection.symbols()[0], expected.as_str());
        }

        #[test]
        fn prop_consecutive_pages_cover_collection(size in 1usize..60, max in 1usize..20) {
            let taxonomy = taxonomy_with_behaviors(size);
            let mut seen = Vec::new();
            let mut start = 0usize;
            loop {
                let options = QueryOptions::for_type(ArtifactType::Behavior, max, start);
                let result = list_by_type(&taxonomy, &options, 50).unwrap();
                if result.artifact_collection.is_empty() {
                    break;
                }
                seen.extend(result.artifact_collection.symbols().into_iter().map(str::to_string));
                if result.first_item_index == 0 && size <= max {
                    break;
                }
                start = (result.last_item_index + 1) as usize;
            }
            let expected: Vec<String> = taxonomy.behaviors.keys().cloned().collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
