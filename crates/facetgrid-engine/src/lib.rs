// Engine module - value normalization, duplicate detection, filtering, sorting
// and column state. Sits between the data model (types) and hosts (runtime, CLI).

pub mod accessor;
pub mod columns;
pub mod filter;
pub mod grid;
pub mod normalize;
pub mod similarity;
pub mod sort;
pub mod tokenize;

pub use columns::{ColumnSet, ColumnStateManager};
pub use grid::{GridEngine, GridOptions};
pub use normalize::{CurrencyFormat, PLACEHOLDER, SymbolPosition, format_currency, parse_currency};
pub use similarity::{DEFAULT_THRESHOLD, SIMILARITY_ROW_CEILING, SimilarityMatcher, jaccard};
pub use sort::SortValue;
pub use tokenize::tokenize;

use facetgrid_types::{Row, SimilarityFacet};
use std::collections::BTreeMap;

// Façade API - Stable public interface for hosts
// Runtime and CLI should use these instead of reaching into the modules

/// Compare counts for every row with the default matcher.
pub fn compare_counts(rows: &[Row]) -> BTreeMap<String, usize> {
    SimilarityMatcher::default().compute(rows)
}

/// Build the similarity facet for one epoch.
pub fn build_facet(matcher: &SimilarityMatcher, epoch: u64, rows: &[Row]) -> SimilarityFacet {
    matcher.build_facet(epoch, rows)
}
