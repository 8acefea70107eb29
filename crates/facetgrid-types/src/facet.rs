use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-row compare counts for one row-set epoch.
///
/// Always delivered whole; a facet for an older epoch is stale and must be
/// dropped rather than merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityFacet {
    pub epoch: u64,
    pub counts: BTreeMap<String, usize>,
}

impl SimilarityFacet {
    pub fn new(epoch: u64, counts: BTreeMap<String, usize>) -> Self {
        Self { epoch, counts }
    }

    pub fn count(&self, row_id: &str) -> Option<usize> {
        self.counts.get(row_id).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// One selectable value of a multi-select column and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}
