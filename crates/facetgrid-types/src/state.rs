use crate::filter::FilterState;
use crate::sort::SortState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Visibility, order and width of every column.
///
/// `order` always holds every column id exactly once; hiding a column never
/// removes it from the order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnViewState {
    pub visibility: BTreeMap<String, bool>,
    pub order: Vec<String>,
    pub sizing: BTreeMap<String, f64>,
}

/// Explicitly selected row ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    ids: BTreeSet<String>,
}

impl SelectionState {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flip one id; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Everything the engine owns besides rows and column definitions.
///
/// Serializable so a host can persist it; the engine itself never does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    #[serde(default)]
    pub filters: FilterState,
    #[serde(default)]
    pub sort: SortState,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub columns: ColumnViewState,
    #[serde(default)]
    pub selection: SelectionState,
}
