use crate::row::Row;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much of the current page is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSelection {
    #[default]
    None,
    Partial,
    All,
}

/// The materialized result handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridView {
    pub page_rows: Vec<Row>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub column_order: Vec<String>,
    pub column_visibility: BTreeMap<String, bool>,
    pub column_widths: BTreeMap<String, f64>,
    /// `column_order` without hidden columns.
    pub visible_columns: Vec<String>,
    pub page_selection: PageSelection,
    /// True when every filtered row is explicitly selected.
    pub all_filtered_selected: bool,
    pub epoch: u64,
    /// Whether the similarity facet for `epoch` has arrived.
    pub facet_ready: bool,
}

impl GridView {
    pub fn page_ids(&self) -> Vec<&str> {
        self.page_rows.iter().map(|row| row.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.page_rows.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }
}
