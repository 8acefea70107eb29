use crate::column::FilterKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Filter value for one column. The variant must match the column's
/// [`FilterKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    /// Inclusive bounds; a missing bound is open.
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    MultiSelect(BTreeSet<String>),
}

impl FilterValue {
    pub fn range(min: f64, max: f64) -> Self {
        FilterValue::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::MultiSelect(values.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Text(_) => FilterKind::Text,
            FilterValue::Range { .. } => FilterKind::Range,
            FilterValue::MultiSelect(_) => FilterKind::MultiSelect,
        }
    }

    /// An empty value restricts nothing and is never stored.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
            FilterValue::MultiSelect(values) => values.is_empty(),
        }
    }
}

/// Global search plus per-column filters. A column without an entry is
/// unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub global: String,
    #[serde(default)]
    pub columns: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.columns.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(FilterValue::Text(String::new()).is_empty());
        assert!(FilterValue::Range { min: None, max: None }.is_empty());
        assert!(!FilterValue::Range { min: Some(1.0), max: None }.is_empty());
        assert!(FilterValue::MultiSelect(BTreeSet::new()).is_empty());
        assert!(!FilterValue::one_of(["Gold"]).is_empty());
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(FilterValue::range(1.0, 2.0).kind(), FilterKind::Range);
        assert_eq!(FilterValue::one_of(["a"]).kind(), FilterKind::MultiSelect);
        assert_eq!(FilterValue::Text("x".into()).kind(), FilterKind::Text);
    }
}
