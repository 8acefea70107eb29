use crate::accessor::{display_text, resolve};
use crate::columns::ColumnSet;
use crate::normalize::parse_currency;
use facetgrid_types::{ColumnDefinition, FilterState, FilterValue, Row, SimilarityFacet};
use serde_json::Value;
use std::collections::BTreeSet;

/// Global search over every string field, plus string members of nested
/// objects one level down. `needle` must already be lower-cased; an empty
/// needle matches everything.
pub fn matches_global(row: &Row, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    row.fields.values().any(|value| match value {
        Value::String(s) => contains_folded(s, needle),
        Value::Object(nested) => nested.values().any(|inner| match inner {
            Value::String(s) => contains_folded(s, needle),
            _ => false,
        }),
        _ => false,
    })
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Case-insensitive substring on the column's text form.
pub fn matches_text(value: &Value, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    display_text(value)
        .map(|text| contains_folded(&text, &needle.to_lowercase()))
        .unwrap_or(false)
}

/// Inclusive range over the parsed currency value. Unknown prices fail: an
/// unparsable value is never assumed to be zero.
pub fn matches_range(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    let Some(amount) = parse_currency(value) else {
        return false;
    };
    min.is_none_or(|min| amount >= min) && max.is_none_or(|max| amount <= max)
}

/// Set membership on the column's text form; an empty set restricts nothing.
pub fn matches_multi_select(value: &Value, allowed: &BTreeSet<String>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    display_text(value)
        .map(|text| allowed.contains(text.as_str()))
        .unwrap_or(false)
}

pub fn matches_column(
    column: &ColumnDefinition,
    filter: &FilterValue,
    row: &Row,
    facet: Option<&SimilarityFacet>,
) -> bool {
    if filter.is_empty() {
        return true;
    }
    let value = resolve(&column.accessor, row, facet);
    match filter {
        FilterValue::Text(needle) => matches_text(&value, needle),
        FilterValue::Range { min, max } => matches_range(&value, *min, *max),
        FilterValue::MultiSelect(allowed) => matches_multi_select(&value, allowed),
    }
}

/// Filter state bound to a column set, ready to be applied row by row.
///
/// A row passes when it passes the global search and every column filter
/// (AND across columns, OR within one multi-select).
pub struct CompiledFilters<'a> {
    needle: String,
    columns: Vec<(&'a ColumnDefinition, &'a FilterValue)>,
}

impl<'a> CompiledFilters<'a> {
    /// `skip` leaves one column's own filter out, which is what facet
    /// option counts need.
    pub fn new(state: &'a FilterState, columns: &'a ColumnSet, skip: Option<&str>) -> Self {
        let bound = state
            .columns
            .iter()
            .filter(|(id, value)| Some(id.as_str()) != skip && !value.is_empty())
            .filter_map(|(id, value)| columns.get_by_id(id).map(|column| (column, value)))
            .collect();

        Self {
            needle: state.global.to_lowercase(),
            columns: bound,
        }
    }

    pub fn matches_global(&self, row: &Row) -> bool {
        matches_global(row, &self.needle)
    }

    pub fn matches_columns(&self, row: &Row, facet: Option<&SimilarityFacet>) -> bool {
        self.columns
            .iter()
            .all(|(column, filter)| matches_column(column, filter, row, facet))
    }

    pub fn matches(&self, row: &Row, facet: Option<&SimilarityFacet>) -> bool {
        self.matches_global(row) && self.matches_columns(row, facet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetgrid_types::{Accessor, FilterKind};
    use serde_json::json;

    fn necklace() -> Row {
        Row::new("1")
            .with("name", "Halskette Geo")
            .with("sku", "A1")
            .with("price", "€49.90")
            .with("stock", 7)
            .with(
                "brand",
                json!({"name": "Pandora", "meta": {"origin": "Denmark"}}),
            )
    }

    #[test]
    fn test_global_empty_matches_everything() {
        assert!(matches_global(&Row::new("x"), ""));
    }

    #[test]
    fn test_global_is_case_insensitive() {
        assert!(matches_global(&necklace(), "halskette"));
        assert!(matches_global(&necklace(), "geo"));
        assert!(!matches_global(&necklace(), "armband"));
    }

    #[test]
    fn test_global_searches_one_level_into_objects() {
        assert!(matches_global(&necklace(), "pandora"));
        // Two levels down is out of reach.
        assert!(!matches_global(&necklace(), "denmark"));
    }

    #[test]
    fn test_global_ignores_numbers_and_id() {
        assert!(!matches_global(&necklace(), "7"));
        assert!(!matches_global(&Row::new("needle"), "needle"));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(matches_range(&json!("€45.00"), Some(45.0), Some(55.0)));
        assert!(matches_range(&json!("€55.00"), Some(45.0), Some(55.0)));
        assert!(!matches_range(&json!("€59.90"), Some(45.0), Some(55.0)));
        assert!(!matches_range(&json!("€20"), Some(45.0), Some(55.0)));
    }

    #[test]
    fn test_range_open_bounds() {
        assert!(matches_range(&json!(1000), Some(45.0), None));
        assert!(matches_range(&json!(0), None, Some(10.0)));
    }

    #[test]
    fn test_range_unknown_price_fails() {
        assert!(!matches_range(&json!("auf Anfrage"), None, Some(100.0)));
        assert!(!matches_range(&Value::Null, Some(0.0), None));
    }

    #[test]
    fn test_multi_select() {
        let allowed: BTreeSet<String> = ["Pandora".to_string(), "Gold".to_string()].into();
        assert!(matches_multi_select(&json!("Gold"), &allowed));
        assert!(matches_multi_select(&json!({"name": "Pandora"}), &allowed));
        assert!(!matches_multi_select(&json!("Silber"), &allowed));
        assert!(!matches_multi_select(&Value::Null, &allowed));
        assert!(matches_multi_select(&Value::Null, &BTreeSet::<String>::new()));
    }

    #[test]
    fn test_text_filter() {
        assert!(matches_text(&json!("Halskette Geo"), "KETTE"));
        assert!(matches_text(&json!(18), "18"));
        assert!(!matches_text(&Value::Null, "x"));
        assert!(matches_text(&Value::Null, ""));
    }

    #[test]
    fn test_compiled_filters_and_across_columns() {
        let columns = ColumnSet::new(vec![
            ColumnDefinition::field("price").filter(FilterKind::Range),
            ColumnDefinition::new("brand", Accessor::field("brand")).filter(FilterKind::MultiSelect),
        ])
        .unwrap();

        let mut state = FilterState::default();
        state
            .columns
            .insert("price".to_string(), FilterValue::range(40.0, 50.0));
        state
            .columns
            .insert("brand".to_string(), FilterValue::one_of(["Pandora"]));

        let compiled = CompiledFilters::new(&state, &columns, None);
        assert!(compiled.matches(&necklace(), None));

        state
            .columns
            .insert("brand".to_string(), FilterValue::one_of(["Thomas Sabo"]));
        let compiled = CompiledFilters::new(&state, &columns, None);
        assert!(!compiled.matches(&necklace(), None));

        // Skipping the brand filter lets the row through again.
        let compiled = CompiledFilters::new(&state, &columns, Some("brand"));
        assert!(compiled.matches(&necklace(), None));
    }
}
