use crate::accessor::resolve;
use crate::columns::ColumnSet;
use crate::normalize::parse_currency;
use facetgrid_types::{ColumnDefinition, Row, SimilarityFacet, SortDirection, SortKind, SortState};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparable form of a column's sort value.
///
/// Missing or unparsable numbers become `-∞`, missing text and booleans
/// become `None`; both sort first in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(Option<String>),
    Bool(Option<bool>),
}

impl SortValue {
    pub fn from_value(value: &Value, kind: SortKind) -> Self {
        match kind {
            SortKind::Currency => {
                SortValue::Number(parse_currency(value).unwrap_or(f64::NEG_INFINITY))
            }
            SortKind::Number => SortValue::Number(parse_number(value).unwrap_or(f64::NEG_INFINITY)),
            SortKind::Text => SortValue::Text(match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
                Value::Null | Value::Array(_) => None,
            }),
            SortKind::Boolean => SortValue::Bool(value.as_bool()),
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Text(a), SortValue::Text(b)) => match (a, b) {
                (Some(a), Some(b)) => compare_text(a, b),
                (a, b) => a.is_some().cmp(&b.is_some()),
            },
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            // One column always yields one variant.
            _ => Ordering::Equal,
        }
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Case-insensitive first so "armband" and "Armband" sit together, then
/// byte order to keep the comparison total.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_value(
    column: &ColumnDefinition,
    row: &Row,
    facet: Option<&SimilarityFacet>,
) -> SortValue {
    SortValue::from_value(&resolve(column.sort_source(), row, facet), column.sort_kind)
}

/// Compare two rows on one column.
pub fn compare_rows(
    column: &ColumnDefinition,
    direction: SortDirection,
    a: &Row,
    b: &Row,
    facet: Option<&SimilarityFacet>,
) -> Ordering {
    let ordering = sort_value(column, a, facet).compare(&sort_value(column, b, facet));
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Stable multi-column sort of row indices.
///
/// Sort values are computed once per row and key; entries are applied in
/// order and the first non-equal comparison wins. Rows equal on every key
/// keep their relative input order.
pub fn sort_indices(
    indices: &mut Vec<usize>,
    rows: &[Row],
    sort: &SortState,
    columns: &ColumnSet,
    facet: Option<&SimilarityFacet>,
) {
    let keys: Vec<(&ColumnDefinition, SortDirection)> = sort
        .entries
        .iter()
        .filter_map(|entry| {
            columns
                .get_by_id(&entry.column)
                .map(|column| (column, entry.direction))
        })
        .collect();

    if keys.is_empty() || indices.len() < 2 {
        return;
    }

    let mut decorated: Vec<(usize, Vec<SortValue>)> = indices
        .iter()
        .map(|&index| {
            let values = keys
                .iter()
                .map(|(column, _)| sort_value(column, &rows[index], facet))
                .collect();
            (index, values)
        })
        .collect();

    // `sort_by` is a stable merge sort.
    decorated.sort_by(|(_, a), (_, b)| {
        keys.iter()
            .zip(a.iter().zip(b.iter()))
            .map(|((_, direction), (va, vb))| {
                let ordering = va.compare(vb);
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    *indices = decorated.into_iter().map(|(index, _)| index).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetgrid_types::{Accessor, SortEntry};
    use serde_json::json;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDefinition::field("name").sortable(SortKind::Text),
            ColumnDefinition::field("price").sortable(SortKind::Currency),
            ColumnDefinition::field("stock").sortable(SortKind::Number),
            ColumnDefinition::field("active").sortable(SortKind::Boolean),
        ])
        .unwrap()
    }

    fn sorted(rows: &[Row], entries: Vec<SortEntry>) -> Vec<String> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        sort_indices(
            &mut indices,
            rows,
            &SortState { entries },
            &columns(),
            None,
        );
        indices.into_iter().map(|i| rows[i].id.clone()).collect()
    }

    #[test]
    fn test_currency_ascending() {
        let rows = vec![
            Row::new("1").with("price", "€49.90"),
            Row::new("2").with("price", "€59.90"),
            Row::new("3").with("price", "€20"),
        ];
        assert_eq!(sorted(&rows, vec![SortEntry::asc("price")]), vec!["3", "1", "2"]);
        assert_eq!(sorted(&rows, vec![SortEntry::desc("price")]), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_unparsable_sorts_first_ascending() {
        let rows = vec![
            Row::new("a").with("price", "€10"),
            Row::new("b").with("price", "auf Anfrage"),
            Row::new("c"),
            Row::new("d").with("price", "-€5"),
        ];
        assert_eq!(
            sorted(&rows, vec![SortEntry::asc("price")]),
            vec!["b", "c", "d", "a"]
        );
        assert_eq!(
            sorted(&rows, vec![SortEntry::desc("price")]),
            vec!["a", "d", "b", "c"]
        );
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let rows = vec![
            Row::new("1").with("price", "€10").with("name", "b"),
            Row::new("2").with("price", "€10").with("name", "a"),
            Row::new("3").with("price", "€5").with("name", "c"),
            Row::new("4").with("price", "€10").with("name", "a"),
        ];
        assert_eq!(
            sorted(&rows, vec![SortEntry::asc("price")]),
            vec!["3", "1", "2", "4"]
        );
        assert_eq!(
            sorted(&rows, vec![SortEntry::desc("price")]),
            vec!["1", "2", "4", "3"]
        );
    }

    #[test]
    fn test_multi_column_tie_break() {
        let rows = vec![
            Row::new("1").with("price", "€10").with("name", "b"),
            Row::new("2").with("price", "€10").with("name", "a"),
            Row::new("3").with("price", "€5").with("name", "c"),
        ];
        assert_eq!(
            sorted(&rows, vec![SortEntry::asc("price"), SortEntry::asc("name")]),
            vec!["3", "2", "1"]
        );
    }

    #[test]
    fn test_text_is_case_insensitive_with_missing_first() {
        let rows = vec![
            Row::new("1").with("name", "beta"),
            Row::new("2").with("name", "Alpha"),
            Row::new("3"),
            Row::new("4").with("name", "alpha"),
        ];
        assert_eq!(
            sorted(&rows, vec![SortEntry::asc("name")]),
            vec!["3", "2", "4", "1"]
        );
    }

    #[test]
    fn test_number_and_boolean() {
        let rows = vec![
            Row::new("1").with("stock", "12").with("active", true),
            Row::new("2").with("stock", 3).with("active", false),
            Row::new("3").with("stock", json!(null)),
        ];
        assert_eq!(sorted(&rows, vec![SortEntry::asc("stock")]), vec!["3", "2", "1"]);
        assert_eq!(sorted(&rows, vec![SortEntry::desc("active")]), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_sort_preserves_order() {
        let rows = vec![Row::new("b"), Row::new("a")];
        assert_eq!(sorted(&rows, vec![]), vec!["b", "a"]);
    }

    #[test]
    fn test_sort_accessor_differs_from_display() {
        let column = ColumnDefinition::new(
            "range",
            Accessor::derived(|row| {
                json!(format!(
                    "{} – {}",
                    row.get_str("low").unwrap_or("?"),
                    row.get_str("high").unwrap_or("?")
                ))
            }),
        )
        .sortable(SortKind::Currency)
        .sort_by(Accessor::field("low"));

        let cheap = Row::new("1").with("low", "€9").with("high", "€90");
        let pricey = Row::new("2").with("low", "€19").with("high", "€20");
        assert_eq!(
            compare_rows(&column, SortDirection::Asc, &cheap, &pricey, None),
            Ordering::Less
        );
    }
}
