//! Column definitions read from TOML, or inferred from the rows themselves.

use anyhow::{Context, Result, bail};
use facetgrid_types::{
    Accessor, ColumnDefinition, DEFAULT_COLUMN_WIDTH, DEFAULT_MAX_WIDTH, DEFAULT_MIN_WIDTH,
    FilterKind, Row, SortKind,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

pub const COMPARE_COLUMN: &str = "compare";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnsFile {
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// One `[[columns]]` table.
///
/// At most one of `field`, `path` and `compare_count` may be given; with none
/// the column reads the top-level field named like its id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub id: String,
    pub header: Option<String>,
    pub field: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub compare_count: bool,
    /// Field the sort value is read from when it differs from the display
    /// value.
    pub sort_field: Option<String>,
    pub sort_kind: Option<SortKind>,
    pub sortable: Option<bool>,
    pub hideable: Option<bool>,
    #[serde(default)]
    pub filter: FilterKind,
    pub width: Option<f64>,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
}

impl ColumnSpec {
    pub fn into_definition(self) -> Result<ColumnDefinition> {
        let accessor = match (&self.field, &self.path, self.compare_count) {
            (None, None, false) => Accessor::field(self.id.clone()),
            (Some(field), None, false) => Accessor::field(field.clone()),
            (None, Some(path), false) => Accessor::path(path),
            (None, None, true) => Accessor::CompareCount,
            _ => bail!(
                "column '{}': set only one of field, path, compare_count",
                self.id
            ),
        };

        let mut column = ColumnDefinition::new(self.id.clone(), accessor)
            .hideable(self.hideable.unwrap_or(true))
            .filter(self.filter)
            .width(
                self.width.unwrap_or(DEFAULT_COLUMN_WIDTH),
                self.min_width.unwrap_or(DEFAULT_MIN_WIDTH),
                self.max_width.unwrap_or(DEFAULT_MAX_WIDTH),
            );
        if let Some(header) = self.header {
            column = column.header(header);
        }

        // A sort kind on its own makes the column sortable.
        let sortable = self.sortable.unwrap_or(self.sort_kind.is_some());
        if sortable {
            column = column.sortable(self.sort_kind.unwrap_or_default());
        }
        if let Some(sort_field) = self.sort_field {
            column = column.sort_by(Accessor::path(&sort_field));
        }

        column.validate()?;
        Ok(column)
    }
}

pub fn parse_columns(content: &str) -> Result<Vec<ColumnDefinition>> {
    let file: ColumnsFile = toml::from_str(content)?;
    if file.columns.is_empty() {
        bail!("no [[columns]] defined");
    }
    file.columns
        .into_iter()
        .map(ColumnSpec::into_definition)
        .collect()
}

pub fn load_columns(path: &Path) -> Result<Vec<ColumnDefinition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read columns file: {}", path.display()))?;
    parse_columns(&content)
        .with_context(|| format!("Invalid columns file: {}", path.display()))
}

/// One column per top-level field, in first-seen order, plus a trailing
/// compare column.
///
/// Amount-like fields sort as currency and get a range filter; everything
/// else sorts and filters as text. The similarity key field is an identifier
/// and always stays text, even when its values are all digits.
pub fn infer_columns(rows: &[Row], key_field: &str) -> Vec<ColumnDefinition> {
    let mut keys: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.fields.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let mut columns: Vec<ColumnDefinition> = keys
        .into_iter()
        .filter(|key| *key != COMPARE_COLUMN)
        .map(|key| {
            if key == key_field {
                text_column(key)
            } else {
                infer_column(key, rows)
            }
        })
        .collect();

    columns.push(
        ColumnDefinition::new(COMPARE_COLUMN, Accessor::CompareCount)
            .header("Compare")
            .sortable(SortKind::Number),
    );
    columns
}

fn infer_column(key: &str, rows: &[Row]) -> ColumnDefinition {
    let values: Vec<&Value> = rows
        .iter()
        .filter_map(|row| row.get(key))
        .filter(|value| !value.is_null())
        .collect();

    let all_numbers = !values.is_empty() && values.iter().all(|value| value.is_number());
    let all_amounts = !values.is_empty() && values.iter().all(|value| looks_like_amount(value));

    let column = ColumnDefinition::field(key);
    if all_numbers {
        column.sortable(SortKind::Number).filter(FilterKind::Range)
    } else if all_amounts {
        column.sortable(SortKind::Currency).filter(FilterKind::Range)
    } else {
        text_column(key)
    }
}

fn text_column(key: &str) -> ColumnDefinition {
    ColumnDefinition::field(key)
        .sortable(SortKind::Text)
        .filter(FilterKind::Text)
}

fn looks_like_amount(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            s.chars().any(|c| c.is_ascii_digit())
                && s.chars().all(|c| {
                    c.is_ascii_digit()
                        || c.is_whitespace()
                        || matches!(c, '.' | ',' | '-' | '€' | '$' | '£' | '¥')
                })
        }
        _ => false,
    }
}
