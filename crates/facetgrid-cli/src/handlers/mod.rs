pub mod config;
pub mod similar;
pub mod view;

use anyhow::{Context, Result};
use facetgrid_types::Row;
use std::collections::HashSet;
use std::path::Path;

/// Read a JSON array of rows. Duplicate ids are kept but reported, since
/// selection and compare counts address rows by id.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows file: {}", path.display()))?;
    let rows: Vec<Row> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid rows file: {}", path.display()))?;

    let mut seen = HashSet::with_capacity(rows.len());
    for row in &rows {
        if !seen.insert(row.id.as_str()) {
            tracing::warn!(id = %row.id, "duplicate row id");
        }
    }
    tracing::debug!(rows = rows.len(), path = %path.display(), "loaded rows");

    Ok(rows)
}
