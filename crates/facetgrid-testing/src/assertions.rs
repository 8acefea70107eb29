//! Assertions over the CLI's JSON view output.

use anyhow::{Context, Result};
use serde_json::Value;

fn page_ids(json: &Value) -> Result<Vec<String>> {
    let rows = json["page_rows"]
        .as_array()
        .context("Expected 'page_rows' array in JSON")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row["id"]
                .as_str()
                .map(String::from)
                .with_context(|| format!("Row {} missing id", i))
        })
        .collect()
}

/// Assert the ids of the rendered page, in order.
pub fn assert_page_ids(json: &Value, expected: &[&str]) -> Result<()> {
    let ids = page_ids(json)?;
    if ids != expected {
        anyhow::bail!("Expected page {:?}, got {:?}", expected, ids);
    }
    Ok(())
}

/// Assert total and filtered counts.
pub fn assert_counts(json: &Value, total: usize, filtered: usize) -> Result<()> {
    let actual_total = json["total_count"]
        .as_u64()
        .context("Expected 'total_count' in JSON")?;
    let actual_filtered = json["filtered_count"]
        .as_u64()
        .context("Expected 'filtered_count' in JSON")?;

    if (actual_total, actual_filtered) != (total as u64, filtered as u64) {
        anyhow::bail!(
            "Expected {} total / {} filtered, got {} / {}",
            total,
            filtered,
            actual_total,
            actual_filtered
        );
    }
    Ok(())
}

/// Assert the compare count the `similar` command reports for a row.
pub fn assert_compare_count(json: &Value, row_id: &str, expected: u64) -> Result<()> {
    let count = json["counts"][row_id]
        .as_u64()
        .with_context(|| format!("No compare count for row {}", row_id))?;

    if count != expected {
        anyhow::bail!("Row {} compares to {} rows, expected {}", row_id, count, expected);
    }
    Ok(())
}

/// Assert that hidden columns are absent from the visible list while staying
/// in the column order.
pub fn assert_column_hidden(json: &Value, column: &str) -> Result<()> {
    let visible = json["visible_columns"]
        .as_array()
        .context("Expected 'visible_columns' array in JSON")?;
    if visible.iter().any(|c| c.as_str() == Some(column)) {
        anyhow::bail!("Column {} is still visible", column);
    }

    let order = json["column_order"]
        .as_array()
        .context("Expected 'column_order' array in JSON")?;
    if !order.iter().any(|c| c.as_str() == Some(column)) {
        anyhow::bail!("Column {} dropped out of the column order", column);
    }
    Ok(())
}
