//! Parsers for the `--filter` and `--sort` command-line specs.

use anyhow::{Context, Result, bail};
use facetgrid_engine::normalize::parse_currency_str;
use facetgrid_types::{FilterValue, SortDirection, SortEntry};

/// Parse a column filter.
///
/// - `price=45..55`, `price=..55`, `price=45..` → range
/// - `brand=Pandora|Thomas Sabo` → multi-select
/// - `name~kette` → text
pub fn parse_filter(spec: &str) -> Result<(String, FilterValue)> {
    let eq = spec.find('=');
    let tilde = spec.find('~');

    let (column, value) = match (eq, tilde) {
        (Some(e), Some(t)) if t < e => split_at(spec, t),
        (None, Some(t)) => split_at(spec, t),
        (Some(e), _) => {
            let (column, raw) = split_at(spec, e);
            return Ok((checked_column(column, spec)?, parse_equals(raw, spec)?));
        }
        (None, None) => bail!("filter '{}' needs '=' or '~' (e.g. price=45..55)", spec),
    };

    Ok((
        checked_column(column, spec)?,
        FilterValue::Text(value.to_string()),
    ))
}

fn split_at(spec: &str, index: usize) -> (&str, &str) {
    (&spec[..index], &spec[index + 1..])
}

fn checked_column(column: &str, spec: &str) -> Result<String> {
    let column = column.trim();
    if column.is_empty() {
        bail!("filter '{}' has no column", spec);
    }
    Ok(column.to_string())
}

fn parse_equals(raw: &str, spec: &str) -> Result<FilterValue> {
    if let Some((min, max)) = raw.split_once("..") {
        let min = parse_bound(min, spec)?;
        let max = parse_bound(max, spec)?;
        if min.is_none() && max.is_none() {
            bail!("range filter '{}' needs at least one bound", spec);
        }
        return Ok(FilterValue::Range { min, max });
    }

    let values: Vec<&str> = raw
        .split('|')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();
    if values.is_empty() {
        bail!("filter '{}' has no values", spec);
    }
    Ok(FilterValue::one_of(values))
}

fn parse_bound(raw: &str, spec: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_currency_str(raw)
        .map(Some)
        .with_context(|| format!("invalid bound '{}' in filter '{}'", raw, spec))
}

/// Parse `column[:asc|desc]`; the direction defaults to ascending.
pub fn parse_sort(spec: &str) -> Result<SortEntry> {
    let (column, direction) = match spec.split_once(':') {
        Some((column, direction)) => (
            column,
            direction
                .parse::<SortDirection>()
                .map_err(|err| anyhow::anyhow!("sort '{}': {}", spec, err))?,
        ),
        None => (spec, SortDirection::Asc),
    };

    let column = column.trim();
    if column.is_empty() {
        bail!("sort '{}' has no column", spec);
    }
    Ok(SortEntry {
        column: column.to_string(),
        direction,
    })
}
