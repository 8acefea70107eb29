use facetgrid_types::{Accessor, Row, SimilarityFacet};
use serde_json::Value;
use std::borrow::Cow;

static NULL: Value = Value::Null;

/// Read a column value. Missing fields resolve to `Null`.
pub fn resolve<'a>(
    accessor: &Accessor,
    row: &'a Row,
    facet: Option<&SimilarityFacet>,
) -> Cow<'a, Value> {
    match accessor {
        Accessor::Field(name) => Cow::Borrowed(row.get(name).unwrap_or(&NULL)),
        Accessor::Path(path) => Cow::Borrowed(row.get_path(path).unwrap_or(&NULL)),
        Accessor::Derived(f) => Cow::Owned(f(row)),
        Accessor::CompareCount => Cow::Owned(
            facet
                .and_then(|facet| facet.count(&row.id))
                .map(Value::from)
                .unwrap_or(Value::Null),
        ),
    }
}

/// Text form of a value for text and multi-select matching.
///
/// Scalars render directly; an object renders as its `name` member
/// (`{"name": "Pandora", "logo": ...}` → `Pandora`). Null and arrays have
/// no text form.
pub fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => match obj.get("name") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
        Value::Null | Value::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_resolve_field_and_path() {
        let row = Row::new("1")
            .with("name", "Armband")
            .with("brand", json!({"name": "Thomas Sabo"}));
        assert_eq!(
            *resolve(&Accessor::field("name"), &row, None),
            json!("Armband")
        );
        assert_eq!(
            *resolve(&Accessor::path("brand.name"), &row, None),
            json!("Thomas Sabo")
        );
        assert_eq!(*resolve(&Accessor::field("sku"), &row, None), Value::Null);
    }

    #[test]
    fn test_resolve_derived() {
        let row = Row::new("1").with("low", 10).with("high", 20);
        let spread = Accessor::derived(|row| {
            match (
                row.get("low").and_then(Value::as_f64),
                row.get("high").and_then(Value::as_f64),
            ) {
                (Some(low), Some(high)) => json!(high - low),
                _ => Value::Null,
            }
        });
        assert_eq!(*resolve(&spread, &row, None), json!(10.0));
    }

    #[test]
    fn test_resolve_compare_count() {
        let row = Row::new("1");
        let facet = SimilarityFacet::new(1, BTreeMap::from([("1".to_string(), 3)]));
        assert_eq!(
            *resolve(&Accessor::CompareCount, &row, Some(&facet)),
            json!(3)
        );
        assert_eq!(*resolve(&Accessor::CompareCount, &row, None), Value::Null);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&json!("Gold")), Some("Gold".to_string()));
        assert_eq!(display_text(&json!(18)), Some("18".to_string()));
        assert_eq!(display_text(&json!(false)), Some("false".to_string()));
        assert_eq!(
            display_text(&json!({"name": "Pandora", "logo": "x"})),
            Some("Pandora".to_string())
        );
        assert_eq!(display_text(&json!({"logo": "x"})), None);
        assert_eq!(display_text(&json!(["a"])), None);
        assert_eq!(display_text(&Value::Null), None);
    }
}
