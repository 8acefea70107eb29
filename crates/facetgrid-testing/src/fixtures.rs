//! Sample catalogs and column definitions.

use facetgrid_types::{Accessor, ColumnDefinition, FilterKind, Row, SortKind};
use serde_json::json;

/// The three-row necklace/bracelet catalog: rows 1 and 2 share a SKU, row 3
/// matches nothing.
pub fn scenario_rows() -> Vec<Row> {
    vec![
        Row::new("1")
            .with("name", "Halskette Geo")
            .with("sku", "A1")
            .with("price", "€49.90"),
        Row::new("2")
            .with("name", "Halskette Geo Gold")
            .with("sku", "A1")
            .with("price", "€59.90"),
        Row::new("3")
            .with("name", "Armband")
            .with("sku", "B2")
            .with("price", "€20"),
    ]
}

/// Larger jewelry catalog with nested brand objects, mixed price formats and
/// one unparsable price.
pub fn catalog_rows() -> Vec<Row> {
    let brand = |name: &str| json!({ "name": name, "logo": format!("{}.svg", name.to_lowercase()) });
    vec![
        Row::new("1")
            .with("name", "Halskette Geo")
            .with("sku", "A1")
            .with("price", "€49.90")
            .with("brand", brand("Pandora"))
            .with("material", "Silber"),
        Row::new("2")
            .with("name", "Halskette Geo Gold")
            .with("sku", "A1")
            .with("price", "€59.90")
            .with("brand", brand("Pandora"))
            .with("material", "Gold"),
        Row::new("3")
            .with("name", "Armband")
            .with("sku", "B2")
            .with("price", "€20")
            .with("brand", brand("Thomas Sabo"))
            .with("material", "Silber"),
        Row::new("4")
            .with("name", "Ring Luna")
            .with("sku", "R-10")
            .with("price", "€1,299.00")
            .with("brand", brand("Thomas Sabo"))
            .with("material", "Gold"),
        Row::new("5")
            .with("name", "Ring Luna Sol")
            .with("sku", "R-11")
            .with("price", "auf Anfrage")
            .with("brand", brand("Swarovski"))
            .with("material", "Silber"),
        Row::new("6")
            .with("name", "Ohrringe Stern")
            .with("sku", "")
            .with("price", 35)
            .with("brand", brand("Swarovski"))
            .with("material", "Rosegold"),
    ]
}

/// `n` generated rows, `Item 1` .. `Item n`, priced `€1.00` .. `€n.00`.
pub fn numbered_rows(n: usize) -> Vec<Row> {
    (1..=n)
        .map(|i| {
            Row::new(i.to_string())
                .with("name", format!("Item {i}"))
                .with("sku", format!("N-{i}"))
                .with("price", format!("€{i}.00"))
        })
        .collect()
}

/// Column set matching [`COLUMNS_TOML`].
pub fn sample_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::field("name")
            .header("Name")
            .sortable(SortKind::Text)
            .filter(FilterKind::Text)
            .hideable(false),
        ColumnDefinition::field("sku").header("SKU"),
        ColumnDefinition::field("price")
            .header("Price")
            .sortable(SortKind::Currency)
            .filter(FilterKind::Range)
            .width(120.0, 80.0, 240.0),
        ColumnDefinition::new("brand", Accessor::path("brand.name"))
            .header("Brand")
            .sortable(SortKind::Text)
            .filter(FilterKind::MultiSelect),
        ColumnDefinition::field("material")
            .header("Material")
            .filter(FilterKind::MultiSelect),
        ColumnDefinition::new("compare", Accessor::CompareCount)
            .header("Compare")
            .sortable(SortKind::Number),
    ]
}

pub const COLUMNS_TOML: &str = r#"
[[columns]]
id = "name"
header = "Name"
field = "name"
sortable = true
sort_kind = "text"
filter = "text"
hideable = false

[[columns]]
id = "sku"
header = "SKU"
field = "sku"

[[columns]]
id = "price"
header = "Price"
field = "price"
sortable = true
sort_kind = "currency"
filter = "range"
width = 120
min_width = 80
max_width = 240

[[columns]]
id = "brand"
header = "Brand"
path = "brand.name"
sortable = true
sort_kind = "text"
filter = "multi_select"

[[columns]]
id = "material"
header = "Material"
field = "material"
filter = "multi_select"

[[columns]]
id = "compare"
header = "Compare"
compare_count = true
sortable = true
sort_kind = "number"
"#;

/// Rows serialized the way the CLI reads them.
pub fn rows_json(rows: &[Row]) -> String {
    serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
}
