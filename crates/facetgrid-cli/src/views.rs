use facetgrid_engine::accessor::{display_text, resolve};
use facetgrid_engine::{CurrencyFormat, GridEngine, PLACEHOLDER, parse_currency};
use facetgrid_types::{
    Accessor, ColumnDefinition, FacetOption, Row, SimilarityFacet, SortDirection, SortKind,
};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::fmt;

const MIN_CELL_CHARS: usize = 4;
const MAX_CELL_CHARS: usize = 48;
const PIXELS_PER_CHAR: f64 = 8.0;

/// Colors only when stdout is a terminal and `NO_COLOR` is unset.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Text of one cell as the table shows it.
///
/// Currency columns render through the configured format; a compare count
/// that has not been computed yet shows the placeholder.
pub fn cell_text(
    column: &ColumnDefinition,
    row: &Row,
    facet: Option<&SimilarityFacet>,
    currency: &CurrencyFormat,
) -> String {
    let value = resolve(&column.accessor, row, facet);
    if column.sort_kind == SortKind::Currency && !matches!(column.accessor, Accessor::CompareCount)
    {
        return currency.format(parse_currency(&value));
    }
    display_text(&value).unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn truncate(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(count)))
}

fn chars_for(pixels: f64) -> usize {
    ((pixels / PIXELS_PER_CHAR).round() as usize).clamp(MIN_CELL_CHARS, MAX_CELL_CHARS)
}

struct TableColumn {
    header: String,
    width: usize,
    sort: Option<SortDirection>,
}

/// One rendered page of the grid.
pub struct TableView {
    columns: Vec<TableColumn>,
    rows: Vec<(bool, Vec<String>)>,
    page_index: usize,
    page_count: usize,
    filtered_count: usize,
    total_count: usize,
    selected_count: usize,
    facet_pending: bool,
    color: bool,
}

impl TableView {
    pub fn from_engine(engine: &GridEngine) -> Self {
        let view = engine.view();
        let state = engine.state();
        let currency = &engine.options().currency;
        let facet = engine.facet();

        let definitions: Vec<&ColumnDefinition> = view
            .visible_columns
            .iter()
            .filter_map(|id| engine.columns().get_by_id(id))
            .collect();

        let columns = definitions
            .iter()
            .map(|column| TableColumn {
                header: column.header.clone(),
                width: chars_for(
                    view.column_widths
                        .get(&column.id)
                        .copied()
                        .unwrap_or(column.default_width),
                ),
                sort: state.sort.direction_of(&column.id),
            })
            .collect();

        let rows = view
            .page_rows
            .iter()
            .map(|row| {
                let cells = definitions
                    .iter()
                    .map(|column| cell_text(column, row, facet, currency))
                    .collect();
                (engine.selection().contains(&row.id), cells)
            })
            .collect();

        let needs_facet = definitions
            .iter()
            .any(|column| matches!(column.accessor, Accessor::CompareCount));

        Self {
            columns,
            rows,
            page_index: view.page_index,
            page_count: view.page_count,
            filtered_count: view.filtered_count,
            total_count: view.total_count,
            selected_count: view.selected_count,
            facet_pending: needs_facet && !view.facet_ready,
            color: use_color(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let label = match column.sort {
                    Some(SortDirection::Asc) => format!("{} ↑", column.header),
                    Some(SortDirection::Desc) => format!("{} ↓", column.header),
                    None => column.header.clone(),
                };
                pad(&truncate(&label, column.width), column.width)
            })
            .collect();
        let header = format!("  {}", header.join("  "));
        if self.color {
            writeln!(f, "{}", header.bold())?;
        } else {
            writeln!(f, "{}", header)?;
        }

        if self.rows.is_empty() {
            writeln!(f, "  (no matching rows)")?;
        }

        for (selected, cells) in &self.rows {
            let line: Vec<String> = cells
                .iter()
                .zip(&self.columns)
                .map(|(cell, column)| pad(&truncate(cell, column.width), column.width))
                .collect();
            let marker = if *selected { "* " } else { "  " };
            let line = format!("{}{}", marker, line.join("  "));
            if self.color && *selected {
                writeln!(f, "{}", line.cyan())?;
            } else {
                writeln!(f, "{}", line)?;
            }
        }

        writeln!(f)?;
        let footer = format!(
            "Page {} of {} ({} of {} rows",
            self.page_index + 1,
            self.page_count.max(1),
            self.filtered_count,
            self.total_count
        );
        let footer = if self.selected_count > 0 {
            format!("{}, {} selected)", footer, self.selected_count)
        } else {
            format!("{})", footer)
        };
        if self.color {
            writeln!(f, "{}", footer.dimmed())?;
        } else {
            writeln!(f, "{}", footer)?;
        }

        if self.facet_pending {
            writeln!(f, "Compare counts are still being computed")?;
        }
        Ok(())
    }
}

fn heading(f: &mut fmt::Formatter<'_>, text: &str, color: bool) -> fmt::Result {
    if color {
        writeln!(f, "{}", text.bold())
    } else {
        writeln!(f, "{}", text)
    }
}

pub enum FacetBody<'a> {
    /// Distinct values with their counts.
    Values(Vec<FacetOption>),
    /// Min and max of a range column.
    Range {
        range: Option<(f64, f64)>,
        currency: &'a CurrencyFormat,
    },
}

/// Facet options of one column, computed with that column's own filter left
/// out.
pub struct FacetOptionsView<'a> {
    pub column: &'a str,
    pub body: FacetBody<'a>,
    pub color: bool,
}

impl fmt::Display for FacetOptionsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            FacetBody::Values(options) => {
                heading(f, &format!("Options for {}", self.column), self.color)?;
                if options.is_empty() {
                    writeln!(f, "  (none)")?;
                }
                let width = options
                    .iter()
                    .map(|option| option.value.chars().count())
                    .max()
                    .unwrap_or(0);
                for option in options {
                    writeln!(f, "  {}  {}", pad(&option.value, width), option.count)?;
                }
            }
            FacetBody::Range { range, currency } => {
                heading(f, &format!("Range for {}", self.column), self.color)?;
                match range {
                    Some((min, max)) => writeln!(
                        f,
                        "  {} .. {}",
                        currency.format(Some(*min)),
                        currency.format(Some(*max))
                    )?,
                    None => writeln!(f, "  (no parsable values)")?,
                }
            }
        }
        Ok(())
    }
}

/// Compare counts, most-duplicated rows first.
pub struct SimilarView<'a> {
    pub counts: &'a BTreeMap<String, usize>,
    pub names: BTreeMap<&'a str, &'a str>,
    pub color: bool,
}

impl fmt::Display for SimilarView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.counts.is_empty() {
            return writeln!(f, "No rows to report");
        }

        let mut entries: Vec<(&String, &usize)> = self.counts.iter().collect();
        entries.sort_by(|(a_id, a), (b_id, b)| b.cmp(a).then_with(|| a_id.cmp(b_id)));

        let id_width = entries
            .iter()
            .map(|(id, _)| id.chars().count())
            .max()
            .unwrap_or(0)
            .max(2);
        heading(f, &format!("{}  Count  Name", pad("ID", id_width)), self.color)?;
        for (id, &count) in entries {
            let name = self.names.get(id.as_str()).copied().unwrap_or(PLACEHOLDER);
            let cell = format!("{:>5}", count);
            if self.color && count > 0 {
                writeln!(f, "{}  {}  {}", pad(id, id_width), cell.yellow(), name)?;
            } else {
                writeln!(f, "{}  {}  {}", pad(id, id_width), cell, name)?;
            }
        }
        Ok(())
    }
}

/// Rows one row is comparable to.
pub struct MatchesView<'a> {
    pub row_id: &'a str,
    pub matches: &'a [String],
}

impl fmt::Display for MatchesView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.matches.len() {
            0 => writeln!(f, "Row {} has no comparable rows", self.row_id),
            n => {
                writeln!(f, "Row {} is comparable to {} row(s):", self.row_id, n)?;
                for id in self.matches {
                    writeln!(f, "  - {}", id)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetgrid_engine::GridOptions;
    use facetgrid_testing::fixtures::{catalog_rows, sample_columns, scenario_rows};
    use facetgrid_types::SortEntry;

    #[test]
    fn test_cell_text() {
        let currency = CurrencyFormat::default();
        let columns = sample_columns();
        let row = &catalog_rows()[3];

        assert_eq!(cell_text(&columns[2], row, None, &currency), "€1,299.00");
        assert_eq!(cell_text(&columns[3], row, None, &currency), "Thomas Sabo");
        assert_eq!(cell_text(&columns[5], row, None, &currency), PLACEHOLDER);

        let unpriced = &catalog_rows()[4];
        assert_eq!(cell_text(&columns[2], unpriced, None, &currency), PLACEHOLDER);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Halskette Geo Gold", 8), "Halsket…");
        assert_eq!(truncate("Ring", 8), "Ring");
    }

    #[test]
    fn test_table_rendering() {
        let mut engine =
            GridEngine::new(sample_columns(), scenario_rows(), GridOptions::default()).unwrap();
        engine.set_sort(vec![SortEntry::asc("price")]).unwrap();
        engine.set_visibility("sku", false).unwrap();
        engine.toggle_selected("1");

        let table = TableView::from_engine(&engine).with_color(false).to_string();
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].contains("Price ↑"));
        assert!(!lines[0].contains("SKU"));
        assert!(lines[1].starts_with("  Armband"));
        assert!(lines[2].starts_with("* Halskette Geo"));
        assert!(lines[2].contains("€49.90"));
        assert!(table.contains("Page 1 of 1 (3 of 3 rows, 1 selected)"));
    }

    #[test]
    fn test_empty_table() {
        let mut engine =
            GridEngine::new(sample_columns(), scenario_rows(), GridOptions::default()).unwrap();
        engine.set_global_filter("nothing like this");

        let table = TableView::from_engine(&engine).with_color(false).to_string();
        assert!(table.contains("(no matching rows)"));
        assert!(table.contains("Page 1 of 1 (0 of 3 rows)"));
    }

    #[test]
    fn test_similar_view_orders_by_count() {
        let counts: BTreeMap<String, usize> =
            [("1".to_string(), 1), ("2".to_string(), 1), ("3".to_string(), 0)].into();
        let names = [("1", "Halskette Geo"), ("3", "Armband")].into();
        let text = SimilarView {
            counts: &counts,
            names,
            color: false,
        }
        .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  Count  Name");
        assert_eq!(lines[1], "1       1  Halskette Geo");
        assert_eq!(lines[2], format!("2       1  {}", PLACEHOLDER));
        assert_eq!(lines[3], "3       0  Armband");
    }

    #[test]
    fn test_matches_view() {
        let matches = vec!["2".to_string()];
        let text = MatchesView {
            row_id: "1",
            matches: &matches,
        }
        .to_string();
        assert_eq!(text, "Row 1 is comparable to 1 row(s):\n  - 2\n");
    }
}
