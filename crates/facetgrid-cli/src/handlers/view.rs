use crate::args::ViewArgs;
use crate::columns::{infer_columns, load_columns};
use crate::specs::{parse_filter, parse_sort};
use crate::types::OutputFormat;
use crate::views::{FacetBody, FacetOptionsView, TableView, use_color};
use anyhow::{Context, Result, bail};
use facetgrid_engine::GridEngine;
use facetgrid_runtime::GridConfig;
use facetgrid_types::FilterKind;
use serde_json::json;

pub fn handle(args: ViewArgs, config: &GridConfig) -> Result<()> {
    let rows = super::load_rows(&args.source.rows)?;
    let columns = match &args.source.columns {
        Some(path) => load_columns(path)?,
        None => infer_columns(&rows, &config.similarity.key_field),
    };

    let mut options = config.engine_options();
    if let Some(page_size) = args.page_size {
        options.page_size = page_size;
    }
    let mut engine = GridEngine::new(columns, rows, options)?;

    if let Some(search) = args.search {
        engine.set_global_filter(search);
    }
    for spec in &args.filters {
        let (column, value) = parse_filter(spec)?;
        engine
            .set_column_filter(&column, value)
            .with_context(|| format!("Cannot apply filter '{}'", spec))?;
    }

    let sorts = args
        .sorts
        .iter()
        .map(|spec| parse_sort(spec))
        .collect::<Result<Vec<_>>>()?;
    if !sorts.is_empty() {
        engine.set_sort(sorts)?;
    }

    if !args.order.is_empty() {
        engine.set_order(args.order.as_slice());
    }
    for column in &args.hidden {
        if !engine.set_visibility(column, false)? {
            eprintln!("Warning: column '{}' cannot be hidden", column);
        }
    }
    engine.set_page_index(args.page);

    if let Some(column) = args.facets {
        return render_facets(&engine, &column, args.source.format);
    }

    match args.source.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(engine.view())?),
        OutputFormat::Table => print!("{}", TableView::from_engine(&engine)),
    }
    Ok(())
}

fn render_facets(engine: &GridEngine, column: &str, format: OutputFormat) -> Result<()> {
    let definition = engine
        .columns()
        .get_by_id(column)
        .with_context(|| format!("Unknown column: {}", column))?;

    let body = match definition.filter_kind {
        FilterKind::MultiSelect | FilterKind::Text => {
            FacetBody::Values(engine.facet_values(column)?)
        }
        FilterKind::Range => FacetBody::Range {
            range: engine.facet_range(column)?,
            currency: &engine.options().currency,
        },
        FilterKind::None => bail!("Column '{}' has no filter to list options for", column),
    };

    match format {
        OutputFormat::Json => {
            let value = match &body {
                FacetBody::Values(options) => json!({ "column": column, "options": options }),
                FacetBody::Range { range, .. } => json!({
                    "column": column,
                    "range": range.map(|(min, max)| json!({ "min": min, "max": max })),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => print!(
            "{}",
            FacetOptionsView {
                column,
                body,
                color: use_color(),
            }
        ),
    }
    Ok(())
}
