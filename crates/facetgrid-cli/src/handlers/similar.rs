use crate::args::SimilarArgs;
use crate::types::OutputFormat;
use crate::views::{MatchesView, SimilarView, use_color};
use anyhow::{Result, bail};
use facetgrid_engine::SimilarityMatcher;
use facetgrid_runtime::GridConfig;
use serde_json::json;
use std::collections::BTreeMap;

pub fn handle(args: SimilarArgs, config: &GridConfig) -> Result<()> {
    let rows = super::load_rows(&args.rows)?;
    let matcher = SimilarityMatcher::from(&config.similarity);

    if let Some(row_id) = args.row {
        if !rows.iter().any(|row| row.id == row_id) {
            bail!("Row not found: {}", row_id);
        }
        let matches = matcher.matches_for(&rows, &row_id);
        match args.format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "row": row_id, "matches": matches }))?
            ),
            OutputFormat::Table => print!(
                "{}",
                MatchesView {
                    row_id: &row_id,
                    matches: &matches,
                }
            ),
        }
        return Ok(());
    }

    let counts: BTreeMap<String, usize> = matcher
        .compute(&rows)
        .into_iter()
        .filter(|(_, count)| *count >= args.min_count)
        .collect();

    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "counts": counts }))?
        ),
        OutputFormat::Table => {
            let names = rows
                .iter()
                .filter_map(|row| {
                    row.get_str(&config.similarity.text_field)
                        .map(|name| (row.id.as_str(), name))
                })
                .collect();
            print!(
                "{}",
                SimilarView {
                    counts: &counts,
                    names,
                    color: use_color(),
                }
            );
        }
    }
    Ok(())
}
