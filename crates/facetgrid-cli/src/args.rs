use crate::types::{LogLevel, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "facetgrid")]
#[command(about = "Search, filter, sort and page through product catalogs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $FACETGRID_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level; overrides $FACETGRID_LOG
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one page of the filtered, sorted catalog
    View(ViewArgs),

    /// Report duplicate / close-variant counts
    Similar(SimilarArgs),

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Rows as a JSON array of objects, each with an `id`
    #[arg(long)]
    pub rows: PathBuf,

    /// Column definitions (TOML, `[[columns]]`); inferred from the rows when omitted
    #[arg(long)]
    pub columns: Option<PathBuf>,

    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Global search over every text field
    #[arg(long)]
    pub search: Option<String>,

    /// Column filter: `col=min..max`, `col=a|b`, or `col~text` (repeatable)
    #[arg(long = "filter", value_name = "SPEC")]
    pub filters: Vec<String>,

    /// Sort key `col[:asc|desc]`; repeat for tie-breakers
    #[arg(long = "sort", value_name = "SPEC")]
    pub sorts: Vec<String>,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    #[arg(long)]
    pub page_size: Option<usize>,

    /// Hide a column (repeatable)
    #[arg(long = "hide", value_name = "COLUMN")]
    pub hidden: Vec<String>,

    /// Column display order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<String>,

    /// List the options of a multi-select column instead of rows
    #[arg(long, value_name = "COLUMN")]
    pub facets: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SimilarArgs {
    /// Rows as a JSON array of objects, each with an `id`
    #[arg(long)]
    pub rows: PathBuf,

    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    /// Only list the rows comparable to this row id
    #[arg(long)]
    pub row: Option<String>,

    /// Only report rows with at least this many matches
    #[arg(long, default_value_t = 0)]
    pub min_count: usize,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a config file with default values
    Init {
        #[arg(long)]
        force: bool,
    },
}
