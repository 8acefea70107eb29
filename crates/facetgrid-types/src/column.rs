use crate::error::{GridError, Result};
use crate::row::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_COLUMN_WIDTH: f64 = 150.0;
pub const DEFAULT_MIN_WIDTH: f64 = 20.0;
pub const DEFAULT_MAX_WIDTH: f64 = f64::MAX;

type DerivedFn = Arc<dyn Fn(&Row) -> Value + Send + Sync>;

/// How a column reads its value out of a row.
///
/// Resolved once per column when the column set is built; the engine never
/// guesses per row whether an accessor is a name or a function.
#[derive(Clone)]
pub enum Accessor {
    /// Top-level field by name.
    Field(String),
    /// Path into nested objects (`brand.name`).
    Path(Vec<String>),
    /// Pure function of the row. Returns `Value::Null` when it has nothing
    /// to report.
    Derived(DerivedFn),
    /// Number of other rows this row is comparable to (similarity facet).
    CompareCount,
}

impl Accessor {
    pub fn field(name: impl Into<String>) -> Self {
        Accessor::Field(name.into())
    }

    /// Parse a dotted path; a path without dots becomes a plain field.
    pub fn path(dotted: &str) -> Self {
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.len() == 1 {
            Accessor::Field(dotted.to_string())
        } else {
            Accessor::Path(segments)
        }
    }

    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        Accessor::Derived(Arc::new(f))
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Accessor::Derived(_) => f.write_str("Derived(<fn>)"),
            Accessor::CompareCount => f.write_str("CompareCount"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    None,
    Text,
    Range,
    MultiSelect,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::None => write!(f, "none"),
            FilterKind::Text => write!(f, "text"),
            FilterKind::Range => write!(f, "range"),
            FilterKind::MultiSelect => write!(f, "multi_select"),
        }
    }
}

/// How a sort value is derived from the raw column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    #[default]
    Text,
    Number,
    Currency,
    Boolean,
}

impl FromStr for SortKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(SortKind::Text),
            "number" => Ok(SortKind::Number),
            "currency" => Ok(SortKind::Currency),
            "boolean" | "bool" => Ok(SortKind::Boolean),
            _ => Err(format!("unknown sort kind: {}", s)),
        }
    }
}

/// One projectable column.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub id: String,
    pub header: String,
    pub accessor: Accessor,
    /// Sort value source when it differs from the display value
    /// (e.g. a low/high price pair sorted by its minimum).
    pub sort_accessor: Option<Accessor>,
    pub sort_kind: SortKind,
    pub sortable: bool,
    pub hideable: bool,
    pub filter_kind: FilterKind,
    pub default_width: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl ColumnDefinition {
    pub fn new(id: impl Into<String>, accessor: Accessor) -> Self {
        let id = id.into();
        Self {
            header: id.clone(),
            id,
            accessor,
            sort_accessor: None,
            sort_kind: SortKind::Text,
            sortable: false,
            hideable: true,
            filter_kind: FilterKind::None,
            default_width: DEFAULT_COLUMN_WIDTH,
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    /// Column reading a top-level field with the same name as its id.
    pub fn field(id: impl Into<String>) -> Self {
        let id = id.into();
        let accessor = Accessor::Field(id.clone());
        Self::new(id, accessor)
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn sortable(mut self, sort_kind: SortKind) -> Self {
        self.sortable = true;
        self.sort_kind = sort_kind;
        self
    }

    pub fn sort_by(mut self, accessor: Accessor) -> Self {
        self.sort_accessor = Some(accessor);
        self
    }

    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.filter_kind = kind;
        self
    }

    pub fn width(mut self, default: f64, min: f64, max: f64) -> Self {
        self.default_width = default;
        self.min_width = min;
        self.max_width = max;
        self
    }

    /// The accessor used for sorting.
    pub fn sort_source(&self) -> &Accessor {
        self.sort_accessor.as_ref().unwrap_or(&self.accessor)
    }

    pub fn clamp_width(&self, width: f64) -> f64 {
        if !width.is_finite() {
            return self.default_width;
        }
        width.clamp(self.min_width, self.max_width)
    }

    /// Structural checks that do not depend on sibling columns.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(GridError::EmptyColumnId);
        }

        let bounds_ok = self.min_width.is_finite()
            && !self.max_width.is_nan()
            && self.min_width >= 0.0
            && self.min_width <= self.max_width
            && self.default_width.is_finite()
            && self.default_width >= self.min_width
            && self.default_width <= self.max_width;
        if !bounds_ok {
            return Err(GridError::InvalidWidthBounds {
                column: self.id.clone(),
                min: self.min_width,
                default: self.default_width,
                max: self.max_width,
            });
        }

        Ok(())
    }
}
