use crate::column::FilterKind;
use thiserror::Error;

/// Configuration and programming errors.
///
/// Bad *data* never produces one of these: unparsable values degrade to a
/// placeholder instead. A `GridError` means the host handed the engine an
/// invalid column set, option or column reference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    #[error("Column id must not be empty")]
    EmptyColumnId,

    #[error("Invalid width bounds for column {column}: min={min} default={default} max={max}")]
    InvalidWidthBounds {
        column: String,
        min: f64,
        default: f64,
        max: f64,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column is not sortable: {0}")]
    NotSortable(String),

    #[error("Column has no filter: {0}")]
    NotFilterable(String),

    #[error("Filter value of kind {found} does not fit {expected} column {column}")]
    FilterKindMismatch {
        column: String,
        expected: FilterKind,
        found: FilterKind,
    },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Similarity threshold must be within (0, 1], got {0}")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, GridError>;
