use std::fmt;

/// Result type for facetgrid-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Column set, filter or sort request rejected by the engine
    Grid(facetgrid_types::GridError),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// A background task (facet worker, debouncer) has stopped
    WorkerClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Grid(err) => write!(f, "Grid error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::WorkerClosed => write!(f, "Background worker has stopped"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Grid(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::WorkerClosed => None,
        }
    }
}

impl From<facetgrid_types::GridError> for Error {
    fn from(err: facetgrid_types::GridError) -> Self {
        Error::Grid(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
