//! Host runtime for the grid engine: configuration, background similarity
//! facets and debounced search.

pub mod config;
pub mod debounce;
pub mod error;
pub mod session;
pub mod worker;

pub use config::{GridConfig, SimilarityConfig, resolve_config_path};
pub use debounce::SearchDebouncer;
pub use error::{Error, Result};
pub use session::GridSession;
pub use worker::{FacetReceiver, FacetWorker};
