pub mod column;
pub mod error;
pub mod facet;
pub mod filter;
pub mod row;
pub mod sort;
pub mod state;
pub mod view;

pub use column::*;
pub use error::{GridError, Result};
pub use facet::*;
pub use filter::*;
pub use row::Row;
pub use sort::*;
pub use state::*;
pub use view::*;

pub use serde_json::{Map, Value};
