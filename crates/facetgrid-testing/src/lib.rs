//! Testing infrastructure for facetgrid integration tests.
//!
//! - `TestWorld`: isolated directory with rows, columns and config files,
//!   plus CLI execution against it
//! - `fixtures`: sample catalogs and column sets
//! - `assertions`: checks over the CLI's JSON view output

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::{CliResult, TestWorld};
