mod args;
mod commands;
pub mod columns;
mod handlers;
pub mod logging;
pub mod specs;
pub mod types;
pub mod views;

pub use args::{Cli, Commands, ConfigCommand, SimilarArgs, SourceArgs, ViewArgs};
pub use commands::run;
