//! CLI layer: argument parsing, dispatch and terminal output

pub mod args;
pub mod commands;
pub mod error;
pub mod geo;
pub mod output;

pub use args::{Cli, Commands};
pub use error::{CliError, CliResult};
