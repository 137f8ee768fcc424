//! CLI module for tabula
//!
//! Provides command-line interface for:
//! - serve: Boot storage and the catalog, then serve HTTP
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_catalog, check_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
