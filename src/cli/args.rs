//! CLI argument definitions using clap
//!
//! Commands:
//! - tabula serve --config <path> [--port <port>]
//! - tabula check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tabula - dynamic-schema tables over HTTP
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply if it does not exist)
        #[arg(long, default_value = "./tabula.json")]
        config: PathBuf,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate a configuration file, then print the effective config
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./tabula.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
