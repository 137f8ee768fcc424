//! CLI command implementations
//!
//! `serve` boots in a fixed order: config, logging, storage, catalog,
//! then the HTTP listener. Any failure before the listener is bound is
//! fatal.

use std::path::Path;
use std::sync::Arc;

use crate::catalog::CatalogService;
use crate::config::ServiceConfig;
use crate::http_server::HttpServer;
use crate::observability::init_logging;
use crate::storage::open_store;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_stdout;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Load the config, applying a port override and revalidating.
fn load_config(config_path: &Path, port: Option<u16>) -> CliResult<ServiceConfig> {
    let mut config = ServiceConfig::load_or_default(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
        config.validate()?;
    }
    Ok(config)
}

/// Build the catalog over the configured storage backend
pub fn build_catalog(config: &ServiceConfig) -> CliResult<Arc<CatalogService>> {
    let store = open_store(&config.storage)?;
    Ok(Arc::new(CatalogService::new(store, config)))
}

/// Start the HTTP server and block until it exits
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = load_config(config_path, port)?;
    init_logging(&config.log)?;

    tracing::info!(
        config = %config_path.display(),
        backend = ?config.storage.backend,
        unknown_fields = ?config.schema.unknown_fields,
        "starting tabula"
    );

    let catalog = build_catalog(&config)?;
    let server = HttpServer::new(config.http.clone(), catalog);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Validate a config file and print the effective configuration
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;
    write_stdout(&config)
}
