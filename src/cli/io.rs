//! JSON output for CLI commands

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write a value as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write a value as pretty JSON to stdout
pub fn write_stdout<T: Serialize>(value: &T) -> CliResult<()> {
    write_json(io::stdout().lock(), value)
}
