//! Output helpers shared across `tops` subcommands.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use tabwriter::TabWriter;

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable aligned table (default for interactive use)
    #[default]
    Table,
    /// Pretty-printed JSON (pipe-friendly, structured)
    Json,
}

/// Write data as JSON to the given writer.
pub fn write_json<W: Write, T: Serialize>(data: &T, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, data).map_err(io::Error::other)?;
    writeln!(writer)?;
    Ok(())
}

/// Write tab-separated rows as an aligned table with a header line.
pub fn write_table<W: Write>(header: &[&str], rows: &[Vec<String>], writer: W) -> io::Result<()> {
    let mut tw = TabWriter::new(writer);
    writeln!(tw, "{}", header.join("\t"))?;
    for row in rows {
        writeln!(tw, "{}", row.join("\t"))?;
    }
    tw.flush()
}

/// Emit `data` either as JSON or as the table produced by `table`.
pub fn emit<T, F>(format: OutputFormat, data: &T, table: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Json => write_json(data, &mut handle)?,
        OutputFormat::Table => table(&mut handle)?,
    }
    Ok(())
}

/// Fixed-precision rendering used in every table.
pub fn fmt_num(value: f64) -> String {
    format!("{value:.4}")
}

/// `None` renders as a dash.
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map(fmt_num).unwrap_or_else(|| "-".to_string())
}
