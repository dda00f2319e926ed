//! Offline import tool: reads a delimited file of order records and replaces
//! the backing store's contents in one bulk operation.
//!
//! This is deliberately separate from the interactive binary; the chat core
//! never mutates the dataset.

use std::io;

use anyhow::{Context as _, Result, bail};
use ordsmed::SqliteStore;
use tracing::info;

const DEFAULT_DB: &str = "orders.db";

fn main() -> Result<()> {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&config.csv)
        .with_context(|| format!("failed to open {}", config.csv))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers from {}", config.csv))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        bail!("{} has no header row", config.csv);
    }

    // Short rows are padded so every record carries one value per column;
    // extra trailing values are dropped.
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("failed to read a row from {}", config.csv))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    info!(file = %config.csv, rows = rows.len(), "read order records");

    let store = SqliteStore::open(&config.db);
    let before = store.count().unwrap_or(0);
    let inserted = store.replace_all(&headers, &rows)?;
    info!(db = %config.db, before, inserted, "replaced store contents");

    Ok(())
}

struct ImportConfig {
    db: String,
    csv: String,
}

fn parse_args() -> Result<ImportConfig, String> {
    let mut db = DEFAULT_DB.to_string();
    let mut csv: Option<String> = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            "--db" => {
                let value = args.next().ok_or_else(|| "error: --db expects a value".to_string())?;
                db = value;
            }
            _ if arg.starts_with("--db=") => {
                db = arg.trim_start_matches("--db=").to_string();
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if csv.is_some() {
                    return Err("error: more than one input file given".to_string());
                }
                csv = Some(arg);
            }
        }
    }

    let csv = csv.ok_or_else(|| format!("error: no input file given\n\n{}", help_text()))?;
    Ok(ImportConfig { db, csv })
}

fn help_text() -> String {
    format!(
        "ordsmed-import

Replace the order store contents from a CSV extract.

Usage:
  ordsmed-import [--db <path>] <file.csv>

Options:
  --db <path>    SQLite database to (re)create. Default: {DEFAULT_DB}
  -h, --help     Show this help message.
"
    )
}
