// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keel - account data management from the command line.
//!
//! Every command works on a JSON account snapshot (an array of accounts)
//! and prints its result to stdout.

mod commands;
mod snapshot;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keel_core::AccountStatus;
use keel_engine::ExportFormat;

/// Keel - account data management from the command line.
#[derive(Parser, Debug)]
#[command(name = "keel", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List duplicate candidates in a snapshot.
    Duplicates {
        #[arg(long)]
        accounts: PathBuf,
    },
    /// Print KPIs for a snapshot, optionally restricted by status/industry.
    Kpis {
        #[arg(long)]
        accounts: PathBuf,
        #[arg(long)]
        status: Vec<AccountStatus>,
        #[arg(long)]
        industry: Vec<String>,
    },
    /// Export accounts as CSV.
    Export {
        #[arg(long)]
        accounts: PathBuf,
        /// Comma-separated ids; all accounts when omitted.
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import a CSV file into a snapshot (or a new one).
    Import {
        #[arg(long)]
        csv: PathBuf,
        /// Existing snapshot to import into.
        #[arg(long)]
        accounts: Option<PathBuf>,
        /// Column mapping as `Column=field`; repeatable.
        #[arg(long = "map", value_parser = parse_mapping)]
        mappings: Vec<(String, String)>,
        #[arg(long)]
        skip_duplicates: bool,
        #[arg(long)]
        update_existing: bool,
        #[arg(long)]
        dry_run: bool,
        /// Owner for rows without one.
        #[arg(long)]
        owner: Option<String>,
        /// Where to write the resulting snapshot.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Merge secondary accounts into a primary account.
    Merge {
        #[arg(long)]
        accounts: PathBuf,
        #[arg(long)]
        primary: String,
        #[arg(long = "secondary", required = true)]
        secondaries: Vec<String>,
        /// Leave a note on the primary for each merged account.
        #[arg(long)]
        keep_history: bool,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn parse_mapping(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(column, field)| (column.trim().to_string(), field.trim().to_string()))
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| format!("expected `Column=field`, got `{raw}`"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => keel_config::load_and_validate_path(path),
        None => keel_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            keel_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.engine.log_level);

    if let Err(e) = commands::run(cli.command, &config).await {
        eprintln!("keel: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keel={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
