//! Command-line interface for materialize-sync
//!
//! # Usage Examples
//!
//! ```bash
//! # Write records from a JSON-lines file
//! materialize-sync write \
//!   --url postgres://materialize@localhost:6875/materialize \
//!   --table users --key id \
//!   --input changes.jsonl --batch-size 500
//!
//! # Print the connector specification as JSON
//! materialize-sync spec
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=materialize_sink=debug`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use materialize_sink::{specification, Destination, Sink};
use materialize_sync::{read_records, write_batches, MaterializeOpts};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "materialize-sync")]
#[command(about = "Apply change records to Materialize tables")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write JSON-lines change records to Materialize
    Write {
        /// Destination options
        #[command(flatten)]
        opts: MaterializeOpts,

        /// Input file (default: stdin)
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
    },

    /// Print the connector specification
    Spec,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Write { opts, input } => run_write(opts, input).await,
        Commands::Spec => {
            let spec = serde_json::to_string_pretty(&specification())
                .context("Failed to serialize specification")?;
            println!("{spec}");
            Ok(())
        }
    }
}

async fn run_write(opts: MaterializeOpts, input: Option<PathBuf>) -> anyhow::Result<()> {
    let records = match &input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file {path:?}"))?;
            read_records(BufReader::new(file))?
        }
        None => read_records(io::stdin().lock())?,
    };
    tracing::info!("Read {} record(s)", records.len());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight statement");
            on_signal.cancel();
        }
    });

    let mut destination = Destination::new();
    destination.configure(&opts.to_settings()).await?;
    destination.open(&cancel).await?;

    let result = write_batches(&mut destination, &cancel, &records, opts.batch_size).await;

    // Close the connection whether or not the write succeeded
    destination.teardown().await?;

    let written = result?;
    tracing::info!("Wrote {} record(s) to Materialize", written);

    Ok(())
}
