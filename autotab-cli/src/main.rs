use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use autotab_service::{
    records_from_json, AutoTab, FileBlobStore, FileSessionStore, ServiceConfig, ServiceError,
    SessionId,
};

#[derive(Parser)]
#[command(name = "autotab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Profile tabular data and train models without configuration", long_about = None)]
struct Cli {
    /// Directory holding session records and blobs
    #[arg(long, default_value = ".autotab")]
    store: PathBuf,

    /// JSON file overriding thresholds and training settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a CSV file and open a session
    Ingest {
        /// CSV file with a header row
        csv: PathBuf,
    },

    /// Profile a session's dataset
    Profile { session_id: String },

    /// Train a model on a session's dataset
    Train { session_id: String },

    /// Predict with a session's trained model
    Predict {
        session_id: String,

        /// JSON array of records, one object per row
        records: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    let service = AutoTab::new(
        config,
        FileSessionStore::open(&cli.store)?,
        FileBlobStore::open(&cli.store)?,
    );

    let output = match cli.command {
        Commands::Ingest { csv } => {
            let bytes = std::fs::read(&csv)?;
            serde_json::to_value(service.ingest(bytes)?)?
        }
        Commands::Profile { session_id } => {
            serde_json::to_value(service.get_profile(&parse_session(&session_id)?)?)?
        }
        Commands::Train { session_id } => {
            serde_json::to_value(service.train(&parse_session(&session_id)?)?)?
        }
        Commands::Predict {
            session_id,
            records,
        } => {
            let records = records_from_json(&std::fs::read(&records)?)?;
            let predictions = service.predict(&parse_session(&session_id)?, &records)?;
            json!({ "predictions": predictions })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// A malformed id names no session.
fn parse_session(raw: &str) -> Result<SessionId, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::not_found("session", raw))
}
