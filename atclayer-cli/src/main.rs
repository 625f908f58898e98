//! ATCLayer CLI - command-line interface.
//!
//! This binary exercises the atclayer library against a data directory:
//! listing the loaded layer hierarchy, building and decoding share tokens,
//! and generating the file index.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atclayer", version, about = "Shareable ATC map layers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a data directory and list the layer hierarchy.
    Layers {
        /// Data directory holding file-index.json and the feature files.
        #[arg(long, default_value = "data")]
        data: PathBuf,
    },

    /// Build a share token from layer selections.
    Encode {
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Selection, repeatable: domain/facility/category/item[=pos,...]
        #[arg(short, long = "select", required = true)]
        selections: Vec<String>,
    },

    /// Decode a share token and list what it selects.
    Decode {
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// The token from the URL's `l` parameter.
        token: String,
    },

    /// Scan a data directory and write file-index.json.
    Index {
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Output path, defaults to <data>/file-index.json.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Layers { data } => commands::layers::run(&data).await,
        Command::Encode { data, selections } => commands::link::encode(&data, &selections).await,
        Command::Decode { data, token } => commands::link::decode(&data, &token).await,
        Command::Index { data, output } => commands::index::run(&data, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
