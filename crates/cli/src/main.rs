//! Emporium CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the document table in PostgreSQL
//! emp-cli migrate
//!
//! # Load products from a JSON array into the configured backend
//! emp-cli seed data/products.seed.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Create products from a JSON file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "emp-cli")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create products from a JSON array of product objects
    Seed {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file } => {
            let summary = commands::seed::products_from_env(&file).await?;
            tracing::info!(
                created = summary.created,
                skipped = summary.skipped,
                "Seeding complete"
            );
        }
    }
    Ok(())
}
