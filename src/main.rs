//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `server_registry` library that handles
//! command-line parsing, logger initialization, and user-facing output.
//! All registry logic lives in the library crate.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;
use std::process;

use server_registry::config::{DEFAULT_DB_URI, DEFAULT_TABLE, REGISTRY_DB_URI_ENV};
use server_registry::{DbIpResolver, RegistryDb};

#[derive(Parser)]
#[command(name = "server-registry", about = "Tracks game server registrations with geo-location enrichment", version)]
struct Cli {
    /// Backing store URI (falls back to $REGISTRY_DB_URI, then the default)
    #[arg(long)]
    db_uri: Option<String>,

    /// Registry table to operate on
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a server
    Add {
        name: String,
        address: String,
        port: u16,
        owner: String,
    },
    /// Update an existing registration
    Update {
        name: String,
        address: String,
        port: u16,
        owner: String,
    },
    /// Remove a registration
    Remove { address: String, port: u16 },
    /// List all registrations as JSON lines
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let db_uri = cli
        .db_uri
        .or_else(|| std::env::var(REGISTRY_DB_URI_ENV).ok())
        .unwrap_or_else(|| DEFAULT_DB_URI.to_string());

    let registry = match DbIpResolver::from_env() {
        Ok(resolver) => RegistryDb::with_resolver(&db_uri, Box::new(resolver)),
        Err(e) => {
            warn!("Geo-location lookups disabled: {e}");
            RegistryDb::new(&db_uri)
        }
    };

    match run(&registry, &cli.table, cli.command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("server-registry error: {e:#}");
            process::exit(1);
        }
    }
}

async fn run(registry: &RegistryDb, table: &str, command: Command) -> Result<()> {
    match command {
        Command::Add {
            name,
            address,
            port,
            owner,
        } => {
            let affected = registry
                .insert(table, &name, &address, port, &owner)
                .await
                .context("insert failed")?;
            println!("{affected} row(s) inserted");
        }
        Command::Update {
            name,
            address,
            port,
            owner,
        } => {
            let affected = registry
                .update(table, &name, &address, port, &owner)
                .await
                .context("update failed")?;
            if affected == 0 {
                println!("no matching registration for {address}:{port}");
            } else {
                println!("{affected} row(s) updated");
            }
        }
        Command::Remove { address, port } => {
            let removed = registry
                .remove(table, &address, port)
                .await
                .context("remove failed")?;
            if removed {
                println!("removed {address}:{port}");
            } else {
                println!("no matching registration for {address}:{port}");
            }
        }
        Command::List => {
            let records = registry.read_all(table).await.context("read failed")?;
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }
    Ok(())
}
