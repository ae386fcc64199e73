//! Bazaar CLI - Command-line interface for the marketplace catalog
//!
//! Lists, searches, publishes and deletes listings against the local
//! libSQL store, optionally replicated from Turso.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use bazaar_core::NewProduct;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::StoreSettings;
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::list::run_list;
use crate::commands::publish::run_publish;
use crate::commands::search::run_search;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if let Some(hint) = error.hint() {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bazaar=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }

    let settings = StoreSettings::resolve(cli.db_path, cli.config)?;
    tracing::debug!("Using catalog database at {}", settings.db_path.display());

    match command {
        Commands::List {
            limit,
            seller,
            json,
        } => run_list(limit, seller.as_deref(), json, &settings).await?,
        Commands::Search { query, limit, json } => {
            run_search(&query, limit, json, &settings).await?;
        }
        Commands::Publish {
            name,
            price,
            description,
            seller,
            images,
        } => {
            let draft = NewProduct {
                name,
                price,
                description,
                seller_username: seller,
                images,
            };
            run_publish(draft, &settings).await?;
        }
        Commands::Delete { id } => {
            run_delete(&id, &settings).await?;
        }
        Commands::Sync => run_sync(&settings).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
