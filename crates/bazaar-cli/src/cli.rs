use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(about = "Browse and manage marketplace listings from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to a JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List listings, newest first
    #[command(alias = "ls")]
    List {
        /// Number of listings to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only show listings from this seller
        #[arg(long, value_name = "USERNAME")]
        seller: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search listing names and descriptions
    Search {
        /// Search query
        query: String,
        /// Number of listings to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Publish a new listing
    Publish {
        /// Listing title
        #[arg(long)]
        name: String,
        /// Asking price, as shown to buyers
        #[arg(long)]
        price: String,
        /// Longer description
        #[arg(long, default_value = "")]
        description: String,
        /// Username of the seller
        #[arg(long, value_name = "USERNAME")]
        seller: String,
        /// Image URL or data URI (repeat for up to three)
        #[arg(long = "image", value_name = "URL")]
        images: Vec<String>,
    },
    /// Delete a listing
    Delete {
        /// Listing ID or unique ID prefix
        id: String,
    },
    /// Sync local replica with remote Turso database
    Sync,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
