//! # bookify
//!
//! Command-line front end for the Bookify catalog.
//!
//! ## Commands
//!
//! - `init`: Write the config file
//! - `list`: List books with filter, sort and paging
//! - `show`: Show one book
//! - `create` / `update`: Add or edit a book
//! - `delete`: Delete a book after confirmation
//! - `borrow`: Borrow copies of a book
//! - `summary`: Show how many copies of each book are borrowed
//!
//! ## Example
//!
//! ```bash
//! # Point at a service
//! bookify init --api-url http://localhost:5000/api
//!
//! # Science books, by title
//! bookify list --genre science --sort title --order asc
//!
//! # Borrow two copies
//! bookify borrow 665f1c2e9b1d4a0012345678 --quantity 2 --due 2025-07-01
//!
//! # Try it without a server
//! bookify --mock list
//! ```

use anyhow::{Context, Result};
use bookify_types::{BookId, Genre, SortField, SortOrder};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod demo;
mod render;

use commands::list::ListOptions;
use commands::{borrow, create, delete, init, list, show, summary, update, BookArgs, Session};
use config::Settings;

/// Browse and manage the Bookify library catalog.
#[derive(Parser, Debug)]
#[command(name = "bookify")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// API base URL, overriding the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use canned demo responses instead of a real service
    #[arg(long, global = true)]
    mock: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the config file (use with --api-url)
    Init {
        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Default books page size
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// List books
    List {
        /// Only this genre
        #[arg(long)]
        genre: Option<Genre>,

        /// Sort field (createdAt, title, author)
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Books per page
        #[arg(long)]
        limit: Option<u32>,

        /// Page to show
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show one book
    Show {
        /// Book id
        id: BookId,
    },

    /// Add a book
    Create {
        #[command(flatten)]
        fields: BookArgs,
    },

    /// Edit a book
    Update {
        /// Book id
        id: BookId,

        #[command(flatten)]
        fields: BookArgs,
    },

    /// Delete a book
    Delete {
        /// Book id
        id: BookId,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Borrow copies of a book
    Borrow {
        /// Book id
        id: BookId,

        /// Number of copies
        #[arg(long, short, default_value = "1")]
        quantity: u32,

        /// Return date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Show the borrow summary
    Summary {
        /// Page to show
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page (10, 20, 50)
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => default_config_dir()?,
    };

    if let Commands::Init {
        timeout_secs,
        page_size,
    } = cli.command
    {
        return init::run(&config_dir, cli.api_url.as_deref(), timeout_secs, page_size).await;
    }

    let settings = Settings::load(&config_dir)
        .await
        .context("Failed to load configuration")?;
    let session = Session::new(settings, cli.api_url.as_deref(), cli.mock)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::List {
            genre,
            sort,
            order,
            limit,
            page,
        } => {
            let options = ListOptions {
                genre,
                sort,
                order,
                limit,
                page,
            };
            list::run(&session, options).await
        }
        Commands::Show { id } => show::run(&session, &id).await,
        Commands::Create { fields } => create::run(&session, &fields).await,
        Commands::Update { id, fields } => update::run(&session, &id, &fields).await,
        Commands::Delete { id, yes } => delete::run(&session, &id, yes).await,
        Commands::Borrow { id, quantity, due } => borrow::run(&session, &id, quantity, due).await,
        Commands::Summary { page, limit } => summary::run(&session, page, limit).await,
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Get the default config directory for bookify.
fn default_config_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("app", "bookify", "bookify")
        .context("Could not determine home directory")?;
    Ok(dirs.config_dir().to_path_buf())
}
