//! feedsync CLI
//!
//! Command-line client for an offline-first feed store.
//!
//! # Commands
//!
//! - `inspect` - Display store statistics
//! - `list` - Print the feed
//! - `post`, `edit`, `remove`, `like`, `unlike`, `share`, `view` - Mutate one item
//! - `sync` - Refresh from the server and push unsynced items
//! - `watch` - Poll for newer items
//! - `draft` - Manage the saved draft

mod commands;

use clap::{Parser, Subcommand};
use commands::draft::DraftAction;
use commands::item::ItemAction;
use commands::Context;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// feedsync command-line feed tools.
#[derive(Parser)]
#[command(name = "feedsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long, env = "FEEDSYNC_PATH")]
    path: Option<PathBuf>,

    /// Base URL of the feed server
    #[arg(global = true, short, long, env = "FEEDSYNC_SERVER")]
    server: Option<String>,

    /// Bearer token for the feed server
    #[arg(global = true, long, env = "FEEDSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display store statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the feed in presentation order
    List {
        /// Only show items not yet on the server
        #[arg(short, long)]
        unsynced: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Create a post
    Post {
        /// Post body
        content: String,

        /// Author name (defaults to "Me")
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Replace a post's content
    Edit {
        /// Server id
        key: String,
        /// New body
        content: String,
    },

    /// Remove an item (`<id>` or `local:<id>`)
    Remove {
        /// Item key
        key: String,
    },

    /// Like a post
    Like {
        /// Server id
        key: String,
    },

    /// Withdraw a like
    Unlike {
        /// Server id
        key: String,
    },

    /// Count a share
    Share {
        /// Item key
        key: String,
    },

    /// Count a view
    View {
        /// Item key
        key: String,
    },

    /// Refresh from the server, then push unsynced items
    Sync,

    /// Poll the server for newer items
    Watch {
        /// Seconds between polls
        #[arg(short, long, default_value = "10")]
        interval: u64,

        /// Merge discovered items as they arrive
        #[arg(short, long)]
        merge: bool,

        /// Also retry unsynced items on every poll
        #[arg(short, long)]
        retry: bool,
    },

    /// Manage the saved draft
    Draft {
        #[command(subcommand)]
        action: Option<DraftCommand>,
    },
}

#[derive(Subcommand)]
enum DraftCommand {
    /// Print the draft
    Show,
    /// Replace the draft
    Set {
        /// Draft text
        text: String,
    },
    /// Discard the draft
    Clear,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = cli
        .path
        .ok_or("Store path required (--path or FEEDSYNC_PATH)")?;
    let ctx = Context::new(path, cli.server, cli.token);

    match cli.command {
        Commands::Inspect { format } => commands::inspect::run(&ctx, &format)?,
        Commands::List { unsynced, format } => commands::list::run(&ctx, unsynced, &format)?,
        Commands::Post { content, author } => {
            commands::item::run(&ctx, ItemAction::Post { content, author })?
        }
        Commands::Edit { key, content } => {
            commands::item::run(&ctx, ItemAction::Edit { key, content })?
        }
        Commands::Remove { key } => commands::item::run(&ctx, ItemAction::Remove { key })?,
        Commands::Like { key } => commands::item::run(&ctx, ItemAction::Like { key })?,
        Commands::Unlike { key } => commands::item::run(&ctx, ItemAction::Unlike { key })?,
        Commands::Share { key } => commands::item::run(&ctx, ItemAction::Share { key })?,
        Commands::View { key } => commands::item::run(&ctx, ItemAction::View { key })?,
        Commands::Sync => commands::sync::run(&ctx)?,
        Commands::Watch {
            interval,
            merge,
            retry,
        } => commands::watch::run(&ctx, Duration::from_secs(interval.max(1)), merge, retry)?,
        Commands::Draft { action } => {
            let action = match action {
                None | Some(DraftCommand::Show) => DraftAction::Show,
                Some(DraftCommand::Set { text }) => DraftAction::Set(text),
                Some(DraftCommand::Clear) => DraftAction::Clear,
            };
            commands::draft::run(&ctx, action)?
        }
    }

    Ok(())
}
