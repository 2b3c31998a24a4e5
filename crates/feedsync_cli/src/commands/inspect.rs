//! Inspect command implementation.

use super::{CliResult, Context};
use feedsync_store::{ItemStore, SNAPSHOT_VERSION};
use serde::Serialize;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Snapshot format version.
    pub format_version: u16,
    /// Number of rows.
    pub rows: usize,
    /// Rows acknowledged by the server.
    pub synced: usize,
    /// Rows waiting for the retry sweep.
    pub unsynced: usize,
    /// Highest server id.
    pub max_synced_id: i64,
    /// Rows the caller liked.
    pub liked: usize,
    /// Whether a draft is saved.
    pub has_draft: bool,
}

/// Runs the inspect command.
pub fn run(ctx: &Context, format: &str) -> CliResult<()> {
    let store = ctx.open_store()?;
    let items = store.list_all()?;
    let unsynced = store.list_unsynced()?.len();

    let result = InspectResult {
        path: store.path().display().to_string(),
        format_version: SNAPSHOT_VERSION,
        rows: items.len(),
        synced: items.len() - unsynced,
        unsynced,
        max_synced_id: store.max_synced_id()?,
        liked: items.iter().filter(|item| item.liked_by_caller).count(),
        has_draft: store.load_draft()?.is_some(),
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("feedsync store: {}", result.path);
    println!("  format version: {}", result.format_version);
    println!();
    println!("Rows:");
    println!("  total:    {}", result.rows);
    println!("  synced:   {}", result.synced);
    println!("  unsynced: {}", result.unsynced);
    println!("  liked:    {}", result.liked);
    println!();
    println!("Max synced id: {}", result.max_synced_id);
    println!("Draft saved:   {}", if result.has_draft { "yes" } else { "no" });
}
