//! List command implementation.

use super::{format_item, CliResult, Context};
use feedsync_store::ItemStore;

/// Runs the list command.
pub fn run(ctx: &Context, unsynced_only: bool, format: &str) -> CliResult<()> {
    let store = ctx.open_store()?;
    let items = if unsynced_only {
        store.list_unsynced()?
    } else {
        store.list_all()?
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        _ => {
            if items.is_empty() {
                println!("(no items)");
            }
            for item in &items {
                println!("{}", format_item(item));
            }
        }
    }

    Ok(())
}
