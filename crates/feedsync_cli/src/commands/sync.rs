//! Sync command implementation.

use super::{CliResult, Context};

/// Runs the sync command.
pub fn run(ctx: &Context) -> CliResult<()> {
    ctx.require_server()?;
    let engine = ctx.open_engine()?;

    let refreshed = engine.refresh()?;
    println!("Refreshed {} items from the server", refreshed);

    let report = engine.retry_unsynced()?;
    if report.attempted == 0 {
        println!("No unsynced items");
    } else {
        println!(
            "Pushed {} of {} unsynced items",
            report.synced.len(),
            report.attempted
        );
    }
    for failure in &report.failures {
        println!("  {} still unsynced: {}", failure.key, failure.message);
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(format!("{} items could not be pushed", report.failures.len()).into())
    }
}
