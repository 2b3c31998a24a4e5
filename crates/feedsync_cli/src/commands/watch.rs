//! Watch command implementation.

use super::{CliResult, Context};
use feedsync_engine::{PollConfig, Poller};
use std::sync::Arc;
use std::time::Duration;

/// Runs the watch command until interrupted.
pub fn run(ctx: &Context, interval: Duration, merge: bool, retry: bool) -> CliResult<()> {
    ctx.require_server()?;
    // The blocking HTTP client must be built and dropped outside the runtime.
    let engine = Arc::new(ctx.open_engine()?);
    let config = PollConfig::new(interval).with_retry_unsynced(retry);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let handle = Poller::spawn(Arc::clone(&engine), config);
        let mut count_rx = handle.subscribe_count();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        println!("Watching for new items every {}s (Ctrl-C to stop)", interval.as_secs());
        let outcome = loop {
            tokio::select! {
                _ = &mut ctrl_c => break Ok(()),
                changed = count_rx.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    let count = *count_rx.borrow_and_update();
                    if count == 0 {
                        continue;
                    }
                    if !merge {
                        println!("{} new items available", count);
                        continue;
                    }
                    match handle.merge_pending_async().await {
                        Ok(merged) => println!("Merged {} new items", merged),
                        Err(err) => break Err(err),
                    }
                }
            }
        };

        handle.shutdown().await;
        outcome
    })?;

    drop(runtime);
    drop(engine);
    Ok(())
}
