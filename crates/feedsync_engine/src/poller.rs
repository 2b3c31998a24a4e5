//! Background discovery of newer items.
//!
//! The poller asks the server for items above the newest id it knows of and
//! buffers them. Nothing reaches the store until the caller merges the
//! buffer, so the visible feed never shifts under the user.

use crate::config::PollConfig;
use crate::engine::{NewerBatch, SyncEngine};
use crate::error::{SyncError, SyncResult};
use feedsync_remote::RemoteClient;
use feedsync_store::ItemStore;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Counters for the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Completed discovery rounds.
    pub rounds: u64,
    /// Items added to the pending buffer.
    pub discovered: u64,
    /// Failed rounds.
    pub failures: u64,
    /// Network failures since the last successful round.
    pub consecutive_failures: u32,
}

struct Shared {
    pending: Mutex<NewerBatch>,
    count_tx: watch::Sender<usize>,
    stats: RwLock<PollStats>,
}

impl Shared {
    fn publish(&self, count: usize) {
        self.count_tx.send_replace(count);
    }
}

/// Spawns poll loops.
pub struct Poller;

impl Poller {
    /// Starts polling on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<S, R>(engine: Arc<SyncEngine<S, R>>, config: PollConfig) -> PollerHandle<S, R>
    where
        S: ItemStore + 'static,
        R: RemoteClient + 'static,
    {
        let (count_tx, count_rx) = watch::channel(0);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            pending: Mutex::new(NewerBatch::default()),
            count_tx,
            stats: RwLock::new(PollStats::default()),
        });

        let task = tokio::spawn(run(
            Arc::clone(&engine),
            config,
            Arc::clone(&shared),
            cancel_rx,
        ));

        PollerHandle {
            engine,
            shared,
            count_rx,
            cancel_tx,
            task: Some(task),
        }
    }
}

/// Controls a running poll loop.
///
/// Dropping the handle cancels the loop without waiting for it.
pub struct PollerHandle<S: ItemStore, R: RemoteClient> {
    engine: Arc<SyncEngine<S, R>>,
    shared: Arc<Shared>,
    count_rx: watch::Receiver<usize>,
    cancel_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl<S: ItemStore, R: RemoteClient> PollerHandle<S, R> {
    /// Returns the number of buffered items.
    pub fn pending_count(&self) -> usize {
        *self.count_rx.borrow()
    }

    /// Subscribes to changes of the pending count.
    pub fn subscribe_count(&self) -> watch::Receiver<usize> {
        self.count_rx.clone()
    }

    /// Returns a copy of the buffer without clearing it.
    pub fn peek_pending(&self) -> NewerBatch {
        self.shared.pending.lock().clone()
    }

    /// Removes and returns the buffered batch.
    pub fn take_pending(&self) -> NewerBatch {
        let batch = std::mem::take(&mut *self.shared.pending.lock());
        self.shared.publish(0);
        batch
    }

    /// Merges the buffered batch into the store.
    ///
    /// Blocks on store writes. On failure the buffer is kept.
    pub fn merge_pending(&self) -> SyncResult<usize> {
        merge(&self.engine, &self.shared)
    }

    /// Returns the poll loop counters.
    pub fn stats(&self) -> PollStats {
        self.shared.stats.read().clone()
    }

    /// Returns true while the loop is running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the loop and waits for it to exit.
    ///
    /// A discovery still in flight finishes on the blocking pool.
    pub async fn shutdown(mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "poll task ended abnormally");
            }
        }
    }
}

impl<S, R> PollerHandle<S, R>
where
    S: ItemStore + 'static,
    R: RemoteClient + 'static,
{
    /// Merges the buffered batch on the blocking pool.
    ///
    /// Use this from async code; store commits may fsync.
    pub async fn merge_pending_async(&self) -> SyncResult<usize> {
        let engine = Arc::clone(&self.engine);
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || merge(&engine, &shared))
            .await
            .map_err(|err| SyncError::Network(format!("merge task failed: {err}")))?
    }
}

impl<S: ItemStore, R: RemoteClient> Drop for PollerHandle<S, R> {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

async fn run<S, R>(
    engine: Arc<SyncEngine<S, R>>,
    config: PollConfig,
    shared: Arc<Shared>,
    mut cancel_rx: watch::Receiver<bool>,
) where
    S: ItemStore + 'static,
    R: RemoteClient + 'static,
{
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(interval_ms = config.interval.as_millis() as u64, "poller started");

    loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let round = tokio::select! {
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
                continue;
            }
            round = discover(Arc::clone(&engine), Arc::clone(&shared)) => round,
        };

        let consecutive = {
            let mut stats = shared.stats.write();
            stats.rounds += 1;
            match &round {
                Ok(found) => {
                    stats.discovered += *found as u64;
                    stats.consecutive_failures = 0;
                }
                Err(err) => {
                    stats.failures += 1;
                    if err.is_retryable() {
                        stats.consecutive_failures += 1;
                    }
                }
            }
            stats.consecutive_failures
        };

        match round {
            Ok(0) => tracing::debug!("no newer items"),
            Ok(found) => tracing::info!(found, "newer items pending"),
            Err(err) => tracing::warn!(error = %err, "discovery failed"),
        }

        if config.retry_unsynced {
            retry(Arc::clone(&engine)).await;
        }

        let delay = config.retry.delay_for_attempt(consecutive);
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "backing off");
            tokio::select! {
                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    tracing::info!("poller stopped");
}

/// Holds the buffer lock throughout, so discovery cannot re-buffer items
/// while they are being written. On failure the buffer is left intact.
fn merge<S: ItemStore, R: RemoteClient>(
    engine: &SyncEngine<S, R>,
    shared: &Shared,
) -> SyncResult<usize> {
    let mut pending = shared.pending.lock();
    let count = engine.merge_newer(pending.clone())?;
    *pending = NewerBatch::default();
    shared.publish(0);
    Ok(count)
}

/// Runs one discovery round and buffers what it finds.
async fn discover<S, R>(engine: Arc<SyncEngine<S, R>>, shared: Arc<Shared>) -> SyncResult<usize>
where
    S: ItemStore + 'static,
    R: RemoteClient + 'static,
{
    tokio::task::spawn_blocking(move || -> SyncResult<usize> {
        let since = engine
            .max_synced_id()?
            .max(shared.pending.lock().max_id());
        let mut batch = engine.discover_newer(since)?;

        let mut pending = shared.pending.lock();
        // A merge may have landed while the request was out.
        let known = engine.max_synced_id()?;
        batch.items.retain(|item| item.id > known);
        let before = pending.len();
        pending.absorb(batch);
        shared.publish(pending.len());
        Ok(pending.len() - before)
    })
    .await
    .map_err(|err| SyncError::Network(format!("discovery task failed: {err}")))?
}

async fn retry<S, R>(engine: Arc<SyncEngine<S, R>>)
where
    S: ItemStore + 'static,
    R: RemoteClient + 'static,
{
    match tokio::task::spawn_blocking(move || engine.retry_unsynced()).await {
        Ok(Ok(report)) => {
            for failure in &report.failures {
                tracing::warn!(key = %failure.key, error = %failure.message, "unsynced item still pending");
            }
        }
        Ok(Err(err)) => tracing::warn!(error = %err, "retry sweep failed"),
        Err(err) => tracing::warn!(error = %err, "retry task failed"),
    }
}
