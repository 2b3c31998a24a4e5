//! The sync engine.
//!
//! Every mutation follows the same three phases:
//! 1. **Apply**: write the change to the store so the feed shows it at once,
//!    keeping the pre-mutation row for rollback
//! 2. **Confirm**: call the matching remote operation
//! 3. **Reconcile**: store the server's copy on success, or restore the
//!    snapshot on failure
//!
//! Creates are the exception: a failed create keeps its unsynced row so the
//! retry sweep can push it later.

use crate::config::EngineConfig;
use crate::error::{ErrorKind, LocalStateError, SyncError, SyncResult};
use crate::locks::KeyLocks;
use feedsync_remote::{RemoteClient, RemoteError, RemoteResult};
use feedsync_store::{FeedSnapshot, Item, ItemKey, ItemStore};
use parking_lot::RwLock;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

/// Statistics about engine activity.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Creates confirmed by the server.
    pub creates_confirmed: u64,
    /// Creates left unsynced after a failed push.
    pub creates_deferred: u64,
    /// Mutations rolled back after a failed remote call.
    pub rollbacks: u64,
    /// Completed retry sweeps.
    pub retry_passes: u64,
    /// Items upserted by `merge_newer`.
    pub items_merged: u64,
    /// Successful refreshes.
    pub refreshes: u64,
    /// Time of the last successful refresh.
    pub last_refresh: Option<Instant>,
    /// Last remote error message.
    pub last_error: Option<String>,
}

/// Items discovered on the server but not yet merged into the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewerBatch {
    /// The id the discovery started after.
    pub since: i64,
    /// Discovered items, newest first.
    pub items: Vec<Item>,
}

impl NewerBatch {
    /// Returns the number of discovered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing new was found.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the highest id in the batch, or `since` if empty.
    pub fn max_id(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .unwrap_or(self.since)
            .max(self.since)
    }

    /// Appends items not already present, keeping newest first.
    pub fn absorb(&mut self, other: NewerBatch) {
        if self.items.is_empty() {
            self.since = other.since;
        }
        for item in other.items {
            if !self.items.iter().any(|existing| existing.id == item.id) {
                self.items.push(item);
            }
        }
        self.items.sort_by(|a, b| b.id.cmp(&a.id));
    }
}

/// One item the retry sweep could not push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    /// Key of the row that stays unsynced.
    pub key: ItemKey,
    /// Error classification.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
}

/// Outcome of a retry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    /// Rows a create was attempted for.
    pub attempted: usize,
    /// Server ids of rows confirmed during the sweep.
    pub synced: Vec<i64>,
    /// Rows that remain unsynced.
    pub failures: Vec<RetryFailure>,
    /// Rows settled by another operation before the sweep reached them.
    pub skipped: usize,
}

impl RetryReport {
    /// Returns true if every attempted row was confirmed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles the local store with the remote feed.
///
/// Operations addressing the same [`ItemKey`] are serialized; operations on
/// different keys run concurrently. All methods block the calling thread
/// for the duration of the remote call.
///
/// Writes of server rows (refresh, fetch, merge) wait for in-flight creates
/// to finish, so a created item is never visible under both its local and
/// its server key.
pub struct SyncEngine<S: ItemStore, R: RemoteClient> {
    config: EngineConfig,
    store: Arc<S>,
    remote: Arc<R>,
    locks: KeyLocks<ItemKey>,
    // Shared by pushing creates, exclusive for remote upserts.
    create_gate: RwLock<()>,
    stats: RwLock<SyncStats>,
}

impl<S: ItemStore, R: RemoteClient> SyncEngine<S, R> {
    /// Creates a new sync engine.
    pub fn new(config: EngineConfig, store: S, remote: R) -> Self {
        Self::with_shared(config, Arc::new(store), Arc::new(remote))
    }

    /// Creates a sync engine over an already shared store and client.
    pub fn with_shared(config: EngineConfig, store: Arc<S>, remote: Arc<R>) -> Self {
        Self {
            config,
            store,
            remote,
            locks: KeyLocks::new(),
            create_gate: RwLock::new(()),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the underlying remote client.
    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Returns one row.
    pub fn get(&self, key: impl Into<ItemKey>) -> SyncResult<Option<Item>> {
        Ok(self.store.get(key.into())?)
    }

    /// Returns every row in presentation order.
    pub fn items(&self) -> SyncResult<Vec<Item>> {
        Ok(self.store.list_all()?)
    }

    /// Subscribes to the observable feed.
    pub fn subscribe(&self) -> Receiver<FeedSnapshot> {
        self.store.subscribe()
    }

    /// Returns the latest feed snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.store.snapshot()
    }

    /// Returns the number of rows waiting for the retry sweep.
    pub fn unsynced_count(&self) -> SyncResult<usize> {
        Ok(self.store.list_unsynced()?.len())
    }

    /// Returns the highest server id in the store.
    pub fn max_synced_id(&self) -> SyncResult<i64> {
        Ok(self.store.max_synced_id()?)
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    /// Returns the saved draft.
    pub fn draft(&self) -> SyncResult<Option<String>> {
        Ok(self.store.load_draft()?)
    }

    /// Saves the draft being composed.
    pub fn save_draft(&self, content: &str) -> SyncResult<()> {
        Ok(self.store.save_draft(content)?)
    }

    /// Discards the saved draft.
    pub fn clear_draft(&self) -> SyncResult<()> {
        Ok(self.store.clear_draft()?)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Likes an item.
    ///
    /// Unlike [`SyncEngine::toggle_like`] this targets a state: on a row the
    /// caller already likes it returns the row unchanged without calling
    /// the server.
    pub fn like(&self, key: impl Into<ItemKey>) -> SyncResult<Item> {
        self.set_liked(key.into(), Some(true))
    }

    /// Withdraws a like. Returns the row unchanged if it is not liked.
    pub fn unlike(&self, key: impl Into<ItemKey>) -> SyncResult<Item> {
        self.set_liked(key.into(), Some(false))
    }

    /// Flips the caller's like, adjusting `like_count` by one.
    ///
    /// The remote call follows the new state: like when the row becomes
    /// liked, unlike otherwise.
    pub fn toggle_like(&self, key: impl Into<ItemKey>) -> SyncResult<Item> {
        self.set_liked(key.into(), None)
    }

    /// Increments the share counter locally.
    pub fn share(&self, key: impl Into<ItemKey>) -> SyncResult<Item> {
        self.bump(key.into(), |item| {
            item.share_count = item.share_count.saturating_add(1)
        })
    }

    /// Increments the view counter locally.
    pub fn view(&self, key: impl Into<ItemKey>) -> SyncResult<Item> {
        self.bump(key.into(), |item| {
            item.view_count = item.view_count.saturating_add(1)
        })
    }

    /// Removes an item.
    ///
    /// Unsynced rows only exist locally and are simply deleted.
    pub fn remove(&self, key: impl Into<ItemKey>) -> SyncResult<()> {
        let key = key.into();
        let _guard = self.locks.lock(key);

        let snapshot = self
            .store
            .get(key)?
            .ok_or(LocalStateError::NotFound(key))?;
        self.store.delete(key)?;

        let id = match key {
            ItemKey::Server(id) => id,
            ItemKey::Local(_) => {
                tracing::debug!(%key, "removed unsynced item locally");
                return Ok(());
            }
        };

        tracing::debug!(%key, "removed locally, confirming");
        match self.remote.remove(id) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.rollback(key, snapshot, &err)?;
                Err(err.into())
            }
        }
    }

    /// Creates an item.
    ///
    /// The item is stored unsynced under a fresh local id before the remote
    /// call. On success that row is replaced by the server's copy; on
    /// failure it stays for [`SyncEngine::retry_unsynced`] and the error is
    /// returned.
    pub fn create(&self, item: Item) -> SyncResult<Item> {
        let local_id = self.store.allocate_local_id()?;
        let key = ItemKey::Local(local_id);
        let _guard = self.locks.lock(key);

        let stored = self.store.put(self.prepare_new(item, local_id))?;
        tracing::debug!(%key, "stored new item, confirming");

        self.push_create(key, stored)
    }

    /// Replaces an item's content.
    pub fn edit(&self, key: impl Into<ItemKey>, content: impl Into<String>) -> SyncResult<Item> {
        let key = key.into();
        let _guard = self.locks.lock(key);

        let snapshot = self.synced_row(key)?;
        let mut applied = snapshot.clone();
        applied.content = content.into();
        let applied = self.store.put(applied)?;
        tracing::debug!(%key, "applied edit locally, confirming");

        let outcome = self.remote.create(&applied);
        self.reconcile(key, snapshot, outcome)
    }

    /// Pushes every unsynced row using its current content.
    ///
    /// A failure for one row is logged and reported but does not stop the
    /// sweep. Rows confirmed here leave the unsynced set, so a second sweep
    /// never pushes them again.
    pub fn retry_unsynced(&self) -> SyncResult<RetryReport> {
        let pending = self.store.list_unsynced()?;
        let mut report = RetryReport::default();

        for item in pending {
            let Some(key) = item.key() else {
                continue;
            };
            let _guard = self.locks.lock(key);

            // A concurrent create or remove may have settled the row.
            let Some(current) = self.store.get(key)? else {
                report.skipped += 1;
                continue;
            };

            report.attempted += 1;
            match self.push_create(key, current) {
                Ok(confirmed) => report.synced.push(confirmed.id),
                Err(err) => report.failures.push(RetryFailure {
                    key,
                    kind: err.kind(),
                    message: err.to_string(),
                }),
            }
        }

        self.stats.write().retry_passes += 1;
        tracing::info!(
            attempted = report.attempted,
            synced = report.synced.len(),
            failed = report.failures.len(),
            "retry sweep finished"
        );
        Ok(report)
    }

    /// Reloads the whole feed from the server.
    ///
    /// Unsynced rows are left alone. Returns the number of rows upserted.
    pub fn refresh(&self) -> SyncResult<usize> {
        let items = self.remote.list().map_err(|err| self.remote_failure(err))?;
        let count = self.upsert_remote(items)?;

        {
            let mut stats = self.stats.write();
            stats.refreshes += 1;
            stats.last_refresh = Some(Instant::now());
            stats.last_error = None;
        }
        tracing::info!(count, "refreshed feed");
        Ok(count)
    }

    /// Loads one item from the server into the store.
    pub fn fetch(&self, id: i64) -> SyncResult<Item> {
        let item = self
            .remote
            .get_by_id(id)
            .map_err(|err| self.remote_failure(err))?;

        if item.id != id {
            return Err(SyncError::Network(format!(
                "server returned item {} for id {}",
                item.id, id
            )));
        }
        self.upsert_one(item)
    }

    /// Asks the server for items newer than `current_max_id`.
    ///
    /// The store is not touched; pass the batch to
    /// [`SyncEngine::merge_newer`] to show it.
    pub fn discover_newer(&self, current_max_id: i64) -> SyncResult<NewerBatch> {
        let items = self
            .remote
            .list_newer_than(current_max_id)
            .map_err(|err| self.remote_failure(err))?;

        tracing::debug!(since = current_max_id, found = items.len(), "discovered newer items");
        Ok(NewerBatch {
            since: current_max_id,
            items: items.into_iter().filter(|item| item.id > 0).collect(),
        })
    }

    /// Upserts a discovered batch. Returns the number of rows written.
    pub fn merge_newer(&self, batch: NewerBatch) -> SyncResult<usize> {
        let count = self.upsert_remote(batch.items)?;
        self.stats.write().items_merged += count as u64;
        tracing::info!(count, "merged newer items");
        Ok(count)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn set_liked(&self, key: ItemKey, target: Option<bool>) -> SyncResult<Item> {
        let _guard = self.locks.lock(key);

        let snapshot = self.synced_row(key)?;
        let liked = target.unwrap_or(!snapshot.liked_by_caller);
        if liked == snapshot.liked_by_caller {
            return Ok(snapshot);
        }

        let mut applied = snapshot.clone();
        applied.liked_by_caller = liked;
        applied.like_count = if liked {
            applied.like_count.saturating_add(1)
        } else {
            applied.like_count.saturating_sub(1)
        };
        self.store.put(applied)?;
        tracing::debug!(%key, liked, "applied like locally, confirming");

        let outcome = if liked {
            self.remote.like(snapshot.id)
        } else {
            self.remote.unlike(snapshot.id)
        };
        self.reconcile(key, snapshot, outcome)
    }

    fn bump(&self, key: ItemKey, apply: impl FnOnce(&mut Item)) -> SyncResult<Item> {
        let _guard = self.locks.lock(key);

        let mut item = self
            .store
            .get(key)?
            .ok_or(LocalStateError::NotFound(key))?;
        apply(&mut item);
        Ok(self.store.put(item)?)
    }

    /// Loads a row that remote mutations may target.
    fn synced_row(&self, key: ItemKey) -> SyncResult<Item> {
        let item = self
            .store
            .get(key)?
            .ok_or(LocalStateError::NotFound(key))?;
        if key.is_local() || !item.is_synced {
            return Err(LocalStateError::Unsynced(key).into());
        }
        Ok(item)
    }

    fn prepare_new(&self, mut item: Item, local_id: i64) -> Item {
        item.id = 0;
        item.local_id = Some(local_id);
        item.is_synced = false;
        if item.author.trim().is_empty() {
            item.author = self.config.default_author.clone();
        }
        if item.published_label.trim().is_empty() {
            item.published_label = self.config.default_published_label.clone();
        }
        item.like_count = 0;
        item.liked_by_caller = false;
        item.share_count = 0;
        item.view_count = 0;
        item
    }

    /// Pushes an unsynced row and swaps it for the server's copy.
    ///
    /// The caller holds the row's key lock. The create gate is held from
    /// the request until the swap, keeping remote upserts of the new id out.
    fn push_create(&self, key: ItemKey, local: Item) -> SyncResult<Item> {
        let _gate = self.create_gate.read();
        let outcome = self.remote.create(&local).and_then(|created| {
            if created.id > 0 {
                Ok(created)
            } else {
                Err(RemoteError::network("server returned an item without an id"))
            }
        });

        match outcome {
            Ok(created) => {
                // Local guard is always taken before the server one.
                let _server_guard = self.locks.lock(ItemKey::Server(created.id));
                let confirmed = self.store.replace(key, created.into_synced())?;
                self.stats.write().creates_confirmed += 1;
                tracing::info!(%key, id = confirmed.id, "create confirmed");
                Ok(confirmed)
            }
            Err(err) => {
                {
                    let mut stats = self.stats.write();
                    stats.creates_deferred += 1;
                    stats.last_error = Some(err.to_string());
                }
                tracing::warn!(%key, error = %err, "create not confirmed, item kept unsynced");
                Err(err.into())
            }
        }
    }

    fn reconcile(&self, key: ItemKey, snapshot: Item, outcome: RemoteResult<Item>) -> SyncResult<Item> {
        match outcome {
            Ok(authoritative) => {
                tracing::debug!(%key, "confirmed by server");
                Ok(self.store.put(authoritative.into_synced())?)
            }
            Err(err) => {
                self.rollback(key, snapshot, &err)?;
                Err(err.into())
            }
        }
    }

    fn rollback(&self, key: ItemKey, snapshot: Item, err: &RemoteError) -> SyncResult<()> {
        tracing::warn!(%key, error = %err, "remote call failed, rolling back");
        self.store.put(snapshot)?;

        let mut stats = self.stats.write();
        stats.rollbacks += 1;
        stats.last_error = Some(err.to_string());
        Ok(())
    }

    fn upsert_remote(&self, items: Vec<Item>) -> SyncResult<usize> {
        let mut count = 0;
        for item in items {
            if item.id <= 0 {
                tracing::warn!("ignoring remote item without an id");
                continue;
            }
            self.upsert_one(item)?;
            count += 1;
        }
        Ok(count)
    }

    /// Stores one server row. Gate before key lock, as in `push_create`.
    fn upsert_one(&self, item: Item) -> SyncResult<Item> {
        let _gate = self.create_gate.write();
        let _guard = self.locks.lock(ItemKey::Server(item.id));
        Ok(self.store.put(item.into_synced())?)
    }

    fn remote_failure(&self, err: RemoteError) -> SyncError {
        tracing::warn!(error = %err, "remote read failed");
        self.stats.write().last_error = Some(err.to_string());
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedsync_remote::MemoryRemote;
    use feedsync_store::MemoryItemStore;

    type TestEngine = SyncEngine<MemoryItemStore, Arc<MemoryRemote>>;

    fn engine() -> (TestEngine, Arc<MemoryRemote>) {
        let remote = Arc::new(MemoryRemote::new());
        let engine = SyncEngine::new(
            EngineConfig::default(),
            MemoryItemStore::new(),
            Arc::clone(&remote),
        );
        (engine, remote)
    }

    fn seeded(likes: u32) -> (TestEngine, Arc<MemoryRemote>, i64) {
        let (engine, remote) = engine();
        let mut post = Item::new("seed");
        post.like_count = likes;
        let post = remote.insert(post);
        engine.refresh().unwrap();
        (engine, remote, post.id)
    }

    #[test]
    fn like_applies_then_confirms() {
        let (engine, remote, id) = seeded(10);

        let liked = engine.like(id).unwrap();
        assert!(liked.liked_by_caller);
        assert_eq!(liked.like_count, 11);
        assert_eq!(remote.call_count("like"), 1);
        assert_eq!(engine.get(id).unwrap().unwrap(), liked);
    }

    #[test]
    fn like_is_visible_before_confirmation() {
        let (engine, remote, id) = seeded(10);
        let rx = engine.subscribe();
        let _ = rx.recv().unwrap();

        remote.reject_next(403);
        let err = engine.like(id).unwrap_err();
        assert_eq!(err.status_code(), Some(403));

        let snapshots: Vec<FeedSnapshot> = rx.try_iter().collect();
        assert_eq!(snapshots.len(), 2);
        let applied = &snapshots[0].items[0];
        assert!(applied.liked_by_caller);
        assert_eq!(applied.like_count, 11);
        let reverted = &snapshots[1].items[0];
        assert!(!reverted.liked_by_caller);
        assert_eq!(reverted.like_count, 10);
    }

    #[test]
    fn like_rejected_rolls_back() {
        let (engine, remote, id) = seeded(10);
        let before = engine.get(id).unwrap().unwrap();

        remote.reject_next(403);
        let err = engine.like(id).unwrap_err();

        assert!(matches!(err, SyncError::RemoteRejected { code: 403, .. }));
        assert_eq!(engine.get(id).unwrap().unwrap(), before);
        assert_eq!(engine.stats().rollbacks, 1);
    }

    #[test]
    fn like_offline_rolls_back() {
        let (engine, remote, id) = seeded(3);
        let before = engine.get(id).unwrap().unwrap();

        remote.set_connected(false);
        let err = engine.toggle_like(id).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(engine.get(id).unwrap().unwrap(), before);
    }

    #[test]
    fn unlike_calls_delete_endpoint() {
        let (engine, remote, id) = seeded(0);
        engine.like(id).unwrap();

        let unliked = engine.toggle_like(id).unwrap();
        assert!(!unliked.liked_by_caller);
        assert_eq!(unliked.like_count, 0);
        assert_eq!(remote.call_count("unlike"), 1);
    }

    #[test]
    fn like_when_already_liked_is_noop() {
        let (engine, remote, id) = seeded(0);
        engine.like(id).unwrap();
        engine.like(id).unwrap();
        assert_eq!(remote.call_count("like"), 1);

        engine.unlike(id).unwrap();
        engine.unlike(id).unwrap();
        assert_eq!(remote.call_count("unlike"), 1);
    }

    #[test]
    fn toggle_like_flips_each_call() {
        let (engine, remote, id) = seeded(5);

        let liked = engine.toggle_like(id).unwrap();
        assert!(liked.liked_by_caller);
        assert_eq!(liked.like_count, 6);

        let unliked = engine.toggle_like(id).unwrap();
        assert!(!unliked.liked_by_caller);
        assert_eq!(unliked.like_count, 5);

        assert_eq!(remote.call_count("like"), 1);
        assert_eq!(remote.call_count("unlike"), 1);
    }

    #[test]
    fn like_unsynced_fails_fast() {
        let (engine, remote) = engine();
        remote.set_connected(false);
        let _ = engine.create(Item::new("offline"));
        let local = engine.items().unwrap().remove(0);
        let key = local.key().unwrap();
        let calls = remote.total_calls();

        let err = engine.like(key).unwrap_err();
        assert!(matches!(
            err,
            SyncError::LocalState(LocalStateError::Unsynced(_))
        ));
        assert_eq!(remote.total_calls(), calls);
        assert_eq!(engine.get(key).unwrap().unwrap(), local);
    }

    #[test]
    fn like_missing_item() {
        let (engine, _remote) = engine();
        let err = engine.like(99i64).unwrap_err();
        assert!(matches!(
            err,
            SyncError::LocalState(LocalStateError::NotFound(ItemKey::Server(99)))
        ));
    }

    #[test]
    fn share_and_view_are_local() {
        let (engine, remote, id) = seeded(0);
        let calls = remote.total_calls();
        remote.set_connected(false);

        engine.share(id).unwrap();
        let item = engine.view(id).unwrap();
        assert_eq!(item.share_count, 1);
        assert_eq!(item.view_count, 1);
        assert_eq!(remote.total_calls(), calls);
    }

    #[test]
    fn create_online_replaces_local_row() {
        let (engine, remote) = engine();

        let created = engine.create(Item::new("hi")).unwrap();
        assert!(created.id > 0);
        assert!(created.is_synced);
        assert_eq!(created.local_id, None);
        assert_eq!(created.author, "Me");
        assert_eq!(created.published_label, "now");

        let items = engine.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, created.id);
        assert_eq!(remote.post_count(), 1);
        assert_eq!(engine.stats().creates_confirmed, 1);
    }

    #[test]
    fn create_offline_keeps_unsynced_row() {
        let (engine, remote) = engine();
        remote.set_connected(false);

        let err = engine.create(Item::new("hi")).unwrap_err();
        assert!(err.is_retryable());

        let items = engine.items().unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_synced);
        assert!(items[0].local_id.is_some());
        assert_eq!(engine.unsynced_count().unwrap(), 1);
        assert_eq!(engine.stats().creates_deferred, 1);
    }

    #[test]
    fn create_rejected_keeps_unsynced_row() {
        let (engine, remote) = engine();
        remote.reject_next(500);

        let err = engine.create(Item::new("hi")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert_eq!(engine.unsynced_count().unwrap(), 1);
    }

    #[test]
    fn create_keeps_caller_author() {
        let (engine, _remote) = engine();
        let created = engine
            .create(Item::new("hi").with_author("Netology"))
            .unwrap();
        assert_eq!(created.author, "Netology");
    }

    #[test]
    fn edit_confirms_content() {
        let (engine, remote, id) = seeded(0);

        let edited = engine.edit(id, "changed").unwrap();
        assert_eq!(edited.content, "changed");
        assert_eq!(remote.post(id).unwrap().content, "changed");
    }

    #[test]
    fn edit_failure_rolls_back() {
        let (engine, remote, id) = seeded(0);
        remote.set_connected(false);

        assert!(engine.edit(id, "changed").is_err());
        assert_eq!(engine.get(id).unwrap().unwrap().content, "seed");
    }

    #[test]
    fn edit_unsynced_is_rejected() {
        let (engine, remote) = engine();
        remote.set_connected(false);
        let _ = engine.create(Item::new("draft"));
        let key = engine.items().unwrap()[0].key().unwrap();

        let err = engine.edit(key, "changed").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalState);
        assert_eq!(engine.get(key).unwrap().unwrap().content, "draft");
    }

    #[test]
    fn remove_synced_confirms() {
        let (engine, remote, id) = seeded(0);
        engine.remove(id).unwrap();
        assert!(engine.get(id).unwrap().is_none());
        assert!(remote.post(id).is_none());
    }

    #[test]
    fn remove_failure_reinserts() {
        let (engine, remote, id) = seeded(4);
        let before = engine.get(id).unwrap().unwrap();
        remote.reject_next(500);

        assert!(engine.remove(id).is_err());
        assert_eq!(engine.get(id).unwrap().unwrap(), before);
    }

    #[test]
    fn remove_unsynced_is_local_only() {
        let (engine, remote) = engine();
        remote.set_connected(false);
        let _ = engine.create(Item::new("draft"));
        let key = engine.items().unwrap()[0].key().unwrap();
        let calls = remote.total_calls();

        engine.remove(key).unwrap();
        assert!(engine.items().unwrap().is_empty());
        assert_eq!(remote.total_calls(), calls);
    }

    #[test]
    fn retry_pushes_current_content() {
        let (engine, remote) = engine();
        remote.set_connected(false);
        let _ = engine.create(Item::new("first words"));
        let key = engine.items().unwrap()[0].key().unwrap();
        engine.share(key).unwrap();

        remote.set_connected(true);
        let report = engine.retry_unsynced().unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.synced.len(), 1);
        assert!(report.is_complete());

        let items = engine.items().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_synced);
        assert_eq!(items[0].local_id, None);
        assert_eq!(remote.post(items[0].id).unwrap().content, "first words");
    }

    #[test]
    fn retry_failure_does_not_stop_sweep() {
        let (engine, remote) = engine();
        remote.set_connected(false);
        let _ = engine.create(Item::new("a"));
        let _ = engine.create(Item::new("b"));

        remote.set_connected(true);
        remote.reject_next(500);
        let report = engine.retry_unsynced().unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.synced.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, ErrorKind::RemoteRejected);
        assert_eq!(engine.unsynced_count().unwrap(), 1);
    }

    #[test]
    fn refresh_failure_leaves_store_untouched() {
        let (engine, remote, _id) = seeded(0);
        let before = engine.items().unwrap();
        remote.insert(Item::new("another"));
        remote.set_connected(false);

        assert!(engine.refresh().is_err());
        assert_eq!(engine.items().unwrap(), before);
        assert!(engine.stats().last_error.is_some());
    }

    #[test]
    fn refresh_keeps_unsynced_rows() {
        let (engine, remote) = engine();
        remote.set_connected(false);
        let _ = engine.create(Item::new("offline"));
        remote.set_connected(true);
        remote.insert(Item::new("remote"));

        assert_eq!(engine.refresh().unwrap(), 1);
        assert_eq!(engine.items().unwrap().len(), 2);
        assert_eq!(engine.unsynced_count().unwrap(), 1);
    }

    #[test]
    fn fetch_upserts_one() {
        let (engine, remote) = engine();
        let post = remote.insert(Item::new("single"));

        let fetched = engine.fetch(post.id).unwrap();
        assert_eq!(fetched.content, "single");
        assert_eq!(engine.items().unwrap().len(), 1);
    }

    #[test]
    fn discover_then_merge() {
        let (engine, remote, id) = seeded(0);
        remote.insert(Item::new("new 1"));
        remote.insert(Item::new("new 2"));
        let before = engine.items().unwrap();

        let batch = engine.discover_newer(id).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(engine.items().unwrap(), before);

        let max = batch.max_id();
        assert_eq!(engine.merge_newer(batch).unwrap(), 2);
        assert_eq!(engine.items().unwrap().len(), 3);
        assert_eq!(engine.max_synced_id().unwrap(), max);
        assert_eq!(engine.stats().items_merged, 2);
    }

    #[test]
    fn batch_absorb_dedupes() {
        let mut a = NewerBatch {
            since: 1,
            items: vec![{
                let mut i = Item::new("x");
                i.id = 2;
                i
            }],
        };
        let b = NewerBatch {
            since: 2,
            items: vec![
                {
                    let mut i = Item::new("y");
                    i.id = 3;
                    i
                },
                {
                    let mut i = Item::new("x");
                    i.id = 2;
                    i
                },
            ],
        };
        a.absorb(b);
        let ids: Vec<i64> = a.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(a.max_id(), 3);
    }

    #[test]
    fn drafts_pass_through() {
        let (engine, _remote) = engine();
        engine.save_draft("hello").unwrap();
        assert_eq!(engine.draft().unwrap(), Some("hello".into()));
        engine.clear_draft().unwrap();
        assert_eq!(engine.draft().unwrap(), None);
    }
}
