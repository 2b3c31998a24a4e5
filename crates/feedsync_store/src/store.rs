//! Item store trait definition.

use crate::error::StoreResult;
use crate::feed::FeedSnapshot;
use crate::item::{Item, ItemKey};
use std::sync::mpsc::Receiver;

/// A durable keyed table of feed items.
///
/// The store is the single source of truth for what is displayed. It never
/// performs network I/O.
///
/// # Invariants
///
/// - Every operation is atomic with respect to every other one
/// - Each committed write emits exactly one [`FeedSnapshot`]
/// - A row with `id > 0` is keyed by [`ItemKey::Server`], carries no local
///   id and is synced
/// - A row with `id == 0` is keyed by [`ItemKey::Local`] and is unsynced
///
/// # Implementors
///
/// - [`super::MemoryItemStore`] - For testing and ephemeral sessions
/// - [`super::FileItemStore`] - For persistent storage
pub trait ItemStore: Send + Sync {
    /// Returns the row stored under `key`.
    fn get(&self, key: ItemKey) -> StoreResult<Option<Item>>;

    /// Upserts a row, overwriting any row with the same key.
    ///
    /// An item with `id == 0` and no local id is given a fresh one. The
    /// stored row is returned.
    fn put(&self, item: Item) -> StoreResult<Item>;

    /// Deletes the row stored under `key`, returning it.
    fn delete(&self, key: ItemKey) -> StoreResult<Option<Item>>;

    /// Deletes `old` and upserts `item` as a single commit.
    ///
    /// Subscribers never observe a state with both rows or with neither.
    fn replace(&self, old: ItemKey, item: Item) -> StoreResult<Item>;

    /// Returns every row in presentation order.
    fn list_all(&self) -> StoreResult<Vec<Item>>;

    /// Returns every row not yet created on the server.
    fn list_unsynced(&self) -> StoreResult<Vec<Item>>;

    /// Returns the highest server id present, or `0`.
    fn max_synced_id(&self) -> StoreResult<i64>;

    /// Reserves a local id without writing a row.
    fn allocate_local_id(&self) -> StoreResult<i64>;

    /// Subscribes to ordered snapshots emitted after every commit.
    fn subscribe(&self) -> Receiver<FeedSnapshot>;

    /// Returns the most recently committed snapshot.
    fn snapshot(&self) -> FeedSnapshot;

    /// Returns the saved draft text, if any.
    fn load_draft(&self) -> StoreResult<Option<String>>;

    /// Saves the draft text.
    fn save_draft(&self, content: &str) -> StoreResult<()>;

    /// Removes the saved draft.
    fn clear_draft(&self) -> StoreResult<()>;
}
