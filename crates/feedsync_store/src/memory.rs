//! In-memory item store.

use crate::error::StoreResult;
use crate::feed::{FeedSnapshot, ItemFeed};
use crate::item::{Item, ItemKey};
use crate::store::ItemStore;
use crate::table::Table;
use parking_lot::RwLock;
use std::sync::mpsc::Receiver;

/// An in-memory item store.
///
/// Suitable for:
/// - Unit and integration tests
/// - Sessions that don't need persistence
///
/// # Example
///
/// ```rust
/// use feedsync_store::{Item, ItemStore, MemoryItemStore};
///
/// let store = MemoryItemStore::new();
/// let stored = store.put(Item::new("draft post")).unwrap();
/// assert!(!stored.is_synced);
/// assert_eq!(store.list_unsynced().unwrap().len(), 1);
/// ```
#[derive(Default)]
pub struct MemoryItemStore {
    table: RwLock<Table>,
    feed: ItemFeed,
}

impl MemoryItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with items.
    ///
    /// No snapshot is emitted for the seed rows.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut table = Table::new();
        for item in items {
            table.put(item);
        }
        let feed = ItemFeed::with_initial(FeedSnapshot {
            version: 1,
            items: table.ordered(),
        });
        Self {
            table: RwLock::new(table),
            feed,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Returns true if the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn commit<T>(&self, apply: impl FnOnce(&mut Table) -> T) -> T {
        let mut table = self.table.write();
        let result = apply(&mut table);
        self.feed.emit(table.ordered());
        result
    }
}

impl ItemStore for MemoryItemStore {
    fn get(&self, key: ItemKey) -> StoreResult<Option<Item>> {
        Ok(self.table.read().get(key))
    }

    fn put(&self, item: Item) -> StoreResult<Item> {
        Ok(self.commit(|table| table.put(item)))
    }

    fn delete(&self, key: ItemKey) -> StoreResult<Option<Item>> {
        Ok(self.commit(|table| table.delete(key)))
    }

    fn replace(&self, old: ItemKey, item: Item) -> StoreResult<Item> {
        Ok(self.commit(|table| {
            table.delete(old);
            table.put(item)
        }))
    }

    fn list_all(&self) -> StoreResult<Vec<Item>> {
        Ok(self.table.read().ordered())
    }

    fn list_unsynced(&self) -> StoreResult<Vec<Item>> {
        Ok(self.table.read().unsynced())
    }

    fn max_synced_id(&self) -> StoreResult<i64> {
        Ok(self.table.read().max_synced_id())
    }

    fn allocate_local_id(&self) -> StoreResult<i64> {
        Ok(self.table.write().allocate_local_id())
    }

    fn subscribe(&self) -> Receiver<FeedSnapshot> {
        self.feed.subscribe()
    }

    fn snapshot(&self) -> FeedSnapshot {
        self.feed.latest()
    }

    fn load_draft(&self) -> StoreResult<Option<String>> {
        Ok(self.table.read().draft())
    }

    fn save_draft(&self, content: &str) -> StoreResult<()> {
        self.table.write().set_draft(Some(content.to_string()));
        Ok(())
    }

    fn clear_draft(&self) -> StoreResult<()> {
        self.table.write().set_draft(None);
        Ok(())
    }
}
