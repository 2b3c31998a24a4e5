//! Observable feed of the store's ordered view.
//!
//! Every committed store write emits one [`FeedSnapshot`] holding the full
//! ordered item list. Consumers hold a receiver and render whatever
//! arrives last:
//!
//! ```rust
//! use feedsync_store::{Item, ItemStore, MemoryItemStore};
//!
//! let store = MemoryItemStore::new();
//! let rx = store.subscribe();
//!
//! store.put(Item::new("hello")).unwrap();
//!
//! let snapshot = rx.recv().unwrap();
//! assert_eq!(snapshot.items.len(), 1);
//! ```

use crate::item::Item;
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// The ordered view after one commit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedSnapshot {
    /// Commit version, strictly increasing per store.
    pub version: u64,
    /// Items in presentation order.
    pub items: Vec<Item>,
}

impl FeedSnapshot {
    /// Returns the number of unsynced items in this snapshot.
    pub fn unsynced_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_synced).count()
    }
}

/// Distributes snapshots to subscribers.
///
/// - Emits only committed state
/// - Preserves commit order
/// - Drops subscribers whose receiver has gone away
pub struct ItemFeed {
    subscribers: RwLock<Vec<Sender<FeedSnapshot>>>,
    latest: RwLock<FeedSnapshot>,
}

impl ItemFeed {
    /// Creates a feed with an empty initial snapshot.
    pub fn new() -> Self {
        Self::with_initial(FeedSnapshot::default())
    }

    /// Creates a feed seeded with an existing snapshot.
    pub fn with_initial(initial: FeedSnapshot) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            latest: RwLock::new(initial),
        }
    }

    /// Subscribes to future snapshots.
    ///
    /// The current snapshot is delivered first so a new consumer never
    /// starts from an empty view.
    pub fn subscribe(&self) -> Receiver<FeedSnapshot> {
        let (tx, rx) = mpsc::channel();
        // Lock order is `latest` then `subscribers`, matching `emit`.
        let latest = self.latest.read();
        let mut subscribers = self.subscribers.write();
        if latest.version > 0 {
            let _ = tx.send((*latest).clone());
        }
        subscribers.push(tx);
        rx
    }

    /// Publishes a new ordered view.
    ///
    /// Callers hold the store's write lock, so versions arrive in commit
    /// order. `latest` stays locked until every subscriber has the snapshot,
    /// so a concurrent `subscribe` sees either the old version or the new
    /// one, never both.
    pub fn emit(&self, items: Vec<Item>) -> u64 {
        let mut latest = self.latest.write();
        latest.version += 1;
        latest.items = items;

        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send((*latest).clone()).is_ok());
        latest.version
    }

    /// Returns the most recent snapshot.
    pub fn latest(&self) -> FeedSnapshot {
        self.latest.read().clone()
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for ItemFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn emit_and_receive() {
        let feed = ItemFeed::new();
        let rx = feed.subscribe();

        let version = feed.emit(vec![Item::new("a")]);
        assert_eq!(version, 1);

        let received = rx.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(received.version, 1);
        assert_eq!(received.items[0].content, "a");
    }

    #[test]
    fn late_subscriber_gets_latest() {
        let feed = ItemFeed::new();
        feed.emit(vec![Item::new("a")]);
        feed.emit(vec![Item::new("a"), Item::new("b")]);

        let rx = feed.subscribe();
        let first = rx.recv().unwrap();
        assert_eq!(first.version, 2);
        assert_eq!(first.items.len(), 2);
    }

    #[test]
    fn subscriber_cleanup() {
        let feed = ItemFeed::new();
        let rx = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);

        drop(rx);
        feed.emit(Vec::new());
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn versions_are_ordered() {
        let feed = ItemFeed::new();
        let rx = feed.subscribe();

        for i in 0..5 {
            feed.emit(vec![Item::new(format!("{}", i))]);
        }

        let versions: Vec<u64> = rx.try_iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn subscribe_during_emits_sees_each_version_once() {
        let feed = Arc::new(ItemFeed::new());
        feed.emit(Vec::new());

        let emitter = {
            let feed = Arc::clone(&feed);
            thread::spawn(move || {
                for _ in 0..500 {
                    feed.emit(vec![Item::new("tick")]);
                }
            })
        };

        let receivers: Vec<_> = (0..200).map(|_| feed.subscribe()).collect();
        emitter.join().unwrap();

        for rx in receivers {
            let versions: Vec<u64> = rx.try_iter().map(|s| s.version).collect();
            assert!(!versions.is_empty());
            assert!(
                versions.windows(2).all(|w| w[0] < w[1]),
                "versions not increasing: {:?}",
                versions
            );
        }
    }

    #[test]
    fn threaded_subscribe() {
        let feed = Arc::new(ItemFeed::new());
        let rx = feed.subscribe();

        let feed_clone = Arc::clone(&feed);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            feed_clone.emit(vec![Item::new("late")]);
        });

        let received = rx.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(received.items[0].content, "late");

        handle.join().unwrap();
    }
}
