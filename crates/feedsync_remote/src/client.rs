//! Remote client abstraction.

use crate::error::RemoteResult;
use feedsync_store::Item;

/// Typed operations against the remote feed API.
///
/// Every returned [`Item`] is the server's authoritative copy and is
/// marked synced. Implementations own their transport timeouts; a timeout
/// surfaces as [`crate::RemoteError::Network`].
///
/// # Implementors
///
/// - [`crate::HttpRemote`] - HTTP/JSON client over a pluggable transport
/// - [`crate::MemoryRemote`] - In-process fake server for tests
pub trait RemoteClient: Send + Sync {
    /// Lists every item.
    fn list(&self) -> RemoteResult<Vec<Item>>;

    /// Fetches one item.
    fn get_by_id(&self, id: i64) -> RemoteResult<Item>;

    /// Creates an item (`id == 0`) or fully updates an existing one.
    fn create(&self, item: &Item) -> RemoteResult<Item>;

    /// Removes an item.
    fn remove(&self, id: i64) -> RemoteResult<()>;

    /// Likes an item as the caller.
    fn like(&self, id: i64) -> RemoteResult<Item>;

    /// Withdraws the caller's like.
    fn unlike(&self, id: i64) -> RemoteResult<Item>;

    /// Lists items with an id greater than `id`.
    fn list_newer_than(&self, id: i64) -> RemoteResult<Vec<Item>>;
}

impl<R: RemoteClient + ?Sized> RemoteClient for std::sync::Arc<R> {
    fn list(&self) -> RemoteResult<Vec<Item>> {
        (**self).list()
    }

    fn get_by_id(&self, id: i64) -> RemoteResult<Item> {
        (**self).get_by_id(id)
    }

    fn create(&self, item: &Item) -> RemoteResult<Item> {
        (**self).create(item)
    }

    fn remove(&self, id: i64) -> RemoteResult<()> {
        (**self).remove(id)
    }

    fn like(&self, id: i64) -> RemoteResult<Item> {
        (**self).like(id)
    }

    fn unlike(&self, id: i64) -> RemoteResult<Item> {
        (**self).unlike(id)
    }

    fn list_newer_than(&self, id: i64) -> RemoteResult<Vec<Item>> {
        (**self).list_newer_than(id)
    }
}
