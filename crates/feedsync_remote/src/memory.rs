//! In-process fake of the feed API.

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteResult};
use feedsync_store::Item;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

/// A fake feed server living in process memory.
///
/// Behaves like the real API (assigns ids, counts likes, answers
/// newer-than queries) and supports failure injection for tests:
/// - [`MemoryRemote::set_connected`] simulates going offline
/// - [`MemoryRemote::reject_all`] makes every call return a status
/// - [`MemoryRemote::reject_next`] rejects only the next call
#[derive(Debug)]
pub struct MemoryRemote {
    posts: Mutex<BTreeMap<i64, Item>>,
    next_id: Mutex<i64>,
    connected: AtomicBool,
    reject_all: Mutex<Option<u16>>,
    reject_next: Mutex<Option<u16>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl MemoryRemote {
    /// Creates an empty, connected server.
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            connected: AtomicBool::new(true),
            reject_all: Mutex::new(None),
            reject_next: Mutex::new(None),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a post directly on the server, as if another user created it.
    ///
    /// Posts with `id == 0` get the next free id. Returns the stored copy.
    pub fn insert(&self, item: Item) -> Item {
        let mut posts = self.posts.lock();
        let mut next_id = self.next_id.lock();

        let mut stored = item.into_synced();
        if stored.id <= 0 {
            stored.id = *next_id;
        }
        *next_id = (*next_id).max(stored.id + 1);
        posts.insert(stored.id, stored.clone());
        stored
    }

    /// Returns the server's copy of a post.
    pub fn post(&self, id: i64) -> Option<Item> {
        self.posts.lock().get(&id).cloned()
    }

    /// Returns the number of posts on the server.
    pub fn post_count(&self) -> usize {
        self.posts.lock().len()
    }

    /// Sets the connected state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Rejects every call with `code` until cleared with `None`.
    pub fn reject_all(&self, code: Option<u16>) {
        *self.reject_all.lock() = code;
    }

    /// Rejects the next call with `code`.
    pub fn reject_next(&self, code: u16) {
        *self.reject_next.lock() = Some(code);
    }

    /// Returns how often `operation` was called (e.g. `"like"`).
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// Returns the number of calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    fn gate(&self, operation: &'static str) -> RemoteResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        if !self.connected.load(Ordering::SeqCst) {
            return Err(RemoteError::network("connection refused"));
        }
        if let Some(code) = self.reject_next.lock().take() {
            return Err(RemoteError::rejected(code));
        }
        if let Some(code) = *self.reject_all.lock() {
            return Err(RemoteError::rejected(code));
        }
        Ok(())
    }

    fn update<F>(&self, id: i64, apply: F) -> RemoteResult<Item>
    where
        F: FnOnce(&mut Item),
    {
        let mut posts = self.posts.lock();
        let post = posts.get_mut(&id).ok_or_else(|| RemoteError::rejected(404))?;
        apply(post);
        Ok(post.clone())
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteClient for MemoryRemote {
    fn list(&self) -> RemoteResult<Vec<Item>> {
        self.gate("list")?;
        Ok(self.posts.lock().values().rev().cloned().collect())
    }

    fn get_by_id(&self, id: i64) -> RemoteResult<Item> {
        self.gate("get_by_id")?;
        self.post(id).ok_or_else(|| RemoteError::rejected(404))
    }

    fn create(&self, item: &Item) -> RemoteResult<Item> {
        self.gate("create")?;
        if item.id > 0 {
            let content = item.content.clone();
            return self.update(item.id, |post| post.content = content);
        }

        let mut fresh = item.clone();
        fresh.like_count = 0;
        fresh.liked_by_caller = false;
        Ok(self.insert(fresh))
    }

    fn remove(&self, id: i64) -> RemoteResult<()> {
        self.gate("remove")?;
        self.posts.lock().remove(&id);
        Ok(())
    }

    fn like(&self, id: i64) -> RemoteResult<Item> {
        self.gate("like")?;
        self.update(id, |post| {
            if !post.liked_by_caller {
                post.liked_by_caller = true;
                post.like_count += 1;
            }
        })
    }

    fn unlike(&self, id: i64) -> RemoteResult<Item> {
        self.gate("unlike")?;
        self.update(id, |post| {
            if post.liked_by_caller {
                post.liked_by_caller = false;
                post.like_count = post.like_count.saturating_sub(1);
            }
        })
    }

    fn list_newer_than(&self, id: i64) -> RemoteResult<Vec<Item>> {
        self.gate("list_newer_than")?;
        Ok(self
            .posts
            .lock()
            .range(id + 1..)
            .rev()
            .map(|(_, post)| post.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_ids() {
        let remote = MemoryRemote::new();
        let a = remote.create(&Item::new("a")).unwrap();
        let b = remote.create(&Item::new("b")).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.is_synced);
        assert_eq!(remote.post_count(), 2);
    }

    #[test]
    fn create_with_id_updates_content() {
        let remote = MemoryRemote::new();
        let mut post = remote.insert(Item::new("before"));
        post.content = "after".into();
        post.like_count = 999;

        let updated = remote.create(&post).unwrap();
        assert_eq!(updated.content, "after");
        assert_eq!(updated.like_count, 0);

        let mut missing = Item::new("x");
        missing.id = 77;
        assert_eq!(remote.create(&missing), Err(RemoteError::rejected(404)));
    }

    #[test]
    fn like_and_unlike() {
        let remote = MemoryRemote::new();
        let post = remote.insert(Item::new("p"));

        let liked = remote.like(post.id).unwrap();
        assert!(liked.liked_by_caller);
        assert_eq!(liked.like_count, 1);

        let unliked = remote.unlike(post.id).unwrap();
        assert!(!unliked.liked_by_caller);
        assert_eq!(unliked.like_count, 0);
    }

    #[test]
    fn newer_than() {
        let remote = MemoryRemote::new();
        for i in 0..5 {
            remote.insert(Item::new(format!("{}", i)));
        }

        let newer: Vec<i64> = remote.list_newer_than(3).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(newer, vec![5, 4]);
    }

    #[test]
    fn failure_injection() {
        let remote = MemoryRemote::new();

        remote.set_connected(false);
        assert!(remote.list().unwrap_err().is_network());
        remote.set_connected(true);

        remote.reject_next(500);
        assert_eq!(remote.list(), Err(RemoteError::rejected(500)));
        assert!(remote.list().is_ok());

        remote.reject_all(Some(403));
        assert!(remote.list().is_err());
        assert!(remote.list().is_err());
        remote.reject_all(None);
        assert!(remote.list().is_ok());

        assert_eq!(remote.call_count("list"), 6);
        assert_eq!(remote.total_calls(), 6);
    }
}
