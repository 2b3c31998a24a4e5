//! Test fixtures and store helpers.
//!
//! Provides convenience functions for building items, temporary stores
//! and engines wired to an in-process fake server.

use feedsync_engine::{EngineConfig, SyncEngine};
use feedsync_remote::MemoryRemote;
use feedsync_store::{FileItemStore, Item, MemoryItemStore, StoreConfig};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Builds an item as the server would return it.
pub fn synced_item(id: i64, content: &str) -> Item {
    let mut item = Item::new(content)
        .with_author("Netology")
        .with_published_label("21 May at 18:36");
    item.id = id;
    item.into_synced()
}

/// Builds a post the way a composer would submit it.
pub fn new_post(content: &str) -> Item {
    Item::new(content)
}

/// A file-backed store in a temporary directory.
pub struct TestStore {
    /// The store instance.
    pub store: FileItemStore,
    /// The temporary directory (kept alive to prevent cleanup).
    dir: TempDir,
}

impl TestStore {
    /// Opens a fresh store.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = open(dir.path());
        Self { store, dir }
    }

    /// Returns the store directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Closes the store and opens it again from disk.
    pub fn reopen(self) -> Self {
        let Self { store, dir } = self;
        drop(store);
        let store = open(dir.path());
        Self { store, dir }
    }

    /// Splits into the store and the directory guard.
    pub fn into_parts(self) -> (FileItemStore, TempDir) {
        (self.store, self.dir)
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = FileItemStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

fn open(path: &Path) -> FileItemStore {
    FileItemStore::open(path, StoreConfig::default()).expect("Failed to open item store")
}

/// An engine over an in-memory store.
pub type MemoryEngine = SyncEngine<MemoryItemStore, Arc<MemoryRemote>>;

/// An engine wired to a fake server the test can steer.
pub struct TestEngine {
    /// The engine.
    pub engine: Arc<MemoryEngine>,
    /// The fake server.
    pub remote: Arc<MemoryRemote>,
}

impl TestEngine {
    /// Creates an engine with an empty store and server.
    pub fn new() -> Self {
        let remote = Arc::new(MemoryRemote::new());
        let engine = SyncEngine::new(
            EngineConfig::default(),
            MemoryItemStore::new(),
            Arc::clone(&remote),
        );
        Self {
            engine: Arc::new(engine),
            remote,
        }
    }

    /// Creates an engine whose store mirrors the given server posts.
    pub fn with_remote_posts(posts: impl IntoIterator<Item = Item>) -> Self {
        let this = Self::new();
        for post in posts {
            this.remote.insert(post);
        }
        this.engine.refresh().expect("Failed to refresh test engine");
        this
    }

    /// Simulates losing connectivity.
    pub fn go_offline(&self) {
        self.remote.set_connected(false);
    }

    /// Restores connectivity.
    pub fn go_online(&self) {
        self.remote.set_connected(true);
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestEngine {
    type Target = MemoryEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}
