//! File-backed item store.
//!
//! Directory layout:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK          # Advisory lock for single-writer
//! └─ items.snap    # Checksummed CBOR snapshot of the table
//! ```
//!
//! The snapshot is rewritten after every commit using write-then-rename,
//! so a crash leaves either the old or the new table on disk.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::feed::{FeedSnapshot, ItemFeed};
use crate::item::{Item, ItemKey};
use crate::store::ItemStore;
use crate::table::{Table, TableData};
use fs2::FileExt;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "items.snap";
const SNAPSHOT_TEMP: &str = "items.snap.tmp";

/// Magic bytes for the snapshot file.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"FSNP";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 32;

/// A persistent item store.
///
/// Holds an exclusive lock on its directory for its whole lifetime; a
/// second open of the same directory fails with [`StoreError::Locked`].
///
/// # Example
///
/// ```no_run
/// use feedsync_store::{FileItemStore, Item, ItemStore, StoreConfig};
/// use std::path::Path;
///
/// let store = FileItemStore::open(Path::new("feed_data"), StoreConfig::default()).unwrap();
/// store.put(Item::new("survives restarts")).unwrap();
/// ```
pub struct FileItemStore {
    path: PathBuf,
    config: StoreConfig,
    table: RwLock<Table>,
    feed: ItemFeed,
    _lock_file: File,
}

impl FileItemStore {
    /// Opens or creates a store directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another process holds the lock
    /// - The snapshot exists but is corrupted
    pub fn open(path: &Path, config: StoreConfig) -> StoreResult<Self> {
        if !path.exists() {
            if config.create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StoreError::NotFound(path.display().to_string()));
            }
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        let table = load_table(&path.join(SNAPSHOT_FILE))?;
        tracing::debug!(path = %path.display(), rows = table.len(), "opened item store");

        let feed = ItemFeed::with_initial(FeedSnapshot {
            version: 1,
            items: table.ordered(),
        });

        Ok(Self {
            path: path.to_path_buf(),
            config,
            table: RwLock::new(table),
            feed,
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
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

    /// Applies a change to a copy of the table, persists it, then installs it.
    ///
    /// On a persistence failure the in-memory table is left untouched.
    fn commit<T>(&self, emit: bool, apply: impl FnOnce(&mut Table) -> T) -> StoreResult<T> {
        let mut table = self.table.write();
        let mut next = table.clone();
        let result = apply(&mut next);

        self.persist(&next)?;
        *table = next;

        if emit {
            self.feed.emit(table.ordered());
        }
        Ok(result)
    }

    fn persist(&self, table: &Table) -> StoreResult<()> {
        let data = encode_snapshot(&table.to_data())?;
        let snapshot_path = self.path.join(SNAPSHOT_FILE);
        let temp_path = self.path.join(SNAPSHOT_TEMP);

        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        if self.config.sync_on_commit {
            file.sync_all()?;
        }
        drop(file);

        fs::rename(&temp_path, &snapshot_path)?;

        if self.config.sync_on_commit {
            self.sync_directory()?;
        }
        Ok(())
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StoreResult<()> {
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl ItemStore for FileItemStore {
    fn get(&self, key: ItemKey) -> StoreResult<Option<Item>> {
        Ok(self.table.read().get(key))
    }

    fn put(&self, item: Item) -> StoreResult<Item> {
        self.commit(true, |table| table.put(item))
    }

    fn delete(&self, key: ItemKey) -> StoreResult<Option<Item>> {
        self.commit(true, |table| table.delete(key))
    }

    fn replace(&self, old: ItemKey, item: Item) -> StoreResult<Item> {
        self.commit(true, |table| {
            table.delete(old);
            table.put(item)
        })
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
        self.commit(false, |table| table.allocate_local_id())
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
        self.commit(false, |table| table.set_draft(Some(content.to_string())))
    }

    fn clear_draft(&self) -> StoreResult<()> {
        self.commit(false, |table| table.set_draft(None))
    }
}

/// Encodes table data as a checksummed snapshot.
fn encode_snapshot(data: &TableData) -> StoreResult<Vec<u8>> {
    let mut payload = Vec::new();
    ciborium::into_writer(data, &mut payload).map_err(StoreError::codec)?;

    let digest = Sha256::digest(&payload);

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&SNAPSHOT_MAGIC);
    buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    buf.extend_from_slice(&digest);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decodes and verifies a snapshot.
fn decode_snapshot(bytes: &[u8]) -> StoreResult<TableData> {
    if bytes.len() < HEADER_LEN {
        return Err(StoreError::Corrupted(format!(
            "snapshot too short: {} bytes",
            bytes.len()
        )));
    }

    if bytes[0..4] != SNAPSHOT_MAGIC {
        return Err(StoreError::Corrupted("bad snapshot magic".into()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != SNAPSHOT_VERSION {
        return Err(StoreError::Corrupted(format!(
            "unsupported snapshot version {}",
            version
        )));
    }

    let expected = &bytes[6..HEADER_LEN];
    let payload = &bytes[HEADER_LEN..];
    if Sha256::digest(payload).as_slice() != expected {
        return Err(StoreError::Corrupted("snapshot checksum mismatch".into()));
    }

    ciborium::from_reader(payload).map_err(StoreError::codec)
}

fn load_table(path: &Path) -> StoreResult<Table> {
    if !path.exists() {
        return Ok(Table::new());
    }

    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    if bytes.is_empty() {
        return Ok(Table::new());
    }

    let data = decode_snapshot(&bytes)?;
    Table::from_data(data).ok_or_else(|| StoreError::Corrupted("row without identity".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn synced(id: i64, content: &str) -> Item {
        let mut item = Item::new(content);
        item.id = id;
        item
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");

        let local_id = {
            let store = FileItemStore::open(&path, StoreConfig::default()).unwrap();
            store.put(synced(1, "one")).unwrap();
            store.save_draft("pending words").unwrap();
            store.put(Item::new("offline")).unwrap().local_id.unwrap()
        };

        let store = FileItemStore::open(&path, StoreConfig::default()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(ItemKey::Server(1)).unwrap().unwrap().content,
            "one"
        );
        assert_eq!(
            store.get(ItemKey::Local(local_id)).unwrap().unwrap().content,
            "offline"
        );
        assert_eq!(store.load_draft().unwrap(), Some("pending words".into()));
        assert!(store.allocate_local_id().unwrap() > local_id);
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _first = FileItemStore::open(dir.path(), StoreConfig::default()).unwrap();

        let second = FileItemStore::open(dir.path(), StoreConfig::default());
        assert!(matches!(second, Err(StoreError::Locked)));
    }

    #[test]
    fn missing_directory_without_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent");
        let result = FileItemStore::open(&path, StoreConfig::new().create_if_missing(false));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn corrupted_snapshot_is_rejected() {
        let dir = tempdir().unwrap();
        {
            let store = FileItemStore::open(dir.path(), StoreConfig::default()).unwrap();
            store.put(synced(7, "seven")).unwrap();
        }

        let snapshot_path = dir.path().join(SNAPSHOT_FILE);
        let mut bytes = fs::read(&snapshot_path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&snapshot_path, bytes).unwrap();

        let result = FileItemStore::open(dir.path(), StoreConfig::default());
        assert!(matches!(result, Err(StoreError::Corrupted(_))));
    }

    #[test]
    fn snapshot_header() {
        let encoded = encode_snapshot(&TableData::default()).unwrap();
        assert_eq!(&encoded[0..4], b"FSNP");
        assert_eq!(u16::from_le_bytes([encoded[4], encoded[5]]), SNAPSHOT_VERSION);

        let decoded = decode_snapshot(&encoded).unwrap();
        assert!(decoded.items.is_empty());
        assert!(decode_snapshot(&encoded[..10]).is_err());
    }

    #[test]
    fn replace_is_persisted() {
        let dir = tempdir().unwrap();
        {
            let store = FileItemStore::open(dir.path(), StoreConfig::default()).unwrap();
            let local = store.put(Item::new("hi")).unwrap();
            let mut confirmed = local.clone();
            confirmed.id = 100;
            store.replace(local.key().unwrap(), confirmed).unwrap();
        }

        let store = FileItemStore::open(dir.path(), StoreConfig::default()).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 100);
        assert!(store.list_unsynced().unwrap().is_empty());
    }
}
