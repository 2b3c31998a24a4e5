//! # feedsync Store
//!
//! Local item store and observable feed for feedsync.
//!
//! The store is the single source of truth for what a consumer displays.
//! It keeps one row per logical item, addressed either by the server id
//! or, for items created while offline, by a locally allocated id.
//!
//! ## Design Principles
//!
//! - Every operation is atomic; none perform network I/O
//! - Each committed write emits one ordered [`FeedSnapshot`]
//! - Replacing a local row by its server copy is a single commit
//!
//! ## Available Stores
//!
//! - [`MemoryItemStore`] - For testing and ephemeral sessions
//! - [`FileItemStore`] - Persistent, checksummed snapshot on disk

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod feed;
mod file;
mod item;
mod memory;
mod store;
mod table;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use feed::{FeedSnapshot, ItemFeed};
pub use file::{FileItemStore, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use item::{feed_order, Attachment, AttachmentKind, Item, ItemKey};
pub use memory::MemoryItemStore;
pub use store::ItemStore;
