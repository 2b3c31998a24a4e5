//! # feedsync Engine
//!
//! Offline-first synchronization between a local item store and the remote
//! feed.
//!
//! This crate provides:
//! - [`SyncEngine`], the optimistic mutation protocol with rollback
//! - Deferred creates and the unsynced retry sweep
//! - Full refresh and newer-item discovery with merge on demand
//! - [`Poller`], a background task that buffers newer items
//! - Per-item serialization through [`KeyLocks`]
//!
//! ## Protocol
//!
//! Mutations are applied locally first, confirmed remotely, then reconciled:
//! 1. Apply the change to the store (the feed re-emits at once)
//! 2. Call the remote operation
//! 3. Store the server's copy, or restore the pre-mutation row
//!
//! ## Key Invariants
//!
//! - A failed like, unlike, edit or remove leaves the row exactly as before
//! - A confirmed create replaces its local row; nothing is merged
//! - Unsynced rows never reach remote like, unlike or edit endpoints
//! - A retry sweep never pushes the same row twice
//! - Discovery never writes the store
//!
//! ## Example
//!
//! ```rust
//! use feedsync_engine::{EngineConfig, SyncEngine};
//! use feedsync_remote::MemoryRemote;
//! use feedsync_store::{Item, MemoryItemStore};
//!
//! let engine = SyncEngine::new(EngineConfig::default(), MemoryItemStore::new(), MemoryRemote::new());
//! let created = engine.create(Item::new("hello")).unwrap();
//! assert!(created.is_synced);
//!
//! let liked = engine.like(created.id).unwrap();
//! assert_eq!(liked.like_count, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod locks;
mod poller;

pub use config::{EngineConfig, PollConfig, RetryConfig};
pub use engine::{NewerBatch, RetryFailure, RetryReport, SyncEngine, SyncStats};
pub use error::{ErrorKind, LocalStateError, SyncError, SyncResult};
pub use locks::{KeyGuard, KeyLocks};
pub use poller::{PollStats, Poller, PollerHandle};
