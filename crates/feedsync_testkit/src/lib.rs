//! # feedsync Testkit
//!
//! Test utilities for feedsync.
//!
//! This crate provides:
//! - Item fixtures and temporary file-backed stores
//! - An engine wired to an in-process fake server
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feedsync_testkit::prelude::*;
//!
//! #[test]
//! fn like_then_rollback() {
//!     let t = TestEngine::with_remote_posts([synced_item(1, "hello")]);
//!     t.remote.reject_next(403);
//!     assert!(t.like(1i64).is_err());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
