//! # feedsync Remote
//!
//! Typed client for the remote feed API.
//!
//! This crate provides:
//! - The [`RemoteClient`] trait the sync engine talks to
//! - An HTTP/JSON implementation over a pluggable [`HttpClient`]
//! - Bearer credential sources
//! - [`MemoryRemote`], an in-process fake server for tests
//!
//! ## Failure Model
//!
//! Every call either succeeds or fails with one of two kinds:
//! [`RemoteError::Network`] (no usable response) or
//! [`RemoteError::Rejected`] (the server declined). Nothing else escapes.
//!
//! ## Routes
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | list | GET | `/api/posts` |
//! | get_by_id | GET | `/api/posts/{id}` |
//! | create | POST | `/api/posts` |
//! | remove | DELETE | `/api/posts/{id}` |
//! | like | POST | `/api/posts/{id}/likes` |
//! | unlike | DELETE | `/api/posts/{id}/likes` |
//! | list_newer_than | GET | `/api/posts/{id}/newer` |

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod client;
mod config;
mod dto;
mod error;
mod http;
mod memory;
#[cfg(feature = "reqwest")]
mod reqwest_client;

pub use auth::{Anonymous, StaticToken, TokenSource};
pub use client::RemoteClient;
pub use config::RemoteConfig;
pub use dto::{AttachmentDto, AttachmentTypeDto, PostDto};
pub use error::{RemoteError, RemoteResult};
pub use http::{HttpClient, HttpRemote, HttpRequest, HttpResponse, Method};
pub use memory::MemoryRemote;
#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;
