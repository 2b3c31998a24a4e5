//! HTTP remote client.
//!
//! The actual HTTP client is abstracted via a trait so the crate does not
//! force a networking stack on its users. A blocking `reqwest`
//! implementation is available behind the `reqwest` feature.

use crate::auth::{Anonymous, TokenSource};
use crate::client::RemoteClient;
use crate::config::RemoteConfig;
use crate::dto::PostDto;
use crate::error::{RemoteError, RemoteResult};
use feedsync_store::Item;
use serde::de::DeserializeOwned;
use std::fmt;

/// HTTP method used by the feed API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Bearer token, if the caller is signed in.
    pub bearer: Option<String>,
    /// JSON body.
    pub body: Option<Vec<u8>>,
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. An `Err`
/// means no response was received at all (connection refused, DNS failure,
/// timeout).
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// Remote client speaking JSON to the feed API.
pub struct HttpRemote<C: HttpClient, T: TokenSource = Anonymous> {
    config: RemoteConfig,
    client: C,
    tokens: T,
}

impl<C: HttpClient> HttpRemote<C, Anonymous> {
    /// Creates an anonymous client.
    pub fn new(config: RemoteConfig, client: C) -> Self {
        Self::with_tokens(config, client, Anonymous)
    }
}

impl<C: HttpClient, T: TokenSource> HttpRemote<C, T> {
    /// Creates a client that authenticates with tokens from `tokens`.
    pub fn with_tokens(config: RemoteConfig, client: C, tokens: T) -> Self {
        Self {
            config,
            client,
            tokens,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn call(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> RemoteResult<Vec<u8>> {
        let request = HttpRequest {
            method,
            url: self.url(path),
            bearer: self.tokens.token(),
            body,
        };

        tracing::debug!(%method, url = %request.url, "remote call");

        let response = self.client.send(request).map_err(RemoteError::Network)?;

        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).into_owned();
            tracing::debug!(%method, path, status = response.status, "remote rejected");
            return Err(RemoteError::Rejected {
                code: response.status,
                message,
            });
        }

        Ok(response.body)
    }

    fn call_json<Res: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> RemoteResult<Res> {
        let bytes = self.call(method, path, body)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::Network(format!("failed to decode response: {}", e)))
    }

    fn call_item(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> RemoteResult<Item> {
        self.call_json::<PostDto>(method, path, body).map(Item::from)
    }

    fn call_items(&self, path: &str) -> RemoteResult<Vec<Item>> {
        let posts: Vec<PostDto> = self.call_json(Method::Get, path, None)?;
        Ok(posts.into_iter().map(Item::from).collect())
    }
}

impl<C: HttpClient, T: TokenSource> RemoteClient for HttpRemote<C, T> {
    fn list(&self) -> RemoteResult<Vec<Item>> {
        self.call_items("/api/posts")
    }

    fn get_by_id(&self, id: i64) -> RemoteResult<Item> {
        self.call_item(Method::Get, &format!("/api/posts/{}", id), None)
    }

    fn create(&self, item: &Item) -> RemoteResult<Item> {
        let body = serde_json::to_vec(&PostDto::from(item))
            .map_err(|e| RemoteError::Network(format!("failed to encode request: {}", e)))?;
        self.call_item(Method::Post, "/api/posts", Some(body))
    }

    fn remove(&self, id: i64) -> RemoteResult<()> {
        self.call(Method::Delete, &format!("/api/posts/{}", id), None)
            .map(|_| ())
    }

    fn like(&self, id: i64) -> RemoteResult<Item> {
        self.call_item(Method::Post, &format!("/api/posts/{}/likes", id), None)
    }

    fn unlike(&self, id: i64) -> RemoteResult<Item> {
        self.call_item(Method::Delete, &format!("/api/posts/{}/likes", id), None)
    }

    fn list_newer_than(&self, id: i64) -> RemoteResult<Vec<Item>> {
        self.call_items(&format!("/api/posts/{}/newer", id))
    }
}
