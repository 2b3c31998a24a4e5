//! CLI command implementations.

pub mod draft;
pub mod inspect;
pub mod item;
pub mod list;
pub mod sync;
pub mod watch;

use feedsync_engine::{EngineConfig, SyncEngine};
use feedsync_remote::{
    HttpRemote, RemoteClient, RemoteConfig, RemoteError, RemoteResult, ReqwestClient, StaticToken,
};
use feedsync_store::{FileItemStore, Item, ItemKey, StoreConfig};
use std::path::PathBuf;

/// Result type for commands.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// The engine every command runs against.
pub type CliEngine = SyncEngine<FileItemStore, Connection>;

/// Global options shared by all commands.
pub struct Context {
    path: PathBuf,
    server: Option<String>,
    token: Option<String>,
}

impl Context {
    /// Creates a context from the global flags.
    pub fn new(path: PathBuf, server: Option<String>, token: Option<String>) -> Self {
        Self {
            path,
            server,
            token,
        }
    }

    /// Opens the store directory.
    pub fn open_store(&self) -> CliResult<FileItemStore> {
        tracing::debug!(path = %self.path.display(), "opening store");
        Ok(FileItemStore::open(&self.path, StoreConfig::default())?)
    }

    /// Returns true if a server was configured.
    pub fn has_server(&self) -> bool {
        self.server.is_some()
    }

    /// Fails unless a server was configured.
    pub fn require_server(&self) -> CliResult<()> {
        if !self.has_server() {
            return Err("Server URL required (--server or FEEDSYNC_SERVER)".into());
        }
        Ok(())
    }

    /// Builds the engine over the store and the configured server.
    ///
    /// Without a server every remote call fails as a network error, so
    /// creates stay unsynced.
    pub fn open_engine(&self) -> CliResult<CliEngine> {
        let store = self.open_store()?;
        let remote = match &self.server {
            Some(url) => {
                let config = RemoteConfig::new(url.as_str());
                let client = ReqwestClient::new(&config)?;
                let tokens = match &self.token {
                    Some(token) => StaticToken::new(token.as_str()),
                    None => StaticToken::default(),
                };
                Connection(Some(HttpRemote::with_tokens(config, client, tokens)))
            }
            None => Connection(None),
        };
        Ok(SyncEngine::new(EngineConfig::default(), store, remote))
    }
}

/// The configured server, if any.
pub struct Connection(Option<HttpRemote<ReqwestClient, StaticToken>>);

impl Connection {
    fn remote(&self) -> RemoteResult<&HttpRemote<ReqwestClient, StaticToken>> {
        self.0
            .as_ref()
            .ok_or_else(|| RemoteError::network("no server configured"))
    }
}

impl RemoteClient for Connection {
    fn list(&self) -> RemoteResult<Vec<Item>> {
        self.remote()?.list()
    }

    fn get_by_id(&self, id: i64) -> RemoteResult<Item> {
        self.remote()?.get_by_id(id)
    }

    fn create(&self, item: &Item) -> RemoteResult<Item> {
        self.remote()?.create(item)
    }

    fn remove(&self, id: i64) -> RemoteResult<()> {
        self.remote()?.remove(id)
    }

    fn like(&self, id: i64) -> RemoteResult<Item> {
        self.remote()?.like(id)
    }

    fn unlike(&self, id: i64) -> RemoteResult<Item> {
        self.remote()?.unlike(id)
    }

    fn list_newer_than(&self, id: i64) -> RemoteResult<Vec<Item>> {
        self.remote()?.list_newer_than(id)
    }
}

/// Parses `<id>` or `local:<id>`.
pub fn parse_key(raw: &str) -> Result<ItemKey, String> {
    let (local, digits) = match raw.strip_prefix("local:") {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let id: i64 = digits
        .parse()
        .map_err(|_| format!("Invalid item key: {:?}", raw))?;
    if id <= 0 {
        return Err(format!("Invalid item key: {:?}", raw));
    }
    Ok(if local {
        ItemKey::Local(id)
    } else {
        ItemKey::Server(id)
    })
}

/// Renders one item as a single text line.
pub fn format_item(item: &Item) -> String {
    let key = item
        .key()
        .map(|key| key.to_string())
        .unwrap_or_else(|| "-".into());
    let heart = if item.liked_by_caller { "♥" } else { "♡" };
    let status = if item.is_synced { "" } else { " [unsynced]" };
    format!(
        "{:>16}  {} · {}  {} {}  shares {}  views {}{}\n    {}",
        key,
        item.author,
        item.published_label,
        heart,
        item.like_count,
        item.share_count,
        item.view_count,
        status,
        item.content
    )
}
