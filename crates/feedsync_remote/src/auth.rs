//! Bearer credential sources.

use parking_lot::RwLock;

/// Supplies the bearer token attached to remote calls.
///
/// Returning `None` sends the request anonymously; read operations still
/// work without a credential.
pub trait TokenSource: Send + Sync {
    /// Returns the current token.
    fn token(&self) -> Option<String>;
}

/// Never supplies a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A token set by the auth collaborator, replaceable at runtime.
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<String>>,
}

impl StaticToken {
    /// Creates a source holding `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Replaces the token after sign-in.
    pub fn set(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Drops the token after sign-out.
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
