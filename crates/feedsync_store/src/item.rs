//! Feed item model.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Kind of media attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    /// A still image.
    Image,
}

/// Media attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Location of the media.
    pub url: String,
    /// Media kind.
    pub kind: AttachmentKind,
}

/// The key a row is addressed by.
///
/// Rows known to the server are keyed by their server id. Rows created
/// while offline are keyed by the local id the store assigned them. A row
/// has exactly one key at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKey {
    /// Server-assigned identity.
    Server(i64),
    /// Local identity of a not-yet-created item.
    Local(i64),
}

impl ItemKey {
    /// Returns true for keys of rows not yet confirmed by the server.
    pub fn is_local(&self) -> bool {
        matches!(self, ItemKey::Local(_))
    }

    /// Returns the server id, if any.
    pub fn server_id(&self) -> Option<i64> {
        match self {
            ItemKey::Server(id) => Some(*id),
            ItemKey::Local(_) => None,
        }
    }
}

impl From<i64> for ItemKey {
    fn from(id: i64) -> Self {
        ItemKey::Server(id)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Server(id) => write!(f, "{}", id),
            ItemKey::Local(id) => write!(f, "local:{}", id),
        }
    }
}

/// A feed entry.
///
/// `id == 0` means the item has not been created on the server yet; such
/// items carry a `local_id` and `is_synced == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Server-assigned identifier, `0` when not yet created remotely.
    pub id: i64,
    /// Local ownership token for items created while offline.
    pub local_id: Option<i64>,
    /// Whether the row reflects the server's last acknowledged state.
    pub is_synced: bool,
    /// Body text.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Author avatar reference.
    pub author_avatar: Option<String>,
    /// Human-readable publication label.
    pub published_label: String,
    /// Number of likes.
    pub like_count: u32,
    /// Whether the current caller liked the item.
    pub liked_by_caller: bool,
    /// Number of shares.
    pub share_count: u32,
    /// Number of views.
    pub view_count: u32,
    /// Video reference.
    pub video_ref: Option<String>,
    /// Attached media.
    pub attachment: Option<Attachment>,
}

impl Item {
    /// Creates a new, not yet created item with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: 0,
            local_id: None,
            is_synced: false,
            content: content.into(),
            author: String::new(),
            author_avatar: None,
            published_label: String::new(),
            like_count: 0,
            liked_by_caller: false,
            share_count: 0,
            view_count: 0,
            video_ref: None,
            attachment: None,
        }
    }

    /// Sets the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets the publication label.
    #[must_use]
    pub fn with_published_label(mut self, label: impl Into<String>) -> Self {
        self.published_label = label.into();
        self
    }

    /// Sets the video reference.
    #[must_use]
    pub fn with_video(mut self, video_ref: impl Into<String>) -> Self {
        self.video_ref = Some(video_ref.into());
        self
    }

    /// Sets the attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Returns the key this row is stored under.
    ///
    /// Returns `None` for an unsynced item without a local id, which has
    /// not been written to a store yet.
    pub fn key(&self) -> Option<ItemKey> {
        if self.id > 0 {
            Some(ItemKey::Server(self.id))
        } else {
            self.local_id.map(ItemKey::Local)
        }
    }

    /// Marks the item as the server's authoritative copy.
    #[must_use]
    pub fn into_synced(mut self) -> Self {
        self.local_id = None;
        self.is_synced = true;
        self
    }
}

/// Default presentation order.
///
/// Unsynced rows sort first, newest local id first, followed by synced
/// rows in descending server id.
pub fn feed_order(a: &Item, b: &Item) -> Ordering {
    match (a.key(), b.key()) {
        (Some(ItemKey::Local(x)), Some(ItemKey::Local(y))) => y.cmp(&x),
        (Some(ItemKey::Local(_)), _) => Ordering::Less,
        (_, Some(ItemKey::Local(_))) => Ordering::Greater,
        _ => b.id.cmp(&a.id),
    }
}
