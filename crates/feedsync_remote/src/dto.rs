//! Wire representation of feed items.

use feedsync_store::{Attachment, AttachmentKind, Item};
use serde::{Deserialize, Serialize};

/// Attachment type as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentTypeDto {
    /// A still image.
    Image,
}

/// Attachment as sent and received by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDto {
    /// Media location.
    pub url: String,
    /// Media type.
    #[serde(rename = "type")]
    pub kind: AttachmentTypeDto,
}

/// A post as sent and received by the API.
///
/// Only server-known fields are present; local identity never leaves the
/// device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    /// Server id, `0` for a create.
    #[serde(default)]
    pub id: i64,
    /// Author display name.
    #[serde(default)]
    pub author: String,
    /// Author avatar reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Publication label.
    #[serde(default)]
    pub published: String,
    /// Like count.
    #[serde(default)]
    pub likes: u32,
    /// Whether the caller liked the post.
    #[serde(default)]
    pub liked_by_me: bool,
    /// Share count.
    #[serde(default)]
    pub shares: u32,
    /// View count.
    #[serde(default)]
    pub views: u32,
    /// Video reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Attached media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentDto>,
}

impl From<&Item> for PostDto {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            author: item.author.clone(),
            author_avatar: item.author_avatar.clone(),
            content: item.content.clone(),
            published: item.published_label.clone(),
            likes: item.like_count,
            liked_by_me: item.liked_by_caller,
            shares: item.share_count,
            views: item.view_count,
            video: item.video_ref.clone(),
            attachment: item.attachment.as_ref().map(|a| AttachmentDto {
                url: a.url.clone(),
                kind: match a.kind {
                    AttachmentKind::Image => AttachmentTypeDto::Image,
                },
            }),
        }
    }
}

impl From<PostDto> for Item {
    fn from(dto: PostDto) -> Self {
        Item {
            id: dto.id,
            local_id: None,
            is_synced: true,
            content: dto.content,
            author: dto.author,
            author_avatar: dto.author_avatar,
            published_label: dto.published,
            like_count: dto.likes,
            liked_by_caller: dto.liked_by_me,
            share_count: dto.shares,
            view_count: dto.views,
            video_ref: dto.video,
            attachment: dto.attachment.map(|a| Attachment {
                url: a.url,
                kind: match a.kind {
                    AttachmentTypeDto::Image => AttachmentKind::Image,
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_json() {
        let json = r#"{
            "id": 3,
            "author": "Netology",
            "content": "hello",
            "published": "21 May 18:36",
            "likes": 10,
            "likedByMe": true,
            "attachment": { "url": "cat.jpg", "type": "IMAGE" }
        }"#;

        let item: Item = serde_json::from_str::<PostDto>(json).unwrap().into();
        assert_eq!(item.id, 3);
        assert!(item.is_synced);
        assert!(item.liked_by_caller);
        assert_eq!(item.like_count, 10);
        assert_eq!(item.share_count, 0);
        assert_eq!(item.attachment.unwrap().kind, AttachmentKind::Image);
    }

    #[test]
    fn local_identity_stays_off_the_wire() {
        let mut item = Item::new("offline");
        item.local_id = Some(1234);

        let json = serde_json::to_value(PostDto::from(&item)).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["likedByMe"], false);
        assert!(json.get("localId").is_none());
        assert!(json.get("isSynced").is_none());
        assert!(json.get("video").is_none());
    }
}
