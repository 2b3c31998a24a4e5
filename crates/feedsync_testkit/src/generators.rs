//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random feed data.

use feedsync_store::{Attachment, AttachmentKind, Item};
use proptest::prelude::*;

/// Strategy for generating post bodies.
pub fn content_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ,.!?]{0,64}").expect("Invalid regex")
}

/// Strategy for generating server ids.
pub fn server_id_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000
}

fn attachment_strategy() -> impl Strategy<Value = Option<Attachment>> {
    prop::option::of(
        prop::string::string_regex("[a-z]{1,12}\\.jpg")
            .expect("Invalid regex")
            .prop_map(|url| Attachment {
                url,
                kind: AttachmentKind::Image,
            }),
    )
}

/// Strategy for generating items as the server returns them.
pub fn item_strategy() -> impl Strategy<Value = Item> {
    (
        server_id_strategy(),
        content_strategy(),
        0u32..1_000,
        any::<bool>(),
        0u32..100,
        0u32..100_000,
        attachment_strategy(),
    )
        .prop_map(|(id, content, likes, liked, shares, views, attachment)| {
            let mut item = Item::new(content).with_author("Netology");
            item.id = id;
            item.like_count = likes;
            item.liked_by_caller = liked && likes > 0;
            item.share_count = shares;
            item.view_count = views;
            item.attachment = attachment;
            item.into_synced()
        })
}

/// A mutation whose remote phase can fail.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Like the item.
    Like,
    /// Withdraw a like.
    Unlike,
    /// Flip the like.
    ToggleLike,
    /// Replace the content.
    Edit(String),
    /// Remove the item.
    Remove,
}

/// Strategy for generating mutations.
pub fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        Just(Mutation::Like),
        Just(Mutation::Unlike),
        Just(Mutation::ToggleLike),
        content_strategy().prop_map(Mutation::Edit),
        Just(Mutation::Remove),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn items_are_synced(item in item_strategy()) {
            prop_assert!(item.is_synced);
            prop_assert!(item.id > 0);
            prop_assert!(!item.liked_by_caller || item.like_count > 0);
        }

        #[test]
        fn content_is_bounded(content in content_strategy()) {
            prop_assert!(content.len() <= 64);
        }
    }
}
