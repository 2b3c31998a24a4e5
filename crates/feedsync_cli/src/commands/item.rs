//! Single-item commands.

use super::{format_item, parse_key, CliResult, Context};
use feedsync_engine::ErrorKind;
use feedsync_store::Item;

/// A mutation of one item.
pub enum ItemAction {
    /// Create a post.
    Post {
        /// Body.
        content: String,
        /// Author override.
        author: Option<String>,
    },
    /// Replace content.
    Edit {
        /// Raw key.
        key: String,
        /// New body.
        content: String,
    },
    /// Remove.
    Remove {
        /// Raw key.
        key: String,
    },
    /// Like.
    Like {
        /// Raw key.
        key: String,
    },
    /// Withdraw a like.
    Unlike {
        /// Raw key.
        key: String,
    },
    /// Count a share.
    Share {
        /// Raw key.
        key: String,
    },
    /// Count a view.
    View {
        /// Raw key.
        key: String,
    },
}

/// Runs one item command.
pub fn run(ctx: &Context, action: ItemAction) -> CliResult<()> {
    match action {
        ItemAction::Post { content, author } => post(ctx, content, author),
        ItemAction::Edit { key, content } => {
            ctx.require_server()?;
            let engine = ctx.open_engine()?;
            let item = engine.edit(parse_key(&key)?, content)?;
            println!("{}", format_item(&item));
            Ok(())
        }
        ItemAction::Remove { key } => {
            let key = parse_key(&key)?;
            if !key.is_local() {
                ctx.require_server()?;
            }
            ctx.open_engine()?.remove(key)?;
            println!("Removed {}", key);
            Ok(())
        }
        ItemAction::Like { key } => {
            ctx.require_server()?;
            let item = ctx.open_engine()?.like(parse_key(&key)?)?;
            println!("{}", format_item(&item));
            Ok(())
        }
        ItemAction::Unlike { key } => {
            ctx.require_server()?;
            let item = ctx.open_engine()?.unlike(parse_key(&key)?)?;
            println!("{}", format_item(&item));
            Ok(())
        }
        ItemAction::Share { key } => {
            let item = ctx.open_engine()?.share(parse_key(&key)?)?;
            println!("{}", format_item(&item));
            Ok(())
        }
        ItemAction::View { key } => {
            let item = ctx.open_engine()?.view(parse_key(&key)?)?;
            println!("{}", format_item(&item));
            Ok(())
        }
    }
}

fn post(ctx: &Context, content: String, author: Option<String>) -> CliResult<()> {
    let engine = ctx.open_engine()?;
    let mut item = Item::new(content);
    if let Some(author) = author {
        item = item.with_author(author);
    }

    match engine.create(item) {
        Ok(created) => {
            engine.clear_draft()?;
            println!("{}", format_item(&created));
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::Store => Err(err.into()),
        Err(err) => {
            // The row is kept unsynced; the draft is consumed.
            engine.clear_draft()?;
            println!(
                "Stored offline ({} unsynced); run `feedsync sync` to publish",
                engine.unsynced_count()?
            );
            if ctx.has_server() {
                Err(err.into())
            } else {
                Ok(())
            }
        }
    }
}
