//! Draft command implementation.

use super::{CliResult, Context};
use feedsync_store::ItemStore;

/// What to do with the draft.
pub enum DraftAction {
    /// Print it.
    Show,
    /// Replace it.
    Set(String),
    /// Discard it.
    Clear,
}

/// Runs the draft command.
pub fn run(ctx: &Context, action: DraftAction) -> CliResult<()> {
    let store = ctx.open_store()?;
    match action {
        DraftAction::Show => match store.load_draft()? {
            Some(draft) => println!("{}", draft),
            None => println!("(no draft)"),
        },
        DraftAction::Set(text) => {
            store.save_draft(&text)?;
            println!("Draft saved");
        }
        DraftAction::Clear => {
            store.clear_draft()?;
            println!("Draft cleared");
        }
    }
    Ok(())
}
