use clap::Subcommand;
use truedose_core::Database;

#[derive(Subcommand)]
pub enum BookmarksAction {
    /// List bookmarked fact ids
    List,
    /// Remove a bookmark
    Remove {
        /// Fact id
        id: String,
    },
}

pub fn run(action: BookmarksAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        BookmarksAction::List => {
            println!("{}", serde_json::to_string_pretty(&db.bookmarks()?)?);
        }
        BookmarksAction::Remove { id } => {
            db.remove_bookmark(&id)?;
            println!("ok");
        }
    }
    Ok(())
}
