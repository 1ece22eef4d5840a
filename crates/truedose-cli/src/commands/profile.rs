//! Best-streak lookups against the local profile store.

use clap::Subcommand;
use truedose_core::{BestStreak, Database, SqliteProfileStore};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the best classic streak ("unknown" when nothing is stored)
    Best {
        /// User id; signed-out players have no best streak
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::Best { user } => {
            let store = SqliteProfileStore::new(Database::open()?);
            let best = BestStreak::lookup(&store, user.as_deref());
            println!("{best}");
        }
    }
    Ok(())
}
