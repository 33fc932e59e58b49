//! Flashcards command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{FlashcardStore, SqliteStore};
use anyhow::Result;

/// List the flashcards collected in a chat.
pub async fn run_flashcards(chat: &str, settings: Settings) -> Result<()> {
    let db_path = settings.database_path();
    if !db_path.exists() {
        Output::info("No flashcards yet.");
        return Ok(());
    }

    let store = SqliteStore::new(&db_path)?;
    let cards = store.list(chat).await?;

    if cards.is_empty() {
        Output::info(&format!("No flashcards in chat '{}'.", chat));
        return Ok(());
    }

    Output::header(&format!("Flashcards ({})", cards.len()));
    for card in &cards {
        Output::flashcard(card);
    }
    Ok(())
}
