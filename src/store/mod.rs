//! Persistence for concept flashcards and the quiz question bank.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored flashcard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub id: Uuid,
    pub chat_id: String,
    pub term: String,
    pub definition: String,
    /// Message the concept was extracted from.
    pub context: String,
    pub auto_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// Flashcard fields supplied on creation.
#[derive(Debug, Clone)]
pub struct NewFlashcard {
    pub term: String,
    pub definition: String,
    pub context: String,
}

/// Flashcard persistence.
///
/// Terms are unique per chat, compared case-insensitively.
#[async_trait]
pub trait FlashcardStore: Send + Sync {
    /// Look up a flashcard by term, ignoring case.
    async fn find_by_term(&self, chat_id: &str, term: &str) -> Result<Option<Flashcard>>;

    /// Store a flashcard. Returns `false` if the term already exists for the chat.
    async fn create(&self, chat_id: &str, card: &NewFlashcard) -> Result<bool>;

    /// All flashcards of a chat, oldest first.
    async fn list(&self, chat_id: &str) -> Result<Vec<Flashcard>>;
}

/// A quiz question saved for later review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionRecord {
    pub id: Uuid,
    pub chat_id: String,
    pub question_html: String,
    pub question_text: String,
    pub correct_answer: Option<String>,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_html: String,
    pub question_text: String,
    pub correct_answer: Option<String>,
    pub topic: String,
}

/// Question bank persistence. Questions are unique per chat by text.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Save a question. Returns `false` if the same text is already banked.
    async fn save_question(&self, chat_id: &str, question: &NewQuestion) -> Result<bool>;

    async fn list_questions(&self, chat_id: &str) -> Result<Vec<QuestionRecord>>;
}
