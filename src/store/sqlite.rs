//! SQLite-backed flashcard and question bank store.

use super::{Flashcard, FlashcardStore, NewFlashcard, NewQuestion, QuestionBank, QuestionRecord};
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS flashcards (
        id TEXT PRIMARY KEY,
        chat_id TEXT NOT NULL,
        term TEXT NOT NULL,
        definition TEXT NOT NULL,
        context TEXT NOT NULL,
        auto_generated INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_flashcards_chat_term
        ON flashcards(chat_id, term COLLATE NOCASE);

    CREATE TABLE IF NOT EXISTS question_bank (
        id TEXT PRIMARY KEY,
        chat_id TEXT NOT NULL,
        question_html TEXT NOT NULL,
        question_text TEXT NOT NULL,
        correct_answer TEXT,
        topic TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_question_bank_chat_text
        ON question_bank(chat_id, question_text);
"#;

/// SQLite store for flashcards and banked questions.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TutorlyError::Storage(format!("Failed to acquire lock: {}", e)))
    }

    fn parse_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_flashcard(row: &Row<'_>) -> rusqlite::Result<Flashcard> {
        let id: String = row.get(0)?;
        let created_at: String = row.get(6)?;
        Ok(Flashcard {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            chat_id: row.get(1)?,
            term: row.get(2)?,
            definition: row.get(3)?,
            context: row.get(4)?,
            auto_generated: row.get(5)?,
            created_at: Self::parse_time(&created_at),
        })
    }

    fn row_to_question(row: &Row<'_>) -> rusqlite::Result<QuestionRecord> {
        let id: String = row.get(0)?;
        let created_at: String = row.get(6)?;
        Ok(QuestionRecord {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            chat_id: row.get(1)?,
            question_html: row.get(2)?,
            question_text: row.get(3)?,
            correct_answer: row.get(4)?,
            topic: row.get(5)?,
            created_at: Self::parse_time(&created_at),
        })
    }
}

#[async_trait]
impl FlashcardStore for SqliteStore {
    async fn find_by_term(&self, chat_id: &str, term: &str) -> Result<Option<Flashcard>> {
        let conn = self.lock()?;
        let card = conn
            .query_row(
                "SELECT id, chat_id, term, definition, context, auto_generated, created_at
                 FROM flashcards WHERE chat_id = ?1 AND term = ?2 COLLATE NOCASE",
                params![chat_id, term],
                Self::row_to_flashcard,
            )
            .optional()?;
        Ok(card)
    }

    #[instrument(skip(self, card), fields(term = %card.term))]
    async fn create(&self, chat_id: &str, card: &NewFlashcard) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO flashcards
             (id, chat_id, term, definition, context, auto_generated, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                Uuid::new_v4().to_string(),
                chat_id,
                card.term,
                card.definition,
                card.context,
                Utc::now().to_rfc3339(),
            ],
        )?;
        debug!("Flashcard insert affected {} rows", inserted);
        Ok(inserted > 0)
    }

    async fn list(&self, chat_id: &str) -> Result<Vec<Flashcard>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, chat_id, term, definition, context, auto_generated, created_at
             FROM flashcards WHERE chat_id = ?1 ORDER BY created_at, rowid",
        )?;
        let cards = stmt
            .query_map(params![chat_id], Self::row_to_flashcard)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cards)
    }
}

#[async_trait]
impl QuestionBank for SqliteStore {
    async fn save_question(&self, chat_id: &str, question: &NewQuestion) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO question_bank
             (id, chat_id, question_html, question_text, correct_answer, topic, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Uuid::new_v4().to_string(),
                chat_id,
                question.question_html,
                question.question_text,
                question.correct_answer,
                question.topic,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    async fn list_questions(&self, chat_id: &str) -> Result<Vec<QuestionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, chat_id, question_html, question_text, correct_answer, topic, created_at
             FROM question_bank WHERE chat_id = ?1 ORDER BY created_at, rowid",
        )?;
        let questions = stmt
            .query_map(params![chat_id], Self::row_to_question)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(questions)
    }
}
