//! In-memory store for tests and ephemeral sessions.

use super::{Flashcard, FlashcardStore, NewFlashcard, NewQuestion, QuestionBank, QuestionRecord};
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    flashcards: RwLock<Vec<Flashcard>>,
    questions: RwLock<Vec<QuestionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> TutorlyError {
    TutorlyError::Storage(format!("Store lock poisoned: {}", e))
}

#[async_trait]
impl FlashcardStore for MemoryStore {
    async fn find_by_term(&self, chat_id: &str, term: &str) -> Result<Option<Flashcard>> {
        let cards = self.flashcards.read().map_err(poisoned)?;
        Ok(cards
            .iter()
            .find(|c| c.chat_id == chat_id && c.term.eq_ignore_ascii_case(term))
            .cloned())
    }

    async fn create(&self, chat_id: &str, card: &NewFlashcard) -> Result<bool> {
        // Check and insert under one write lock so concurrent callers cannot both insert.
        let mut cards = self.flashcards.write().map_err(poisoned)?;
        if cards
            .iter()
            .any(|c| c.chat_id == chat_id && c.term.eq_ignore_ascii_case(&card.term))
        {
            return Ok(false);
        }

        cards.push(Flashcard {
            id: Uuid::new_v4(),
            chat_id: chat_id.to_string(),
            term: card.term.clone(),
            definition: card.definition.clone(),
            context: card.context.clone(),
            auto_generated: true,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list(&self, chat_id: &str) -> Result<Vec<Flashcard>> {
        let cards = self.flashcards.read().map_err(poisoned)?;
        Ok(cards.iter().filter(|c| c.chat_id == chat_id).cloned().collect())
    }
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn save_question(&self, chat_id: &str, question: &NewQuestion) -> Result<bool> {
        let mut questions = self.questions.write().map_err(poisoned)?;
        if questions
            .iter()
            .any(|q| q.chat_id == chat_id && q.question_text == question.question_text)
        {
            return Ok(false);
        }

        questions.push(QuestionRecord {
            id: Uuid::new_v4(),
            chat_id: chat_id.to_string(),
            question_html: question.question_html.clone(),
            question_text: question.question_text.clone(),
            correct_answer: question.correct_answer.clone(),
            topic: question.topic.clone(),
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_questions(&self, chat_id: &str) -> Result<Vec<QuestionRecord>> {
        let questions = self.questions.read().map_err(poisoned)?;
        Ok(questions.iter().filter(|q| q.chat_id == chat_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(term: &str) -> NewFlashcard {
        NewFlashcard {
            term: term.to_string(),
            definition: "A definition long enough".to_string(),
            context: "ctx".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_terms_ignore_case() {
        let store = MemoryStore::new();
        assert!(store.create("c", &card("Photosynthesis")).await.unwrap());
        assert!(!store.create("c", &card("photosynthesis")).await.unwrap());
        assert!(store.create("other", &card("Photosynthesis")).await.unwrap());
        assert_eq!(store.list("c").await.unwrap().len(), 1);
        assert!(store.find_by_term("c", "PHOTOSYNTHESIS").await.unwrap().is_some());
    }
}
