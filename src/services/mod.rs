//! Collaborator services invoked by the tools.

mod concepts;
mod diagram;
mod quiz;

pub use concepts::{normalize_concept, LlmConceptExtractor};
pub use diagram::{clean_dot_source, GraphvizDiagramService};
pub use quiz::{extract_main_topic, extract_quiz_content, is_more_request, LlmQuizService};

use crate::ai::ChatMessage;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Produces a rendered diagram for a query.
#[async_trait]
pub trait DiagramService: Send + Sync {
    /// Returns the stored image id, or `None` when generation failed.
    async fn generate_diagram_image(
        &self,
        history: &[ChatMessage],
        query: &str,
        chat_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Option<String>;
}

/// A generated quiz.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeneratedQuiz {
    pub quiz_html: String,
    /// Meaningful text the model wrote before the quiz, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizOutcome {
    Generated(GeneratedQuiz),
    Error(String),
}

/// Builds a quiz from the conversation.
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn generate_quiz_from_query(
        &self,
        history: &[ChatMessage],
        query: &str,
        chat_id: Option<&str>,
    ) -> QuizOutcome;
}

/// Extracts `(term, definition)` pairs from recent conversation.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    async fn extract_concepts(&self, conversation: &str, message: &str) -> Result<Vec<(String, String)>>;
}
