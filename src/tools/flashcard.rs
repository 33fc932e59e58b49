use super::{contains_any, word_count};
use crate::agent::{preview, ChatContext, MessageType, Tool, ToolResult, ToolRole};
use crate::ai::history_text;
use crate::error::Result;
use crate::services::{normalize_concept, ConceptExtractor};
use crate::store::{FlashcardStore, NewFlashcard};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

const EDUCATIONAL_INDICATORS: &[&str] = &[
    "explain",
    "definition",
    "means",
    "refers to",
    "concept",
    "theory",
    "principle",
];

/// Background tool that turns newly discussed concepts into flashcards.
///
/// Scores zero when no concept extractor is configured.
pub struct FlashcardConceptTracker {
    store: Arc<dyn FlashcardStore>,
    extractor: Option<Arc<dyn ConceptExtractor>>,
    max_recent_messages: usize,
}

impl FlashcardConceptTracker {
    pub fn new(
        store: Arc<dyn FlashcardStore>,
        extractor: Option<Arc<dyn ConceptExtractor>>,
        max_recent_messages: usize,
    ) -> Self {
        Self {
            store,
            extractor,
            max_recent_messages,
        }
    }

    /// Store a concept unless the chat already has a card for the term.
    async fn create_if_new(&self, chat_id: &str, term: &str, definition: &str, context: &str) -> Option<String> {
        let (term, definition, context) = normalize_concept(term, definition, context)?;

        match self.store.find_by_term(chat_id, &term).await {
            Ok(Some(_)) => return None,
            Ok(None) => {}
            Err(e) => {
                error!("Error looking up flashcard {}: {}", term, e);
                return None;
            }
        }

        let card = NewFlashcard {
            term: term.clone(),
            definition,
            context,
        };
        match self.store.create(chat_id, &card).await {
            Ok(true) => {
                info!("Created flashcard for concept: {}", term);
                Some(term)
            }
            Ok(false) => None,
            Err(e) => {
                error!("Error creating flashcard {}: {}", term, e);
                None
            }
        }
    }
}

#[async_trait]
impl Tool for FlashcardConceptTracker {
    fn name(&self) -> &'static str {
        "flashcard_concept_tracker"
    }

    fn description(&self) -> &'static str {
        "Automatically identifies and creates flashcards for new concepts discussed in the conversation"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[]
    }

    fn role(&self) -> ToolRole {
        ToolRole::Background
    }

    async fn can_handle(&self, message: &str, _context: &ChatContext) -> Result<f32> {
        if self.extractor.is_none() {
            return Ok(0.0);
        }

        let words = word_count(message);
        if words < 5 {
            return Ok(0.0);
        }
        if contains_any(&message.to_lowercase(), EDUCATIONAL_INDICATORS) {
            return Ok(0.8);
        }
        if words > 15 {
            return Ok(0.6);
        }
        Ok(0.4)
    }

    async fn execute(&self, message: &str, context: &ChatContext) -> ToolResult {
        info!("FlashcardConceptTracker processing message: {}", preview(message, 50));

        let Some(extractor) = &self.extractor else {
            return ToolResult::failure(MessageType::BackgroundProcess, "Concept extraction is not configured");
        };
        let Some(chat_id) = context.chat_id.as_deref() else {
            warn!("No chat to attach flashcards to");
            return ToolResult::failure(MessageType::BackgroundProcess, "No chat available for flashcards");
        };

        let conversation = history_text(context.recent_messages(self.max_recent_messages));
        let concepts = match extractor.extract_concepts(&conversation, message).await {
            Ok(c) => c,
            Err(e) => {
                error!("FlashcardConceptTracker error: {}", e);
                return ToolResult::failure(
                    MessageType::BackgroundProcess,
                    format!("Flashcard processing error: {}", e),
                );
            }
        };

        let mut added = Vec::new();
        for (term, definition) in &concepts {
            if let Some(term) = self.create_if_new(chat_id, term, definition, message).await {
                added.push(term);
            }
        }

        let result = if added.is_empty() {
            ToolResult::success(MessageType::BackgroundProcess, None)
        } else {
            ToolResult::success(
                MessageType::BackgroundProcess,
                Some(format!(
                    "Added {} new concept(s) to your flashcard vault",
                    added.len()
                )),
            )
        };

        result
            .with_metadata("tool_used", self.name())
            .with_metadata("flashcards_created", added.len())
            .with_metadata("concepts_added", added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tools::testing::context;

    struct Fixed(Vec<(&'static str, &'static str)>);

    #[async_trait]
    impl ConceptExtractor for Fixed {
        async fn extract_concepts(&self, _conversation: &str, _message: &str) -> Result<Vec<(String, String)>> {
            Ok(self
                .0
                .iter()
                .map(|(t, d)| (t.to_string(), d.to_string()))
                .collect())
        }
    }

    fn tracker(store: Arc<MemoryStore>, concepts: Vec<(&'static str, &'static str)>) -> FlashcardConceptTracker {
        FlashcardConceptTracker::new(store, Some(Arc::new(Fixed(concepts))), 5)
    }

    #[tokio::test]
    async fn test_scores() {
        let t = tracker(Arc::new(MemoryStore::new()), vec![]);
        let ctx = context();
        assert_eq!(t.can_handle("too short", &ctx).await.unwrap(), 0.0);
        assert_eq!(t.can_handle("please explain the krebs cycle", &ctx).await.unwrap(), 0.8);
        assert_eq!(t.can_handle("I went to the lab today", &ctx).await.unwrap(), 0.4);
        let long = "word ".repeat(16);
        assert_eq!(t.can_handle(&long, &ctx).await.unwrap(), 0.6);

        let disabled = FlashcardConceptTracker::new(Arc::new(MemoryStore::new()), None, 5);
        assert_eq!(disabled.can_handle("please explain the krebs cycle", &ctx).await.unwrap(), 0.0);
        assert_eq!(disabled.role(), ToolRole::Background);
    }

    #[tokio::test]
    async fn test_duplicate_terms_are_stored_once() {
        let store = Arc::new(MemoryStore::new());
        let t = tracker(
            store.clone(),
            vec![
                ("osmosis", "movement of water across a membrane"),
                ("OSMOSIS", "movement of water across a membrane"),
                ("x", "too short a term to keep"),
            ],
        );

        let first = t.execute("explain osmosis to me please", &context()).await;
        assert!(first.is_success());
        assert_eq!(first.message_type(), MessageType::BackgroundProcess);
        assert_eq!(first.metadata().unwrap()["flashcards_created"], 1);

        let second = t.execute("explain osmosis to me please", &context()).await;
        assert!(second.is_success());
        assert!(second.content().is_none());
        assert_eq!(second.metadata().unwrap()["flashcards_created"], 0);

        let cards = store.list("chat-1").await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].term, "Osmosis");
    }
}
