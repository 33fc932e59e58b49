//! Concept extraction for automatic flashcards.

use super::ConceptExtractor;
use crate::ai::{extract_json_object, AiService, ChatMessage};
use crate::config::Prompts;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const EXTRACT_MAX_TOKENS: u32 = 1000;
const MAX_CONTEXT_CHARS: usize = 500;

/// Asks the completion model for a `{term: definition}` JSON object.
pub struct LlmConceptExtractor {
    ai: Arc<dyn AiService>,
    prompts: Prompts,
}

impl LlmConceptExtractor {
    pub fn new(ai: Arc<dyn AiService>, prompts: Prompts) -> Self {
        Self { ai, prompts }
    }
}

#[async_trait]
impl ConceptExtractor for LlmConceptExtractor {
    #[instrument(skip_all)]
    async fn extract_concepts(&self, conversation: &str, message: &str) -> Result<Vec<(String, String)>> {
        let mut vars = HashMap::new();
        vars.insert("conversation".to_string(), conversation.to_string());
        vars.insert("message".to_string(), message.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.flashcards.extract, &vars);

        let response = self
            .ai
            .get_ai_response(&[ChatMessage::user(prompt)], EXTRACT_MAX_TOKENS, 0.2)
            .await?;

        let Some(json) = extract_json_object(&response) else {
            warn!("No JSON object in concept extraction response");
            return Ok(Vec::new());
        };

        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(json) {
            Ok(map) => {
                let concepts: Vec<(String, String)> = map
                    .into_iter()
                    .filter_map(|(term, definition)| {
                        definition.as_str().map(|d| (term, d.to_string()))
                    })
                    .collect();
                debug!("Extracted {} concepts", concepts.len());
                Ok(concepts)
            }
            Err(e) => {
                warn!("Failed to parse concepts JSON: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

/// Clean an extracted concept into `(term, definition, context)`.
///
/// The term is trimmed and title-cased; the context is cut to 500 characters.
/// Returns `None` for terms under 2 characters or definitions under 10.
pub fn normalize_concept(term: &str, definition: &str, context: &str) -> Option<(String, String, String)> {
    let term = title_case(term.trim());
    let definition = definition.trim().to_string();

    if term.chars().count() < 2 || definition.chars().count() < 10 {
        return None;
    }

    let context: String = context.chars().take(MAX_CONTEXT_CHARS).collect();
    Some((term, definition, context))
}

/// Capitalize the first letter of every alphabetic run and lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
