use super::{compile_patterns, contains_any, matches_any, word_count};
use crate::agent::{preview, ChatContext, MessageType, Tool, ToolResult, FILES_RAG_INSTANCE};
use crate::error::Result;
use crate::rag::{format_passages_for_prompt, DocumentIndex};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};
use tracing::{error, info};

const TRIGGERS: &[&str] = &[
    "according to",
    "based on",
    "from the document",
    "in the file",
    "what does the document say",
    "search",
    "find",
    "reference",
];

static EXPLICIT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_patterns(&[
        r"(according to|based on|from)\s+(the\s+)?(document|file|paper|pdf)",
        r"what does (the|my) (document|file|paper) say",
        r"find.*in.*document",
        r"search.*document",
    ])
});

const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where", "who", "explain"];

/// Answers from the documents uploaded to the chat.
///
/// The index registered in the chat context under [`FILES_RAG_INSTANCE`]
/// takes precedence over the one the tool was built with.
pub struct ContextTool {
    index: Option<Arc<dyn DocumentIndex>>,
}

impl ContextTool {
    pub fn new(index: Option<Arc<dyn DocumentIndex>>) -> Self {
        Self { index }
    }

    fn resolve_index(&self, context: &ChatContext) -> Option<Arc<dyn DocumentIndex>> {
        context
            .index(FILES_RAG_INSTANCE)
            .or_else(|| self.index.clone())
    }
}

#[async_trait]
impl Tool for ContextTool {
    fn name(&self) -> &'static str {
        "context"
    }

    fn description(&self) -> &'static str {
        "Query uploaded documents using RAG (Retrieval Augmented Generation)"
    }

    fn triggers(&self) -> &'static [&'static str] {
        TRIGGERS
    }

    async fn can_handle(&self, message: &str, context: &ChatContext) -> Result<f32> {
        let Some(chat_id) = context.chat_id.as_deref() else {
            return Ok(0.0);
        };
        let Some(index) = self.resolve_index(context) else {
            return Ok(0.0);
        };
        if !index.has_indexed_documents(chat_id).await? {
            return Ok(0.0);
        }

        let lower = message.to_lowercase();
        if matches_any(&EXPLICIT, &lower) {
            return Ok(0.9);
        }
        if contains_any(&lower, TRIGGERS) {
            return Ok(0.6);
        }
        if contains_any(&lower, QUESTION_WORDS) && word_count(message) > 5 {
            return Ok(0.4);
        }
        Ok(0.0)
    }

    async fn execute(&self, message: &str, context: &ChatContext) -> ToolResult {
        info!("ContextTool executing for query: {}", preview(message, 100));

        let (Some(index), Some(chat_id)) = (self.resolve_index(context), context.chat_id.as_deref())
        else {
            return ToolResult::failure(
                MessageType::Text,
                "No RAG context available. Please upload documents first.",
            );
        };

        let passages = match index.retrieve_docs(message, chat_id).await {
            Ok(p) => p,
            Err(e) => {
                error!("Context tool error: {}", e);
                return ToolResult::failure(MessageType::Text, format!("RAG query error: {}", e));
            }
        };

        if passages.is_empty() {
            return ToolResult::failure(
                MessageType::Text,
                "No relevant information found in the uploaded documents.",
            );
        }

        ToolResult::success(MessageType::Text, Some(format_passages_for_prompt(&passages)))
            .with_data(json!({ "passages": passages }))
            .with_metadata("tool_used", self.name())
            .with_metadata("passages", passages.len())
    }
}
