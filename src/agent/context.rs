//! Per-request chat context handed to every tool.

use crate::ai::ChatMessage;
use crate::rag::DocumentIndex;
use std::collections::HashMap;
use std::sync::Arc;

/// Name under which the chat's uploaded-document index is registered.
pub const FILES_RAG_INSTANCE: &str = "files_rag";

/// Everything a tool may read about the conversation it is serving.
///
/// Rebuilt for every request and read-only for tools.
#[derive(Clone, Default)]
pub struct ChatContext {
    /// Prior messages, oldest first. Does not include the message being handled.
    pub messages: Vec<ChatMessage>,
    /// Persisted conversation this turn belongs to.
    pub chat_id: Option<String>,
    /// Requesting user.
    pub user_id: Option<String>,
    indexes: HashMap<String, Arc<dyn DocumentIndex>>,
}

impl ChatContext {
    pub fn new(chat_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Register an auxiliary retrieval index under a name.
    pub fn with_index(mut self, name: &str, index: Arc<dyn DocumentIndex>) -> Self {
        self.indexes.insert(name.to_string(), index);
        self
    }

    /// Look up an auxiliary retrieval index by name.
    pub fn index(&self, name: &str) -> Option<Arc<dyn DocumentIndex>> {
        self.indexes.get(name).cloned()
    }

    /// The last `n` messages of the history.
    pub fn recent_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

impl std::fmt::Debug for ChatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatContext")
            .field("messages", &self.messages.len())
            .field("chat_id", &self.chat_id)
            .field("user_id", &self.user_id)
            .field("indexes", &self.indexes.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_messages() {
        let context = ChatContext::new("chat-1", "user-1").with_messages(vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("two"),
            ChatMessage::user("three"),
        ]);
        assert_eq!(context.recent_messages(2).len(), 2);
        assert_eq!(context.recent_messages(2)[0].content, "two");
        assert_eq!(context.recent_messages(10).len(), 3);
    }
}
