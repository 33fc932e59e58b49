//! Tool interface and the result envelope every tool returns.

use super::ChatContext;
use crate::error::Result;
use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// What kind of output a tool produced, used by clients to pick a renderer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Diagram,
    Quiz,
    Youtube,
    FlashcardUpdate,
    BackgroundProcess,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageType::Text => "text",
            MessageType::Diagram => "diagram",
            MessageType::Quiz => "quiz",
            MessageType::Youtube => "youtube",
            MessageType::FlashcardUpdate => "flashcard_update",
            MessageType::BackgroundProcess => "background_process",
        };
        write!(f, "{}", s)
    }
}

/// Whether a tool competes for the primary answer or runs alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolRole {
    Primary,
    Background,
}

/// Uniform result of a tool execution.
///
/// A failed result never carries content and always carries an error.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    structured_data: Option<Value>,
    message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_order: Option<usize>,
}

impl ToolResult {
    /// A successful result with optional user-facing text.
    pub fn success(message_type: MessageType, content: Option<String>) -> Self {
        Self {
            success: true,
            content,
            structured_data: None,
            message_type,
            metadata: None,
            error: None,
            execution_order: None,
        }
    }

    /// A failed result. Content is always absent.
    pub fn failure(message_type: MessageType, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            content: None,
            structured_data: None,
            message_type,
            metadata: None,
            error: Some(if error.is_empty() { "Unknown error".to_string() } else { error }),
            execution_order: None,
        }
    }

    /// Attach a tool-specific payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.structured_data = Some(data);
        self
    }

    /// Add one metadata entry.
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn structured_data(&self) -> Option<&Value> {
        self.structured_data.as_ref()
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn execution_order(&self) -> Option<usize> {
        self.execution_order
    }

    /// Background results never count toward the primary answer.
    pub fn is_background(&self) -> bool {
        self.message_type == MessageType::BackgroundProcess
    }

    pub(crate) fn set_execution_order(&mut self, order: usize) {
        self.execution_order = Some(order);
    }
}

/// A capability the agent can decide to use for a message.
///
/// `can_handle` must not have side effects. `execute` may write or call out to
/// the network, but reports every failure through a failed [`ToolResult`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable, unique registry key.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Phrases that hint at this tool. Advisory only, never used for gating.
    fn triggers(&self) -> &'static [&'static str];

    fn role(&self) -> ToolRole {
        ToolRole::Primary
    }

    /// Confidence in `[0, 1]` that this tool should handle the message.
    async fn can_handle(&self, message: &str, context: &ChatContext) -> Result<f32>;

    /// Run the tool.
    async fn execute(&self, message: &str, context: &ChatContext) -> ToolResult;
}

/// Score a tool, turning errors and panics into zero confidence.
pub(crate) async fn guarded_score(tool: &dyn Tool, message: &str, context: &ChatContext) -> f32 {
    match AssertUnwindSafe(tool.can_handle(message, context))
        .catch_unwind()
        .await
    {
        Ok(Ok(confidence)) if confidence.is_finite() => confidence.clamp(0.0, 1.0),
        Ok(Ok(confidence)) => {
            error!("Tool {} returned a non-finite confidence ({})", tool.name(), confidence);
            0.0
        }
        Ok(Err(e)) => {
            error!("Error getting confidence from {}: {}", tool.name(), e);
            0.0
        }
        Err(panic) => {
            error!(
                "Confidence scoring panicked in {}: {}",
                tool.name(),
                panic_message(panic.as_ref())
            );
            0.0
        }
    }
}

/// Execute a tool, turning a panic into a failed result for that tool only.
pub(crate) async fn guarded_execute(
    tool: &dyn Tool,
    message: &str,
    context: &ChatContext,
) -> ToolResult {
    match AssertUnwindSafe(tool.execute(message, context))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            error!("Error executing tool {}: {}", tool.name(), reason);
            let message_type = match tool.role() {
                ToolRole::Primary => MessageType::Text,
                ToolRole::Background => MessageType::BackgroundProcess,
            };
            ToolResult::failure(message_type, format!("Tool {} failed: {}", tool.name(), reason))
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// First `max_chars` characters of `text`, for log lines and result captions.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_error_and_no_content() {
        let result = ToolResult::failure(MessageType::Diagram, "Failed to generate diagram");
        assert!(!result.is_success());
        assert!(result.content().is_none());
        assert_eq!(result.error(), Some("Failed to generate diagram"));
    }

    #[test]
    fn test_failure_with_empty_error_still_reports_one() {
        let result = ToolResult::failure(MessageType::Text, "");
        assert!(result.error().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn test_serialized_shape() {
        let result = ToolResult::success(MessageType::Youtube, Some("Videos".to_string()))
            .with_data(serde_json::json!({ "videos": [] }))
            .with_metadata("tool_used", "youtube");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["message_type"], "youtube");
        assert_eq!(json["metadata"]["tool_used"], "youtube");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("héllo wörld", 4), "héll");
    }
}
