//! Merges tool results and decides whether a direct answer is still needed.

use super::{ChatContext, ToolResult};
use crate::ai::{AiService, ChatMessage};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Shown when the model cannot produce a fallback answer.
pub const FALLBACK_APOLOGY: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again.";

/// Why a direct answer accompanies (or does not accompany) the tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectAnswer {
    /// Every primary tool succeeded; the tool output is the answer.
    NotNeeded,
    /// No primary tool ran.
    NoToolSelected,
    /// At least one primary tool failed.
    ToolFailed,
}

impl DirectAnswer {
    pub fn is_needed(&self) -> bool {
        !matches!(self, DirectAnswer::NotNeeded)
    }
}

/// Decide from the primary results alone. Background results are ignored.
pub fn decide(primary: &[ToolResult]) -> DirectAnswer {
    let mut primary = primary.iter().filter(|r| !r.is_background()).peekable();

    if primary.peek().is_none() {
        DirectAnswer::NoToolSelected
    } else if primary.any(|r| !r.is_success()) {
        DirectAnswer::ToolFailed
    } else {
        DirectAnswer::NotNeeded
    }
}

/// Externally visible outcome of one orchestration call.
#[derive(Debug, Clone, Serialize)]
pub struct FinalResponse {
    /// Direct model answer, present only when tools alone do not answer the user.
    pub ai_response: Option<String>,
    /// Primary results followed by background results, in execution order.
    pub tool_results: Vec<ToolResult>,
}

impl FinalResponse {
    /// Results that directly answer the user.
    pub fn primary_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.tool_results.iter().filter(|r| !r.is_background())
    }

    /// Results from always-on background tools.
    pub fn background_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.tool_results.iter().filter(|r| r.is_background())
    }
}

/// Produces the final response, fetching a direct answer when required.
pub struct Reconciler {
    ai: Arc<dyn AiService>,
    system_prompt: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl Reconciler {
    pub fn new(ai: Arc<dyn AiService>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            ai,
            system_prompt: None,
            max_tokens,
            temperature,
        }
    }

    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Combine primary and background results into one response.
    pub async fn reconcile(
        &self,
        message: &str,
        context: &ChatContext,
        primary: Vec<ToolResult>,
        background: Vec<ToolResult>,
    ) -> FinalResponse {
        let decision = decide(&primary);

        let ai_response = match decision {
            DirectAnswer::NotNeeded => None,
            DirectAnswer::NoToolSelected => {
                info!("No primary tool used, fetching a direct answer");
                Some(self.direct_answer(message, context).await)
            }
            DirectAnswer::ToolFailed => {
                info!("A primary tool failed, adding a direct answer");
                Some(self.direct_answer(message, context).await)
            }
        };

        let mut tool_results = primary;
        tool_results.extend(background);

        FinalResponse {
            ai_response,
            tool_results,
        }
    }

    /// A direct answer that never fails; model errors become an apology.
    pub async fn direct_answer(&self, message: &str, context: &ChatContext) -> String {
        match self.try_direct_answer(message, context).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Error getting direct AI response: {}", e);
                FALLBACK_APOLOGY.to_string()
            }
        }
    }

    /// A direct answer that propagates model errors to the caller.
    pub async fn try_direct_answer(&self, message: &str, context: &ChatContext) -> Result<String> {
        let messages = self.build_messages(message, context);
        self.ai
            .get_ai_response(&messages, self.max_tokens, self.temperature)
            .await
    }

    fn build_messages(&self, message: &str, context: &ChatContext) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(context.messages.len() + 2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }
        messages.extend(context.messages.iter().cloned());
        messages.push(ChatMessage::user(message));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MessageType;

    fn ok(kind: MessageType) -> ToolResult {
        ToolResult::success(kind, Some("done".to_string()))
    }

    #[test]
    fn test_empty_primary_needs_answer() {
        assert_eq!(decide(&[]), DirectAnswer::NoToolSelected);
    }

    #[test]
    fn test_all_success_needs_no_answer() {
        let results = vec![ok(MessageType::Diagram), ok(MessageType::Quiz)];
        assert_eq!(decide(&results), DirectAnswer::NotNeeded);
        assert!(!decide(&results).is_needed());
    }

    #[test]
    fn test_any_failure_needs_answer() {
        let results = vec![
            ok(MessageType::Diagram),
            ToolResult::failure(MessageType::Quiz, "Failed to generate quiz"),
        ];
        assert_eq!(decide(&results), DirectAnswer::ToolFailed);
    }

    #[test]
    fn test_background_results_do_not_count() {
        let results = vec![ToolResult::success(MessageType::BackgroundProcess, None)];
        assert_eq!(decide(&results), DirectAnswer::NoToolSelected);
    }
}
