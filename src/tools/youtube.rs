use super::{compile_patterns, contains_any, matches_any};
use crate::agent::{preview, ChatContext, MessageType, Tool, ToolResult};
use crate::error::Result;
use crate::youtube::{VideoRecord, YouTubeReply, YouTubeService};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

const TRIGGERS: &[&str] = &[
    "youtube",
    "video",
    "watch",
    "recommend",
    "tutorial",
    "learn more",
    "show me videos",
    "find videos",
    "educational content",
];

static EXPLICIT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_patterns(&[
        r"(find|show|recommend|suggest)\s+(me\s+)?(youtube|videos?|tutorials?)",
        r"youtube.*about",
        r"watch.*video",
        r"learn more.*video",
    ])
});

const LEARNING_WORDS: &[&str] = &["learn", "tutorial", "how to", "guide", "instruction"];

/// Recommends or summarizes YouTube videos.
pub struct YouTubeTool {
    service: Arc<dyn YouTubeService>,
}

impl YouTubeTool {
    pub fn new(service: Arc<dyn YouTubeService>) -> Self {
        Self { service }
    }
}

/// Interpret a collaborator reply. A non-empty list of video records becomes
/// structured data; anything else is plain text.
fn interpret_reply(reply: String) -> ToolResult {
    match serde_json::from_str::<Vec<VideoRecord>>(&reply) {
        Ok(videos) if !videos.is_empty() => {
            debug!("Reply parsed as {} video records", videos.len());
            ToolResult::success(
                MessageType::Youtube,
                Some("Here are some YouTube video recommendations based on your query:".to_string()),
            )
            .with_data(json!({ "videos": videos }))
        }
        _ => ToolResult::success(MessageType::Youtube, Some(reply)),
    }
}

#[async_trait]
impl Tool for YouTubeTool {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn description(&self) -> &'static str {
        "Search for YouTube video recommendations or summarize YouTube videos"
    }

    fn triggers(&self) -> &'static [&'static str] {
        TRIGGERS
    }

    async fn can_handle(&self, message: &str, _context: &ChatContext) -> Result<f32> {
        if !self.service.is_available(message) {
            debug!("No YouTube handler configured for this query");
            return Ok(0.0);
        }

        let lower = message.to_lowercase();

        if matches_any(&EXPLICIT, &lower) {
            return Ok(0.9);
        }
        if contains_any(&lower, TRIGGERS) {
            return Ok(0.6);
        }
        if contains_any(&lower, LEARNING_WORDS) {
            return Ok(0.4);
        }
        Ok(0.0)
    }

    async fn execute(&self, message: &str, context: &ChatContext) -> ToolResult {
        info!("YouTubeTool executing for query: {}", preview(message, 100));

        let reply = match self.service.get_agent_response(message, &context.messages).await {
            YouTubeReply::Answer(reply) => reply,
            YouTubeReply::Failed(reason) => {
                warn!("YouTube handler failed: {}", reason);
                return ToolResult::failure(MessageType::Youtube, reason)
                    .with_metadata("tool_used", self.name());
            }
        };
        debug!("YouTube reply: {}", preview(&reply, 200));

        if reply.trim().is_empty() {
            return ToolResult::failure(MessageType::Youtube, "YouTube service returned no response");
        }
        interpret_reply(reply).with_metadata("tool_used", self.name())
    }
}
