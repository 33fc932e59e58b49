use super::{compile_patterns, contains_any, matches_any, word_count};
use crate::agent::{preview, ChatContext, MessageType, Tool, ToolResult};
use crate::error::Result;
use crate::services::DiagramService;
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};
use tracing::{error, info};

const TRIGGERS: &[&str] = &[
    "diagram",
    "chart",
    "visualize",
    "draw",
    "flowchart",
    "architecture",
    "process flow",
    "explain visually",
    "visual representation",
];

static EXPLICIT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_patterns(&[
        r"(create|make|generate|draw|show)\s+(a\s+)?(diagram|chart|flowchart)",
        r"visualize",
        r"show me (how|the process|the flow|the architecture)",
        r"explain (visually|with a diagram)",
    ])
});

const STRUCTURE_WORDS: &[&str] = &["process", "workflow", "architecture", "system"];

/// Draws a diagram explaining the message.
pub struct DiagramTool {
    service: Arc<dyn DiagramService>,
}

impl DiagramTool {
    pub fn new(service: Arc<dyn DiagramService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for DiagramTool {
    fn name(&self) -> &'static str {
        "diagram_generator"
    }

    fn description(&self) -> &'static str {
        "Creates visual diagrams to explain complex concepts, processes, or relationships"
    }

    fn triggers(&self) -> &'static [&'static str] {
        TRIGGERS
    }

    async fn can_handle(&self, message: &str, _context: &ChatContext) -> Result<f32> {
        let lower = message.to_lowercase();

        if matches_any(&EXPLICIT, &lower) {
            return Ok(0.9);
        }
        if contains_any(&lower, TRIGGERS) {
            return Ok(0.6);
        }
        // Long questions about how something is put together.
        if word_count(message) > 10 && contains_any(&lower, STRUCTURE_WORDS) {
            return Ok(0.3);
        }
        Ok(0.0)
    }

    async fn execute(&self, message: &str, context: &ChatContext) -> ToolResult {
        info!("DiagramTool executing for query: {}", preview(message, 100));

        let image_id = self
            .service
            .generate_diagram_image(
                &context.messages,
                message,
                context.chat_id.as_deref(),
                context.user_id.as_deref(),
            )
            .await;

        match image_id {
            Some(id) => ToolResult::success(
                MessageType::Diagram,
                Some(format!("Diagram generated for: {}", preview(message, 100))),
            )
            .with_data(json!({ "diagram_image_id": id }))
            .with_metadata("tool_used", self.name()),
            None => {
                error!("Diagram service returned no image");
                ToolResult::failure(MessageType::Diagram, "Failed to generate diagram")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatMessage;
    use crate::tools::testing::context;

    struct FixedDiagram(Option<&'static str>);

    #[async_trait]
    impl DiagramService for FixedDiagram {
        async fn generate_diagram_image(
            &self,
            _history: &[ChatMessage],
            _query: &str,
            _chat_id: Option<&str>,
            _user_id: Option<&str>,
        ) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[tokio::test]
    async fn test_scores() {
        let tool = DiagramTool::new(Arc::new(FixedDiagram(None)));
        let ctx = context();

        assert_eq!(tool.can_handle("Draw a diagram of the water cycle", &ctx).await.unwrap(), 0.9);
        assert_eq!(tool.can_handle("Can you visualize this?", &ctx).await.unwrap(), 0.9);
        assert_eq!(tool.can_handle("is there a chart for that", &ctx).await.unwrap(), 0.6);
        assert_eq!(
            tool.can_handle(
                "tell me about every step of the cell division process from start to finish",
                &ctx
            )
            .await
            .unwrap(),
            0.3
        );
        assert_eq!(tool.can_handle("hello there", &ctx).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_execute_success_carries_image_id() {
        let tool = DiagramTool::new(Arc::new(FixedDiagram(Some("img-1"))));
        let result = tool.execute("draw a diagram of mitosis", &context()).await;

        assert!(result.is_success());
        assert_eq!(result.message_type(), MessageType::Diagram);
        assert_eq!(result.structured_data().unwrap()["diagram_image_id"], "img-1");
    }

    #[tokio::test]
    async fn test_execute_failure() {
        let tool = DiagramTool::new(Arc::new(FixedDiagram(None)));
        let result = tool.execute("draw a diagram of mitosis", &context()).await;

        assert!(!result.is_success());
        assert_eq!(result.error(), Some("Failed to generate diagram"));
    }
}
