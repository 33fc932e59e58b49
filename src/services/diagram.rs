//! Two-step diagram generation rendered with Graphviz.

use super::DiagramService;
use crate::ai::{history_text, strip_code_fence, AiService, ChatMessage};
use crate::config::Prompts;
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const MAX_RENDER_ATTEMPTS: usize = 3;
const DESCRIPTION_MAX_TOKENS: u32 = 1500;
const CODE_MAX_TOKENS: u32 = 2000;

/// Asks the model for a structured description, then DOT source, then
/// renders it to `<output_dir>/<uuid>.png`.
pub struct GraphvizDiagramService {
    ai: Arc<dyn AiService>,
    prompts: Prompts,
    output_dir: PathBuf,
    dot_command: String,
}

impl GraphvizDiagramService {
    pub fn new(ai: Arc<dyn AiService>, prompts: Prompts, output_dir: PathBuf) -> Self {
        Self {
            ai,
            prompts,
            output_dir,
            dot_command: "dot".to_string(),
        }
    }

    /// Use a different Graphviz executable.
    pub fn with_dot_command(mut self, command: &str) -> Self {
        self.dot_command = command.to_string();
        self
    }

    /// Path of a rendered diagram.
    pub fn image_path(&self, image_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", image_id))
    }

    async fn ask(&self, prompt: String, max_tokens: u32) -> Result<String> {
        let messages = [ChatMessage::user(prompt)];
        self.ai.get_ai_response(&messages, max_tokens, 0.2).await
    }

    async fn describe(&self, history: &[ChatMessage], query: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("history".to_string(), history_text(history));
        vars.insert("query".to_string(), query.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.diagram.description, &vars);

        let description = self.ask(prompt, DESCRIPTION_MAX_TOKENS).await?;
        if description.trim().is_empty() {
            return Err(TutorlyError::Diagram(
                "Model returned an empty structured description".to_string(),
            ));
        }
        Ok(description.trim().to_string())
    }

    async fn dot_source(&self, description: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("description".to_string(), description.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.diagram.graphviz, &vars);

        let response = self.ask(prompt, CODE_MAX_TOKENS).await?;
        clean_dot_source(&response)
            .ok_or_else(|| TutorlyError::Diagram("Generated source contains no digraph".to_string()))
    }

    async fn repair(&self, query: &str, code: &str, error: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("code".to_string(), code.to_string());
        vars.insert("error".to_string(), error.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.diagram.fix, &vars);

        let response = self.ask(prompt, CODE_MAX_TOKENS).await?;
        clean_dot_source(&response)
            .ok_or_else(|| TutorlyError::Diagram("Repaired source contains no digraph".to_string()))
    }

    /// Render DOT source to a PNG file.
    async fn render(&self, source: &str, target: &Path) -> Result<()> {
        let dot_path = target.with_extension("dot");
        tokio::fs::write(&dot_path, source).await?;

        let result = Command::new(&self.dot_command)
            .arg("-Tpng")
            .arg(&dot_path)
            .arg("-o")
            .arg(target)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let _ = tokio::fs::remove_file(&dot_path).await;

        match result {
            Ok(out) if out.status.success() && target.exists() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(TutorlyError::ToolFailed(format!("dot failed: {}", err.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TutorlyError::ToolNotFound(self.dot_command.clone()))
            }
            Err(e) => Err(TutorlyError::ToolFailed(format!("dot error: {e}"))),
        }
    }

    async fn generate(&self, history: &[ChatMessage], query: &str) -> Result<String> {
        let description = self.describe(history, query).await?;
        let mut source = self.dot_source(&description).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let image_id = Uuid::new_v4().to_string();
        let target = self.image_path(&image_id);

        for attempt in 1..=MAX_RENDER_ATTEMPTS {
            info!("Graphviz render attempt {}/{}", attempt, MAX_RENDER_ATTEMPTS);
            match self.render(&source, &target).await {
                Ok(()) => return Ok(image_id),
                Err(e @ TutorlyError::ToolNotFound(_)) => return Err(e),
                Err(e) if attempt < MAX_RENDER_ATTEMPTS => {
                    warn!("Render failed, asking the model for a fix: {}", e);
                    source = self.repair(query, &source, &e.to_string()).await?;
                }
                Err(e) => return Err(e),
            }
        }

        Err(TutorlyError::Diagram("Rendering attempts exhausted".to_string()))
    }
}

#[async_trait]
impl DiagramService for GraphvizDiagramService {
    #[instrument(skip(self, history, query, chat_id))]
    async fn generate_diagram_image(
        &self,
        history: &[ChatMessage],
        query: &str,
        chat_id: Option<&str>,
        _user_id: Option<&str>,
    ) -> Option<String> {
        match self.generate(history, query).await {
            Ok(id) => {
                info!("Diagram {} saved for chat {}", id, chat_id.unwrap_or("-"));
                Some(id)
            }
            Err(e) => {
                error!("Diagram generation failed: {}", e);
                None
            }
        }
    }
}

/// Strip code fences and surrounding prose from model output and return the
/// `digraph` block, or `None` if there is none.
pub fn clean_dot_source(text: &str) -> Option<String> {
    let stripped = strip_code_fence(text);
    let start = stripped.find("digraph")?;
    let body = &stripped[start..];
    let end = body.rfind('}').map(|i| i + 1).unwrap_or(body.len());
    let source = body[..end].trim();
    if source.contains('{') {
        Some(source.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_dot_source_strips_fences_and_prose() {
        let raw = "Here you go:\n```dot\ndigraph G {\n  a -> b;\n}\n```\nEnjoy!";
        assert_eq!(clean_dot_source(raw).as_deref(), Some("digraph G {\n  a -> b;\n}"));
    }

    #[test]
    fn test_clean_dot_source_requires_digraph() {
        assert!(clean_dot_source("graph G { a -- b }").is_none());
        assert!(clean_dot_source("I cannot draw that.").is_none());
    }
}
