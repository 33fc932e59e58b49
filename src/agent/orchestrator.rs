//! Agent orchestration: mode forcing, tool selection, execution and reconciliation.

use super::modes::{resolve_forced_mode, ActiveModes};
use super::reconciler::{FinalResponse, Reconciler};
use super::selector::ConfidenceSelector;
use super::tool::{guarded_execute, guarded_score, panic_message};
use super::{ChatContext, Tool, ToolResult, ToolRole};
use crate::ai::AiService;
use crate::config::AgentSettings;
use crate::error::{Result, TutorlyError};
use futures::FutureExt;
use serde::Serialize;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Tunables for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub confidence_threshold: f32,
    pub max_tools_per_message: usize,
    pub fallback_max_tokens: u32,
    pub fallback_temperature: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from(&AgentSettings::default())
    }
}

impl From<&AgentSettings> for AgentConfig {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            confidence_threshold: settings.confidence_threshold,
            max_tools_per_message: settings.max_tools_per_message,
            fallback_max_tokens: settings.fallback_max_tokens,
            fallback_temperature: settings.fallback_temperature,
        }
    }
}

/// Public description of a registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub triggers: String,
    pub role: ToolRole,
}

/// Decides, per message, which tools run and whether a direct answer is needed.
pub struct AgentOrchestrator {
    tools: Vec<Arc<dyn Tool>>,
    selector: ConfidenceSelector,
    reconciler: Reconciler,
}

impl AgentOrchestrator {
    /// Build an orchestrator over a fixed tool registry.
    ///
    /// Registration order matters: it breaks confidence ties and orders
    /// background execution.
    pub fn new(tools: Vec<Arc<dyn Tool>>, ai: Arc<dyn AiService>, config: AgentConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.confidence_threshold) {
            return Err(TutorlyError::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                config.confidence_threshold
            )));
        }

        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.name()) {
                return Err(TutorlyError::Config(format!(
                    "Duplicate tool name: {}",
                    tool.name()
                )));
            }
        }

        info!(
            "Agent initialized with {} tools (threshold {}, max {})",
            tools.len(),
            config.confidence_threshold,
            config.max_tools_per_message
        );

        Ok(Self {
            tools,
            selector: ConfidenceSelector::new(
                config.confidence_threshold,
                config.max_tools_per_message,
            ),
            reconciler: Reconciler::new(
                ai,
                config.fallback_max_tokens,
                config.fallback_temperature,
            ),
        })
    }

    /// System prompt prepended to every direct answer.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.reconciler = self.reconciler.with_system_prompt(prompt);
        self
    }

    pub fn available_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                triggers: t.triggers().join(", "),
                role: t.role(),
            })
            .collect()
    }

    pub fn tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Handle one user message.
    ///
    /// Any unexpected failure inside orchestration degrades to a single direct
    /// answer with no tool results. If that answer also fails, the error is
    /// returned.
    #[instrument(skip(self, context, modes), fields(chat_id = ?context.chat_id))]
    pub async fn process_message(
        &self,
        message: &str,
        context: &ChatContext,
        modes: &ActiveModes,
    ) -> Result<FinalResponse> {
        info!("Agent processing message: {}", super::tool::preview(message, 100));

        match AssertUnwindSafe(self.orchestrate(message, context, modes))
            .catch_unwind()
            .await
        {
            Ok(response) => Ok(response),
            Err(panic) => {
                error!("Agent system error: {}", panic_message(panic.as_ref()));
                let answer = self.reconciler.try_direct_answer(message, context).await?;
                Ok(FinalResponse {
                    ai_response: Some(answer),
                    tool_results: Vec::new(),
                })
            }
        }
    }

    async fn orchestrate(
        &self,
        message: &str,
        context: &ChatContext,
        modes: &ActiveModes,
    ) -> FinalResponse {
        let mut primary = self.run_primary(message, context, modes).await;
        let mut background = self.run_background(message, context).await;

        for (order, result) in primary.iter_mut().chain(background.iter_mut()).enumerate() {
            result.set_execution_order(order);
        }

        self.reconciler
            .reconcile(message, context, primary, background)
            .await
    }

    /// Resolve forced modes or score tools, then execute the primary set in order.
    pub async fn run_primary(
        &self,
        message: &str,
        context: &ChatContext,
        modes: &ActiveModes,
    ) -> Vec<ToolResult> {
        let chosen: Vec<Arc<dyn Tool>> = match resolve_forced_mode(modes) {
            Some(mode) => match self.tool(mode.tool_name()) {
                Some(tool) => {
                    info!("Mode '{}' is active, forcing tool {}", mode, tool.name());
                    vec![tool]
                }
                None => {
                    warn!(
                        "Mode '{}' is active, but no tool named {} is registered",
                        mode,
                        mode.tool_name()
                    );
                    Vec::new()
                }
            },
            None => self
                .selector
                .select(&self.tools, message, context)
                .await
                .selected
                .into_iter()
                .map(|scored| scored.tool)
                .collect(),
        };

        let mut results = Vec::with_capacity(chosen.len());
        for tool in chosen {
            if tool.role() == ToolRole::Background {
                continue;
            }
            info!("Executing tool: {}", tool.name());
            let result = guarded_execute(tool.as_ref(), message, context).await;
            if !result.is_success() {
                warn!(
                    "Tool {} failed: {}",
                    tool.name(),
                    result.error().unwrap_or_default()
                );
            }
            results.push(result);
        }
        results
    }

    /// Execute every background tool that reports any confidence at all.
    pub async fn run_background(&self, message: &str, context: &ChatContext) -> Vec<ToolResult> {
        let mut results = Vec::new();
        for tool in self.tools.iter().filter(|t| t.role() == ToolRole::Background) {
            let confidence = guarded_score(tool.as_ref(), message, context).await;
            if confidence > 0.0 {
                info!("Running background tool {} ({:.2})", tool.name(), confidence);
                results.push(guarded_execute(tool.as_ref(), message, context).await);
            }
        }
        results
    }
}
