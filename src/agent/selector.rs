//! Confidence-based primary tool selection.

use super::tool::guarded_score;
use super::{ChatContext, Tool, ToolRole};
use std::sync::Arc;
use tracing::{debug, info};

/// A tool together with the confidence it reported.
#[derive(Clone)]
pub struct ScoredTool {
    pub tool: Arc<dyn Tool>,
    pub confidence: f32,
}

impl std::fmt::Debug for ScoredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:.2})", self.tool.name(), self.confidence)
    }
}

/// Tools chosen for primary execution, highest confidence first.
#[derive(Debug, Clone, Default)]
pub struct SelectionOutcome {
    pub selected: Vec<ScoredTool>,
}

impl SelectionOutcome {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.selected.iter().map(|s| s.tool.name()).collect()
    }
}

/// Scores every primary tool and keeps the best ones above a threshold.
#[derive(Debug, Clone)]
pub struct ConfidenceSelector {
    confidence_threshold: f32,
    max_tools: usize,
}

impl ConfidenceSelector {
    pub fn new(confidence_threshold: f32, max_tools: usize) -> Self {
        Self {
            confidence_threshold,
            max_tools,
        }
    }

    /// Score `tools` in registration order and select up to `max_tools`.
    ///
    /// Background tools are never scored here. Ties keep registration order.
    pub async fn select(
        &self,
        tools: &[Arc<dyn Tool>],
        message: &str,
        context: &ChatContext,
    ) -> SelectionOutcome {
        let mut candidates = Vec::new();

        for tool in tools.iter().filter(|t| t.role() == ToolRole::Primary) {
            let confidence = guarded_score(tool.as_ref(), message, context).await;
            debug!("Tool {} scored {:.2}", tool.name(), confidence);

            if confidence >= self.confidence_threshold {
                candidates.push(ScoredTool {
                    tool: Arc::clone(tool),
                    confidence,
                });
            }
        }

        // `sort_by` is stable, so equal scores stay in registration order.
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.max_tools);

        if candidates.is_empty() {
            info!("No tools selected for execution");
        } else {
            info!("Selected tools: {:?}", candidates);
        }

        SelectionOutcome {
            selected: candidates,
        }
    }
}
