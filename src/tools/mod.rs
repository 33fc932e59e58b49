//! Concrete tools registered with the agent.
//!
//! Each tool scores messages with its own keyword and pattern heuristics and
//! delegates the real work to a collaborator service.

mod context;
mod diagram;
mod flashcard;
mod quiz;
mod youtube;

pub use context::ContextTool;
pub use diagram::DiagramTool;
pub use flashcard::FlashcardConceptTracker;
pub use quiz::{split_quiz_questions, QuizTool};
pub use youtube::YouTubeTool;

use regex::Regex;

/// Compile a fixed pattern table. Patterns are matched against lowercased text.
fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid tool pattern"))
        .collect()
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::agent::ChatContext;
    use crate::ai::ChatMessage;

    pub fn context() -> ChatContext {
        ChatContext::new("chat-1", "user-1")
            .with_messages(vec![ChatMessage::user("What is photosynthesis?")])
    }
}
