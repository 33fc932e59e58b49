//! Quiz generation from the conversation.

use super::{GeneratedQuiz, QuizOutcome, QuizService};
use crate::ai::{strip_code_fence, AiService, ChatMessage};
use crate::config::Prompts;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, instrument, warn};

const QUIZ_MAX_TOKENS: u32 = 2500;

const MORE_WORDS: &[&str] = &["more", "another", "additional", "continue", "keep going"];

const ACADEMIC_TOPICS: &[&str] = &[
    "machine learning",
    "deep learning",
    "artificial intelligence",
    "neural networks",
    "data science",
    "python",
    "javascript",
    "programming",
    "algorithms",
    "data structures",
    "computer science",
    "mathematics",
    "statistics",
    "calculus",
    "linear algebra",
    "physics",
    "chemistry",
    "biology",
    "economics",
    "finance",
    "marketing",
    "business",
    "cybersecurity",
    "networking",
    "databases",
    "web development",
    "software engineering",
    "cloud computing",
    "blockchain",
];

const FILLER_WORDS: &[&str] = &["quiz", "test", "more", "make", "create", "give", "another", "additional"];

const AI_PREFIXES: &[&str] = &[
    "here's your quiz",
    "here is your quiz",
    "based on the conversation",
    "quiz:",
    "here are the questions",
    "below is the quiz",
    "i've created a quiz",
    "the quiz is ready",
];

static TOPIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"quiz\s+(?:me\s+)?(?:on\s+)?([a-z\s]+?)(?:\.|$|quiz|test)",
        r"test\s+(?:my\s+)?(?:knowledge\s+)?(?:of\s+)?([a-z\s]+?)(?:\.|$|quiz|test)",
        r"questions?\s+(?:about\s+)?([a-z\s]+?)(?:\.|$|quiz|test)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid topic regex"))
    .collect()
});

static CAPITALIZED_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*").expect("valid regex"));

/// Generates multiple-choice HTML quizzes with the completion model.
pub struct LlmQuizService {
    ai: Arc<dyn AiService>,
    prompts: Prompts,
    min_content_chars: usize,
}

impl LlmQuizService {
    pub fn new(ai: Arc<dyn AiService>, prompts: Prompts, min_content_chars: usize) -> Self {
        Self {
            ai,
            prompts,
            min_content_chars,
        }
    }

    fn build_prompt(&self, content: &str, query: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());

        let focus_template = if is_more_request(query) {
            vars.insert("topic".to_string(), extract_main_topic(content, query));
            &self.prompts.quiz.more_focus
        } else {
            &self.prompts.quiz.query_focus
        };
        let focus = self.prompts.render_with_custom(focus_template, &vars);

        vars.insert("focus".to_string(), focus);
        vars.insert("content".to_string(), content.to_string());
        self.prompts.render_with_custom(&self.prompts.quiz.user, &vars)
    }
}

#[async_trait]
impl QuizService for LlmQuizService {
    #[instrument(skip(self, history, query, chat_id))]
    async fn generate_quiz_from_query(
        &self,
        history: &[ChatMessage],
        query: &str,
        chat_id: Option<&str>,
    ) -> QuizOutcome {
        let content = history
            .iter()
            .map(|m| m.content.as_str())
            .chain(std::iter::once(query))
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "Generating quiz for chat {} from {} messages",
            chat_id.unwrap_or("-"),
            history.len()
        );

        if content.chars().count() < self.min_content_chars {
            warn!("Not enough conversation content to generate a quiz");
            return QuizOutcome::Error("Not enough conversation content to generate a quiz.".to_string());
        }

        let prompt = self.build_prompt(&content, query);
        match self
            .ai
            .get_ai_response(&[ChatMessage::user(prompt)], QUIZ_MAX_TOKENS, 0.7)
            .await
        {
            Ok(response) => extract_quiz_content(&response, query),
            Err(e) => {
                error!("Quiz generation call failed: {}", e);
                QuizOutcome::Error(format!("Quiz generation failed: {}", e))
            }
        }
    }
}

/// Whether the student is asking for more questions on the current topic.
pub fn is_more_request(query: &str) -> bool {
    let lower = query.to_lowercase();
    MORE_WORDS.iter().any(|w| lower.contains(w))
}

/// Best-effort guess of the subject being studied.
pub fn extract_main_topic(content: &str, query: &str) -> String {
    let recent: String = {
        let chars: Vec<char> = content.chars().collect();
        let start = chars.len().saturating_sub(1000);
        chars[start..].iter().collect()
    };
    let combined = format!("{} {}", recent.to_lowercase(), query.to_lowercase());

    for pattern in TOPIC_PATTERNS.iter() {
        for caps in pattern.captures_iter(&combined) {
            if let Some(m) = caps.get(1) {
                let candidate = m.as_str().trim();
                if candidate.len() > 2 && !["me", "my", "the", "and", "or"].contains(&candidate) {
                    return candidate.to_string();
                }
            }
        }
    }

    if let Some(topic) = ACADEMIC_TOPICS.iter().find(|t| combined.contains(*t)) {
        return topic.to_string();
    }

    let meaningful: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 3 && !FILLER_WORDS.contains(w))
        .take(2)
        .map(str::to_string)
        .collect();
    if !meaningful.is_empty() {
        return meaningful.join(" ");
    }

    CAPITALIZED_TERM
        .find_iter(content)
        .last()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "the subject".to_string())
}

/// Separate quiz HTML from any text the model wrote around it.
pub fn extract_quiz_content(response: &str, topic: &str) -> QuizOutcome {
    let text = strip_code_fence(response);

    match text.find("<div class=\"quiz-question\"") {
        Some(start) => {
            let quiz_html = clean_quiz_html(&text[start..]);
            let before = text[..start].trim();
            let content = if before.chars().count() > 10 {
                filter_ai_prefixes(before)
            } else {
                None
            };
            info!("Extracted quiz HTML ({} chars)", quiz_html.len());
            QuizOutcome::Generated(GeneratedQuiz { quiz_html, content })
        }
        None => {
            warn!("Could not find quiz HTML structure in model response");
            let lower = text.to_lowercase();
            if lower.contains("quiz") || lower.contains("question") {
                QuizOutcome::Generated(GeneratedQuiz {
                    quiz_html: text.clone(),
                    content: Some(format!("Generated quiz based on {}", topic)),
                })
            } else {
                QuizOutcome::Error("No valid quiz content generated".to_string())
            }
        }
    }
}

/// Drop trailing prose after the last closing `</div>`.
fn clean_quiz_html(html: &str) -> String {
    let mut html = html.trim();
    if let Some(end) = html.rfind("</div>") {
        let after = html[end + 6..].trim();
        if !after.is_empty() && !after.starts_with('<') {
            html = &html[..end + 6];
        }
    }
    html.trim().to_string()
}

fn filter_ai_prefixes(text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    if AI_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return None;
    }
    if text.chars().count() < 15 || ["here's", "here is", "below"].iter().any(|p| lower.contains(p)) {
        return None;
    }
    Some(text.trim().to_string())
}
