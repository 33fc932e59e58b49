use super::{compile_patterns, contains_any, matches_any};
use crate::agent::{preview, ChatContext, MessageType, Tool, ToolResult};
use crate::error::Result;
use crate::services::{QuizOutcome, QuizService};
use crate::store::{NewQuestion, QuestionBank};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

const TRIGGERS: &[&str] = &[
    "quiz",
    "test",
    "question",
    "practice",
    "check understanding",
    "assess me",
    "make questions",
    "test my knowledge",
];

static EXPLICIT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_patterns(&[
        r"(create|make|generate)\s+(a\s+)?(quiz|test|questions?)",
        r"test\s+(my\s+)?(knowledge|understanding)",
        r"quiz\s+me",
        r"check\s+(my\s+)?understanding",
    ])
});

const ASSESSMENT_WORDS: &[&str] = &["practice", "review", "study", "prepare"];

const QUESTION_MARKER: &str = r#"<div class="quiz-question""#;
const MAX_QUESTION_TEXT: usize = 200;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static CORRECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-correct="([A-Za-z])""#).expect("valid answer regex"));

/// Builds a multiple-choice quiz and banks its questions.
pub struct QuizTool {
    service: Arc<dyn QuizService>,
    bank: Option<Arc<dyn QuestionBank>>,
}

impl QuizTool {
    pub fn new(service: Arc<dyn QuizService>) -> Self {
        Self { service, bank: None }
    }

    /// Save generated questions into a question bank.
    pub fn with_question_bank(mut self, bank: Arc<dyn QuestionBank>) -> Self {
        self.bank = Some(bank);
        self
    }

    /// Returns how many new questions were banked. Bank errors are logged only.
    async fn bank_questions(&self, chat_id: Option<&str>, quiz_html: &str, message: &str) -> usize {
        let (Some(bank), Some(chat_id)) = (&self.bank, chat_id) else {
            return 0;
        };

        let mut saved = 0;
        for question in split_quiz_questions(quiz_html, &topic_from_message(message)) {
            match bank.save_question(chat_id, &question).await {
                Ok(true) => saved += 1,
                Ok(false) => {}
                Err(e) => warn!("Question bank save skipped: {}", e),
            }
        }
        saved
    }
}

#[async_trait]
impl Tool for QuizTool {
    fn name(&self) -> &'static str {
        "quiz_generator"
    }

    fn description(&self) -> &'static str {
        "Creates interactive quizzes to test understanding of topics discussed"
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
            return Ok(0.7);
        }
        if contains_any(&lower, ASSESSMENT_WORDS) {
            return Ok(0.5);
        }
        Ok(0.0)
    }

    async fn execute(&self, message: &str, context: &ChatContext) -> ToolResult {
        info!("QuizTool executing for query: {}", preview(message, 100));

        let outcome = self
            .service
            .generate_quiz_from_query(&context.messages, message, context.chat_id.as_deref())
            .await;

        let quiz = match outcome {
            QuizOutcome::Generated(quiz) if !quiz.quiz_html.trim().is_empty() => quiz,
            QuizOutcome::Generated(_) => {
                return ToolResult::failure(MessageType::Quiz, "Failed to generate quiz");
            }
            QuizOutcome::Error(e) => return ToolResult::failure(MessageType::Quiz, e),
        };

        let saved = self
            .bank_questions(context.chat_id.as_deref(), &quiz.quiz_html, message)
            .await;

        ToolResult::success(
            MessageType::Quiz,
            Some("Quiz generated based on our conversation:".to_string()),
        )
        .with_data(json!({ "quiz_html": quiz.quiz_html, "content": quiz.content }))
        .with_metadata("tool_used", self.name())
        .with_metadata("questions_saved", saved)
    }
}

/// Split quiz HTML into one bankable question per `quiz-question` block.
///
/// The question text is the block with tags removed, cut to 200 characters.
/// The correct answer comes from the block's `data-correct` attribute.
pub fn split_quiz_questions(quiz_html: &str, topic: &str) -> Vec<NewQuestion> {
    let starts: Vec<usize> = quiz_html.match_indices(QUESTION_MARKER).map(|(i, _)| i).collect();

    let blocks: Vec<&str> = if starts.is_empty() {
        vec![quiz_html]
    } else {
        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts.get(n + 1).copied().unwrap_or(quiz_html.len());
                &quiz_html[start..end]
            })
            .collect()
    };

    blocks
        .into_iter()
        .filter_map(|block| {
            let plain = TAG.replace_all(block, " ");
            let text = plain.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            let text = if text.chars().count() > MAX_QUESTION_TEXT {
                format!("{}...", preview(&text, MAX_QUESTION_TEXT))
            } else {
                text
            };

            Some(NewQuestion {
                question_html: block.trim().to_string(),
                question_text: text,
                correct_answer: CORRECT
                    .captures(block)
                    .map(|c| c[1].to_uppercase()),
                topic: topic.to_string(),
            })
        })
        .collect()
}

/// A short topic label from the first meaningful words of the request.
fn topic_from_message(message: &str) -> String {
    const SKIP: &[&str] = &["quiz", "test", "make", "create"];

    let words: Vec<&str> = message
        .split_whitespace()
        .take(5)
        .filter(|w| w.chars().count() > 3 && !SKIP.contains(&w.to_lowercase().as_str()))
        .take(3)
        .collect();

    if words.is_empty() {
        "General".to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatMessage;
    use crate::services::GeneratedQuiz;
    use crate::store::MemoryStore;
    use crate::tools::testing::context;

    const TWO_QUESTIONS: &str = r#"<div class="quiz-question" data-correct="B">
  <div class="font-semibold mb-1">What is 2+2?</div>
  <form><label><input type="radio" name="q1" value="A"> 3</label></form>
</div>
<div class="quiz-question" data-correct="c">
  <div class="font-semibold mb-1">What is the powerhouse of the cell?</div>
</div>"#;

    struct Canned(QuizOutcome);

    #[async_trait]
    impl QuizService for Canned {
        async fn generate_quiz_from_query(
            &self,
            _history: &[ChatMessage],
            _query: &str,
            _chat_id: Option<&str>,
        ) -> QuizOutcome {
            self.0.clone()
        }
    }

    fn generated(html: &str) -> QuizOutcome {
        QuizOutcome::Generated(GeneratedQuiz {
            quiz_html: html.to_string(),
            content: None,
        })
    }

    #[tokio::test]
    async fn test_scores() {
        let tool = QuizTool::new(Arc::new(Canned(generated(""))));
        let ctx = context();
        assert_eq!(tool.can_handle("Quiz me on cells", &ctx).await.unwrap(), 0.9);
        assert_eq!(tool.can_handle("one more question", &ctx).await.unwrap(), 0.7);
        assert_eq!(tool.can_handle("help me review", &ctx).await.unwrap(), 0.5);
        assert_eq!(tool.can_handle("hi", &ctx).await.unwrap(), 0.0);
    }

    #[test]
    fn test_split_questions() {
        let questions = split_quiz_questions(TWO_QUESTIONS, "Cells");
        assert_eq!(questions.len(), 2);
        assert!(questions[0].question_text.starts_with("What is 2+2?"));
        assert_eq!(questions[0].correct_answer.as_deref(), Some("B"));
        assert_eq!(questions[1].correct_answer.as_deref(), Some("C"));
        assert_eq!(questions[1].topic, "Cells");
    }

    #[test]
    fn test_topic_from_message() {
        assert_eq!(topic_from_message("make a quiz about photosynthesis please"), "about photosynthesis");
        assert_eq!(topic_from_message("quiz me"), "General");
    }

    #[tokio::test]
    async fn test_execute_banks_questions_once() {
        let bank = Arc::new(MemoryStore::new());
        let tool = QuizTool::new(Arc::new(Canned(generated(TWO_QUESTIONS))))
            .with_question_bank(bank.clone());

        let first = tool.execute("quiz me on biology", &context()).await;
        assert!(first.is_success());
        assert_eq!(first.message_type(), MessageType::Quiz);
        assert_eq!(first.metadata().unwrap()["questions_saved"], 2);

        let second = tool.execute("quiz me on biology", &context()).await;
        assert_eq!(second.metadata().unwrap()["questions_saved"], 0);
        assert_eq!(bank.list_questions("chat-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_service_error_fails() {
        let tool = QuizTool::new(Arc::new(Canned(QuizOutcome::Error(
            "Not enough conversation content to generate a quiz.".to_string(),
        ))));
        let result = tool.execute("quiz me", &context()).await;
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("Not enough"));
    }
}
