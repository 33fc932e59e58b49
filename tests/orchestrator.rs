//! End-to-end behavior of the agent orchestrator with mock tools and models.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use tutorly::agent::{
    ActiveModes, AgentConfig, AgentOrchestrator, ChatContext, MessageType, Mode, Tool, ToolResult,
    ToolRole, FALLBACK_APOLOGY,
};
use tutorly::ai::{AiService, ChatMessage};
use tutorly::services::ConceptExtractor;
use tutorly::store::{FlashcardStore, SqliteStore};
use tutorly::tools::{FlashcardConceptTracker, YouTubeTool};
use tutorly::youtube::{classify, Route, Summarizer, YoutubeRouter};
use tutorly::{Result, TutorlyError};

// === Mocks ===

#[derive(Clone, Copy)]
enum Score {
    Fixed(f32),
    Fails,
    Panics,
}

#[derive(Clone, Copy)]
enum Outcome {
    Succeeds,
    Fails,
    Panics,
}

struct MockTool {
    name: &'static str,
    role: ToolRole,
    score: Score,
    outcome: Outcome,
    scored: AtomicUsize,
    executed: AtomicUsize,
}

impl MockTool {
    fn primary(name: &'static str, confidence: f32) -> Self {
        Self {
            name,
            role: ToolRole::Primary,
            score: Score::Fixed(confidence),
            outcome: Outcome::Succeeds,
            scored: AtomicUsize::new(0),
            executed: AtomicUsize::new(0),
        }
    }

    fn background(name: &'static str, confidence: f32) -> Self {
        Self {
            role: ToolRole::Background,
            ..Self::primary(name, confidence)
        }
    }

    fn scoring(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    fn executing(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    fn scored(&self) -> usize {
        self.scored.load(Ordering::SeqCst)
    }

    fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    fn message_type(&self) -> MessageType {
        match self.role {
            ToolRole::Primary => MessageType::Text,
            ToolRole::Background => MessageType::BackgroundProcess,
        }
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "mock tool"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["mock"]
    }

    fn role(&self) -> ToolRole {
        self.role
    }

    async fn can_handle(&self, _message: &str, _context: &ChatContext) -> Result<f32> {
        self.scored.fetch_add(1, Ordering::SeqCst);
        match self.score {
            Score::Fixed(confidence) => Ok(confidence),
            Score::Fails => Err(TutorlyError::Agent("scoring blew up".to_string())),
            Score::Panics => panic!("scoring panicked"),
        }
    }

    async fn execute(&self, _message: &str, _context: &ChatContext) -> ToolResult {
        self.executed.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Succeeds => ToolResult::success(self.message_type(), Some(self.name.to_string())),
            Outcome::Fails => ToolResult::failure(self.message_type(), format!("{} failed", self.name)),
            Outcome::Panics => panic!("{} exploded", self.name),
        }
    }
}

/// Completion mock. Panics on the calls listed in `panic_on` (1-based).
#[derive(Default)]
struct MockAi {
    calls: AtomicUsize,
    fail: bool,
    panic_on: Vec<usize>,
}

impl MockAi {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiService for MockAi {
    async fn get_ai_response(&self, messages: &[ChatMessage], _max_tokens: u32, _temperature: f32) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.panic_on.contains(&call) {
            panic!("model client panicked");
        }
        if self.fail {
            return Err(TutorlyError::Model("upstream unavailable".to_string()));
        }
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(format!("Direct answer to: {}", last))
    }
}

fn context() -> ChatContext {
    ChatContext::new("chat-1", "user-1").with_messages(vec![
        ChatMessage::user("What is a neuron?"),
        ChatMessage::assistant("A neuron is a nerve cell."),
    ])
}

fn agent(tools: &[Arc<MockTool>], ai: Arc<MockAi>, config: AgentConfig) -> AgentOrchestrator {
    let tools: Vec<Arc<dyn Tool>> = tools.iter().map(|t| t.clone() as Arc<dyn Tool>).collect();
    AgentOrchestrator::new(tools, ai, config).unwrap()
}

fn contents(results: &[ToolResult]) -> Vec<&str> {
    results.iter().filter_map(|r| r.content()).collect()
}

// === Mode forcing ===

#[tokio::test]
async fn test_diagram_mode_wins_over_youtube_mode() {
    for _ in 0..5 {
        let diagram = Arc::new(MockTool::primary("diagram_generator", 0.0));
        let youtube = Arc::new(MockTool::primary("youtube", 1.0));
        let ai = Arc::new(MockAi::default());
        let agent = agent(&[diagram.clone(), youtube.clone()], ai.clone(), AgentConfig::default());

        let mut flags = HashMap::new();
        flags.insert("youtube".to_string(), true);
        flags.insert("diagram".to_string(), true);
        let modes = ActiveModes::from(flags);

        let response = agent.process_message("explain the heart", &context(), &modes).await.unwrap();

        assert_eq!(diagram.executed(), 1);
        assert_eq!(youtube.executed(), 0);
        assert_eq!(youtube.scored(), 0);
        assert_eq!(contents(&response.tool_results), vec!["diagram_generator"]);
        assert!(response.ai_response.is_none());
        assert_eq!(ai.calls(), 0);
    }
}

#[tokio::test]
async fn test_forced_tool_runs_even_with_zero_confidence() {
    let youtube = Arc::new(MockTool::primary("youtube", 0.0));
    let agent = agent(&[youtube.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let modes = ActiveModes::new().with(Mode::Youtube, true);
    let response = agent.process_message("hello", &context(), &modes).await.unwrap();

    assert_eq!(youtube.executed(), 1);
    assert_eq!(response.tool_results.len(), 1);
}

#[tokio::test]
async fn test_forced_mode_without_tool_yields_no_primary() {
    let quiz = Arc::new(MockTool::primary("quiz_generator", 0.9));
    let tracker = Arc::new(MockTool::background("flashcard_concept_tracker", 0.4));
    let ai = Arc::new(MockAi::default());
    let agent = agent(&[quiz.clone(), tracker.clone()], ai.clone(), AgentConfig::default());

    let modes = ActiveModes::new().with(Mode::Diagram, true);
    let response = agent.process_message("quiz me", &context(), &modes).await.unwrap();

    // No substitute tool is scored or run.
    assert_eq!(quiz.scored(), 0);
    assert_eq!(quiz.executed(), 0);
    assert_eq!(tracker.executed(), 1);
    assert_eq!(response.primary_results().count(), 0);
    assert_eq!(response.ai_response.as_deref(), Some("Direct answer to: quiz me"));
}

#[tokio::test]
async fn test_forced_tool_failure_is_not_replaced() {
    let diagram = Arc::new(MockTool::primary("diagram_generator", 0.9).executing(Outcome::Fails));
    let quiz = Arc::new(MockTool::primary("quiz_generator", 0.9));
    let agent = agent(&[diagram.clone(), quiz.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let modes = ActiveModes::new().with(Mode::Diagram, true);
    let response = agent.process_message("draw it", &context(), &modes).await.unwrap();

    assert_eq!(diagram.executed(), 1);
    assert_eq!(quiz.executed(), 0);
    let primary: Vec<_> = response.primary_results().collect();
    assert_eq!(primary.len(), 1);
    assert!(!primary[0].is_success());
    assert!(response.ai_response.is_some());
}

// === Selection ===

#[tokio::test]
async fn test_scenario_threshold_and_max_tools() {
    let diagram = Arc::new(MockTool::primary("diagram_generator", 0.9));
    let youtube = Arc::new(MockTool::primary("youtube", 0.3));
    let quiz = Arc::new(MockTool::primary("quiz_generator", 0.7));
    let agent = agent(
        &[diagram.clone(), youtube.clone(), quiz.clone()],
        Arc::new(MockAi::default()),
        AgentConfig::default(),
    );

    let response = agent
        .process_message("make a chart and a quiz", &context(), &ActiveModes::new())
        .await
        .unwrap();

    assert_eq!(contents(&response.tool_results), vec!["diagram_generator", "quiz_generator"]);
    assert_eq!(youtube.scored(), 1);
    assert_eq!(youtube.executed(), 0);
    assert!(response.ai_response.is_none());
}

#[tokio::test]
async fn test_selection_never_exceeds_max_tools() {
    let tools: Vec<Arc<MockTool>> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|name| Arc::new(MockTool::primary(name, 0.8)))
        .collect();
    let agent = agent(&tools, Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    // Ties keep registration order.
    assert_eq!(contents(&response.tool_results), vec!["a", "b"]);
    assert_eq!(tools.iter().map(|t| t.executed()).sum::<usize>(), 2);
}

#[tokio::test]
async fn test_threshold_and_max_are_configurable() {
    let high = Arc::new(MockTool::primary("high", 0.85));
    let mid = Arc::new(MockTool::primary("mid", 0.6));
    let low = Arc::new(MockTool::primary("low", 0.79));
    let config = AgentConfig {
        confidence_threshold: 0.8,
        max_tools_per_message: 5,
        ..AgentConfig::default()
    };
    let agent = agent(&[mid.clone(), low.clone(), high.clone()], Arc::new(MockAi::default()), config);

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(contents(&response.tool_results), vec!["high"]);
}

#[tokio::test]
async fn test_threshold_is_inclusive() {
    let edge = Arc::new(MockTool::primary("edge", 0.5));
    let agent = agent(&[edge.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();
    assert_eq!(edge.executed(), 1);
}

#[tokio::test]
async fn test_scoring_errors_count_as_zero() {
    let broken = Arc::new(MockTool::primary("broken", 0.0).scoring(Score::Fails));
    let panicky = Arc::new(MockTool::primary("panicky", 0.0).scoring(Score::Panics));
    let good = Arc::new(MockTool::primary("good", 0.6));
    let agent = agent(
        &[broken.clone(), panicky.clone(), good.clone()],
        Arc::new(MockAi::default()),
        AgentConfig::default(),
    );

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(broken.executed(), 0);
    assert_eq!(panicky.executed(), 0);
    assert_eq!(contents(&response.tool_results), vec!["good"]);
}

#[tokio::test]
async fn test_background_tool_never_runs_as_primary() {
    let tracker = Arc::new(MockTool::background("flashcard_concept_tracker", 0.95));
    let agent = agent(&[tracker.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent
        .process_message("explain the concept of entropy", &context(), &ActiveModes::new())
        .await
        .unwrap();

    assert_eq!(tracker.executed(), 1);
    assert_eq!(response.primary_results().count(), 0);
    assert_eq!(response.background_results().count(), 1);
    assert!(response.ai_response.is_some());
}

// === Background independence ===

#[tokio::test]
async fn test_background_runs_without_primary_tools() {
    let tracker = Arc::new(MockTool::background("tracker", 0.01));
    let idle = Arc::new(MockTool::primary("idle", 0.1));
    let agent = agent(&[idle.clone(), tracker.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(idle.executed(), 0);
    assert_eq!(tracker.executed(), 1);
    assert_eq!(response.background_results().count(), 1);
}

#[tokio::test]
async fn test_background_runs_when_primary_fails() {
    let failing = Arc::new(MockTool::primary("failing", 0.9).executing(Outcome::Fails));
    let tracker = Arc::new(MockTool::background("tracker", 0.4));
    let agent = agent(&[failing.clone(), tracker.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(tracker.executed(), 1);
    assert!(response.ai_response.is_some());
}

#[tokio::test]
async fn test_background_with_zero_confidence_is_skipped() {
    let tracker = Arc::new(MockTool::background("tracker", 0.0));
    let agent = agent(&[tracker.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    agent.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(tracker.scored(), 1);
    assert_eq!(tracker.executed(), 0);
}

#[tokio::test]
async fn test_background_failure_does_not_trigger_fallback() {
    let good = Arc::new(MockTool::primary("good", 0.9));
    let tracker = Arc::new(MockTool::background("tracker", 0.5).executing(Outcome::Panics));
    let ai = Arc::new(MockAi::default());
    let agent = agent(&[good.clone(), tracker.clone()], ai.clone(), AgentConfig::default());

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    let background: Vec<_> = response.background_results().collect();
    assert_eq!(background.len(), 1);
    assert!(!background[0].is_success());
    assert!(response.ai_response.is_none());
    assert_eq!(ai.calls(), 0);
}

// === Fallback rule ===

#[tokio::test]
async fn test_direct_answer_only_when_needed() {
    // Empty primary set.
    let ai = Arc::new(MockAi::default());
    let agent_none = agent(&[], ai.clone(), AgentConfig::default());
    let response = agent_none.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();
    assert_eq!(response.ai_response.as_deref(), Some("Direct answer to: hi"));
    assert!(response.tool_results.is_empty());

    // Every primary tool succeeded.
    let ai = Arc::new(MockAi::default());
    let ok = Arc::new(MockTool::primary("ok", 0.9));
    let agent_ok = agent(&[ok], ai.clone(), AgentConfig::default());
    let response = agent_ok.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();
    assert!(response.ai_response.is_none());
    assert_eq!(ai.calls(), 0);

    // One of two primary tools failed.
    let ai = Arc::new(MockAi::default());
    let ok = Arc::new(MockTool::primary("ok", 0.9));
    let bad = Arc::new(MockTool::primary("bad", 0.8).executing(Outcome::Fails));
    let agent_mixed = agent(&[ok, bad], ai.clone(), AgentConfig::default());
    let response = agent_mixed.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();
    assert!(response.ai_response.is_some());
    assert_eq!(response.tool_results.len(), 2);
    assert_eq!(ai.calls(), 1);
}

#[tokio::test]
async fn test_scenario_diagram_failure_adds_direct_answer() {
    let diagram = Arc::new(MockTool::primary("diagram_generator", 0.9).executing(Outcome::Panics));
    let agent = agent(&[diagram.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent
        .process_message("draw a diagram of the heart", &context(), &ActiveModes::new())
        .await
        .unwrap();

    let result = &response.tool_results[0];
    assert!(!result.is_success());
    assert!(result.content().is_none());
    assert!(result.error().is_some_and(|e| !e.is_empty()));
    assert!(response.ai_response.is_some_and(|a| !a.is_empty()));
}

#[tokio::test]
async fn test_model_error_becomes_apology() {
    let agent = agent(&[], Arc::new(MockAi::failing()), AgentConfig::default());

    let response = agent.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(response.ai_response.as_deref(), Some(FALLBACK_APOLOGY));
}

// === Isolation ===

#[tokio::test]
async fn test_panicking_tool_does_not_stop_siblings() {
    let first = Arc::new(MockTool::primary("first", 0.9).executing(Outcome::Panics));
    let second = Arc::new(MockTool::primary("second", 0.8));
    let agent = agent(&[first.clone(), second.clone()], Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(second.executed(), 1);
    assert_eq!(response.tool_results.len(), 2);
    assert!(!response.tool_results[0].is_success());
    assert!(response.tool_results[0].error().unwrap().contains("first"));
    assert!(response.tool_results[1].is_success());
}

#[tokio::test]
async fn test_unexpected_failure_degrades_to_direct_answer() {
    let tracker = Arc::new(MockTool::background("tracker", 0.5));
    let ai = Arc::new(MockAi {
        panic_on: vec![1],
        ..MockAi::default()
    });
    let agent = agent(&[tracker], ai.clone(), AgentConfig::default());

    let response = agent.process_message("hi", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(ai.calls(), 2);
    assert_eq!(response.ai_response.as_deref(), Some("Direct answer to: hi"));
    assert!(response.tool_results.is_empty());
}

#[tokio::test]
async fn test_unexpected_failure_with_failing_model_is_an_error() {
    let ai = Arc::new(MockAi {
        fail: true,
        panic_on: vec![1],
        ..MockAi::default()
    });
    let agent = agent(&[], ai, AgentConfig::default());

    let result = agent.process_message("hi", &context(), &ActiveModes::new()).await;

    assert_err!(&result);
    assert!(matches!(result, Err(TutorlyError::Model(_))));
}

// === Result envelope ===

#[tokio::test]
async fn test_execution_order_spans_primary_then_background() {
    let a = Arc::new(MockTool::primary("a", 0.6));
    let b = Arc::new(MockTool::primary("b", 0.9));
    let tracker = Arc::new(MockTool::background("tracker", 0.3));
    let agent = agent(&[a, tracker, b], Arc::new(MockAi::default()), AgentConfig::default());

    let response = agent.process_message("anything", &context(), &ActiveModes::new()).await.unwrap();

    assert_eq!(contents(&response.tool_results), vec!["b", "a", "tracker"]);
    let orders: Vec<_> = response.tool_results.iter().map(|r| r.execution_order()).collect();
    assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_duplicate_tool_names_are_rejected() {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(MockTool::primary("same", 0.5)),
        Arc::new(MockTool::primary("same", 0.5)),
    ];
    let result = AgentOrchestrator::new(tools, Arc::new(MockAi::default()), AgentConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_available_tools_lists_registry() {
    let agent = agent(
        &[
            Arc::new(MockTool::primary("one", 0.5)),
            Arc::new(MockTool::background("two", 0.5)),
        ],
        Arc::new(MockAi::default()),
        AgentConfig::default(),
    );

    let tools = agent.available_tools();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "one");
    assert_eq!(tools[0].triggers, "mock");
    assert_eq!(tools[1].role, ToolRole::Background);
}

// === Router determinism ===

#[test]
fn test_router_has_exactly_two_outcomes() {
    let summarize = [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "youtu.be/dQw4w9WgXcQ",
        "see https://www.youtube.com/embed/dQw4w9WgXcQ please",
        "https://youtube.com/v/dQw4w9WgXcQ",
    ];
    for query in summarize {
        assert!(matches!(classify(query), Route::Summarize(_)), "{query}");
    }

    let recommend = [
        "videos about plate tectonics",
        "https://example.com/watch?v=dQw4w9WgXcQ",
        "youtube",
        "",
    ];
    for query in recommend {
        assert_eq!(classify(query), Route::Recommend, "{query}");
    }
}

// === YouTube handler failures ===

struct MissingDownloader;

#[async_trait]
impl Summarizer for MissingDownloader {
    async fn summarize(&self, _url: &str) -> Result<String> {
        Err(TutorlyError::ToolNotFound("yt-dlp".to_string()))
    }
}

fn youtube_agent(router: YoutubeRouter, ai: Arc<MockAi>) -> AgentOrchestrator {
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(YouTubeTool::new(Arc::new(router)))];
    AgentOrchestrator::new(tools, ai, AgentConfig::default()).unwrap()
}

#[tokio::test]
async fn test_unconfigured_video_search_is_not_selected() {
    let ai = Arc::new(MockAi::default());
    let agent = youtube_agent(YoutubeRouter::new(None, None), ai.clone());

    let response = agent
        .process_message("find me videos about enzymes", &context(), &ActiveModes::new())
        .await
        .unwrap();

    assert!(response.tool_results.is_empty());
    assert_eq!(
        response.ai_response.as_deref(),
        Some("Direct answer to: find me videos about enzymes")
    );
    assert_eq!(ai.calls(), 1);
}

#[tokio::test]
async fn test_forced_unconfigured_video_search_fails_with_direct_answer() {
    let agent = youtube_agent(YoutubeRouter::new(None, None), Arc::new(MockAi::default()));

    let modes = ActiveModes::new().with(Mode::Youtube, true);
    let response = agent
        .process_message("find me videos about enzymes", &context(), &modes)
        .await
        .unwrap();

    let result = &response.tool_results[0];
    assert!(!result.is_success());
    assert!(result.content().is_none());
    assert!(result.error().is_some_and(|e| e.contains("YOUTUBE_API_KEY")));
    assert!(response.ai_response.is_some());
}

#[tokio::test]
async fn test_failed_video_summary_adds_direct_answer() {
    let agent = youtube_agent(
        YoutubeRouter::new(Some(Arc::new(MissingDownloader)), None),
        Arc::new(MockAi::default()),
    );

    let response = agent
        .process_message(
            "watch this video https://youtu.be/dQw4w9WgXcQ",
            &context(),
            &ActiveModes::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.tool_results.len(), 1);
    let result = &response.tool_results[0];
    assert!(!result.is_success());
    assert_eq!(result.message_type(), MessageType::Youtube);
    assert!(result.error().is_some_and(|e| e.contains("yt-dlp")));
    assert!(response.ai_response.is_some());
}

// === Flashcard duplicate safety ===

struct SameConcept;

#[async_trait]
impl ConceptExtractor for SameConcept {
    async fn extract_concepts(&self, _conversation: &str, _message: &str) -> Result<Vec<(String, String)>> {
        Ok(vec![(
            "action potential".to_string(),
            "a rapid change in voltage across a neuron membrane".to_string(),
        )])
    }
}

#[tokio::test]
async fn test_flashcard_tracker_is_duplicate_safe() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let tracker: Arc<dyn Tool> = Arc::new(FlashcardConceptTracker::new(
        store.clone(),
        Some(Arc::new(SameConcept)),
        5,
    ));
    let agent = AgentOrchestrator::new(vec![tracker], Arc::new(MockAi::default()), AgentConfig::default()).unwrap();

    let message = "explain what an action potential means for a neuron";
    let first = assert_ok!(agent.process_message(message, &context(), &ActiveModes::new()).await);
    let second = assert_ok!(agent.process_message(message, &context(), &ActiveModes::new()).await);

    let created = |r: &tutorly::agent::FinalResponse| {
        r.background_results().next().unwrap().metadata().unwrap()["flashcards_created"].clone()
    };
    assert_eq!(created(&first), 1);
    assert_eq!(created(&second), 0);

    let cards = store.list("chat-1").await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].term, "Action Potential");
    assert!(store.find_by_term("chat-1", "ACTION POTENTIAL").await.unwrap().is_some());
}
