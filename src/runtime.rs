//! Wires settings, collaborators and tools into a ready agent.

use crate::agent::{
    ActiveModes, AgentConfig, AgentOrchestrator, ChatContext, FinalResponse, Tool, FILES_RAG_INSTANCE,
};
use crate::ai::{AiService, ChatMessage, OpenAiCompletion};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::rag::{DocumentIndex, OpenAIEmbedder, RetrievalConfig, SqliteDocumentIndex};
use crate::services::{ConceptExtractor, GraphvizDiagramService, LlmConceptExtractor, LlmQuizService};
use crate::store::{FlashcardStore, QuestionBank, SqliteStore};
use crate::tools::{ContextTool, DiagramTool, FlashcardConceptTracker, QuizTool, YouTubeTool};
use crate::youtube::{DataApiRecommender, Recommender, Summarizer, WhisperSummarizer, YoutubeRouter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A fully assembled tutoring agent and the stores it writes to.
pub struct Runtime {
    settings: Settings,
    agent: AgentOrchestrator,
    store: Arc<SqliteStore>,
    documents: Arc<SqliteDocumentIndex>,
    diagrams: Arc<GraphvizDiagramService>,
}

impl Runtime {
    /// Build every collaborator from settings.
    ///
    /// Optional collaborators that cannot be configured (no YouTube API key,
    /// flashcards disabled) leave their tool registered but inert.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        std::fs::create_dir_all(settings.data_dir())?;
        std::fs::create_dir_all(settings.diagram_dir())?;

        let ai: Arc<dyn AiService> = Arc::new(OpenAiCompletion::new(&settings.ai)?);
        let model_for = |model: &str| -> Result<Arc<dyn AiService>> {
            Ok(Arc::new(OpenAiCompletion::with_model(&settings.ai, model)?))
        };

        let db_path = settings.database_path();
        let store = Arc::new(SqliteStore::new(&db_path)?);

        let embedder = Arc::new(OpenAIEmbedder::new(&settings.ai, &settings.rag)?);
        let documents = Arc::new(SqliteDocumentIndex::new(
            &db_path,
            embedder,
            RetrievalConfig::from(&settings.rag),
        )?);

        let diagrams = Arc::new(
            GraphvizDiagramService::new(
                model_for(&settings.diagram.model)?,
                prompts.clone(),
                settings.diagram_dir(),
            )
            .with_dot_command(&settings.diagram.dot_command),
        );

        let quiz = Arc::new(LlmQuizService::new(
            model_for(&settings.quiz.model)?,
            prompts.clone(),
            settings.quiz.min_content_chars,
        ));

        let youtube = Arc::new(Self::youtube_router(&settings, &prompts, model_for(&settings.youtube.model)?)?);

        let extractor: Option<Arc<dyn ConceptExtractor>> = if settings.flashcards.enabled {
            Some(Arc::new(LlmConceptExtractor::new(
                model_for(&settings.flashcards.model)?,
                prompts.clone(),
            )))
        } else {
            info!("Flashcard extraction disabled");
            None
        };

        let bank: Arc<dyn QuestionBank> = store.clone();
        let flashcards: Arc<dyn FlashcardStore> = store.clone();
        let index: Arc<dyn DocumentIndex> = documents.clone();

        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(DiagramTool::new(diagrams.clone())),
            Arc::new(YouTubeTool::new(youtube)),
            Arc::new(QuizTool::new(quiz).with_question_bank(bank)),
            Arc::new(ContextTool::new(Some(index))),
            Arc::new(FlashcardConceptTracker::new(
                flashcards,
                extractor,
                settings.flashcards.max_recent_messages,
            )),
        ];

        let agent = AgentOrchestrator::new(tools, ai, AgentConfig::from(&settings.agent))?
            .with_system_prompt(&prompts.tutor.system);

        Ok(Self {
            settings,
            agent,
            store,
            documents,
            diagrams,
        })
    }

    fn youtube_router(settings: &Settings, prompts: &Prompts, ai: Arc<dyn AiService>) -> Result<YoutubeRouter> {
        let summarizer: Arc<dyn Summarizer> = Arc::new(WhisperSummarizer::new(
            &settings.ai,
            &settings.youtube.transcription_model,
            ai.clone(),
            prompts.clone(),
            settings.temp_dir(),
        )?);

        let recommender: Option<Arc<dyn Recommender>> = match settings.youtube.resolved_api_key() {
            Some(key) => Some(Arc::new(DataApiRecommender::new(
                key,
                ai,
                prompts.clone(),
                &settings.youtube,
            )?)),
            None => {
                warn!("YOUTUBE_API_KEY not set, video recommendations are unavailable");
                None
            }
        };

        Ok(YoutubeRouter::new(Some(summarizer), recommender))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn agent(&self) -> &AgentOrchestrator {
        &self.agent
    }

    pub fn flashcards(&self) -> Arc<dyn FlashcardStore> {
        self.store.clone()
    }

    pub fn question_bank(&self) -> Arc<dyn QuestionBank> {
        self.store.clone()
    }

    pub fn documents(&self) -> Arc<dyn DocumentIndex> {
        self.documents.clone()
    }

    /// Where a generated diagram image is stored.
    pub fn diagram_path(&self, image_id: &str) -> PathBuf {
        self.diagrams.image_path(image_id)
    }

    /// Build the per-request context for a chat turn.
    pub fn context_for(&self, chat_id: &str, user_id: &str, history: Vec<ChatMessage>) -> ChatContext {
        ChatContext::new(chat_id, user_id)
            .with_messages(history)
            .with_index(FILES_RAG_INSTANCE, self.documents())
    }

    /// Run one chat turn through the agent.
    #[instrument(skip(self, history, message, modes))]
    pub async fn handle_message(
        &self,
        chat_id: &str,
        user_id: &str,
        history: Vec<ChatMessage>,
        message: &str,
        modes: &ActiveModes,
    ) -> Result<FinalResponse> {
        let context = self.context_for(chat_id, user_id, history);
        self.agent.process_message(message, &context, modes).await
    }
}
