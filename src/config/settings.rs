//! Configuration settings for Tutorly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub agent: AgentSettings,
    pub ai: AiSettings,
    pub youtube: YoutubeSettings,
    pub flashcards: FlashcardSettings,
    pub quiz: QuizSettings,
    pub diagram: DiagramSettings,
    pub rag: RagSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (database, rendered diagrams).
    pub data_dir: String,
    /// Directory for temporary files (downloaded audio).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.tutorly".to_string(),
            temp_dir: "/tmp/tutorly".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Tool selection settings for the agent orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Minimum confidence a tool needs to be selected as a primary tool.
    pub confidence_threshold: f32,
    /// Maximum number of primary tools executed for a single message.
    pub max_tools_per_message: usize,
    /// Token budget for the direct fallback answer.
    pub fallback_max_tokens: u32,
    /// Sampling temperature for the direct fallback answer.
    pub fallback_temperature: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            max_tools_per_message: 2,
            fallback_max_tokens: 1000,
            fallback_temperature: 0.7,
        }
    }
}

/// Chat completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Model used for direct answers.
    pub model: String,
    /// Base URL of an OpenAI-compatible endpoint. None uses the OpenAI default.
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            timeout_seconds: 300,
        }
    }
}

/// YouTube recommendation and summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. The `YOUTUBE_API_KEY` environment variable takes precedence.
    pub api_key: Option<String>,
    /// Number of videos requested per search page.
    pub max_results: u32,
    /// Videos shorter than this are never recommended.
    pub min_duration_seconds: u64,
    /// How many videos the model picks from the candidates.
    pub recommend_count: usize,
    /// Model that picks recommendations and writes summaries.
    pub model: String,
    /// Whisper model used to transcribe videos before summarizing.
    pub transcription_model: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: 10,
            min_duration_seconds: 300,
            recommend_count: 3,
            model: "gpt-4o-mini".to_string(),
            transcription_model: "whisper-1".to_string(),
        }
    }
}

impl YoutubeSettings {
    /// Resolve the API key from the environment or the config file.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("YOUTUBE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.is_empty()))
    }
}

/// Background concept tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashcardSettings {
    /// Enable automatic concept extraction.
    pub enabled: bool,
    /// Model used to extract concepts.
    pub model: String,
    /// Number of recent history messages given to the extractor.
    pub max_recent_messages: usize,
}

impl Default for FlashcardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini".to_string(),
            max_recent_messages: 5,
        }
    }
}

/// Quiz generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Model used to write quiz HTML.
    pub model: String,
    /// Minimum characters of conversation needed before a quiz is attempted.
    pub min_content_chars: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            min_content_chars: 100,
        }
    }
}

/// Diagram generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    /// Model used to describe the concept and write Graphviz source.
    pub model: String,
    /// Graphviz executable used for rendering.
    pub dot_command: String,
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            dot_command: "dot".to_string(),
        }
    }
}

/// Document retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Embedding model.
    pub embedding_model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Words per indexed passage.
    pub chunk_words: usize,
    /// Words shared between consecutive passages.
    pub chunk_overlap: usize,
    /// Passages returned per query.
    pub top_k: usize,
    /// Minimum similarity for a passage to be returned.
    pub min_score: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            chunk_words: 200,
            chunk_overlap: 20,
            top_k: 4,
            min_score: 0.3,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TutorlyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tutorly")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// SQLite database holding flashcards, the question bank and indexed documents.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("tutorly.db")
    }

    /// Directory where rendered diagrams are written.
    pub fn diagram_dir(&self) -> PathBuf {
        self.data_dir().join("diagrams")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.agent.confidence_threshold, 0.5);
        assert_eq!(settings.agent.max_tools_per_message, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [agent]
            max_tools_per_message = 4
            "#,
        )
        .unwrap();
        assert_eq!(settings.agent.max_tools_per_message, 4);
        assert_eq!(settings.agent.confidence_threshold, 0.5);
        assert_eq!(settings.youtube.min_duration_seconds, 300);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.agent.confidence_threshold = 0.7;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.confidence_threshold, 0.7);
    }
}
