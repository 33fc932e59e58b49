//! Error types for Tutorly.

use thiserror::Error;

/// Library-level error type for Tutorly operations.
#[derive(Error, Debug)]
pub enum TutorlyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI service error: {0}")]
    Ai(String),

    /// Raised by the completion collaborator when the model call itself fails.
    #[error("Model error: {0}")]
    Model(String),

    #[error("Diagram generation failed: {0}")]
    Diagram(String),

    #[error("YouTube error: {0}")]
    YouTube(String),

    #[error("Quiz generation failed: {0}")]
    Quiz(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("Flashcard error: {0}")]
    Flashcard(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for Tutorly operations.
pub type Result<T> = std::result::Result<T, TutorlyError>;
