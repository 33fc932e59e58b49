//! Configuration module for Tutorly.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{
    DiagramPrompts, FlashcardPrompts, Prompts, QuizPrompts, TutorPrompts, YoutubePrompts,
};
pub use settings::{
    AgentSettings, AiSettings, DiagramSettings, FlashcardSettings, GeneralSettings,
    PromptSettings, QuizSettings, RagSettings, ServerSettings, Settings, YoutubeSettings,
};
