//! Tutorly - a tutoring assistant with agentic tool selection
//!
//! Every user message is scored against a fixed set of tools. The best
//! matches run, an always-on background tool collects flashcards, and the
//! model answers directly whenever no tool did.
//!
//! # Architecture
//!
//! - `agent` - Tool interface, mode forcing, selection, reconciliation
//! - `tools` - Diagram, YouTube, quiz, document and flashcard tools
//! - `services` - Model-backed diagram, quiz and concept collaborators
//! - `youtube` - Video link router with summarize and recommend handlers
//! - `rag` - Chat-scoped document index
//! - `store` - Flashcard and question bank persistence
//! - `ai` - Chat completion collaborator
//! - `runtime` - Builds all of the above from `config::Settings`
//!
//! # Example
//!
//! ```rust,no_run
//! use tutorly::agent::ActiveModes;
//! use tutorly::config::Settings;
//! use tutorly::runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Runtime::new(Settings::load()?)?;
//!
//!     let response = runtime
//!         .handle_message("chat-1", "me", Vec::new(), "Quiz me on osmosis", &ActiveModes::new())
//!         .await?;
//!     println!("{} tool results", response.tool_results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod ai;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod rag;
pub mod runtime;
pub mod services;
pub mod store;
pub mod tools;
pub mod youtube;

pub use error::{Result, TutorlyError};
