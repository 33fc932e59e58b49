//! CLI module for Tutorly.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tutorly - a tutoring assistant that picks the right tool for each question
///
/// Draws diagrams, finds and summarizes videos, builds quizzes, answers from
/// uploaded documents, and collects flashcards as you learn.
#[derive(Parser, Debug)]
#[command(name = "tutorly")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single message to the tutor
    Ask {
        /// The message to send
        message: String,

        /// Chat to attach the message to
        #[arg(long, default_value = "default")]
        chat: String,

        /// Force a diagram for this message
        #[arg(long)]
        diagram: bool,

        /// Force a YouTube lookup for this message
        #[arg(long)]
        youtube: bool,
    },

    /// Start an interactive tutoring session
    Chat {
        /// Chat to continue
        #[arg(long, default_value = "default")]
        chat: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Index a text document for a chat
    Index {
        /// Path to a plain-text or markdown file
        file: String,

        /// Chat the document belongs to
        #[arg(long, default_value = "default")]
        chat: String,
    },

    /// List the flashcards collected in a chat
    Flashcards {
        /// Chat to list
        #[arg(long, default_value = "default")]
        chat: String,
    },

    /// List the tools the agent can use
    Tools,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// User id used for turns sent from the command line.
pub const LOCAL_USER: &str = "local";
