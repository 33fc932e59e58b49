//! YouTube video lookup: summarize a linked video or recommend videos for a topic.

mod recommend;
mod router;
mod summarize;

pub use recommend::{parse_iso8601_duration, DataApiRecommender};
pub use router::{classify, Recommender, Route, Summarizer, YoutubeRouter};
pub use summarize::{normalize_video_url, WhisperSummarizer};

use crate::ai::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A recommended video, as exchanged between the router and the YouTube tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// What the YouTube collaborator said about a query.
#[derive(Debug, Clone, PartialEq)]
pub enum YouTubeReply {
    /// A JSON list of [`VideoRecord`]s or free-form text such as a summary.
    Answer(String),
    /// The handler could not serve the query. Carries a user-facing explanation.
    Failed(String),
}

/// YouTube collaborator used by the YouTube tool.
///
/// Failures are reported as a [`YouTubeReply::Failed`] text, never as errors.
#[async_trait]
pub trait YouTubeService: Send + Sync {
    /// Whether a handler is configured for this query at all.
    fn is_available(&self, _query: &str) -> bool {
        true
    }

    async fn get_agent_response(&self, query: &str, history: &[ChatMessage]) -> YouTubeReply;
}
