//! Classify a query as a video link or a search, then dispatch.

use super::{VideoRecord, YouTubeReply, YouTubeService};
use crate::ai::ChatMessage;
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, instrument};

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^"&?\s]{11})"#,
    )
    .expect("valid video URL regex")
});

/// Summarize-by-transcript handler.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, url: &str) -> Result<String>;
}

/// Recommend-by-search handler.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, query: &str, history: &[ChatMessage]) -> Result<Vec<VideoRecord>>;
}

/// Where a query goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The query contains a video link; carries the matched link.
    Summarize(String),
    Recommend,
}

/// Classify a query. A video link anywhere in the text wins.
pub fn classify(query: &str) -> Route {
    match VIDEO_URL.find(query) {
        Some(m) => Route::Summarize(m.as_str().to_string()),
        None => Route::Recommend,
    }
}

/// Dispatches each query to exactly one handler and turns handler errors
/// into a reply for the user.
pub struct YoutubeRouter {
    summarizer: Option<Arc<dyn Summarizer>>,
    recommender: Option<Arc<dyn Recommender>>,
}

impl YoutubeRouter {
    pub fn new(
        summarizer: Option<Arc<dyn Summarizer>>,
        recommender: Option<Arc<dyn Recommender>>,
    ) -> Self {
        Self {
            summarizer,
            recommender,
        }
    }

    async fn dispatch(&self, route: &Route, query: &str, history: &[ChatMessage]) -> Result<String> {
        match route {
            Route::Summarize(url) => {
                let summarizer = self.summarizer.as_ref().ok_or_else(|| {
                    TutorlyError::YouTube("Video summaries are not configured.".to_string())
                })?;
                summarizer.summarize(url).await
            }
            Route::Recommend => {
                let recommender = self.recommender.as_ref().ok_or_else(|| {
                    TutorlyError::YouTube(
                        "Video search is not configured. Set YOUTUBE_API_KEY to enable it.".to_string(),
                    )
                })?;
                let videos = recommender.recommend(query, history).await?;
                Ok(serde_json::to_string(&videos)?)
            }
        }
    }
}

#[async_trait]
impl YouTubeService for YoutubeRouter {
    fn is_available(&self, query: &str) -> bool {
        match classify(query) {
            Route::Summarize(_) => self.summarizer.is_some(),
            Route::Recommend => self.recommender.is_some(),
        }
    }

    #[instrument(skip(self, query, history))]
    async fn get_agent_response(&self, query: &str, history: &[ChatMessage]) -> YouTubeReply {
        let route = classify(query);
        info!("YouTube request routed to {:?}", route);

        match self.dispatch(&route, query, history).await {
            Ok(reply) => YouTubeReply::Answer(reply),
            Err(e) => {
                error!("Error in YouTube router: {}", e);
                YouTubeReply::Failed(user_facing(&route, &e))
            }
        }
    }
}

fn user_facing(route: &Route, error: &TutorlyError) -> String {
    let detail = match error {
        TutorlyError::YouTube(msg) => msg.clone(),
        other => other.to_string(),
    };
    match route {
        Route::Summarize(_) => format!("Sorry, I couldn't summarize that video. {}", detail),
        Route::Recommend => format!("Sorry, I couldn't find videos for that. {}", detail),
    }
}
