//! Video recommendations from the YouTube Data API, ranked by the model.

use super::router::Recommender;
use super::VideoRecord;
use crate::ai::{extract_json_object, AiService, ChatMessage};
use crate::config::{Prompts, YoutubeSettings};
use crate::error::{Result, TutorlyError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const MIN_CANDIDATES: usize = 3;
const PICK_MAX_TOKENS: u32 = 500;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    kind: String,
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
    status: Status,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    privacy_status: Option<String>,
    upload_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Picks {
    #[serde(default)]
    recommendations: Vec<String>,
}

/// Searches YouTube and lets the model pick the most useful videos.
pub struct DataApiRecommender {
    http: reqwest::Client,
    api_key: String,
    ai: Arc<dyn AiService>,
    prompts: Prompts,
    max_results: u32,
    min_duration_seconds: u64,
    recommend_count: usize,
}

impl DataApiRecommender {
    pub fn new(
        api_key: String,
        ai: Arc<dyn AiService>,
        prompts: Prompts,
        settings: &YoutubeSettings,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TutorlyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            ai,
            prompts,
            max_results: settings.max_results,
            min_duration_seconds: settings.min_duration_seconds,
            recommend_count: settings.recommend_count,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let max_results = (self.max_results * 2).min(50).to_string();
        let response: SearchResponse = self
            .http
            .get(format!("{}/search", API_BASE))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter(|item| item.id.kind == "youtube#video")
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn details(&self, ids: &[String]) -> Result<Vec<VideoRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let response: VideosResponse = self
            .http
            .get(format!("{}/videos", API_BASE))
            .query(&[
                ("part", "snippet,contentDetails,statistics,status"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Keep search rank order.
        let mut by_id: HashMap<String, VideoItem> =
            response.items.into_iter().map(|v| (v.id.clone(), v)).collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .filter_map(|item| self.to_record(item))
            .collect())
    }

    /// Public, processed, and long enough, or `None`.
    fn to_record(&self, item: VideoItem) -> Option<VideoRecord> {
        if item.status.privacy_status.as_deref() != Some("public")
            || item.status.upload_status.as_deref() != Some("processed")
        {
            return None;
        }

        let duration = parse_iso8601_duration(&item.content_details.duration)?;
        if duration < self.min_duration_seconds {
            return None;
        }

        let parse_count = |v: Option<String>| v.and_then(|s| s.parse().ok()).unwrap_or(0);

        Some(VideoRecord {
            title: item.snippet.title,
            description: item.snippet.description,
            url: format!("https://www.youtube.com/watch?v={}", item.id),
            thumbnail: Some(format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", item.id)),
            views: parse_count(item.statistics.view_count),
            likes: parse_count(item.statistics.like_count),
            duration: duration as f64,
        })
    }

    async fn pick(&self, query: &str, candidates: &[VideoRecord]) -> Result<Vec<VideoRecord>> {
        let listing = candidates
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}. Title: {}\nDescription: {}\nLink: {}", i + 1, v.title, v.description, v.url))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("count".to_string(), self.recommend_count.to_string());
        vars.insert("videos".to_string(), listing);
        let prompt = self.prompts.render_with_custom(&self.prompts.youtube.recommend, &vars);

        let response = self
            .ai
            .get_ai_response(&[ChatMessage::user(prompt)], PICK_MAX_TOKENS, 0.5)
            .await?;

        let json = extract_json_object(&response).ok_or_else(|| {
            TutorlyError::YouTube("Could not find a valid JSON object in the model response.".to_string())
        })?;
        let picks: Picks = serde_json::from_str(json)?;

        Ok(select_by_titles(candidates, &picks.recommendations, self.recommend_count))
    }
}

/// Candidates whose titles the model picked, in pick order. Falls back to the
/// top search results when none of the titles match.
fn select_by_titles(candidates: &[VideoRecord], titles: &[String], count: usize) -> Vec<VideoRecord> {
    let picked: Vec<VideoRecord> = titles
        .iter()
        .filter_map(|title| candidates.iter().find(|c| c.title.trim() == title.trim()))
        .take(count)
        .cloned()
        .collect();

    if picked.is_empty() {
        warn!("No recommended title matched a candidate, using search order");
        return candidates.iter().take(count).cloned().collect();
    }
    picked
}

#[async_trait]
impl Recommender for DataApiRecommender {
    #[instrument(skip(self, _history))]
    async fn recommend(&self, query: &str, _history: &[ChatMessage]) -> Result<Vec<VideoRecord>> {
        let ids = self.search(query).await?;
        debug!("Search returned {} videos", ids.len());

        let candidates = self.details(&ids).await?;
        info!("{} candidate videos after filtering", candidates.len());

        if candidates.len() < MIN_CANDIDATES {
            return Err(TutorlyError::YouTube(
                "Not enough available videos found to make recommendations. Please try a different search query."
                    .to_string(),
            ));
        }

        self.pick(query, &candidates).await
    }
}

/// Parse an ISO 8601 duration such as `PT1H2M10S` into seconds.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let rest = value.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut total = 0u64;
    let mut number = String::new();

    for c in date_part.chars() {
        match c {
            '0'..='9' => number.push(c),
            'W' => total += number.parse::<u64>().ok()? * 7 * 86_400,
            'D' => total += number.parse::<u64>().ok()? * 86_400,
            _ => return None,
        }
        if !c.is_ascii_digit() {
            number.clear();
        }
    }

    for c in time_part.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' => total += number.parse::<u64>().ok()? * 3600,
            'M' => total += number.parse::<u64>().ok()? * 60,
            'S' => total += number.parse::<f64>().ok()? as u64,
            _ => return None,
        }
        if !(c.is_ascii_digit() || c == '.') {
            number.clear();
        }
    }

    if !number.is_empty() {
        return None;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str) -> VideoRecord {
        VideoRecord {
            title: title.to_string(),
            description: String::new(),
            url: format!("https://www.youtube.com/watch?v={}", title),
            thumbnail: None,
            views: 0,
            likes: 0,
            duration: 600.0,
        }
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_iso8601_duration("PT1H2M10S"), Some(3730));
        assert_eq!(parse_iso8601_duration("PT5M"), Some(300));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
        assert_eq!(parse_iso8601_duration("1H"), None);
        assert_eq!(parse_iso8601_duration("PT5X"), None);
    }

    #[test]
    fn test_select_by_titles_keeps_pick_order() {
        let candidates = vec![video("a"), video("b"), video("c"), video("d")];
        let titles = vec!["c".to_string(), "missing".to_string(), "a".to_string()];
        let picked = select_by_titles(&candidates, &titles, 3);
        let names: Vec<_> = picked.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_select_by_titles_falls_back_to_search_order() {
        let candidates = vec![video("a"), video("b"), video("c"), video("d")];
        let picked = select_by_titles(&candidates, &["zzz".to_string()], 3);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].title, "a");
    }
}
