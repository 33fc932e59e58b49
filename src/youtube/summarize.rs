//! Summarize a video: download audio, transcribe, summarize.

use super::router::Summarizer;
use crate::ai::{AiService, ChatMessage};
use crate::config::{AiSettings, Prompts};
use crate::error::{Result, TutorlyError};
use crate::openai::client_from_settings;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, instrument};
use url::Url;

const SUMMARY_MAX_TOKENS: u32 = 1200;
/// Transcripts longer than this are cut before summarizing.
const MAX_TRANSCRIPT_CHARS: usize = 48_000;

/// Downloads audio with yt-dlp, transcribes it with Whisper and summarizes
/// the transcript with the completion model.
pub struct WhisperSummarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    transcription_model: String,
    ai: Arc<dyn AiService>,
    prompts: Prompts,
    temp_dir: PathBuf,
}

impl WhisperSummarizer {
    pub fn new(
        settings: &AiSettings,
        transcription_model: &str,
        ai: Arc<dyn AiService>,
        prompts: Prompts,
        temp_dir: PathBuf,
    ) -> Result<Self> {
        Ok(Self {
            client: client_from_settings(settings)?,
            transcription_model: transcription_model.to_string(),
            ai,
            prompts,
            temp_dir,
        })
    }

    #[instrument(skip(self, work_dir))]
    async fn download_audio(&self, url: &str, work_dir: &Path) -> Result<PathBuf> {
        let template = work_dir.join("audio.%(ext)s");

        let result = Command::new("yt-dlp")
            .arg("--extract-audio")
            .arg("--audio-format").arg("mp3")
            .arg("--audio-quality").arg("5")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TutorlyError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(TutorlyError::ToolFailed(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TutorlyError::YouTube(format!("Error downloading video: {}", stderr.trim())));
        }

        find_audio_file(work_dir)
    }

    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("audio.mp3".to_string(), file_bytes))
            .model(&self.transcription_model)
            .response_format(AudioResponseFormat::VerboseJson)
            .build()
            .map_err(|e| TutorlyError::YouTube(format!("Failed to build transcription request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| TutorlyError::OpenAI(format!("Whisper API error: {}", e)))?;

        debug!("Transcribed {:.0}s of audio", response.duration);
        Ok(response.text.trim().to_string())
    }

    async fn summarize_transcript(&self, transcript: &str) -> Result<String> {
        let clipped: String = transcript.chars().take(MAX_TRANSCRIPT_CHARS).collect();
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), clipped);
        let prompt = self.prompts.render_with_custom(&self.prompts.youtube.summarize, &vars);

        self.ai
            .get_ai_response(&[ChatMessage::user(prompt)], SUMMARY_MAX_TOKENS, 0.3)
            .await
    }
}

#[async_trait]
impl Summarizer for WhisperSummarizer {
    async fn summarize(&self, url: &str) -> Result<String> {
        let url = normalize_video_url(url)?;
        info!("Summarizing video {}", url);

        std::fs::create_dir_all(&self.temp_dir)?;
        // Removed on drop, including the downloaded audio.
        let work_dir = tempfile::Builder::new()
            .prefix("tutorly-video-")
            .tempdir_in(&self.temp_dir)?;

        let audio = self.download_audio(&url, work_dir.path()).await?;
        let transcript = self.transcribe(&audio).await?;
        if transcript.is_empty() {
            return Err(TutorlyError::YouTube(
                "No text was extracted from the video".to_string(),
            ));
        }

        self.summarize_transcript(&transcript).await
    }
}

/// Turn a matched link into a full `https://www.youtube.com/...` or
/// `https://youtu.be/...` URL, rejecting anything else.
pub fn normalize_video_url(raw: &str) -> Result<String> {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| TutorlyError::InvalidInput(format!("Invalid video URL {}: {}", raw, e)))?;

    url.set_scheme("https")
        .map_err(|_| TutorlyError::InvalidInput(format!("Unsupported video URL scheme: {}", raw)))?;
    let host = url.host_str().unwrap_or_default().to_string();
    if matches!(host.as_str(), "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" | "www.youtube-nocookie.com") {
        url.set_host(Some("www.youtube.com"))
            .map_err(|e| TutorlyError::InvalidInput(e.to_string()))?;
    }

    let normalized = url.to_string();
    if normalized.starts_with("https://www.youtube.com/") || normalized.starts_with("https://youtu.be/") {
        Ok(normalized)
    } else {
        Err(TutorlyError::YouTube("Please provide a valid YouTube URL".to_string()))
    }
}

fn find_audio_file(dir: &Path) -> Result<PathBuf> {
    for ext in ["mp3", "m4a", "opus", "webm", "ogg"] {
        let candidate = dir.join(format!("audio.{}", ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)?;
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with("audio") {
            return Ok(entry.path());
        }
    }

    Err(TutorlyError::YouTube("Audio file not found after download".into()))
}
