//! OpenAI-compatible client configuration.

use crate::config::AiSettings;
use crate::error::{Result, TutorlyError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for model API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the default OpenAI endpoint.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with(None, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client from the `[ai]` settings section.
pub fn client_from_settings(settings: &AiSettings) -> Result<Client<OpenAIConfig>> {
    create_client_with(
        settings.api_base.as_deref(),
        Duration::from_secs(settings.timeout_seconds),
    )
}

/// Create a client with an optional custom base URL and a request timeout.
///
/// Any OpenAI-compatible endpoint works here; the key is read from
/// `OPENAI_API_KEY` by `OpenAIConfig`.
pub fn create_client_with(api_base: Option<&str>, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TutorlyError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
