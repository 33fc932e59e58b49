//! Pre-flight checks before starting the agent.
//!
//! The API key is required. Missing external binaries only disable the tools
//! that shell out to them, so they are reported as warnings.

use crate::config::Settings;
use crate::error::{Result, TutorlyError};
use std::process::Command;

/// Fail unless an OpenAI API key is configured.
pub fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(TutorlyError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(TutorlyError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Problems that disable individual tools without stopping the agent.
pub fn optional_warnings(settings: &Settings) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Err(e) = check_tool("yt-dlp", "--version") {
        warnings.push(format!("{}; video summaries will fail", e));
    }
    if let Err(e) = check_tool(&settings.diagram.dot_command, "-V") {
        warnings.push(format!("{}; diagrams will fail", e));
    }
    if settings.youtube.resolved_api_key().is_none() {
        warnings.push("YOUTUBE_API_KEY not set; video recommendations are disabled".to_string());
    }

    warnings
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_arg: &str) -> Result<()> {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TutorlyError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TutorlyError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TutorlyError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
