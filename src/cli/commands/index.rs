//! Index command implementation.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use std::path::Path;

/// Index a text file into a chat's document index.
pub async fn run_index(file: &str, chat: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_api_key() {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let path = Settings::expand_path(file);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());

    let runtime = Runtime::new(settings)?;

    let spinner = Output::spinner(&format!("Indexing {}...", name));
    let result = runtime.documents().index_document(chat, &name, &text).await;
    spinner.finish_and_clear();

    let chunks = result?;
    Output::success(&format!("Indexed {} ({} chunks) into chat '{}'", name, chunks, chat));
    Ok(())
}
