//! Ask command implementation.

use crate::agent::{ActiveModes, Mode};
use crate::cli::{preflight, Output, LOCAL_USER};
use crate::config::Settings;
use crate::runtime::Runtime;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(message: &str, chat: &str, diagram: bool, youtube: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_api_key() {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let runtime = Runtime::new(settings)?;
    let modes = ActiveModes::new()
        .with(Mode::Diagram, diagram)
        .with(Mode::Youtube, youtube);

    let spinner = Output::spinner("Thinking...");
    let result = runtime
        .handle_message(chat, LOCAL_USER, Vec::new(), message, &modes)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            Output::response(&response, |id| runtime.diagram_path(id));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            Err(e.into())
        }
    }
}
