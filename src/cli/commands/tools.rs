//! Tools command implementation.

use crate::agent::ToolRole;
use crate::cli::Output;
use crate::config::Settings;
use crate::runtime::Runtime;
use anyhow::Result;

/// List the tools registered with the agent.
pub fn run_tools(settings: Settings) -> Result<()> {
    let runtime = Runtime::new(settings)?;

    Output::header("Available tools");
    for tool in runtime.agent().available_tools() {
        let role = match tool.role {
            ToolRole::Primary => "",
            ToolRole::Background => " (background)",
        };
        Output::list_item(&format!("{}{}", tool.name, role));
        Output::kv("Description", &tool.description);
        if !tool.triggers.is_empty() {
            Output::kv("Triggers", &tool.triggers);
        }
    }
    Ok(())
}
