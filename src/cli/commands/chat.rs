//! Interactive tutoring session.

use crate::agent::{ActiveModes, FinalResponse, Mode};
use crate::ai::ChatMessage;
use crate::cli::{preflight, Output, LOCAL_USER};
use crate::config::Settings;
use crate::runtime::Runtime;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// History kept between turns, in messages.
const MAX_HISTORY: usize = 30;

/// Run the interactive chat command.
pub async fn run_chat(chat: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check_api_key() {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }
    for warning in preflight::optional_warnings(&settings) {
        Output::warning(&warning);
    }

    let runtime = Runtime::new(settings)?;
    let mut history: Vec<ChatMessage> = Vec::new();
    let mut modes = ActiveModes::new();

    println!("\n{}", style("Tutorly").bold().cyan());
    println!(
        "{}\n",
        style("Ask anything. /diagram and /youtube toggle modes, /clear resets, 'exit' quits.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let active = modes.active_names();
        if active.is_empty() {
            print!("{} ", style("You:").green().bold());
        } else {
            print!("{} {} ", style("You").green().bold(), style(format!("[{}]:", active.join(","))).dim());
        }
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        match input {
            "/clear" => {
                history.clear();
                Output::info("Conversation history cleared.");
                continue;
            }
            "/diagram" | "/youtube" => {
                let mode = if input == "/diagram" { Mode::Diagram } else { Mode::Youtube };
                let on = modes.toggle(mode);
                Output::info(&format!("{} mode {}", mode, if on { "on" } else { "off" }));
                continue;
            }
            _ => {}
        }

        let spinner = Output::spinner("Thinking...");
        let result = runtime
            .handle_message(chat, LOCAL_USER, history.clone(), input, &modes)
            .await;
        spinner.finish_and_clear();

        match result {
            Ok(response) => {
                Output::response(&response, |id| runtime.diagram_path(id));
                history.push(ChatMessage::user(input));
                if let Some(reply) = reply_text(&response) {
                    history.push(ChatMessage::assistant(reply));
                }
                let excess = history.len().saturating_sub(MAX_HISTORY);
                history.drain(..excess);
            }
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}

/// Text to remember as the tutor's side of the turn.
fn reply_text(response: &FinalResponse) -> Option<String> {
    response.ai_response.clone().or_else(|| {
        response
            .primary_results()
            .find_map(|r| r.content().map(str::to_string))
    })
}
