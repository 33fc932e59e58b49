//! CLI output formatting utilities.

use crate::agent::{FinalResponse, MessageType, ToolResult};
use crate::store::Flashcard;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a flashcard.
    pub fn flashcard(card: &Flashcard) {
        println!("  {} {}", style("*").cyan(), style(&card.term).bold());
        println!("    {}", card.definition);
    }

    /// Print everything the agent produced for one message.
    ///
    /// `diagram_path` maps a diagram image id to where the image was saved.
    pub fn response(response: &FinalResponse, diagram_path: impl Fn(&str) -> std::path::PathBuf) {
        for result in response.primary_results() {
            Self::tool_result(result, &diagram_path);
        }

        if let Some(answer) = &response.ai_response {
            println!("\n{} {}\n", style("Tutor:").cyan().bold(), answer);
        }

        for result in response.background_results() {
            if let Some(note) = result.content() {
                println!("{}", style(format!("  [{}]", note)).dim());
            }
        }
    }

    fn tool_result(result: &ToolResult, diagram_path: &impl Fn(&str) -> std::path::PathBuf) {
        if !result.is_success() {
            Self::warning(result.error().unwrap_or("Tool failed"));
            return;
        }

        if let Some(content) = result.content() {
            println!("\n{}", content);
        }

        let Some(data) = result.structured_data() else {
            return;
        };

        match result.message_type() {
            MessageType::Diagram => {
                if let Some(id) = data["diagram_image_id"].as_str() {
                    Self::kv("Diagram", &display_path(&diagram_path(id)));
                }
            }
            MessageType::Youtube => {
                for video in data["videos"].as_array().into_iter().flatten() {
                    let duration = video["duration"].as_f64().unwrap_or(0.0);
                    println!(
                        "  {} {} ({})",
                        style("*").cyan(),
                        style(video["title"].as_str().unwrap_or("Untitled")).bold(),
                        format_duration(duration)
                    );
                    if let Some(url) = video["url"].as_str() {
                        println!("    {}", style(url).dim());
                    }
                }
            }
            MessageType::Quiz => {
                if let Some(html) = data["quiz_html"].as_str() {
                    println!("{}", html);
                }
            }
            _ => {}
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
