//! Prompt templates for Tutorly.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub tutor: TutorPrompts,
    pub quiz: QuizPrompts,
    pub diagram: DiagramPrompts,
    pub flashcards: FlashcardPrompts,
    pub youtube: YoutubePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompt for direct answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorPrompts {
    pub system: String,
}

impl Default for TutorPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a patient, encouraging tutor. Explain concepts clearly, build on what the student already said in this conversation, and prefer short worked examples over long lectures. When you are unsure, say so."#
                .to_string(),
        }
    }
}

/// Prompts for quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub user: String,
    /// Focus line used when the student asks for more questions on the current topic.
    pub more_focus: String,
    /// Focus line used for a fresh quiz request.
    pub query_focus: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            more_focus: "The user is asking for MORE quizzes on the topic of '{{topic}}'. Create new, different questions about {{topic}} concepts, theories, and practical applications. Do NOT create questions about the conversation itself - focus entirely on testing knowledge of {{topic}}."
                .to_string(),
            query_focus: "The user has specifically asked to be quizzed on: '{{query}}'. Create questions that test knowledge and understanding of this topic, focusing on educational content rather than conversation details."
                .to_string(),
            user: r#"You are an educational quiz generator that creates questions to test understanding of academic topics.
{{focus}}

Guidelines:
- Test understanding of concepts, theories and practical applications
- Never ask about what the user asked or what happened in the conversation
- Make questions challenging but fair
- All 4 options must be plausible, exactly one correct

Create at least 2 multiple-choice questions (4 options per question).
For each question, use this HTML structure:
<div class="quiz-question" data-correct="B">
  <div class="font-semibold mb-1">What is 2+2?</div>
  <form>
    <label><input type="radio" name="q1" value="A"> 3</label><br>
    <label><input type="radio" name="q1" value="B"> 4</label><br>
    <label><input type="radio" name="q1" value="C"> 5</label><br>
    <label><input type="radio" name="q1" value="D"> 6</label><br>
    <button type="submit">Check Answer</button>
  </form>
  <div class="quiz-feedback"></div>
</div>
Replace the question, answers, and correct value as appropriate.
Output ONLY the HTML for the quiz.

Educational context:
{{content}}"#
                .to_string(),
        }
    }
}

/// Prompts for two-step diagram generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramPrompts {
    pub description: String,
    pub graphviz: String,
    /// Asks the model to repair DOT source that Graphviz rejected.
    pub fix: String,
}

impl Default for DiagramPrompts {
    fn default() -> Self {
        Self {
            description: r#"Produce a structured explanation of the concept below as a list of entities and the relationships between them. Use short labels (at most 5 words each), group related entities, and describe every relationship as "A -> B: label".

Recent conversation:
{{history}}

Concept to explain: {{query}}"#
                .to_string(),
            graphviz: r#"Convert the structured explanation below into a single Graphviz DOT `digraph`. Use rankdir=LR, rounded box nodes, and edge labels for relationships. Output only the DOT source.

{{description}}"#
                .to_string(),
            fix: r#"Graphviz could not render the DOT source below for the topic "{{query}}".

Error:
{{error}}

Source:
{{code}}

Return a corrected version of the complete `digraph`. Output only the DOT source."#
                .to_string(),
        }
    }
}

/// Prompt for background concept extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashcardPrompts {
    pub extract: String,
}

impl Default for FlashcardPrompts {
    fn default() -> Self {
        Self {
            extract: r#"Analyze the following conversation and extract key concepts that would be valuable for learning flashcards.
For each concept, provide a clear, concise definition.
Focus on:
- Technical terms and their meanings
- Important concepts being explained
- New vocabulary being introduced
- Processes or methods being described

Conversation:
{{conversation}}

Latest message:
{{message}}

Return the response in this exact JSON format:
{
    "concept_name": "clear definition of the concept",
    "another_concept": "another definition"
}
Only include concepts that have clear definitions in the conversation. If no concepts are found, return an empty JSON object {}."#
                .to_string(),
        }
    }
}

/// Prompts for the YouTube handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubePrompts {
    pub recommend: String,
    pub summarize: String,
}

impl Default for YoutubePrompts {
    fn default() -> Self {
        Self {
            recommend: r#"You are an intelligent assistant helping users find the best YouTube videos.

User message: "{{query}}"

From the following videos, recommend the top {{count}} that are most relevant and useful, and most likely to be watched by the user.
Provide your answer as a JSON object containing a key "recommendations" which is a list of video titles, copied exactly.

Example:
{
    "recommendations": [
        "But what is a neural network? | Deep learning chapter 1",
        "Deep Learning Crash Course for Beginners"
    ]
}

Here is the list of videos to choose from:
{{videos}}"#
                .to_string(),
            summarize: r#"Summarize the following video transcript for a student. Start with a two-sentence overview, then list the key ideas in the order they are presented.

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let tutor_path = custom_path.join("tutor.toml");
            if tutor_path.exists() {
                let content = std::fs::read_to_string(&tutor_path)?;
                prompts.tutor = toml::from_str(&content)?;
            }

            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }

            let diagram_path = custom_path.join("diagram.toml");
            if diagram_path.exists() {
                let content = std::fs::read_to_string(&diagram_path)?;
                prompts.diagram = toml::from_str(&content)?;
            }

            let flashcards_path = custom_path.join("flashcards.toml");
            if flashcards_path.exists() {
                let content = std::fs::read_to_string(&flashcards_path)?;
                prompts.flashcards = toml::from_str(&content)?;
            }

            let youtube_path = custom_path.join("youtube.toml");
            if youtube_path.exists() {
                let content = std::fs::read_to_string(&youtube_path)?;
                prompts.youtube = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
