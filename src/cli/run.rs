use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tracing::{debug, info};

use crate::app::{AppEvent, Assistant};
use crate::config::Config;
use crate::discovery::prompts::STATIC_QUESTIONS;

/// Process a prepared answers file non-interactively
#[derive(Args)]
pub struct RunCommand {
    /// Path to the answers JSON file, or `-` to read it from stdin
    pub input: String,

    /// Print the report as JSON instead of text
    #[arg(long = "json")]
    pub json: bool,
}

/// Prepared interview input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InterviewScript {
    pub background: String,
    pub notes: String,
    pub static_answers: Vec<String>,
}

impl InterviewScript {
    pub fn parse(json: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(json).context("Invalid answers file")?;
        if script.static_answers.len() != STATIC_QUESTIONS.len() {
            return Err(anyhow!(
                "Expected {} static answers, found {}",
                STATIC_QUESTIONS.len(),
                script.static_answers.len()
            ));
        }
        Ok(script)
    }
}

/// What a non-interactive run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub model: String,
    pub questions: Vec<String>,
    pub summary: String,
    pub next_steps: String,
    pub notices: Vec<AppEvent>,
}

impl RunReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("## Follow-up Questions\n");
        if self.questions.is_empty() {
            out.push_str("(none)\n");
        }
        for (i, question) in self.questions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, question));
        }
        out.push_str("\n## Technical Summary\n");
        out.push_str(&self.summary);
        out.push_str("\n\n## Recommended Next Steps\n");
        out.push_str(&self.next_steps);
        out.push('\n');
        out
    }
}

impl RunCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing run command");

        let script = InterviewScript::parse(&self.read_input()?)?;
        let assistant = Assistant::new(config)?;
        let report = run_script(assistant, script).await;

        for notice in report.notices.iter().filter(|n| n.is_error()) {
            eprintln!("{}", notice.message());
        }
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.render_text());
        }
        Ok(())
    }

    fn read_input(&self) -> Result<String> {
        if self.input == "-" {
            debug!("Reading answers from stdin");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            Ok(buffer)
        } else {
            std::fs::read_to_string(&self.input)
                .with_context(|| format!("Failed to read {}", self.input))
        }
    }
}

/// Static answers, one question round, then summary and next steps
pub async fn run_script(mut assistant: Assistant, script: InterviewScript) -> RunReport {
    let mut events = assistant.take_event_receiver();

    assistant.state_mut().set_background(script.background);
    assistant.state_mut().set_notes(script.notes);
    assistant.submit_static_answers(&script.static_answers).await;
    let added = assistant.generate_questions().await;
    info!("Run generated {} questions", added);

    let summary = assistant.generate_summary().await.to_string();
    let next_steps = assistant.generate_next_steps().await.to_string();

    let mut notices = Vec::new();
    if let Some(rx) = events.as_mut() {
        while let Ok(event) = rx.try_recv() {
            notices.push(event);
        }
    }

    RunReport {
        model: assistant.state().model().to_string(),
        questions: assistant.state().questions().to_vec(),
        summary,
        next_steps,
        notices,
    }
}
