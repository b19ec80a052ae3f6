//! Line-oriented interview shell

use anyhow::Result;
use std::{io::Write, str::FromStr};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    app::{AppEvent, Assistant},
    discovery::prompts::STATIC_QUESTIONS,
    llm::ModelId,
};

const HELP: &str = "\
Commands:
  background <text>     Set the client background
  notes <text>          Set the meeting notes
  static                Answer the technical discovery questions
  generate              Generate follow-up questions
  questions             List generated questions by set
  answer <n> <text>     Answer generated question n
  submit <set>          Submit the answers of a question set
  summary               Generate a technical summary
  next-steps            Generate recommended next steps
  context               Show all collected information
  model [id]            Show or select the model
  log                   Show the activity log
  reset                 Start a new interview
  help                  Show this help
  quit                  Exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Background(String),
    Notes(String),
    Static,
    Generate,
    Questions,
    Answer { number: usize, text: String },
    Submit(usize),
    Summary,
    NextSteps,
    Context,
    Model(Option<ModelId>),
    Log,
    Reset,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let number = |text: &str, what: &str| -> Result<usize, String> {
            text.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("Expected a {} number, got '{}'", what, text))
        };

        match word {
            "help" | "?" => Ok(ShellCommand::Help),
            "background" => Ok(ShellCommand::Background(rest.to_string())),
            "notes" => Ok(ShellCommand::Notes(rest.to_string())),
            "static" => Ok(ShellCommand::Static),
            "generate" => Ok(ShellCommand::Generate),
            "questions" => Ok(ShellCommand::Questions),
            "answer" => {
                let (n, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Ok(ShellCommand::Answer {
                    number: number(n, "question")?,
                    text: text.trim().to_string(),
                })
            }
            "submit" => Ok(ShellCommand::Submit(number(rest, "set")?)),
            "summary" => Ok(ShellCommand::Summary),
            "next-steps" | "next_steps" => Ok(ShellCommand::NextSteps),
            "context" => Ok(ShellCommand::Context),
            "model" if rest.is_empty() => Ok(ShellCommand::Model(None)),
            "model" => rest
                .parse::<ModelId>()
                .map(|m| ShellCommand::Model(Some(m)))
                .map_err(|e| e.to_string()),
            "log" => Ok(ShellCommand::Log),
            "reset" => Ok(ShellCommand::Reset),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
        }
    }
}

/// Interactive shell around an [`Assistant`]
pub struct Shell<R, W> {
    assistant: Assistant,
    input: R,
    output: W,
    events: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(mut assistant: Assistant, input: R, output: W) -> Self {
        let events = assistant.take_event_receiver();
        Self {
            assistant,
            input,
            output,
            events,
        }
    }

    pub fn into_assistant(self) -> Assistant {
        self.assistant
    }

    /// Read and dispatch commands until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Agent Assisted Discovery")?;
        writeln!(self.output, "Type 'help' for commands.")?;

        loop {
            write!(self.output, "discovery> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<ShellCommand>() {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => {
                    debug!("Dispatching {:?}", command);
                    self.dispatch(command).await?;
                }
                Err(message) => writeln!(self.output, "{}", message)?,
            }
            self.flush_events()?;
        }
        Ok(())
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn flush_events(&mut self) -> Result<()> {
        if let Some(rx) = self.events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                let tag = match &event {
                    AppEvent::Success { .. } => "ok",
                    AppEvent::Info { .. } => "info",
                    AppEvent::Error { .. } => "error",
                };
                writeln!(self.output, "[{}] {}", tag, event.message())?;
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: ShellCommand) -> Result<()> {
        match command {
            ShellCommand::Help => writeln!(self.output, "{}", HELP)?,
            ShellCommand::Background(text) => {
                self.assistant.state_mut().set_background(text);
                writeln!(self.output, "Background saved.")?;
            }
            ShellCommand::Notes(text) => {
                self.assistant.state_mut().set_notes(text);
                writeln!(self.output, "Notes saved.")?;
            }
            ShellCommand::Static => self.ask_static_questions().await?,
            ShellCommand::Generate => {
                writeln!(self.output, "Generating new questions...")?;
                self.assistant.generate_questions().await;
                self.print_questions()?;
            }
            ShellCommand::Questions => self.print_questions()?,
            ShellCommand::Answer { number, text } => {
                match self.assistant.state_mut().answer_question(number - 1, text) {
                    Ok(()) => writeln!(self.output, "Answer to question {} saved.", number)?,
                    Err(_) => writeln!(self.output, "No generated question {}.", number)?,
                }
            }
            ShellCommand::Submit(set) => {
                writeln!(self.output, "Processing answers...")?;
                if let Err(e) = self.assistant.submit_question_set(set).await {
                    writeln!(self.output, "{}", e)?;
                }
            }
            ShellCommand::Summary => {
                writeln!(self.output, "Generating summary...")?;
                let summary = self.assistant.generate_summary().await.to_string();
                writeln!(self.output, "### Technical Summary\n{}", summary)?;
            }
            ShellCommand::NextSteps => {
                writeln!(self.output, "Generating next steps...")?;
                let next_steps = self.assistant.generate_next_steps().await.to_string();
                writeln!(self.output, "### Recommended Actions\n{}", next_steps)?;
            }
            ShellCommand::Context => {
                let context = self.assistant.state().combined_context();
                if context.is_empty() {
                    writeln!(self.output, "No information collected yet.")?;
                } else {
                    writeln!(self.output, "{}", context)?;
                }
            }
            ShellCommand::Model(None) => {
                let current = self.assistant.state().model();
                for model in ModelId::ALL {
                    let marker = if model == current { "*" } else { " " };
                    writeln!(self.output, "{} {}", marker, model)?;
                }
            }
            ShellCommand::Model(Some(model)) => {
                self.assistant.state_mut().set_model(model);
                writeln!(self.output, "Model set to {}.", model)?;
            }
            ShellCommand::Log => {
                let state = self.assistant.state();
                writeln!(
                    self.output,
                    "Session {} started {} (iteration {})",
                    state.id(),
                    state.started_at().format("%Y-%m-%d %H:%M:%S UTC"),
                    state.iteration()
                )?;
                let entries = state.activity();
                if entries.is_empty() {
                    writeln!(self.output, "No activities recorded yet")?;
                }
                for entry in entries {
                    writeln!(self.output, "- {}", entry)?;
                }
            }
            ShellCommand::Reset => self.assistant.reset(),
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    async fn ask_static_questions(&mut self) -> Result<()> {
        let mut answers = Vec::with_capacity(STATIC_QUESTIONS.len());
        for (i, question) in STATIC_QUESTIONS.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, question)?;
            write!(self.output, "> ")?;
            self.output.flush()?;
            match self.read_line().await? {
                Some(answer) => answers.push(answer),
                None => {
                    writeln!(self.output, "Input ended; answers discarded.")?;
                    return Ok(());
                }
            }
        }

        writeln!(self.output, "Processing responses...")?;
        self.assistant.submit_static_answers(&answers).await;
        Ok(())
    }

    fn print_questions(&mut self) -> Result<()> {
        let state = self.assistant.state();
        let sets = state.question_sets();
        if sets.is_empty() {
            writeln!(
                self.output,
                "No questions generated yet. Run 'generate' to start."
            )?;
            return Ok(());
        }
        for set in sets {
            writeln!(self.output, "Question Set {}", set.number)?;
            for (offset, question) in set.questions.iter().enumerate() {
                let index = set.start + offset;
                match state.answer(index) {
                    Some(answer) => {
                        writeln!(self.output, "  {}. {}\n     -> {}", index + 1, question, answer)?
                    }
                    None => writeln!(self.output, "  {}. {}", index + 1, question)?,
                }
            }
        }
        Ok(())
    }
}
