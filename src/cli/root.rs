use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use super::{interactive::Shell, run::RunCommand};
use crate::{
    app::Assistant,
    config::Config,
    discovery::prompts::STATIC_QUESTIONS,
    llm::ModelId,
};

/// Discovery - guided technical discovery interviews in your terminal
#[derive(Parser)]
#[command(
    name = "discovery",
    version,
    about = "Guided technical discovery interviews in your terminal",
    long_about = r#"Walks through a fixed set of discovery questions, generates follow-up
questions from the answers, and produces a technical summary and next steps.

Examples:
  discovery                          # Start an interactive interview
  discovery run answers.json         # Process prepared answers in one pass
  discovery --model gpt-4-turbo      # Use a different model"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Model to use (gpt-4o, gpt-4-turbo, gpt-3.5-turbo)
    #[arg(short = 'm', long = "model", global = true)]
    pub model: Option<ModelId>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a prepared answers file non-interactively
    Run(RunCommand),

    /// Print the opening discovery questions
    Questions,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let mut config = Config::init().await?;
        if let Some(model) = self.model {
            config.model = model;
        }
        debug!("Configuration initialized (model={})", config.model);

        match self.command {
            Some(Commands::Run(run_cmd)) => run_cmd.execute(&config).await,
            Some(Commands::Questions) => {
                for (i, question) in STATIC_QUESTIONS.iter().enumerate() {
                    println!("{}. {}", i + 1, question);
                }
                Ok(())
            }
            None => Self::start_interactive_mode(&config).await,
        }
    }

    async fn start_interactive_mode(config: &Config) -> Result<()> {
        info!("Starting interactive mode");

        let assistant = Assistant::new(config)?;
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut shell = Shell::new(assistant, stdin, std::io::stdout());
        shell.run().await?;

        info!("Interview finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["discovery", "--debug", "--model", "gpt-3.5-turbo"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.model, Some(ModelId::Gpt35Turbo));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_model() {
        assert!(Cli::try_parse_from(["discovery", "--model", "gpt-2"]).is_err());
    }

    #[test]
    fn test_parse_run_subcommand() {
        let cli = Cli::try_parse_from(["discovery", "run", "answers.json", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Run(run)) => {
                assert_eq!(run.input, "answers.json");
                assert!(run.json);
            }
            _ => panic!("expected run subcommand"),
        }
    }
}
