//! NotesAI - ask an assistant about your own notes
//!
#![doc = "Main entry point for the NotesAI command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notesai::cli::{Cli, Commands};
use notesai::commands;
use notesai::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Ask {
            questions,
            responses,
        } => {
            tracing::info!(
                questions = questions.len(),
                responses = responses.len(),
                "Asking about notes"
            );
            commands::ask::run_ask(&config, questions, responses).await?;
            Ok(())
        }
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(&config).await?;
            Ok(())
        }
        Commands::Notes { command } => {
            tracing::debug!("Running notes command");
            commands::notes::handle_notes(&config, command).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so that answers on stdout stay pipeable.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "notesai=debug" } else { "notesai=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
