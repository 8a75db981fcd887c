mod cli;
mod commands;
mod console;
mod terminal;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use chime_alarms::EngineConfig;
use chime_core::config::{load_dotenv, Config};

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let config = Config::from_env();

    // Logs go to stderr so command output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();
    let state_file = args
        .state
        .clone()
        .unwrap_or_else(|| config.storage.state_file.clone());

    let result = match args.command {
        Command::Run { poll_ms } => {
            config.log_summary();
            let mut engine_config = EngineConfig::from(&config.scheduler);
            if let Some(ms) = poll_ms {
                engine_config = engine_config.with_poll_interval(Duration::from_millis(ms.max(1)));
            }
            commands::run(&state_file, engine_config, terminal).await
        }
        Command::Next { at } => commands::next(&state_file, at.as_deref(), terminal),
        Command::Check => commands::check(&state_file, terminal),
    };

    if let Err(e) = result {
        terminal.print_error(&format!("{e:#}"))?;
        std::process::exit(1);
    }
    Ok(())
}
