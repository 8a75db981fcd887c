use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Alarm scheduler for the chime state file.
///
/// Runs the polling engine in the foreground, or inspects the saved alarms
/// without ringing anything.
#[derive(Parser, Debug)]
#[command(name = "chime", version, about)]
pub struct CliArgs {
    /// State file holding settings and alarms (default: CHIME_STATE_FILE or data/chime-state.json)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ring alarms until Ctrl-C.
    Run {
        /// Poll interval override in milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,
    },

    /// Show when each alarm rings next.
    Next {
        /// Predict from this local time instead of now ("YYYY-MM-DD HH:MM")
        #[arg(long)]
        at: Option<String>,
    },

    /// List alarms that can never ring as configured.
    Check,
}
