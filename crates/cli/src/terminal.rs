use std::io::{self, Write};

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const RING: Color = Color::Yellow;
    const TIME: Color = Color::Cyan;
    const WARN: Color = Color::Magenta;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Green;
}

/// Colored stdout output for the `chime` commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner for `chime run`.
    pub fn print_banner(&self, state_file: &str, alarms: usize) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("chime"),
            ResetColor,
            SetForegroundColor(Colors::DIM),
            Print(format!(" watching {state_file} ({alarms} alarms), Ctrl-C to quit\n")),
            ResetColor,
        )?;
        stdout.flush()
    }

    /// One line per ring.
    pub fn print_ring(&self, time: &str, name: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::RING),
            Print("RING "),
            SetForegroundColor(Colors::TIME),
            Print(format!("{time} ")),
            ResetColor,
            Print(format!("{name}\n")),
        )?;
        stdout.flush()
    }

    /// One row of the `chime next` listing.
    pub fn print_next(&self, name: &str, days: &str, schedule: &str, next: Option<&str>) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print(format!("{name:<24} ")),
            SetForegroundColor(Colors::DIM),
            Print(format!("{days} {schedule:<28} ")),
            ResetColor,
        )?;
        match next {
            Some(next) => execute!(
                stdout,
                SetForegroundColor(Colors::TIME),
                Print(format!("{next}\n")),
                ResetColor,
            )?,
            None => execute!(
                stdout,
                SetForegroundColor(Colors::DIM),
                Print("not within a week\n"),
                ResetColor,
            )?,
        }
        stdout.flush()
    }

    /// An alarm that can never ring, with the reason.
    pub fn print_problem(&self, name: &str, reason: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::WARN),
            Print(format!("{name}: ")),
            ResetColor,
            Print(format!("{reason}\n")),
        )?;
        stdout.flush()
    }

    pub fn print_error(&self, msg: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Error: {msg}\n")),
            ResetColor,
        )?;
        stdout.flush()
    }

    pub fn print_info(&self, msg: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{msg}\n")),
            ResetColor,
        )?;
        stdout.flush()
    }
}
