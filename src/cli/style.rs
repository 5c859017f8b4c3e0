//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips ANSI codes when stdout is
//! not a terminal, so styling here can be unconditional.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Passing marker
pub const CHECK: &str = "✓";
/// Blocking marker
pub const CROSS: &str = "✗";
/// Pending marker
pub const PENDING: &str = "…";
/// Non-blocking concern marker
pub const WARN: &str = "!";
/// Not applicable marker
pub const DASH: &str = "-";

/// Semantic styles for CLI output
pub trait Stylize {
    /// De-emphasized text
    fn muted(&self) -> String;
    /// Bold text
    fn emphasis(&self) -> String;
    /// Highlighted values (names, numbers)
    fn accent(&self) -> String;
    /// Success text
    fn success(&self) -> String;
    /// Warning text
    fn warn(&self) -> String;
    /// Error text
    fn error(&self) -> String;
}

impl<T: Display + ?Sized> Stylize for T {
    fn muted(&self) -> String {
        self.to_string().dimmed().to_string()
    }

    fn emphasis(&self) -> String {
        self.to_string().bold().to_string()
    }

    fn accent(&self) -> String {
        self.to_string().cyan().to_string()
    }

    fn success(&self) -> String {
        self.to_string().green().to_string()
    }

    fn warn(&self) -> String {
        self.to_string().yellow().to_string()
    }

    fn error(&self) -> String {
        self.to_string().red().to_string()
    }
}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Red cross
pub fn cross() -> String {
    CROSS.error()
}

/// Spinner used while talking to the forge
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
