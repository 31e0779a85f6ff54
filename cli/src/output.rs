//! Styled terminal output.

use std::fmt::Display;

use console::{Term, style};
use staffdesk_business::{Notification, NotificationLevel};

/// Writes to stdout. Write failures (closed pipe) are ignored.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    pub fn success(&self, message: impl Display) {
        self.line(format!("{} {message}", style("✓").green().bold()));
    }

    pub fn error(&self, message: impl Display) {
        self.line(format!("{} {message}", style("✗").red().bold()));
    }

    pub fn warning(&self, message: impl Display) {
        self.line(format!("{} {message}", style("⚠").yellow().bold()));
    }

    pub fn print(&self, message: impl Display) {
        self.line(message.to_string());
    }

    pub fn newline(&self) {
        self.line(String::new());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(style(message).dim().to_string());
    }

    pub fn labeled(&self, label: impl Display, value: impl Display) {
        self.line(format!("  {}: {value}", style(label).dim()));
    }

    /// `Total: 3 user(s)`
    pub fn total(&self, label: impl Display, count: usize, noun: &str) {
        self.line(format!(
            "\n{}: {}",
            style(label).bold(),
            style(format!("{count} {noun}(s)")).cyan()
        ));
    }

    /// Prints an orchestrator notification as a success or error line.
    pub fn notification(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Success => self.success(&notification.message),
            NotificationLevel::Error => self.error(&notification.message),
        }
    }

    fn line(&self, text: String) {
        drop(self.term.write_line(&text));
    }
}
