//! Progress output for user-facing status updates.
//!
//! Execution and undo report each file through this module as they go.
//! In verbose mode, output is suppressed since tracing handles everything.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    /// When true, output is colorized
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create a new progress reporter writing to stderr
    pub fn new() -> Self {
        Self::new_with_ui(false, should_use_colors())
    }

    /// When verbose=true, output is suppressed (tracing handles it)
    pub fn new_with_ui(verbose: bool, colors_enabled: bool) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled,
        }
    }

    /// Create a progress reporter with a custom writer (for testing)
    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    /// A reporter that prints nothing
    pub fn silent() -> Self {
        Self {
            writer: Box::new(io::sink()),
            silent: true,
            colors_enabled: false,
        }
    }

    /// Report progress on a single rename
    pub fn rename_progress(&mut self, current: usize, total: usize, from: &str, to: &str) {
        self.counter_line(current, total, from, to);
    }

    /// Report a file left untouched
    pub fn skip(&mut self, current: usize, total: usize, name: &str, reason: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {}",
                counter.cyan(),
                name.dimmed(),
                format!("({})", reason).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} ({})", current, total, name, reason);
        }
    }

    /// Report a file that could not be processed
    pub fn item_error(&mut self, current: usize, total: usize, name: &str, error: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {}",
                counter.cyan(),
                name,
                format!("failed: {}", error).red()
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} failed: {}", current, total, name, error);
        }
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    /// Report the run stopping early
    pub fn cancelled(&mut self, processed: usize, total: usize) {
        self.warn(&format!("Cancelled after {} of {} files", processed, total));
    }

    /// Report a history entry being recorded
    pub fn history_recorded(&mut self, id: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", format!("History saved as: {}", id).dimmed());
        } else {
            let _ = writeln!(self.writer, "History saved as: {}", id);
        }
    }

    /// Report starting an undo
    pub fn undo_start(&mut self, total: usize, from_timestamp: &str) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        let message = format!("Undoing {} renames from history ({})", total, from_timestamp);
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", message.bold());
        } else {
            let _ = writeln!(self.writer, "{}", message);
        }
    }

    /// Report progress on a single undo
    pub fn undo_progress(&mut self, current: usize, total: usize, from: &str, to: &str) {
        self.counter_line(current, total, from, to);
    }

    fn counter_line(&mut self, current: usize, total: usize, from: &str, to: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                from.dimmed(),
                "→".cyan(),
                to
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} -> {}", current, total, from, to);
        }
    }
}
