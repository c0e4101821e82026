use std::env;
use std::path::{Path, PathBuf};

const ENV_HISTORY_FILE: &str = "DATEPREFIX_HISTORY_FILE";
const ENV_FFPROBE: &str = "DATEPREFIX_FFPROBE";

const HISTORY_DIR: &str = ".dateprefix";
const HISTORY_FILE: &str = "history.json";

/// Runtime settings that do not come from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_path: PathBuf,
    /// Program used to read video metadata
    pub ffprobe: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognised variables:
    /// - `DATEPREFIX_HISTORY_FILE`: history file location
    /// - `DATEPREFIX_FFPROBE`: ffprobe executable
    ///
    /// These can be set in a `.env` file in the working directory.
    pub fn from_env() -> Self {
        let history_path = non_empty_var(ENV_HISTORY_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);
        let ffprobe = non_empty_var(ENV_FFPROBE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("ffprobe"));

        Self { history_path, ffprobe }
    }

    /// Replace the history location when one was given explicitly
    pub fn with_history_override(mut self, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            self.history_path = path.to_path_buf();
        }
        self
    }
}

/// `~/.dateprefix/history.json`, or relative to the working directory without a home
pub fn default_history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HISTORY_DIR)
        .join(HISTORY_FILE)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
