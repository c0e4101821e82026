mod codes;

pub use codes::ExitCode;

use crate::execute::ExecuteError;
use crate::history::HistoryError;
use crate::scanner::ScannerError;
use crate::undo::UndoError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Target not found: {path}")]
    TargetNotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Cannot read target {path}: {message}")]
    TargetUnreadable { path: PathBuf, message: String },

    #[error("History file error: {message}")]
    HistoryError {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Cannot undo: {0}")]
    NotUndoable(String),

    #[error("The plan was cancelled before it was complete")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::TargetNotFound { .. } => ExitCode::TargetNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::TargetUnreadable { .. } => ExitCode::GeneralError,
            AppError::HistoryError { .. } => ExitCode::HistoryError,
            AppError::NotUndoable(_) => ExitCode::HistoryError,
            AppError::Cancelled => ExitCode::Cancelled,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Attach the history file location to a history error
    pub fn with_history_path(self, history_path: PathBuf) -> Self {
        match self {
            AppError::HistoryError { message, .. } => AppError::HistoryError {
                path: Some(history_path),
                message,
            },
            other => other,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::TargetNotFound { path } => {
                format!(
                    "The specified file or folder does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::TargetUnreadable { path, message } => {
                format!("Cannot read:\n  {}\n  {}", path.display(), message)
            }

            AppError::HistoryError { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "History file error:\n  {}\n{}\n\
                     Ensure the history file is valid JSON, or move it aside to start fresh.",
                    message, path_info
                )
            }

            AppError::NotUndoable(message) => {
                format!(
                    "Cannot undo:\n  {}\n\n\
                     Use --history to list recorded batches and their status.",
                    message
                )
            }

            AppError::Cancelled => {
                "The rename plan was cancelled before it was complete.\n\
                 Nothing was renamed. Run the command again to rebuild the plan."
                    .to_string()
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::TargetNotFound { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::NotReadable { path, source } => AppError::TargetUnreadable {
                path,
                message: source.to_string(),
            },
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::HistoryError {
            path: None,
            message: err.to_string(),
        }
    }
}

impl From<ExecuteError> for AppError {
    fn from(err: ExecuteError) -> Self {
        match err {
            ExecuteError::PlanCancelled => AppError::Cancelled,
        }
    }
}

impl From<UndoError> for AppError {
    fn from(err: UndoError) -> Self {
        match err {
            UndoError::History(e) => e.into(),
            UndoError::NotUndoable(message) => AppError::NotUndoable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = AppError::TargetNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::TargetNotFound);

        let err = AppError::PermissionDenied {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::PermissionError);

        assert_eq!(AppError::Cancelled.exit_code(), ExitCode::Cancelled);
    }

    #[test]
    fn test_detailed_message_includes_context() {
        let err = AppError::HistoryError {
            path: Some(PathBuf::from("/home/me/.dateprefix/history.json")),
            message: "Invalid JSON".to_string(),
        };

        let msg = err.detailed_message();
        assert!(msg.contains("Invalid JSON"));
        assert!(msg.contains("history.json"));
    }

    #[test]
    fn test_scanner_error_conversion() {
        let scanner_err = ScannerError::PathNotFound(PathBuf::from("/missing"));
        let app_err: AppError = scanner_err.into();
        assert_eq!(app_err.exit_code(), ExitCode::TargetNotFound);
    }

    #[test]
    fn test_undo_error_conversion() {
        let app_err: AppError = UndoError::NotUndoable("abc is undone".to_string()).into();
        assert_eq!(app_err.exit_code(), ExitCode::HistoryError);

        let app_err: AppError = UndoError::History(HistoryError::Corrupted("bad".to_string())).into();
        assert!(matches!(app_err, AppError::HistoryError { .. }));
    }

    #[test]
    fn test_with_history_path() {
        let err: AppError = HistoryError::Corrupted("bad".to_string()).into();
        let err = err.with_history_path(PathBuf::from("/h.json"));
        assert!(err.detailed_message().contains("/h.json"));
    }
}
