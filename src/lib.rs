pub mod cancel;
pub mod cli;
pub mod config;
pub mod date_source;
pub mod error;
pub mod execute;
pub mod filter;
pub mod fs_ops;
pub mod history;
pub mod logging;
pub mod naming;
pub mod output;
pub mod plan;
pub mod progress;
pub mod scanner;
pub mod undo;

pub use cancel::{CancelToken, RequestToken, RequestTracker};
pub use config::Config;
pub use date_source::{DateNote, DateResolver, DateSource, MetadataOutcome, MetadataProvider, Resolution};
pub use error::{AppError, ExitCode};
pub use execute::{execute_plan, ExecuteError, ExecutionResult, ItemFailure};
pub use filter::NameFilter;
pub use history::{
    HistoryEntry, HistoryError, HistoryStore, JsonHistoryStore, MemoryHistoryStore, OperationRecord,
};
pub use plan::{
    resolve_conflict, ConflictError, ItemStatus, PlanBuilder, PlanItem, RenameOptions, RenamePlan,
};
pub use scanner::{scan_target, ScanResult, ScannerError};
pub use undo::{undo_entry, undo_last, UndoError, UndoOutcome, UndoResult};
