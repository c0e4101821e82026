mod builder;
mod conflict;
mod types;

pub use builder::{DirectoryLister, FsLister, PlanBuilder};
pub use conflict::{resolve_conflict, ConflictError, DirectoryState, MAX_CONFLICT_INDEX};
pub use types::{ItemStatus, PlanItem, RenameOptions, RenamePlan};
