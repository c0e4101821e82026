use std::path::{Path, PathBuf};

use crate::date_source::{DateNote, DateSource};
use crate::filter::NameFilter;

/// Options that decide what a plan contains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub recursive: bool,
    pub date_source: DateSource,
    /// Raw extension list as typed, e.g. "jpg, png"
    pub filter_exts: String,
    pub filter_include: String,
    pub filter_exclude: String,
}

impl RenameOptions {
    pub fn name_filter(&self) -> NameFilter {
        NameFilter::new(&self.filter_exts, &self.filter_include, &self.filter_exclude)
    }
}

/// What the plan decided for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Rename,
    /// Name already starts with `YYYYMMDD_`
    SkipPrefix,
    /// Rejected by the name filter
    SkipFilter,
    Error,
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Rename => "rename",
            ItemStatus::SkipPrefix => "skip (prefix)",
            ItemStatus::SkipFilter => "skip (filter)",
            ItemStatus::Error => "error",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, ItemStatus::SkipPrefix | ItemStatus::SkipFilter)
    }
}

/// One file in a rename plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    /// Location at scan time
    pub path: PathBuf,
    pub original_name: String,
    /// Date-prefixed candidate before collision handling
    pub base_name: Option<String>,
    /// Collision-free target; equals `original_name` unless renaming
    pub final_name: String,
    pub status: ItemStatus,
    /// 0 without a collision, else the `_NNN` suffix number
    pub conflict_index: u16,
    pub date_source_used: Option<DateSource>,
    pub note: Option<DateNote>,
    pub summary: String,
    pub error: Option<String>,
}

impl PlanItem {
    /// An item that keeps its name, with the given status and summary
    pub fn unchanged(path: PathBuf, original_name: String, status: ItemStatus, summary: impl Into<String>) -> Self {
        Self {
            path,
            final_name: original_name.clone(),
            original_name,
            base_name: None,
            status,
            conflict_index: 0,
            date_source_used: None,
            note: None,
            summary: summary.into(),
            error: None,
        }
    }

    pub fn failed(path: PathBuf, original_name: String, error: impl Into<String>) -> Self {
        let error = error.into();
        let mut item = Self::unchanged(path, original_name, ItemStatus::Error, error.clone());
        item.error = Some(error);
        item
    }

    pub fn changed(&self) -> bool {
        self.final_name != self.original_name
    }

    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Where the file ends up after renaming
    pub fn target_path(&self) -> PathBuf {
        self.folder().join(&self.final_name)
    }
}

/// The ordered, inspectable outcome of planning a run
#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    /// Target the plan was built for
    pub target: PathBuf,
    pub is_single_file: bool,
    pub options: RenameOptions,
    pub items: Vec<PlanItem>,
    pub scanned: usize,
    pub matched: usize,
    pub filtered_out: usize,
    pub scan_errors: Vec<String>,
    pub cancelled: bool,
}

impl RenamePlan {
    /// Items that needed an auto-numbered suffix
    pub fn conflicts(&self) -> impl Iterator<Item = &PlanItem> {
        self.items.iter().filter(|item| item.conflict_index > 0)
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts().count()
    }

    pub fn rename_count(&self) -> usize {
        self.count(ItemStatus::Rename)
    }

    pub fn skip_count(&self) -> usize {
        self.items.iter().filter(|item| item.status.is_skip()).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(ItemStatus::Error)
    }

    pub fn is_executable(&self) -> bool {
        !self.cancelled
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename_item(name: &str, final_name: &str, index: u16) -> PlanItem {
        let mut item = PlanItem::unchanged(
            PathBuf::from("/photos").join(name),
            name.to_string(),
            ItemStatus::Rename,
            "date prefix (mtime)",
        );
        item.base_name = Some(final_name.to_string());
        item.final_name = final_name.to_string();
        item.conflict_index = index;
        item
    }

    #[test]
    fn test_unchanged_item_keeps_name() {
        let item = PlanItem::unchanged(
            PathBuf::from("/photos/20240101_a.jpg"),
            "20240101_a.jpg".to_string(),
            ItemStatus::SkipPrefix,
            "skip",
        );
        assert!(!item.changed());
        assert_eq!(item.final_name, item.original_name);
        assert_eq!(item.target_path(), PathBuf::from("/photos/20240101_a.jpg"));
    }

    #[test]
    fn test_failed_item_carries_error() {
        let item = PlanItem::failed(PathBuf::from("/x/a"), "a".to_string(), "stat() failed");
        assert_eq!(item.status, ItemStatus::Error);
        assert_eq!(item.error.as_deref(), Some("stat() failed"));
        assert!(!item.changed());
    }

    #[test]
    fn test_plan_counts() {
        let plan = RenamePlan {
            items: vec![
                rename_item("a.jpg", "20240101_a.jpg", 0),
                rename_item("b.jpg", "20240101_b_001.jpg", 1),
                PlanItem::failed(PathBuf::from("/photos/c.jpg"), "c.jpg".to_string(), "boom"),
            ],
            ..RenamePlan::default()
        };

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.rename_count(), 2);
        assert_eq!(plan.error_count(), 1);
        assert_eq!(plan.skip_count(), 0);
        assert_eq!(plan.conflict_count(), 1);
        assert_eq!(plan.items[1].target_path(), PathBuf::from("/photos/20240101_b_001.jpg"));
        assert!(plan.is_executable());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ItemStatus::Rename.label(), "rename");
        assert!(ItemStatus::SkipFilter.is_skip());
        assert!(!ItemStatus::Error.is_skip());
    }
}
