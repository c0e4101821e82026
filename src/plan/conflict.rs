use std::collections::HashSet;
use thiserror::Error;

use crate::naming::{name_key, with_conflict_suffix};

/// Highest `_NNN` suffix tried before giving up
pub const MAX_CONFLICT_INDEX: u16 = 999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("No free name for {0} after _999")]
    Exhausted(String),
}

/// Pick a collision-free name for `base_name`.
///
/// `existing` and `reserved` hold name keys (see [`name_key`]). Returns the
/// chosen name and its suffix index, 0 when `base_name` was already free.
pub fn resolve_conflict(
    base_name: &str,
    existing: &HashSet<String>,
    reserved: &HashSet<String>,
) -> Result<(String, u16), ConflictError> {
    let taken = |name: &str| {
        let key = name_key(name);
        existing.contains(&key) || reserved.contains(&key)
    };

    if !taken(base_name) {
        return Ok((base_name.to_string(), 0));
    }

    for index in 1..=MAX_CONFLICT_INDEX {
        let candidate = with_conflict_suffix(base_name, index);
        if !taken(&candidate) {
            return Ok((candidate, index));
        }
    }

    Err(ConflictError::Exhausted(base_name.to_string()))
}

/// Simulated contents of one directory while a plan is being built
#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
    existing: HashSet<String>,
    reserved: HashSet<String>,
}

impl DirectoryState {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            existing: names.into_iter().map(|n| name_key(n.as_ref())).collect(),
            reserved: HashSet::new(),
        }
    }

    pub fn resolve(&self, base_name: &str) -> Result<(String, u16), ConflictError> {
        resolve_conflict(base_name, &self.existing, &self.reserved)
    }

    /// Record that `original` will be renamed to `final_name`
    pub fn commit(&mut self, original: &str, final_name: &str) {
        let final_key = name_key(final_name);
        self.reserved.insert(final_key.clone());
        self.existing.remove(&name_key(original));
        self.existing.insert(final_key);
    }

    pub fn reserved(&self) -> &HashSet<String> {
        &self.reserved
    }

    pub fn existing(&self) -> &HashSet<String> {
        &self.existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| name_key(n)).collect()
    }

    #[test]
    fn test_free_name_unchanged() {
        let result = resolve_conflict("20240101_a.jpg", &keys(&["other.jpg"]), &HashSet::new());
        assert_eq!(result, Ok(("20240101_a.jpg".to_string(), 0)));
    }

    #[test]
    fn test_existing_collision_gets_first_free_index() {
        let existing = keys(&["report.txt", "report_001.txt"]);
        let result = resolve_conflict("report.txt", &existing, &HashSet::new());
        assert_eq!(result, Ok(("report_002.txt".to_string(), 2)));
    }

    #[test]
    fn test_reserved_collision() {
        let reserved = keys(&["20240101_a.jpg"]);
        let result = resolve_conflict("20240101_a.jpg", &HashSet::new(), &reserved);
        assert_eq!(result, Ok(("20240101_a_001.jpg".to_string(), 1)));
    }

    #[test]
    fn test_suffix_goes_before_last_extension() {
        let existing = keys(&["archive.tar.gz"]);
        let result = resolve_conflict("archive.tar.gz", &existing, &HashSet::new());
        assert_eq!(result.unwrap().0, "archive.tar_001.gz");
    }

    #[test]
    fn test_dotfile_suffix_at_end() {
        let existing = keys(&["20240101_.env"]);
        let result = resolve_conflict("20240101_.env", &existing, &HashSet::new());
        // The dot follows the prefix, so ".env" is treated as the extension
        assert_eq!(result.unwrap().0, "20240101__001.env");
    }

    #[test]
    fn test_exhaustion() {
        let mut existing = keys(&["x.txt"]);
        for index in 1..=MAX_CONFLICT_INDEX {
            existing.insert(name_key(&with_conflict_suffix("x.txt", index)));
        }

        let result = resolve_conflict("x.txt", &existing, &HashSet::new());
        assert_eq!(result, Err(ConflictError::Exhausted("x.txt".to_string())));
    }

    #[test]
    fn test_directory_state_batch_collision() {
        let mut state = DirectoryState::from_names(["a.jpg", "b.jpg"]);

        let (first, first_index) = state.resolve("20240101_x.jpg").unwrap();
        state.commit("a.jpg", &first);
        let (second, second_index) = state.resolve("20240101_x.jpg").unwrap();
        state.commit("b.jpg", &second);

        assert_eq!((first.as_str(), first_index), ("20240101_x.jpg", 0));
        assert_eq!((second.as_str(), second_index), ("20240101_x_001.jpg", 1));
        assert_eq!(state.reserved().len(), 2);
        assert!(!state.existing().contains(&name_key("a.jpg")));
        assert!(state.existing().contains(&name_key("20240101_x_001.jpg")));
    }

    #[test]
    fn test_renamed_away_name_becomes_free() {
        let mut state = DirectoryState::from_names(["old.txt"]);
        state.commit("old.txt", "20240101_old.txt");

        // "old.txt" no longer exists once its rename is simulated
        assert_eq!(state.resolve("old.txt").unwrap(), ("old.txt".to_string(), 0));
    }

    #[cfg(any(windows, target_os = "macos"))]
    #[test]
    fn test_case_insensitive_collision() {
        let existing = keys(&["20240101_A.JPG"]);
        let result = resolve_conflict("20240101_a.jpg", &existing, &HashSet::new());
        assert_eq!(result.unwrap().1, 1);
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    #[test]
    fn test_case_sensitive_no_collision() {
        let existing = keys(&["20240101_A.JPG"]);
        let result = resolve_conflict("20240101_a.jpg", &existing, &HashSet::new());
        assert_eq!(result.unwrap().1, 0);
    }
}
