use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::trace;

static EXTENSION_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,;]+").unwrap());

/// Inclusion criteria applied to file names before planning.
///
/// All configured criteria must hold; an unconfigured filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    extensions: BTreeSet<String>,
    include: String,
    exclude: String,
}

impl NameFilter {
    pub fn new(extensions: &str, include: &str, exclude: &str) -> Self {
        Self {
            extensions: parse_extensions(extensions),
            include: include.trim().to_lowercase(),
            exclude: exclude.trim().to_lowercase(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.extensions.is_empty() || !self.include.is_empty() || !self.exclude.is_empty()
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Test a bare file name (never a full path)
    pub fn matches(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();

        if !self.extensions.is_empty() && !self.extensions.contains(&extension_of(&lower)) {
            trace!(name = %file_name, "Rejected by extension");
            return false;
        }

        if !self.include.is_empty() && !lower.contains(&self.include) {
            trace!(name = %file_name, "Rejected by include text");
            return false;
        }

        if !self.exclude.is_empty() && lower.contains(&self.exclude) {
            trace!(name = %file_name, "Rejected by exclude text");
            return false;
        }

        true
    }
}

/// Parse "jpg, .PNG;pdf" into {".jpg", ".png", ".pdf"}. A `*` entry clears the set.
pub fn parse_extensions(raw: &str) -> BTreeSet<String> {
    let mut extensions = BTreeSet::new();

    for part in EXTENSION_SEPARATORS.split(raw.trim()) {
        let part = part.trim().to_lowercase();
        if part.is_empty() {
            continue;
        }
        if part == "*" {
            return BTreeSet::new();
        }
        if part.starts_with('.') {
            extensions.insert(part);
        } else {
            extensions.insert(format!(".{}", part));
        }
    }

    extensions
}

fn extension_of(name: &str) -> String {
    let (_, ext) = crate::naming::split_extension(name);
    ext.to_string()
}
