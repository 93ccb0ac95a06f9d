use std::collections::BTreeSet;
use std::path::{Component, Path};

/// Office suites drop `.~lock.<name>#` files next to open documents.
pub const LOCK_FILE_PREFIX: &str = ".~lock";
/// Prefix of in-flight write targets; see [`crate::store::FileStore::write`].
pub const PARTIAL_FILE_PREFIX: &str = ".~part";

/// Exact names and name prefixes that are kept out of listings and never served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenPatternSet {
    names: BTreeSet<String>,
    prefixes: BTreeSet<String>,
}

impl HiddenPatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set every server starts from: lock and partial-write prefixes,
    /// plus the base names of the note and last-change files in case they
    /// are configured to live inside the shared root.
    pub fn standard(note_file: &Path, last_change_file: &Path) -> Self {
        let mut set = Self::new()
            .with_prefix(LOCK_FILE_PREFIX)
            .with_prefix(PARTIAL_FILE_PREFIX)
            .with_name("nots.txt");
        for path in [note_file, last_change_file] {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                set = set.with_name(name);
            }
        }
        set
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.prefixes.insert(prefix);
        }
        self
    }

    /// Whether a single file name matches any pattern.
    pub fn is_hidden(&self, name: &str) -> bool {
        self.names.contains(name) || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Whether any normal component of a relative path is hidden.
    pub fn hides_path(&self, relative: &Path) -> bool {
        relative.components().any(|component| match component {
            Component::Normal(name) => name.to_str().map_or(true, |n| self.is_hidden(n)),
            _ => false,
        })
    }
}
