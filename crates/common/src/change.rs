use std::fmt;

use serde_json::Value;

/// Where a change happened: an optional section (e.g. `pois`, `br`) and a key
/// or entity id within it. An empty key with no section is the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePath {
    pub section: Option<String>,
    pub key: String,
}

impl ChangePath {
    pub fn key(key: &str) -> Self {
        Self {
            section: None,
            key: key.to_string(),
        }
    }

    pub fn entity(section: &str, id: &str) -> Self {
        Self {
            section: Some(section.to_string()),
            key: id.to_string(),
        }
    }

    pub fn root() -> Self {
        Self::key("")
    }

    pub fn is_root(&self) -> bool {
        self.section.is_none() && self.key.is_empty()
    }

    pub fn in_section(&self, section: &str) -> bool {
        self.section.as_deref() == Some(section)
    }
}

impl fmt::Display for ChangePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{}/{}", section, self.key),
            None => f.write_str(&self.key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Added => "Added",
            ChangeKind::Removed => "Removed",
            ChangeKind::Changed => "Changed",
        })
    }
}

/// One detected difference between a stored snapshot and a fresh document.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRecord {
    Added { path: ChangePath, value: Value },
    Removed { path: ChangePath, value: Value },
    Changed { path: ChangePath, old: Value, new: Value },
}

impl ChangeRecord {
    pub fn added(path: ChangePath, value: Value) -> Self {
        ChangeRecord::Added { path, value }
    }

    pub fn removed(path: ChangePath, value: Value) -> Self {
        ChangeRecord::Removed { path, value }
    }

    pub fn changed(path: ChangePath, old: Value, new: Value) -> Self {
        ChangeRecord::Changed { path, old, new }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeRecord::Added { .. } => ChangeKind::Added,
            ChangeRecord::Removed { .. } => ChangeKind::Removed,
            ChangeRecord::Changed { .. } => ChangeKind::Changed,
        }
    }

    pub fn path(&self) -> &ChangePath {
        match self {
            ChangeRecord::Added { path, .. }
            | ChangeRecord::Removed { path, .. }
            | ChangeRecord::Changed { path, .. } => path,
        }
    }

    /// The value the record refers to: the new value for additions and
    /// changes, the old value for removals.
    pub fn subject(&self) -> &Value {
        match self {
            ChangeRecord::Added { value, .. } | ChangeRecord::Removed { value, .. } => value,
            ChangeRecord::Changed { new, .. } => new,
        }
    }
}

/// True when the records are a single whole-document replacement, i.e. the
/// extractor could not understand the payload shape.
pub fn is_whole_document(changes: &[ChangeRecord]) -> bool {
    matches!(changes, [ChangeRecord::Changed { path, .. }] if path.is_root())
}
