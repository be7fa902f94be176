use serde::{Deserialize, Serialize};

/// Kind of change a path went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Modified,
    Added,
    Deleted,
    Renamed,
    Binary,
}

impl StatusKind {
    /// Single-letter code, in the spirit of `git status --short`
    pub fn code(&self) -> char {
        match self {
            StatusKind::Modified => 'M',
            StatusKind::Added => 'A',
            StatusKind::Deleted => 'D',
            StatusKind::Renamed => 'R',
            StatusKind::Binary => 'B',
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatusKind::Modified => "modified",
            StatusKind::Added => "added",
            StatusKind::Deleted => "deleted",
            StatusKind::Renamed => "renamed",
            StatusKind::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// One file's change between two tree states.
///
/// Built once by the repository scanner and never mutated afterwards. Content
/// is already split into logical lines; binary files never carry content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: String,
    /// Set only for renames
    pub previous_path: Option<String>,
    pub status: StatusKind,
    pub staged: bool,
    pub old_content: Option<Vec<String>>,
    pub new_content: Option<Vec<String>>,
}

impl ChangeRecord {
    pub fn modified(path: impl Into<String>, old: Vec<String>, new: Vec<String>) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            status: StatusKind::Modified,
            staged: false,
            old_content: Some(old),
            new_content: Some(new),
        }
    }

    pub fn added(path: impl Into<String>, new: Vec<String>) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            status: StatusKind::Added,
            staged: false,
            old_content: None,
            new_content: Some(new),
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            status: StatusKind::Deleted,
            staged: false,
            old_content: None,
            new_content: None,
        }
    }

    /// A rename, optionally carrying content when the file is text
    pub fn renamed(
        previous_path: impl Into<String>,
        path: impl Into<String>,
        old: Option<Vec<String>>,
        new: Option<Vec<String>>,
    ) -> Self {
        Self {
            path: path.into(),
            previous_path: Some(previous_path.into()),
            status: StatusKind::Renamed,
            staged: false,
            old_content: old,
            new_content: new,
        }
    }

    pub fn binary(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            status: StatusKind::Binary,
            staged: false,
            old_content: None,
            new_content: None,
        }
    }

    pub fn with_staged(mut self, staged: bool) -> Self {
        self.staged = staged;
        self
    }

    pub fn has_content(&self) -> bool {
        self.old_content.is_some() || self.new_content.is_some()
    }

    /// Whether the selection UI should propose this record pre-checked
    pub fn is_default_selected(&self) -> bool {
        is_default_selected(self)
    }
}

/// Staged, non-binary changes are proposed pre-selected.
pub fn is_default_selected(record: &ChangeRecord) -> bool {
    record.staged && record.status != StatusKind::Binary
}
