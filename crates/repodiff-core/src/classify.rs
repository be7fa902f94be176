use serde::{Deserialize, Serialize};

use crate::{ChangeRecord, CoreError, StatusKind};

/// Where a selected change ends up in the assembled document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Added or modified text, rendered as an interleaved diff
    TextChange,
    /// Listed in the rename trailer; also rendered when content is present
    Renamed,
    /// Listed in the deletion trailer, never rendered
    Deleted,
    /// Listed in the skipped trailer, never rendered
    BinarySkipped,
}

/// Classify a change record. First matching rule wins:
/// binary, rename, deletion, then text change.
pub fn classify(record: &ChangeRecord) -> Result<Category, CoreError> {
    if record.status == StatusKind::Binary {
        return Ok(Category::BinarySkipped);
    }

    if record
        .previous_path
        .as_deref()
        .is_some_and(|previous| previous != record.path)
    {
        return Ok(Category::Renamed);
    }

    if record.status == StatusKind::Deleted {
        return Ok(Category::Deleted);
    }

    if !record.has_content() {
        return Err(CoreError::MalformedRecord {
            path: record.path.clone(),
            reason: format!("{} change carries no content and is not binary", record.status),
        });
    }

    Ok(Category::TextChange)
}
