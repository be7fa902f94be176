use serde::{Deserialize, Serialize};

use repodiff_core::{ChangeRecord, StatusKind};

/// Counts of the changes found in a working tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub binary: usize,
    pub staged: usize,
}

impl ChangeSummary {
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                StatusKind::Modified => summary.modified += 1,
                StatusKind::Added => summary.added += 1,
                StatusKind::Deleted => summary.deleted += 1,
                StatusKind::Renamed => summary.renamed += 1,
                StatusKind::Binary => summary.binary += 1,
            }
            if record.staged {
                summary.staged += 1;
            }
        }
        summary
    }

    pub fn is_clean(&self) -> bool {
        self.total_changes() == 0
    }

    pub fn total_changes(&self) -> usize {
        self.modified + self.added + self.deleted + self.renamed + self.binary
    }
}
