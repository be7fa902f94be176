use git2::{ObjectType, Repository, Status, StatusEntry, StatusOptions, Tree};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use repodiff_core::{ChangeRecord, StatusKind};

use crate::ChangeSummary;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Repository has no working tree: {0}")]
    BareRepo(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),
}

/// Git treats a file as binary when a NUL byte shows up this early
const BINARY_SNIFF_LEN: usize = 8000;

fn is_staged(st: Status) -> bool {
    st.intersects(
        Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE,
    )
}

/// Root of the working tree enclosing `working_dir`
pub fn repo_root(working_dir: &Path) -> Result<PathBuf, GitError> {
    let repo = open_repo(working_dir)?;
    workdir_of(&repo)
}

fn open_repo(working_dir: &Path) -> Result<Repository, GitError> {
    Repository::discover(working_dir).map_err(|e| {
        if e.code() == git2::ErrorCode::NotFound {
            GitError::NotARepo(working_dir.display().to_string())
        } else {
            GitError::GitOperationFailed(e)
        }
    })
}

fn workdir_of(repo: &Repository) -> Result<PathBuf, GitError> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| GitError::BareRepo(repo.path().display().to_string()))
}

/// Every change found in a working tree, in git status order
#[derive(Debug, Clone)]
pub struct WorkingTreeChanges {
    pub root: PathBuf,
    pub records: Vec<ChangeRecord>,
}

impl WorkingTreeChanges {
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::from_records(&self.records)
    }
}

/// Reads the working tree status and loads both sides of every change
pub struct ChangeScanner {
    /// Whether to include untracked files
    include_untracked: bool,
}

impl Default for ChangeScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeScanner {
    pub fn new() -> Self {
        Self {
            include_untracked: true,
        }
    }

    pub fn with_untracked(mut self, include: bool) -> Self {
        self.include_untracked = include;
        self
    }

    /// Scan the repository enclosing `working_dir`.
    ///
    /// Old content comes from HEAD, new content from the working tree. Binary
    /// or unreadable files come back as [`StatusKind::Binary`] without content.
    pub fn scan(&self, working_dir: &Path) -> Result<WorkingTreeChanges, GitError> {
        let repo = open_repo(working_dir)?;
        let root = workdir_of(&repo)?;

        // Try to get HEAD tree, handle empty repo case
        let head_tree = match repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                None
            }
            Err(e) => return Err(GitError::GitOperationFailed(e)),
        };

        let mut opts = StatusOptions::new();
        opts.include_untracked(self.include_untracked)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = repo.statuses(Some(&mut opts))?;

        let mut records = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            if entry.status().is_empty() || entry.status().is_ignored() {
                continue;
            }
            if let Some(record) = build_record(&repo, &root, head_tree.as_ref(), &entry)? {
                records.push(record);
            }
        }

        let changes = WorkingTreeChanges { root, records };
        let summary = changes.summary();
        debug!(
            modified = summary.modified,
            added = summary.added,
            deleted = summary.deleted,
            renamed = summary.renamed,
            binary = summary.binary,
            staged = summary.staged,
            "Scanned working tree"
        );

        Ok(changes)
    }
}

/// One side of a change, as loaded from HEAD or the working tree
enum Content {
    Absent,
    Text(Vec<String>),
    Binary,
}

impl Content {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
        if sniff.contains(&0) {
            return Content::Binary;
        }
        match String::from_utf8(bytes) {
            Ok(text) => Content::Text(text.lines().map(str::to_string).collect()),
            Err(_) => Content::Binary,
        }
    }

    fn into_lines(self) -> Option<Vec<String>> {
        match self {
            Content::Text(lines) => Some(lines),
            Content::Absent | Content::Binary => None,
        }
    }
}

fn build_record(
    repo: &Repository,
    root: &Path,
    head_tree: Option<&Tree<'_>>,
    entry: &StatusEntry<'_>,
) -> Result<Option<ChangeRecord>, GitError> {
    let st = entry.status();

    // entry.path() is the pre-rename path, so prefer the new side of the deltas
    let path = entry
        .index_to_workdir()
        .and_then(|d| d.new_file().path())
        .or_else(|| entry.head_to_index().and_then(|d| d.new_file().path()))
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| entry.path().map(str::to_string));
    let Some(path) = path else {
        warn!("Skipping status entry without a path");
        return Ok(None);
    };

    let rename_origin = if st.is_index_renamed() {
        entry.head_to_index().and_then(|d| d.old_file().path())
    } else if st.is_wt_renamed() {
        entry.index_to_workdir().and_then(|d| d.old_file().path())
    } else {
        None
    };
    let previous_path = rename_origin
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|previous| *previous != path);

    let staged = is_staged(st);

    let kind = if previous_path.is_some() {
        StatusKind::Renamed
    } else if st.is_wt_deleted() || st.is_index_deleted() {
        StatusKind::Deleted
    } else if st.is_index_new() || st.is_wt_new() {
        StatusKind::Added
    } else {
        StatusKind::Modified
    };

    if kind == StatusKind::Deleted {
        return Ok(Some(ChangeRecord::deleted(path).with_staged(staged)));
    }

    let new_side = read_worktree(&root.join(&path));
    let old_side = match kind {
        StatusKind::Added => Content::Absent,
        _ => read_head(
            repo,
            head_tree,
            previous_path.as_deref().unwrap_or(path.as_str()),
        )?,
    };

    let record = match (old_side, new_side) {
        (Content::Binary, _) | (_, Content::Binary) => {
            debug!(path = %path, "Treating change as binary");
            ChangeRecord {
                path,
                previous_path,
                status: StatusKind::Binary,
                staged,
                old_content: None,
                new_content: None,
            }
        }
        (old, new) => ChangeRecord {
            path,
            previous_path,
            status: kind,
            staged,
            old_content: old.into_lines(),
            new_content: new.into_lines(),
        },
    };

    Ok(Some(record))
}

fn read_worktree(full_path: &Path) -> Content {
    // Submodules and nested repositories show up as directories
    if full_path.is_dir() {
        return Content::Binary;
    }

    match fs::read(full_path) {
        Ok(bytes) => Content::from_bytes(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Content::Absent,
        Err(e) => {
            warn!(path = %full_path.display(), error = %e, "Unreadable file, skipping as binary");
            Content::Binary
        }
    }
}

fn read_head(
    repo: &Repository,
    head_tree: Option<&Tree<'_>>,
    path: &str,
) -> Result<Content, GitError> {
    let Some(tree) = head_tree else {
        return Ok(Content::Absent);
    };

    let entry = match tree.get_path(Path::new(path)) {
        Ok(entry) => entry,
        Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Content::Absent),
        Err(e) => return Err(GitError::GitOperationFailed(e)),
    };

    if entry.kind() != Some(ObjectType::Blob) {
        return Ok(Content::Binary);
    }

    let blob = repo.find_blob(entry.id())?;
    if blob.is_binary() {
        return Ok(Content::Binary);
    }
    Ok(Content::from_bytes(blob.content().to_vec()))
}
