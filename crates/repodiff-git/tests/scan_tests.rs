use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};
use repodiff_core::{ChangeRecord, StatusKind};
use repodiff_git::{repo_root, ChangeScanner, GitError};
use tempfile::TempDir;

/// Helper: a fresh repository in a temp directory.
fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

fn write(dir: &TempDir, rel: &str, content: &[u8]) {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn stage(repo: &Repository, rel: &str) {
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(rel)).unwrap();
    index.write().unwrap();
}

/// Helper: stage everything and commit it on top of HEAD (if any).
fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

fn find<'a>(records: &'a [ChangeRecord], path: &str) -> &'a ChangeRecord {
    records
        .iter()
        .find(|r| r.path == path)
        .unwrap_or_else(|| panic!("no record for {path}: {records:?}"))
}

fn lines(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

// ============================================================
// Discovery
// ============================================================

#[test]
fn test_not_a_repo() {
    let dir = TempDir::new().unwrap();
    let result = repo_root(dir.path());
    assert!(matches!(result, Err(GitError::NotARepo(_))));

    let scan = ChangeScanner::new().scan(dir.path());
    assert!(matches!(scan, Err(GitError::NotARepo(_))));
}

#[test]
fn test_repo_root_from_subdirectory() {
    let (dir, _repo) = init_repo();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();

    let root = repo_root(&dir.path().join("src/nested")).unwrap();
    assert_eq!(
        fs::canonicalize(root).unwrap(),
        fs::canonicalize(dir.path()).unwrap()
    );
}

// ============================================================
// Scanning
// ============================================================

#[test]
fn test_clean_repo_has_no_changes() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\n");
    commit_all(&repo, "initial");

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    assert!(changes.records.is_empty());
    assert!(changes.summary().is_clean());
}

#[test]
fn test_unstaged_modification() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\ntwo\n");
    commit_all(&repo, "initial");
    write(&dir, "a.txt", b"one\nthree\n");

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&changes.records, "a.txt");
    assert_eq!(record.status, StatusKind::Modified);
    assert!(!record.staged);
    assert_eq!(record.old_content, lines(&["one", "two"]));
    assert_eq!(record.new_content, lines(&["one", "three"]));
}

#[test]
fn test_staged_modification_is_staged() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\n");
    commit_all(&repo, "initial");
    write(&dir, "a.txt", b"two\n");
    stage(&repo, "a.txt");

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&changes.records, "a.txt");
    assert_eq!(record.status, StatusKind::Modified);
    assert!(record.staged);
    assert!(record.is_default_selected());
}

#[test]
fn test_staged_new_file() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\n");
    commit_all(&repo, "initial");
    write(&dir, "src/new.rs", b"fn main() {}\n");
    stage(&repo, "src/new.rs");

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&changes.records, "src/new.rs");
    assert_eq!(record.status, StatusKind::Added);
    assert!(record.staged);
    assert_eq!(record.old_content, None);
    assert_eq!(record.new_content, lines(&["fn main() {}"]));
}

#[test]
fn test_untracked_files_can_be_excluded() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\n");
    commit_all(&repo, "initial");
    write(&dir, "notes/todo.md", b"- item\n");

    let with = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&with.records, "notes/todo.md");
    assert_eq!(record.status, StatusKind::Added);
    assert!(!record.staged);

    let without = ChangeScanner::new()
        .with_untracked(false)
        .scan(dir.path())
        .unwrap();
    assert!(without.records.is_empty());
}

#[test]
fn test_deleted_file_has_no_content() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\n");
    write(&dir, "b.txt", b"two\n");
    commit_all(&repo, "initial");
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&changes.records, "b.txt");
    assert_eq!(record.status, StatusKind::Deleted);
    assert!(!record.has_content());
}

#[test]
fn test_binary_file_is_flagged_without_content() {
    let (dir, repo) = init_repo();
    write(&dir, "a.txt", b"one\n");
    commit_all(&repo, "initial");
    write(&dir, "logo.png", &[0x89, b'P', b'N', b'G', 0x00, 0x1a, 0x0a]);
    stage(&repo, "logo.png");

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&changes.records, "logo.png");
    assert_eq!(record.status, StatusKind::Binary);
    assert!(record.staged);
    assert!(!record.has_content());
    assert!(!record.is_default_selected());
    assert_eq!(changes.summary().binary, 1);
}

#[test]
fn test_staged_rename() {
    let (dir, repo) = init_repo();
    write(&dir, "old.txt", b"alpha\nbeta\ngamma\n");
    commit_all(&repo, "initial");

    fs::rename(dir.path().join("old.txt"), dir.path().join("new.txt")).unwrap();
    let mut index = repo.index().unwrap();
    index.remove_path(Path::new("old.txt")).unwrap();
    index.add_path(Path::new("new.txt")).unwrap();
    index.write().unwrap();

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    assert_eq!(changes.records.len(), 1);

    let record = &changes.records[0];
    assert_eq!(record.path, "new.txt");
    assert_eq!(record.previous_path.as_deref(), Some("old.txt"));
    assert_eq!(record.status, StatusKind::Renamed);
    assert!(record.staged);
    assert_eq!(record.old_content, lines(&["alpha", "beta", "gamma"]));
    assert_eq!(record.new_content, record.old_content);
}

#[test]
fn test_unborn_branch() {
    let (dir, _repo) = init_repo();
    write(&dir, "first.txt", b"hello\n");

    let changes = ChangeScanner::new().scan(dir.path()).unwrap();
    let record = find(&changes.records, "first.txt");
    assert_eq!(record.status, StatusKind::Added);
    assert_eq!(record.new_content, lines(&["hello"]));
}

#[test]
fn test_scan_from_subdirectory_uses_root_relative_paths() {
    let (dir, repo) = init_repo();
    write(&dir, "src/lib.rs", b"pub fn a() {}\n");
    commit_all(&repo, "initial");
    write(&dir, "src/lib.rs", b"pub fn b() {}\n");

    let changes = ChangeScanner::new().scan(&dir.path().join("src")).unwrap();
    let record = find(&changes.records, "src/lib.rs");
    assert_eq!(record.status, StatusKind::Modified);
}
