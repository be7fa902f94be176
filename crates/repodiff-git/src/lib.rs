//! # repodiff-git
//!
//! Git working-tree scanning for repodiff.
//!
//! This crate is the repository side of the pipeline: it finds the enclosing
//! repository, reads `git status` (with rename detection), and loads the HEAD
//! and working-tree content of every change into a
//! [`ChangeRecord`](repodiff_core::ChangeRecord).
//!
//! ## Key Types
//!
//! - [`ChangeScanner`] - Builds change records from the working tree
//! - [`WorkingTreeChanges`] - Repository root plus records in status order
//! - [`ChangeSummary`] - Per-kind counts (for logging and display)
//!
//! ## Binary files
//!
//! A side is binary when it has a NUL byte in its first 8000 bytes, is not
//! valid UTF-8, cannot be read, or is a submodule. Binary records carry no
//! content; the core never sniffs content itself.

mod scan;
mod status;

pub use scan::{repo_root, ChangeScanner, GitError, WorkingTreeChanges};
pub use status::ChangeSummary;
