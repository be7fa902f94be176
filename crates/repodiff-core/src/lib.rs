//! # repodiff-core
//!
//! Turns selected working-tree changes into a single review document.
//!
//! ## Overview
//!
//! Three pure pieces, leaves first:
//! - [`diff_lines`] aligns old and new lines (longest common subsequence)
//!   and interleaves them as kept / removed / added lines
//! - [`classify`] puts each [`ChangeRecord`] into exactly one [`Category`]
//! - [`assemble`] builds a [`PromptDocument`] in selection order, which
//!   [`PromptDocument::render`] turns into Markdown
//!
//! Nothing here touches git, the filesystem or the terminal. Records arrive
//! with their content already split into lines and binary files already
//! flagged.
//!
//! ## Usage
//!
//! ```rust
//! use repodiff_core::{assemble, ChangeRecord, RenderOptions};
//!
//! let record = ChangeRecord::modified(
//!     "src/lib.rs",
//!     vec!["a".into(), "b".into()],
//!     vec!["a".into(), "c".into()],
//! );
//! let document = assemble(&[record], None).unwrap();
//! let text = document.render(&RenderOptions::default());
//! assert!(text.contains("-b\n+c"));
//! ```

mod classify;
mod diff;
mod error;
mod prompt;
mod record;

pub use classify::{classify, Category};
pub use diff::{diff_lines, DiffLine, DiffStats, DiffTag};
pub use error::CoreError;
pub use prompt::{
    assemble, language_hint, PromptDocument, RenamedPath, RenderOptions, RenderedFile,
    FORMAT_EXPLAINER,
};
pub use record::{is_default_selected, ChangeRecord, StatusKind};
