//! Change table and interactive file selection.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, MultiSelect};

use repodiff_core::{is_default_selected, ChangeRecord, StatusKind};

/// How the files for the prompt are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Checklist prompt, staged text files pre-checked
    Interactive,
    /// Every change, no prompt
    All,
    /// The pre-checked set, no prompt
    Staged,
}

/// Print the changed files as a table on stderr, sorted by path
pub fn print_change_table(records: &[ChangeRecord]) {
    let mut rows: Vec<&ChangeRecord> = records.iter().collect();
    rows.sort_by(|a, b| a.path.cmp(&b.path));

    let paths: Vec<String> = rows.iter().map(|r| display_path(r)).collect();
    let width = paths.iter().map(|p| p.chars().count()).max().unwrap_or(0).max(4);

    eprintln!();
    eprintln!("{}", "Changed files".bold());
    eprintln!(
        "  {}  {}  {}  {}",
        format!("{:<8}", "Status").dimmed(),
        format!("{:<10}", "Change").dimmed(),
        format!("{:<width$}", "Path", width = width).dimmed(),
        "Type".dimmed()
    );
    for (record, path) in rows.iter().zip(&paths) {
        let staged = if record.staged {
            format!("{:<8}", "Staged").bright_cyan()
        } else {
            format!("{:<8}", "Unstaged").dimmed()
        };
        let kind = if record.status == StatusKind::Binary {
            "Binary".yellow()
        } else {
            "Text".normal()
        };
        eprintln!(
            "  {}  {:<10}  {}  {}",
            staged,
            record.status.to_string(),
            format!("{:<width$}", path, width = width).green(),
            kind
        );
    }
    eprintln!();
}

/// Pick the records to include, in the order the selection returns them.
///
/// `None` when the checklist was cancelled (Esc or `q`). Confirming with
/// nothing checked is an empty selection, not a cancel.
pub fn select_changes(
    records: &[ChangeRecord],
    mode: SelectionMode,
) -> Result<Option<Vec<ChangeRecord>>> {
    let picked = match mode {
        SelectionMode::All => Some((0..records.len()).collect()),
        SelectionMode::Staged => Some(default_selection(records)),
        SelectionMode::Interactive => {
            let items: Vec<String> = records.iter().map(item_label).collect();
            let defaults: Vec<bool> = records.iter().map(is_default_selected).collect();

            MultiSelect::new()
                .with_prompt("Select files to include in the prompt")
                .items(&items)
                .defaults(&defaults)
                .interact_opt()?
        }
    };

    Ok(picked_records(records, picked))
}

/// Map checklist indices back to records, keeping a cancel as `None`
fn picked_records(
    records: &[ChangeRecord],
    picked: Option<Vec<usize>>,
) -> Option<Vec<ChangeRecord>> {
    picked.map(|indices| {
        indices
            .into_iter()
            .filter_map(|i| records.get(i).cloned())
            .collect()
    })
}

/// Yes/no question on the terminal
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Indices of records proposed pre-checked
pub fn default_selection(records: &[ChangeRecord]) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_default_selected(r))
        .map(|(i, _)| i)
        .collect()
}

fn display_path(record: &ChangeRecord) -> String {
    match &record.previous_path {
        Some(previous) => format!("{} → {}", previous, record.path),
        None => record.path.clone(),
    }
}

/// Checklist entry for a record
pub fn item_label(record: &ChangeRecord) -> String {
    let label = format!("{}  {}", record.status.code(), display_path(record));
    if record.status == StatusKind::Binary {
        format!("{} (binary, listed only)", label)
    } else {
        label
    }
}
