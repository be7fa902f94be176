use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a line relates to the old and new version of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffTag {
    Kept,
    Added,
    Removed,
}

impl DiffTag {
    pub fn glyph(&self) -> char {
        match self {
            DiffTag::Kept => ' ',
            DiffTag::Added => '+',
            DiffTag::Removed => '-',
        }
    }
}

/// A single line of an interleaved diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

impl DiffLine {
    pub fn kept(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Kept,
            text: text.into(),
        }
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Added,
            text: text.into(),
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Removed,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for DiffLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.tag.glyph(), self.text)
    }
}

/// Line counts of an interleaved diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn of(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, line| {
            match line.tag {
                DiffTag::Kept => stats.kept += 1,
                DiffTag::Added => stats.added += 1,
                DiffTag::Removed => stats.removed += 1,
            }
            stats
        })
    }
}

/// Tables above this many cells are not allocated (64 MiB of `u32`)
const MAX_TABLE_CELLS: usize = 1 << 24;

/// Interleave `old` and `new` into kept / removed / added lines, top to bottom.
///
/// Lines are compared as whole tokens. The alignment is a longest common
/// subsequence: an equal pair is matched as soon as the walk reaches it, and
/// when a line has to be dropped from either side with the same outcome, the
/// old line is removed before the new one is added. Output is therefore fully
/// determined by the input.
///
/// When the LCS table for the changed region would be too large, the common
/// suffix is kept as one block and the rest is aligned in linear space by
/// splitting at the earliest optimal column (Hirschberg). The result is still
/// a longest common subsequence, but among repeated lines the matched pair can
/// differ from the one the table walk picks.
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S]) -> Vec<DiffLine> {
    diff_with_limit(old, new, MAX_TABLE_CELLS)
}

fn diff_with_limit<S: AsRef<str>>(old: &[S], new: &[S], max_cells: usize) -> Vec<DiffLine> {
    let mut result = Vec::with_capacity(old.len().max(new.len()));

    // Leading equal lines are exactly what the walk below would emit first
    let prefix = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a.as_ref() == b.as_ref())
        .count();
    result.extend(old[..prefix].iter().map(|l| DiffLine::kept(l.as_ref())));

    let old = &old[prefix..];
    let new = &new[prefix..];

    let suffix = if fits(old.len(), new.len(), max_cells) {
        0
    } else {
        old.iter()
            .rev()
            .zip(new.iter().rev())
            .take_while(|(a, b)| a.as_ref() == b.as_ref())
            .count()
    };
    let (old_mid, old_tail) = old.split_at(old.len() - suffix);
    let new_mid = &new[..new.len() - suffix];

    if suffix > 0 || !fits(old_mid.len(), new_mid.len(), max_cells) {
        debug!(
            old = old_mid.len(),
            new = new_mid.len(),
            suffix,
            "Aligning large change in linear space"
        );
    }

    let (old_ids, new_ids) = intern(old_mid, new_mid);
    let mut edits = Vec::with_capacity(old_mid.len() + new_mid.len());
    align(&old_ids, &new_ids, max_cells, &mut edits);

    let (mut i, mut j) = (0, 0);
    for edit in edits {
        match edit {
            Edit::Keep => {
                result.push(DiffLine::kept(old_mid[i].as_ref()));
                i += 1;
                j += 1;
            }
            Edit::Remove => {
                result.push(DiffLine::removed(old_mid[i].as_ref()));
                i += 1;
            }
            Edit::Add => {
                result.push(DiffLine::added(new_mid[j].as_ref()));
                j += 1;
            }
        }
    }
    result.extend(old_tail.iter().map(|l| DiffLine::kept(l.as_ref())));

    result
}

fn fits(old_len: usize, new_len: usize, max_cells: usize) -> bool {
    (old_len + 1).saturating_mul(new_len + 1) <= max_cells
}

/// Replace each distinct line with a small id so comparisons are integer compares
fn intern<'a, S: AsRef<str>>(old: &'a [S], new: &'a [S]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&'a str, u32> = HashMap::new();
    let mut lookup = |lines: &'a [S]| -> Vec<u32> {
        lines
            .iter()
            .map(|line| {
                let next = ids.len() as u32;
                *ids.entry(line.as_ref()).or_insert(next)
            })
            .collect()
    };
    let old_ids = lookup(old);
    let new_ids = lookup(new);
    (old_ids, new_ids)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Keep,
    Remove,
    Add,
}

/// Append the edits turning `old` into `new`.
///
/// Blocks small enough for a full table are walked directly. Larger ones are
/// halved on the old side and the new side is cut at the first column where
/// the two halves together still reach the full LCS length.
fn align(old: &[u32], new: &[u32], max_cells: usize, edits: &mut Vec<Edit>) {
    if old.len() <= 1 || new.is_empty() || fits(old.len(), new.len(), max_cells) {
        walk_table(old, new, edits);
        return;
    }

    let mid = old.len() / 2;
    let head = forward_row(&old[..mid], new);
    let tail = backward_row(&old[mid..], new);

    let mut split = 0;
    let mut best = 0;
    for (k, (h, t)) in head.iter().zip(&tail).enumerate() {
        if h + t > best {
            best = h + t;
            split = k;
        }
    }

    align(&old[..mid], &new[..split], max_cells, edits);
    align(&old[mid..], &new[split..], max_cells, edits);
}

fn walk_table(old: &[u32], new: &[u32], edits: &mut Vec<Edit>) {
    let table = LcsTable::build(old, new);

    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            edits.push(Edit::Keep);
            i += 1;
            j += 1;
        } else if table.get(i + 1, j) >= table.get(i, j + 1) {
            edits.push(Edit::Remove);
            i += 1;
        } else {
            edits.push(Edit::Add);
            j += 1;
        }
    }
    edits.extend(std::iter::repeat(Edit::Remove).take(old.len() - i));
    edits.extend(std::iter::repeat(Edit::Add).take(new.len() - j));
}

/// `row[k]` is the LCS length of `old` and `new[..k]`
fn forward_row(old: &[u32], new: &[u32]) -> Vec<u32> {
    let mut prev = vec![0u32; new.len() + 1];
    let mut cur = vec![0u32; new.len() + 1];
    for x in old {
        for k in 1..=new.len() {
            cur[k] = if *x == new[k - 1] {
                prev[k - 1] + 1
            } else {
                prev[k].max(cur[k - 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

/// `row[k]` is the LCS length of `old` and `new[k..]`
fn backward_row(old: &[u32], new: &[u32]) -> Vec<u32> {
    let m = new.len();
    let mut prev = vec![0u32; m + 1];
    let mut cur = vec![0u32; m + 1];
    for x in old.iter().rev() {
        for k in (0..m).rev() {
            cur[k] = if *x == new[k] {
                prev[k + 1] + 1
            } else {
                prev[k].max(cur[k + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev
}

/// Suffix LCS lengths: `get(i, j)` is the LCS length of `old[i..]` and `new[j..]`.
struct LcsTable {
    width: usize,
    cells: Vec<u32>,
}

impl LcsTable {
    fn build(old: &[u32], new: &[u32]) -> Self {
        let width = new.len() + 1;
        let mut cells = vec![0u32; (old.len() + 1) * width];

        for i in (0..old.len()).rev() {
            for j in (0..new.len()).rev() {
                cells[i * width + j] = if old[i] == new[j] {
                    cells[(i + 1) * width + j + 1] + 1
                } else {
                    cells[(i + 1) * width + j].max(cells[i * width + j + 1])
                };
            }
        }

        Self { width, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.width + j]
    }
}
