use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::classify::{classify, Category};
use crate::diff::{diff_lines, DiffLine, DiffStats};
use crate::{ChangeRecord, CoreError};

/// Paragraph opening every document, telling the reader how to read the diffs
pub const FORMAT_EXPLAINER: &str = "The sections below show changes from a Git working tree. \
Each changed file is rendered as an interleaved diff of its full content: lines starting \
with `+` were added, lines starting with `-` were removed, and lines starting with a space \
are unchanged. Renamed, deleted and skipped binary files are listed at the end.";

/// Interleaved diff of one selected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    pub path: String,
    /// Present when the file was renamed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    pub lines: Vec<DiffLine>,
}

impl RenderedFile {
    pub fn stats(&self) -> DiffStats {
        DiffStats::of(&self.lines)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedPath {
    pub from: String,
    pub to: String,
}

/// The assembled document. Owns everything it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDocument {
    pub format_explainer: String,
    pub readme: Option<String>,
    /// In the order the files were selected
    pub rendered_files: Vec<RenderedFile>,
    pub renamed: Vec<RenamedPath>,
    pub deleted: Vec<String>,
    pub skipped_binary: Vec<String>,
}

/// Presentation switches for [`PromptDocument::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Tag each fenced block with a language guessed from the file extension
    pub language_hints: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            language_hints: true,
        }
    }
}

/// Build a document from the selected records, keeping their order.
///
/// Fails with [`CoreError::MissingSelection`] when there is nothing at all to
/// include, and propagates [`CoreError::MalformedRecord`] from classification.
pub fn assemble(
    selected: &[ChangeRecord],
    readme: Option<&str>,
) -> Result<PromptDocument, CoreError> {
    if selected.is_empty() && readme.is_none() {
        return Err(CoreError::MissingSelection);
    }

    let mut document = PromptDocument {
        format_explainer: FORMAT_EXPLAINER.to_string(),
        readme: readme.map(str::to_string),
        rendered_files: Vec::new(),
        renamed: Vec::new(),
        deleted: Vec::new(),
        skipped_binary: Vec::new(),
    };

    for record in selected {
        match classify(record)? {
            Category::TextChange => document.rendered_files.push(render_record(record)),
            Category::Renamed => {
                document.renamed.push(RenamedPath {
                    from: record.previous_path.clone().unwrap_or_default(),
                    to: record.path.clone(),
                });
                if record.has_content() {
                    document.rendered_files.push(render_record(record));
                }
            }
            Category::Deleted => document.deleted.push(record.path.clone()),
            Category::BinarySkipped => document.skipped_binary.push(record.path.clone()),
        }
    }

    debug!(
        rendered = document.rendered_files.len(),
        renamed = document.renamed.len(),
        deleted = document.deleted.len(),
        skipped = document.skipped_binary.len(),
        "Assembled prompt document"
    );

    Ok(document)
}

fn render_record(record: &ChangeRecord) -> RenderedFile {
    let old = record.old_content.as_deref().unwrap_or(&[]);
    let new = record.new_content.as_deref().unwrap_or(&[]);
    let lines = diff_lines(old, new);

    debug!(path = %record.path, lines = lines.len(), "Rendered interleaved diff");

    RenderedFile {
        path: record.path.clone(),
        previous_path: record
            .previous_path
            .clone()
            .filter(|previous| *previous != record.path),
        lines,
    }
}

impl PromptDocument {
    /// Number of paths the document mentions, rendered or listed
    pub fn file_count(&self) -> usize {
        let renamed_and_rendered = self
            .rendered_files
            .iter()
            .filter(|f| f.previous_path.is_some())
            .count();
        self.rendered_files.len() + self.renamed.len() - renamed_and_rendered
            + self.deleted.len()
            + self.skipped_binary.len()
    }

    /// Render the document as Markdown text. Empty sections are left out.
    pub fn render(&self, options: &RenderOptions) -> String {
        let mut sections = vec![format!("# Changes\n\n{}", self.format_explainer)];

        if let Some(readme) = &self.readme {
            sections.push(format!("## README\n\n{}", readme.trim_end()));
        }

        for file in &self.rendered_files {
            sections.push(render_file(file, options));
        }

        if !self.renamed.is_empty() {
            let items: Vec<String> = self
                .renamed
                .iter()
                .map(|r| format!("{} → {}", r.from, r.to))
                .collect();
            sections.push(bullet_section("Renamed files", &items));
        }
        if !self.deleted.is_empty() {
            sections.push(bullet_section("Deleted files", &self.deleted));
        }
        if !self.skipped_binary.is_empty() {
            sections.push(bullet_section("Skipped binary files", &self.skipped_binary));
        }

        let mut text = sections.join("\n\n");
        text.push('\n');
        text
    }
}

fn render_file(file: &RenderedFile, options: &RenderOptions) -> String {
    let header = match &file.previous_path {
        Some(previous) => format!("## {} (renamed from {})", file.path, previous),
        None => format!("## {}", file.path),
    };

    let fence = "`".repeat(fence_width(&file.lines));
    let lang = if options.language_hints {
        language_hint(&file.path)
    } else {
        String::new()
    };

    let mut block = format!("{header}\n\n{fence}{lang}\n");
    for line in &file.lines {
        block.push_str(&line.to_string());
        block.push('\n');
    }
    block.push_str(&fence);
    block
}

fn bullet_section<S: AsRef<str>>(title: &str, items: &[S]) -> String {
    let bullets: Vec<String> = items.iter().map(|i| format!("* {}", i.as_ref())).collect();
    format!("## {}\n\n{}", title, bullets.join("\n"))
}

/// Backtick fence long enough that no run inside the body can close it
fn fence_width(lines: &[DiffLine]) -> usize {
    let longest_run = lines
        .iter()
        .flat_map(|line| line.text.split(|c| c != '`'))
        .map(str::len)
        .max()
        .unwrap_or(0);
    (longest_run + 1).max(3)
}

/// Fence language for a path, guessed from its extension
pub fn language_hint(path: &str) -> String {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lang = match ext.as_str() {
        "" => "text",
        "js" => "javascript",
        "ts" => "typescript",
        "md" => "markdown",
        "py" => "python",
        "rb" => "ruby",
        "h" | "hpp" | "cc" => "cpp",
        "cs" => "csharp",
        "sh" => "bash",
        "yml" => "yaml",
        "rs" => "rust",
        "kt" => "kotlin",
        other => other,
    };
    lang.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_selection() {
        assert_eq!(assemble(&[], None), Err(CoreError::MissingSelection));
    }

    #[test]
    fn test_readme_only_document() {
        let document = assemble(&[], Some("# Hi")).unwrap();
        assert!(document.rendered_files.is_empty());

        let text = document.render(&RenderOptions::default());
        assert!(text.starts_with("# Changes\n\n"));
        assert!(text.contains("## README\n\n# Hi"));
        assert!(!text.contains("```"));
        assert!(!text.contains("Renamed files"));
        assert!(!text.contains("Deleted files"));
        assert!(!text.contains("Skipped binary files"));
    }

    #[test]
    fn test_no_readme_section_without_readme() {
        let record = ChangeRecord::added("a.txt", lines(&["x"]));
        let text = assemble(&[record], None)
            .unwrap()
            .render(&RenderOptions::default());
        assert!(!text.contains("## README"));
    }

    #[test]
    fn test_added_file_rendered_against_empty() {
        let record = ChangeRecord::added("src/main.rs", lines(&["fn main() {}"]));
        let document = assemble(&[record], None).unwrap();

        assert_eq!(document.rendered_files.len(), 1);
        assert_eq!(
            document.rendered_files[0].lines,
            vec![DiffLine::added("fn main() {}")]
        );

        let text = document.render(&RenderOptions::default());
        assert!(text.contains("## src/main.rs\n\n```rust\n+fn main() {}\n```"));
    }

    #[test]
    fn test_deleted_only_in_trailer() {
        let record = ChangeRecord::deleted("old.rs");
        let document = assemble(&[record], None).unwrap();

        assert!(document.rendered_files.is_empty());
        assert_eq!(document.deleted, vec!["old.rs".to_string()]);
        assert!(document
            .render(&RenderOptions::default())
            .contains("## Deleted files\n\n* old.rs"));
    }

    #[test]
    fn test_renamed_with_content_is_listed_and_rendered() {
        let record = ChangeRecord::renamed(
            "src/old.rs",
            "src/new.rs",
            Some(lines(&["a", "b"])),
            Some(lines(&["a", "c"])),
        );
        let document = assemble(&[record], None).unwrap();

        assert_eq!(
            document.renamed,
            vec![RenamedPath {
                from: "src/old.rs".to_string(),
                to: "src/new.rs".to_string(),
            }]
        );
        assert_eq!(document.rendered_files.len(), 1);
        assert_eq!(document.file_count(), 1);

        let text = document.render(&RenderOptions::default());
        assert!(text.contains("## src/new.rs (renamed from src/old.rs)"));
        assert!(text.contains("## Renamed files\n\n* src/old.rs → src/new.rs"));
    }

    #[test]
    fn test_renamed_without_content_only_listed() {
        let record = ChangeRecord::renamed("a.bin", "b.bin", None, None);
        let document = assemble(&[record], None).unwrap();
        assert!(document.rendered_files.is_empty());
        assert_eq!(document.renamed.len(), 1);
    }

    #[test]
    fn test_binary_skipped() {
        let record = ChangeRecord::binary("logo.png");
        let document = assemble(&[record], None).unwrap();
        let text = document.render(&RenderOptions::default());
        assert!(text.contains("## Skipped binary files\n\n* logo.png"));
        assert!(!text.contains("## logo.png"));
    }

    #[test]
    fn test_malformed_record_propagates() {
        let mut record = ChangeRecord::added("a.txt", vec![]);
        record.new_content = None;
        let result = assemble(&[record], Some("readme"));
        assert!(matches!(result, Err(CoreError::MalformedRecord { .. })));
    }

    #[test]
    fn test_language_hints_can_be_disabled() {
        let record = ChangeRecord::added("script.py", lines(&["print(1)"]));
        let document = assemble(&[record], None).unwrap();
        let text = document.render(&RenderOptions {
            language_hints: false,
        });
        assert!(text.contains("## script.py\n\n```\n+print(1)\n```"));
    }

    #[test]
    fn test_fence_outgrows_backticks_in_body() {
        let record = ChangeRecord::added("README.md", lines(&["```rust", "let x = 1;", "```"]));
        let text = assemble(&[record], None)
            .unwrap()
            .render(&RenderOptions::default());
        assert!(text.contains("````markdown\n+```rust\n+let x = 1;\n+```\n````"));
    }

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("src/lib.rs"), "rust");
        assert_eq!(language_hint("app/main.TS"), "typescript");
        assert_eq!(language_hint("ui/Button.tsx"), "tsx");
        assert_eq!(language_hint("ui/App.jsx"), "jsx");
        assert_eq!(language_hint("config.toml"), "toml");
        assert_eq!(language_hint("Makefile"), "text");
    }

    #[test]
    fn test_document_serializes_to_json() {
        let record = ChangeRecord::modified("a.txt", lines(&["a"]), lines(&["b"]));
        let document = assemble(&[record], None).unwrap();
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["rendered_files"][0]["path"], "a.txt");
        assert_eq!(json["rendered_files"][0]["lines"][0]["tag"], "removed");
        assert!(json["rendered_files"][0].get("previous_path").is_none());
    }
}
