use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the finished document was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSink {
    Preview,
    Clipboard,
    File,
    Stdout,
}

/// Structured log events for one repodiff run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    ScanCompleted {
        root: PathBuf,
        total: usize,
        staged: usize,
        binary: usize,
    },
    SelectionMade {
        selected: usize,
        offered: usize,
    },
    FileRendered {
        path: String,
        added: usize,
        removed: usize,
        kept: usize,
    },
    PromptAssembled {
        files: usize,
        bytes: usize,
        renamed: usize,
        deleted: usize,
        skipped: usize,
    },
    OutputDelivered {
        sink: OutputSink,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        bytes: usize,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Logger for repodiff events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // Log to file if configured (always JSON format for file)
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::ScanCompleted {
                total,
                staged,
                binary,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} changed {} ({} staged, {} binary)",
                    "▶".bright_cyan(),
                    total,
                    plural(*total, "file", "files"),
                    staged,
                    binary
                );
            }
            LogEvent::SelectionMade { .. } => {
                // The selection prompt already echoes the choice
            }
            LogEvent::FileRendered {
                path,
                added,
                removed,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} {} {}",
                    "│".dimmed(),
                    path,
                    format!("+{}", added).green(),
                    format!("-{}", removed).red()
                );
            }
            LogEvent::PromptAssembled { files, bytes, .. } => {
                let _ = writeln!(
                    stderr,
                    "{} {} ({} {}, {} bytes)",
                    "✓".bright_green(),
                    "Prompt generated!".bright_green().bold(),
                    files,
                    plural(*files, "file", "files"),
                    bytes
                );
            }
            LogEvent::OutputDelivered { sink, target, .. } => match sink {
                OutputSink::Clipboard => {
                    let _ = writeln!(
                        stderr,
                        "{} {}",
                        "✓".bright_green(),
                        "Copied to clipboard!".bright_green().bold()
                    );
                }
                OutputSink::File => {
                    let _ = writeln!(
                        stderr,
                        "{} Wrote prompt to {}",
                        "✓".bright_green(),
                        target.as_deref().unwrap_or("file").bold()
                    );
                }
                // Skip: the document itself is the output
                OutputSink::Preview | OutputSink::Stdout => {}
            },
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::ScanCompleted {
                total,
                staged,
                binary,
                ..
            } => format!(
                "[{}] scan:done {}f staged={} binary={}",
                timestamp, total, staged, binary
            ),
            LogEvent::SelectionMade { selected, offered } => {
                format!("[{}] select:{}/{}", timestamp, selected, offered)
            }
            LogEvent::FileRendered {
                path,
                added,
                removed,
                ..
            } => format!("[{}] render:{} +{} -{}", timestamp, path, added, removed),
            LogEvent::PromptAssembled { files, bytes, .. } => {
                format!("[{}] prompt:done {}f {}b", timestamp, files, bytes)
            }
            LogEvent::OutputDelivered { sink, bytes, .. } => {
                format!("[{}] output:{:?} {}b", timestamp, sink, bytes).to_lowercase()
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = LogEvent::OutputDelivered {
            sink: OutputSink::Clipboard,
            target: None,
            bytes: 42,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "output_delivered");
        assert_eq!(value["sink"], "clipboard");
        assert!(value.get("target").is_none());
    }

    #[test]
    fn test_file_logging_appends_json_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("repodiff.jsonl");

        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();
        logger.log(&LogEvent::SelectionMade {
            selected: 2,
            offered: 5,
        });
        logger.log(&LogEvent::PromptAssembled {
            files: 2,
            bytes: 100,
            renamed: 0,
            deleted: 1,
            skipped: 0,
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "selection_made");
        assert_eq!(lines[1]["deleted"], 1);
        assert!(lines[1]["timestamp"].is_string());
    }
}
