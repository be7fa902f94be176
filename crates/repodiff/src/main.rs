mod config;
mod output;
mod readme;
mod select;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use repodiff_core::{assemble, CoreError, PromptDocument, RenderOptions};
use repodiff_git::{repo_root, ChangeScanner};
use repodiff_logging::{init_tracing, LogEvent, LogFormat, Logger, OutputSink};

use crate::config::Settings;
use crate::select::SelectionMode;

#[derive(Parser, Debug)]
#[command(
    name = "repodiff",
    about = "Turn Git working-tree changes into a single review prompt",
    version,
    author
)]
struct Cli {
    /// Working directory (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Include every changed file without prompting
    #[arg(long, conflicts_with = "staged")]
    all: bool,

    /// Include the staged text files without prompting
    #[arg(long)]
    staged: bool,

    /// Leave the README out of the prompt
    #[arg(long)]
    no_readme: bool,

    /// Ignore untracked files
    #[arg(long)]
    no_untracked: bool,

    /// Do not tag code fences with a language
    #[arg(long)]
    no_lang_hints: bool,

    /// Write the prompt to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the prompt to stdout
    #[arg(long)]
    print: bool,

    /// Write the assembled document as JSON to stdout
    #[arg(long, conflicts_with = "print")]
    json: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Log level for diagnostics (RUST_LOG overrides)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append run events as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn selection_mode(&self) -> SelectionMode {
        if self.all {
            SelectionMode::All
        } else if self.staged {
            SelectionMode::Staged
        } else {
            SelectionMode::Interactive
        }
    }

    /// Any explicit sink replaces the preview and clipboard prompts
    fn has_explicit_sink(&self) -> bool {
        self.output.is_some() || self.print || self.json
    }

    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if self.no_readme {
            settings.readme = false;
        }
        if self.no_untracked {
            settings.untracked = false;
        }
        if self.no_lang_hints {
            settings.language_hints = false;
        }
        settings
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    ctrlc::set_handler(|| {
        eprintln!("\n{}", "Operation cancelled by user.".bright_yellow().bold());
        std::process::exit(130);
    })
    .context("Failed to set Ctrl+C handler")?;

    let logger = match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    match run(&cli, &logger) {
        Err(e) if is_interrupted(&e) => {
            eprintln!("\n{}", "Operation cancelled by user.".bright_yellow().bold());
            std::process::exit(130);
        }
        result => result,
    }
}

fn run(cli: &Cli, logger: &Logger) -> Result<()> {
    eprintln!(
        "{} - Generate code review prompts from Git changes",
        "repodiff".bold().bright_green()
    );

    let working_dir = match &cli.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let root = repo_root(&working_dir)?;
    let settings = cli.apply_overrides(Settings::load(&root)?);

    let changes = ChangeScanner::new()
        .with_untracked(settings.untracked)
        .scan(&root)
        .context("Failed to read repository status")?;

    let summary = changes.summary();
    logger.log(&LogEvent::ScanCompleted {
        root: changes.root.clone(),
        total: summary.total_changes(),
        staged: summary.staged,
        binary: summary.binary,
    });

    if summary.is_clean() {
        eprintln!("{}", "No changed files found!".bright_yellow().bold());
        return Ok(());
    }

    let mode = cli.selection_mode();
    if mode == SelectionMode::Interactive {
        select::print_change_table(&changes.records);
    }
    let Some(selected) = select::select_changes(&changes.records, mode)? else {
        eprintln!("{}", "No files selected. Exiting.".bright_yellow().bold());
        return Ok(());
    };
    logger.log(&LogEvent::SelectionMade {
        selected: selected.len(),
        offered: changes.records.len(),
    });

    let readme = if settings.readme {
        readme::find_readme(&root, &settings.readme_names)
    } else {
        None
    };

    let document = match assemble(&selected, readme.as_deref()) {
        Ok(document) => document,
        Err(CoreError::MissingSelection) => {
            eprintln!("{}", "No files selected. Exiting.".bright_yellow().bold());
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to assemble prompt"),
    };
    if selected.is_empty() {
        eprintln!(
            "{} No files selected; the prompt contains only the README.",
            "⚠".bright_yellow()
        );
    }

    for file in &document.rendered_files {
        let stats = file.stats();
        logger.log(&LogEvent::FileRendered {
            path: file.path.clone(),
            added: stats.added,
            removed: stats.removed,
            kept: stats.kept,
        });
    }

    let text = document.render(&RenderOptions {
        language_hints: settings.language_hints,
    });
    logger.log(&LogEvent::PromptAssembled {
        files: document.file_count(),
        bytes: text.len(),
        renamed: document.renamed.len(),
        deleted: document.deleted.len(),
        skipped: document.skipped_binary.len(),
    });

    deliver(cli, &settings, &document, &text, logger)?;

    eprintln!("{}", "Done!".bright_green().bold());
    Ok(())
}

fn deliver(
    cli: &Cli,
    settings: &Settings,
    document: &PromptDocument,
    text: &str,
    logger: &Logger,
) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(document)?;
        println!("{}", json);
        logger.log(&LogEvent::OutputDelivered {
            sink: OutputSink::Stdout,
            target: None,
            bytes: json.len(),
        });
    }

    if cli.print {
        print!("{}", text);
        logger.log(&LogEvent::OutputDelivered {
            sink: OutputSink::Stdout,
            target: None,
            bytes: text.len(),
        });
    }

    if let Some(path) = &cli.output {
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        logger.log(&LogEvent::OutputDelivered {
            sink: OutputSink::File,
            target: Some(path.display().to_string()),
            bytes: text.len(),
        });
    }

    if cli.has_explicit_sink() {
        return Ok(());
    }

    if select::confirm("Would you like to preview the prompt?", settings.preview)? {
        output::preview(text)?;
        logger.log(&LogEvent::OutputDelivered {
            sink: OutputSink::Preview,
            target: None,
            bytes: text.len(),
        });
    }

    if select::confirm("Copy to clipboard?", settings.copy)? {
        let tool = output::copy_to_clipboard(text)?;
        logger.log(&LogEvent::OutputDelivered {
            sink: OutputSink::Clipboard,
            target: Some(tool.to_string()),
            bytes: text.len(),
        });
    }

    Ok(())
}

/// Prompts report Ctrl+C as an interrupted read
fn is_interrupted(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::Interrupted)
    })
}
