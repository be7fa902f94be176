//! Output sinks for the finished document: pager preview and clipboard.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// A clipboard command that reads the text on stdin
struct ClipboardTool {
    program: &'static str,
    args: &'static [&'static str],
}

const PBCOPY: ClipboardTool = ClipboardTool {
    program: "pbcopy",
    args: &[],
};
const CLIP: ClipboardTool = ClipboardTool {
    program: "clip",
    args: &[],
};
const WL_COPY: ClipboardTool = ClipboardTool {
    program: "wl-copy",
    args: &[],
};
const XCLIP: ClipboardTool = ClipboardTool {
    program: "xclip",
    args: &["-selection", "clipboard"],
};
const XSEL: ClipboardTool = ClipboardTool {
    program: "xsel",
    args: &["--clipboard", "--input"],
};

fn clipboard_tools() -> Vec<&'static ClipboardTool> {
    if cfg!(target_os = "macos") {
        vec![&PBCOPY]
    } else if cfg!(windows) {
        vec![&CLIP]
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        vec![&WL_COPY, &XCLIP, &XSEL]
    } else {
        vec![&XCLIP, &XSEL, &WL_COPY]
    }
}

/// Copy `text` with the first clipboard tool that works. Returns its name.
pub fn copy_to_clipboard(text: &str) -> Result<&'static str> {
    let tools = clipboard_tools();

    for tool in &tools {
        match pipe_to(tool.program, tool.args, text) {
            Ok(true) => {
                debug!(tool = tool.program, bytes = text.len(), "Copied to clipboard");
                return Ok(tool.program);
            }
            Ok(false) => warn!(tool = tool.program, "Clipboard tool exited with an error"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(tool = tool.program, "Clipboard tool not installed")
            }
            Err(e) => warn!(tool = tool.program, error = %e, "Failed to run clipboard tool"),
        }
    }

    let tried: Vec<&str> = tools.iter().map(|t| t.program).collect();
    anyhow::bail!(
        "No working clipboard tool found (tried: {}). Use --output or --print instead.",
        tried.join(", ")
    )
}

/// Show `text` in `$PAGER` (default `less -R`), or print it if no pager runs
pub fn preview(text: &str) -> Result<()> {
    let pager = std::env::var("PAGER").unwrap_or_else(|_| "less -R".to_string());
    let mut parts = pager.split_whitespace();

    if let Some(program) = parts.next() {
        let args: Vec<&str> = parts.collect();
        match pipe_to(program, &args, text) {
            Ok(_) => return Ok(()),
            Err(e) => debug!(pager = %pager, error = %e, "Pager unavailable, printing instead"),
        }
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to print preview")
}

/// Run `program`, feed `text` on its stdin and wait. `Ok(false)` on a non-zero exit.
fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        // A pager quit early closes its end of the pipe
        match stdin.write_all(text.as_bytes()) {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
            _ => {}
        }
    }

    Ok(child.wait()?.success())
}
