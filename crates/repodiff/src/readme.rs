use std::path::Path;

use tracing::{debug, warn};

pub const DEFAULT_README_NAMES: &[&str] = &["README.md", "Readme.md", "readme.md"];

/// Raw text of the first readable README at the repository root.
///
/// Empty or whitespace-only files count as missing.
pub fn find_readme(root: &Path, names: &[String]) -> Option<String> {
    for name in names {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => {
                debug!(path = %path.display(), "Ignoring empty README");
            }
            Ok(content) => {
                debug!(path = %path.display(), bytes = content.len(), "Found README");
                return Some(content);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read README");
            }
        }
    }
    None
}
