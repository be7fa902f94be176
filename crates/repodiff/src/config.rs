//! Configuration file support for repodiff.
//!
//! Settings come from the global `<config_dir>/repodiff/config.toml` and the
//! project `repodiff.toml` at the repository root. Project values win over
//! global ones; command-line flags win over both.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::readme::DEFAULT_README_NAMES;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "repodiff.toml";

/// Directory under the platform config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "repodiff";

pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Contents of one config file; every key is optional
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Include the repository README
    pub readme: Option<bool>,
    /// README file names to look for, in order
    pub readme_names: Option<Vec<String>>,
    /// Offer untracked files
    pub untracked: Option<bool>,
    /// Tag fenced blocks with a language
    pub language_hints: Option<bool>,
    /// Default answer to the preview prompt
    pub preview: Option<bool>,
    /// Default answer to the clipboard prompt
    pub copy: Option<bool>,
}

impl FileConfig {
    /// Load `repodiff.toml` from the repository root.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load_project(root: &Path) -> Result<Option<Self>> {
        Self::load_from(&root.join(CONFIG_FILE_NAME))
    }

    /// Load the global config, if the platform has a config directory
    pub fn load_global() -> Result<Option<Self>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_from(&dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE)),
            None => Ok(None),
        }
    }

    fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }
}

/// Effective settings after merging config files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub readme: bool,
    pub readme_names: Vec<String>,
    pub untracked: bool,
    pub language_hints: bool,
    pub preview: bool,
    pub copy: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            readme: true,
            readme_names: DEFAULT_README_NAMES.iter().map(|s| s.to_string()).collect(),
            untracked: true,
            language_hints: true,
            preview: false,
            copy: true,
        }
    }
}

impl Settings {
    /// Merge config files. Priority: project > global > built-in default
    pub fn resolve(project: Option<&FileConfig>, global: Option<&FileConfig>) -> Self {
        let defaults = Self::default();

        let pick = |get: fn(&FileConfig) -> Option<bool>, fallback: bool| {
            project
                .and_then(get)
                .or_else(|| global.and_then(get))
                .unwrap_or(fallback)
        };

        let readme_names = project
            .and_then(|c| c.readme_names.clone())
            .or_else(|| global.and_then(|c| c.readme_names.clone()))
            .unwrap_or(defaults.readme_names);

        Self {
            readme: pick(|c| c.readme, defaults.readme),
            readme_names,
            untracked: pick(|c| c.untracked, defaults.untracked),
            language_hints: pick(|c| c.language_hints, defaults.language_hints),
            preview: pick(|c| c.preview, defaults.preview),
            copy: pick(|c| c.copy, defaults.copy),
        }
    }

    /// Load both config files and merge them
    pub fn load(root: &Path) -> Result<Self> {
        let global = FileConfig::load_global().context("Failed to load global configuration")?;
        let project =
            FileConfig::load_project(root).context("Failed to load project configuration")?;
        Ok(Self::resolve(project.as_ref(), global.as_ref()))
    }
}
