//! Run configuration loaded from TOML.
//!
//! All keys are optional; a missing file yields the defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! progress_delay_ms = 0
//! ignore = ["*.tmp", "~$*"]
//!
//! [[categories]]
//! name = "Books"
//! folder = "Books"
//! icon = "📚"
//! extensions = ["epub", "mobi"]
//!
//! [[categories]]
//! name = "Other"
//! folder = "Other"
//! icon = "📁"
//! extensions = []
//! ```
//!
//! When `categories` is present it replaces the built-in table wholesale.

use crate::error::{SortError, SortResult};
use crate::file_category::{Category, CategoryTable};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Names skipped by every scan, compared case-insensitively.
const SYSTEM_FILES: [&str; 3] = ["desktop.ini", "thumbs.db", ".ds_store"];

/// Local configuration file looked up in the working directory.
const LOCAL_CONFIG_NAME: &str = ".foldersortrc.toml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub scan: ScanSettings,

    /// Replacement category table, catch-all last.
    #[serde(default)]
    pub categories: Option<Vec<CategoryEntry>>,
}

/// Scanner tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Pause after every progress event, in milliseconds.
    #[serde(default)]
    pub progress_delay_ms: u64,

    /// Extra glob patterns matched against file names to skip.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl SortConfig {
    /// Load configuration, with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided (must exist)
    /// 2. `.foldersortrc.toml` in the current directory
    /// 3. `~/.config/foldersort/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> SortResult<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("foldersort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> SortResult<Self> {
        if !path.exists() {
            return Err(SortError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| SortError::Io(e.to_string()))?;
        log::debug!("Loaded configuration from {}", path.display());

        Self::from_toml(&content)
    }

    /// Parses a configuration document.
    pub fn from_toml(content: &str) -> SortResult<Self> {
        toml::from_str(content).map_err(|e| SortError::ConfigInvalid(e.to_string()))
    }

    /// Builds the category table, if the document overrides it.
    pub fn category_table(&self) -> SortResult<Option<CategoryTable>> {
        self.categories
            .as_ref()
            .map(|entries| {
                let categories = entries
                    .iter()
                    .map(|entry| {
                        let folder = entry.folder.as_deref().unwrap_or(&entry.name);
                        Category::new(&entry.name, folder, &entry.icon, &entry.extensions)
                    })
                    .collect();
                CategoryTable::new(categories)
            })
            .transpose()
    }

    pub fn progress_delay(&self) -> Duration {
        Duration::from_millis(self.scan.progress_delay_ms)
    }

    /// Compiles the ignore patterns into a [`ScanFilter`].
    pub fn scan_filter(&self) -> SortResult<ScanFilter> {
        ScanFilter::new(self.scan.ignore.as_slice())
    }
}

/// Decides which directory entries the scanner skips.
///
/// System files (`desktop.ini`, `thumbs.db`, `.ds_store`) and every name
/// starting with `.` are always skipped; extra glob patterns come from the
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    ignore_patterns: Vec<Pattern>,
}

impl ScanFilter {
    /// # Errors
    ///
    /// Returns [`SortError::InvalidPattern`] if a pattern does not compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> SortResult<Self> {
        let ignore_patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Pattern::new(pattern).map_err(|e| SortError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ignore_patterns })
    }

    /// True if a file with this name should be scanned.
    pub fn should_include(&self, file_name: &str) -> bool {
        if is_system_file(file_name) {
            return false;
        }

        !self
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
    }
}

/// Hidden files and well-known OS metadata files.
pub fn is_system_file(file_name: &str) -> bool {
    if file_name.starts_with('.') {
        return true;
    }
    let lower = file_name.to_lowercase();
    SYSTEM_FILES.contains(&lower.as_str())
}
