/// Analyze phase: list a folder, classify its files and build a [`Preview`].
///
/// Nothing on disk is modified here. The preview is the only thing the
/// organize phase needs.
use crate::config::ScanFilter;
use crate::error::{SortError, SortResult};
use crate::events::{EventSink, ProgressEvent, Stage};
use crate::file_category::{Category, CategoryTable};
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A file seen during the scan, with its category and metadata snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CategorizedFile {
    pub original_path: PathBuf,
    pub file_name: String,
    #[serde(serialize_with = "category_name")]
    pub category: Arc<Category>,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Local>>,
}

/// Per-category aggregate of a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category_name: String,
    pub icon: String,
    pub file_count: usize,
    pub total_size_bytes: u64,
}

/// Result of the analyze phase.
///
/// Either a full listing with summaries, or an error message with nothing
/// else filled in.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub source_folder: PathBuf,
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub categorized_files: Vec<CategorizedFile>,
    /// Sorted by descending file count; ties keep first-seen order.
    pub category_summaries: Vec<CategorySummary>,
    pub error_message: Option<String>,
}

impl Preview {
    /// A preview carrying only an error.
    pub fn failed(source_folder: &Path, message: String) -> Self {
        Self {
            source_folder: source_folder.to_path_buf(),
            total_files: 0,
            total_size_bytes: 0,
            categorized_files: Vec::new(),
            category_summaries: Vec::new(),
            error_message: Some(message),
        }
    }

    fn from_files(source_folder: &Path, categorized_files: Vec<CategorizedFile>) -> Self {
        let total_size_bytes = categorized_files.iter().map(|f| f.size_bytes).sum();
        let category_summaries = summarize(&categorized_files);

        Self {
            source_folder: source_folder.to_path_buf(),
            total_files: categorized_files.len(),
            total_size_bytes,
            categorized_files,
            category_summaries,
            error_message: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.categorized_files.is_empty()
    }
}

fn category_name<S: Serializer>(category: &Arc<Category>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(category.name())
}

/// Groups files by category name in first-seen order, then sorts the groups
/// by descending file count. `sort_by` is stable, so ties stay in order.
fn summarize(files: &[CategorizedFile]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();

    for file in files {
        let name = file.category.name();
        match summaries.iter_mut().find(|s| s.category_name == name) {
            Some(summary) => {
                summary.file_count += 1;
                summary.total_size_bytes += file.size_bytes;
            }
            None => summaries.push(CategorySummary {
                category_name: name.to_string(),
                icon: file.category.icon().to_string(),
                file_count: 1,
                total_size_bytes: file.size_bytes,
            }),
        }
    }

    summaries.sort_by(|a, b| b.file_count.cmp(&a.file_count));
    summaries
}

/// Walks the direct children of `folder` and classifies every eligible file.
///
/// Only regular files are considered. A symlink counts when it resolves to a
/// regular file; the link itself is what gets moved later. Emits one
/// `Analyzing` progress event per file, in listing order.
pub(crate) fn scan(
    folder: &Path,
    table: &CategoryTable,
    filter: &ScanFilter,
    sink: &mut dyn EventSink,
    delay: Duration,
) -> SortResult<Preview> {
    if !folder.is_dir() {
        return Err(SortError::NotFound {
            path: folder.to_path_buf(),
        });
    }

    sink.log(format!("Scanning {}", folder.display()));

    let scan_err = |source: std::io::Error| SortError::Scan {
        path: folder.to_path_buf(),
        source,
    };

    // Collect eligible entries first so progress events know the total.
    let mut eligible = Vec::new();
    for entry in fs::read_dir(folder).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let file_type = entry.file_type().map_err(scan_err)?;
        let is_file = if file_type.is_symlink() {
            // Broken links have no target to sort.
            fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
        } else {
            file_type.is_file()
        };
        if !is_file {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !filter.should_include(&file_name) {
            log::debug!("Skipping {}", file_name);
            continue;
        }
        eligible.push((entry.path(), file_name));
    }

    let total = eligible.len();
    let mut categorized_files = Vec::with_capacity(total);

    for (index, (path, file_name)) in eligible.into_iter().enumerate() {
        let metadata = fs::metadata(&path).map_err(|source| SortError::Scan {
            path: path.clone(),
            source,
        })?;
        let category = Arc::clone(table.classify(&path));
        log::debug!("{} -> {}", file_name, category.name());

        categorized_files.push(CategorizedFile {
            original_path: path,
            file_name: file_name.clone(),
            category,
            size_bytes: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });

        sink.progress(ProgressEvent {
            current_file: file_name,
            processed_count: index + 1,
            total_count: total,
            stage: Stage::Analyzing,
        });
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    let preview = Preview::from_files(folder, categorized_files);
    sink.log(format!(
        "Found {} files in {} categories",
        preview.total_files,
        preview.category_summaries.len()
    ));
    Ok(preview)
}
