/// Two-phase folder organization.
///
/// [`FileOrganizer::analyze`] builds a [`Preview`] without touching the disk;
/// [`FileOrganizer::organize`] consumes that preview and moves each file into
/// `<source>/<category folder>/`, renaming on name collisions.
///
/// Moves are not transactional: if a move fails, files moved before it stay
/// where they are and the result reports the failure.
use crate::config::{ScanFilter, SortConfig};
use crate::error::{SortError, SortResult};
use crate::events::{EventSink, ProgressEvent, Stage};
use crate::file_category::{Category, CategoryTable};
use crate::scanner::{self, CategorizedFile, Preview};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One successfully moved file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizedFileRecord {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    /// Category name.
    pub category: String,
    pub size_bytes: u64,
}

/// Outcome of the organize phase.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub total_files_organized: usize,
    /// Number of categories that had files, whether or not their folder
    /// already existed.
    pub categories_created: usize,
    /// Files moved, in move order. Kept on failure for the files that made it.
    pub organized_files: Vec<OrganizedFileRecord>,
    pub completed_at: DateTime<Local>,
}

impl OrganizationResult {
    fn failed(message: String, organized_files: Vec<OrganizedFileRecord>) -> Self {
        Self {
            success: false,
            error_message: Some(message),
            total_files_organized: organized_files.len(),
            categories_created: 0,
            organized_files,
            completed_at: Local::now(),
        }
    }

    fn succeeded(organized_files: Vec<OrganizedFileRecord>, categories_created: usize) -> Self {
        Self {
            success: true,
            error_message: None,
            total_files_organized: organized_files.len(),
            categories_created,
            organized_files,
            completed_at: Local::now(),
        }
    }
}

/// Classifies and organizes the files of one folder at a time.
///
/// Owns the active [`CategoryTable`]; replace it with
/// [`set_categories`](Self::set_categories).
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    table: CategoryTable,
    filter: ScanFilter,
    progress_delay: Duration,
}

impl FileOrganizer {
    pub fn new(table: CategoryTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Builds an organizer from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Fails if the category override or an ignore pattern is invalid.
    pub fn from_config(config: &SortConfig) -> SortResult<Self> {
        let table = config.category_table()?.unwrap_or_default();
        Ok(Self {
            table,
            filter: config.scan_filter()?,
            progress_delay: config.progress_delay(),
        })
    }

    /// Pause applied after each progress event.
    pub fn with_progress_delay(mut self, delay: Duration) -> Self {
        self.progress_delay = delay;
        self
    }

    pub fn with_filter(mut self, filter: ScanFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replaces the active category table wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::InvalidConfiguration`] for an empty table or one
    /// that breaks the catch-all-last rule; the current table is kept.
    pub fn set_categories(&mut self, categories: Vec<Category>) -> SortResult<()> {
        self.table = CategoryTable::new(categories)?;
        Ok(())
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.table
    }

    /// Returns the category a file would be sorted into.
    pub fn classify(&self, file_path: &Path) -> &Arc<Category> {
        self.table.classify(file_path)
    }

    /// Scans `folder`, returning the typed error on failure.
    pub fn try_analyze(&self, folder: &Path, sink: &mut dyn EventSink) -> SortResult<Preview> {
        scanner::scan(folder, &self.table, &self.filter, sink, self.progress_delay)
    }

    /// Scans `folder` and builds a preview. Never fails: errors are carried
    /// in [`Preview::error_message`].
    pub fn analyze(&self, folder: &Path, sink: &mut dyn EventSink) -> Preview {
        match self.try_analyze(folder, sink) {
            Ok(preview) => preview,
            Err(e) => {
                log::warn!("Analyze failed: {}", e);
                Preview::failed(folder, e.to_string())
            }
        }
    }

    /// Moves every file listed in `preview` into its category folder.
    ///
    /// A preview with an error short-circuits without touching the disk.
    pub fn organize(&self, preview: &Preview, sink: &mut dyn EventSink) -> OrganizationResult {
        if let Some(message) = &preview.error_message {
            return OrganizationResult::failed(message.clone(), Vec::new());
        }

        let mut organized_files = Vec::with_capacity(preview.total_files);
        match self.move_all(preview, sink, &mut organized_files) {
            Ok(()) => {
                sink.log(format!(
                    "Organized {} files into {} categories",
                    organized_files.len(),
                    preview.category_summaries.len()
                ));
                OrganizationResult::succeeded(organized_files, preview.category_summaries.len())
            }
            Err(e) => {
                log::warn!("Organize stopped after {} files: {}", organized_files.len(), e);
                OrganizationResult::failed(e.to_string(), organized_files)
            }
        }
    }

    fn move_all(
        &self,
        preview: &Preview,
        sink: &mut dyn EventSink,
        organized_files: &mut Vec<OrganizedFileRecord>,
    ) -> SortResult<()> {
        let total = preview.total_files;

        for (category, files) in group_by_category(&preview.categorized_files) {
            let destination = preview.source_folder.join(category.folder_name());
            if !destination.is_dir() {
                fs::create_dir_all(&destination).map_err(|source| SortError::CreateFolder {
                    path: destination.clone(),
                    source,
                })?;
                sink.log(format!("Created folder: {}", category.folder_name()));
            }

            for file in files {
                let target = destination.join(&file.file_name);
                let new_path = if is_occupied(&target) {
                    let renamed = unique_destination(&target);
                    sink.log(format!(
                        "Renamed {} to {}",
                        file.file_name,
                        display_name(&renamed)
                    ));
                    renamed
                } else {
                    target
                };

                fs::rename(&file.original_path, &new_path).map_err(|source| SortError::Move {
                    from: file.original_path.clone(),
                    to: new_path.clone(),
                    source,
                })?;
                sink.log(format!(
                    "Moved {} -> {}/{}",
                    file.file_name,
                    category.folder_name(),
                    display_name(&new_path)
                ));

                organized_files.push(OrganizedFileRecord {
                    original_path: file.original_path.clone(),
                    new_path,
                    category: category.name().to_string(),
                    size_bytes: file.size_bytes,
                });

                sink.progress(ProgressEvent {
                    current_file: file.file_name.clone(),
                    processed_count: organized_files.len(),
                    total_count: total,
                    stage: Stage::Organizing,
                });
                if !self.progress_delay.is_zero() {
                    thread::sleep(self.progress_delay);
                }
            }
        }

        Ok(())
    }
}

/// Groups files by category, keeping first-seen category order and the
/// original file order inside each group.
fn group_by_category(files: &[CategorizedFile]) -> Vec<(&Arc<Category>, Vec<&CategorizedFile>)> {
    let mut groups: Vec<(&Arc<Category>, Vec<&CategorizedFile>)> = Vec::new();
    for file in files {
        match groups
            .iter_mut()
            .find(|(category, _)| category.name() == file.category.name())
        {
            Some((_, members)) => members.push(file),
            None => groups.push((&file.category, vec![file])),
        }
    }
    groups
}

/// Finds a free sibling path by appending ` (n)` to the file stem.
///
/// `n` starts at 1 and increases until nothing, not even a broken symlink,
/// occupies the path. Racy against
/// other writers; the caller is assumed to be the only one.
///
/// ```
/// use foldersort::file_organizer::unique_destination;
/// use std::path::Path;
///
/// // Nothing exists at this path, so the first candidate is returned.
/// let path = unique_destination(Path::new("/nonexistent/dir/report.pdf"));
/// assert_eq!(path, Path::new("/nonexistent/dir/report (1).pdf"));
/// ```
pub fn unique_destination(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = parent.join(format!("{} ({}){}", stem, counter, extension));
        if !is_occupied(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// True if anything sits at `path`, including a dangling symlink.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullSink, OrganizerEvent};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("Failed to write test file");
    }

    #[test]
    fn test_unique_destination_increments() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        write(dir, "photo.jpg", "0");

        let first = unique_destination(&dir.join("photo.jpg"));
        assert_eq!(first, dir.join("photo (1).jpg"));

        write(dir, "photo (1).jpg", "1");
        write(dir, "photo (2).jpg", "2");
        let next = unique_destination(&dir.join("photo.jpg"));
        assert_eq!(next, dir.join("photo (3).jpg"));
        assert!(!next.exists());
    }

    #[test]
    fn test_unique_destination_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        write(dir, "README", "");
        assert_eq!(unique_destination(&dir.join("README")), dir.join("README (1)"));
    }

    #[test]
    fn test_unique_destination_keeps_inner_dots() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        write(dir, "backup.tar.gz", "");
        assert_eq!(
            unique_destination(&dir.join("backup.tar.gz")),
            dir.join("backup.tar (1).gz")
        );
    }

    #[test]
    fn test_set_categories_rejects_empty_and_keeps_table() {
        let mut organizer = FileOrganizer::default();
        let result = organizer.set_categories(Vec::new());
        assert!(matches!(result, Err(SortError::InvalidConfiguration(_))));
        assert_eq!(organizer.categories().len(), 8);
    }

    #[test]
    fn test_set_categories_replaces_wholesale() {
        let mut organizer = FileOrganizer::default();
        organizer
            .set_categories(vec![
                Category::new("Pictures", "pics", "🖼", ["png"]),
                Category::new("Misc", "misc", "?", Vec::<String>::new()),
            ])
            .expect("valid table");

        assert_eq!(organizer.classify(Path::new("a.png")).name(), "Pictures");
        assert_eq!(organizer.classify(Path::new("a.pdf")).name(), "Misc");
        assert!(organizer.categories().get("Documents").is_none());
    }

    #[test]
    fn test_organize_error_preview_short_circuits() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let preview = Preview::failed(temp_dir.path(), "Folder not found: x".to_string());

        let result = FileOrganizer::default().organize(&preview, &mut NullSink);
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("Folder not found: x"));
        assert_eq!(result.total_files_organized, 0);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_organize_reports_cumulative_progress() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        write(dir, "a.pdf", "a");
        write(dir, "b.png", "b");
        write(dir, "c.pdf", "c");

        let organizer = FileOrganizer::default();
        let preview = organizer.analyze(dir, &mut NullSink);

        let mut events = Vec::new();
        let mut sink = |e: OrganizerEvent| events.push(e);
        let result = organizer.organize(&preview, &mut sink);
        assert!(result.success);

        let progress: Vec<(usize, usize, Stage)> = events
            .iter()
            .filter_map(|e| match e {
                OrganizerEvent::Progress(p) => Some((p.processed_count, p.total_count, p.stage)),
                OrganizerEvent::Log(_) => None,
            })
            .collect();
        assert_eq!(
            progress,
            vec![
                (1, 3, Stage::Organizing),
                (2, 3, Stage::Organizing),
                (3, 3, Stage::Organizing)
            ]
        );
        assert!(events.contains(&OrganizerEvent::Log("Created folder: Documents".to_string())));
    }

    #[test]
    fn test_organize_groups_by_first_seen_category() {
        let table = CategoryTable::default();
        let file = |name: &str| CategorizedFile {
            original_path: PathBuf::from(name),
            file_name: name.to_string(),
            category: Arc::clone(table.classify(Path::new(name))),
            size_bytes: 0,
            last_modified: None,
        };
        let files = vec![file("a.png"), file("b.pdf"), file("c.png"), file("d.pdf")];

        let groups: Vec<(String, Vec<String>)> = group_by_category(&files)
            .into_iter()
            .map(|(category, members)| {
                (
                    category.name().to_string(),
                    members.iter().map(|f| f.file_name.clone()).collect(),
                )
            })
            .collect();

        assert_eq!(
            groups,
            vec![
                ("Images".to_string(), vec!["a.png".to_string(), "c.png".to_string()]),
                ("Documents".to_string(), vec!["b.pdf".to_string(), "d.pdf".to_string()]),
            ]
        );
    }

    #[test]
    fn test_organize_stops_at_first_failure_without_rollback() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        write(dir, "first.pdf", "1");
        write(dir, "second.pdf", "2");

        let organizer = FileOrganizer::default();
        let preview = organizer.analyze(dir, &mut NullSink);
        assert_eq!(preview.total_files, 2);

        // Remove the file listed second so its move fails.
        let doomed = &preview.categorized_files[1];
        fs::remove_file(&doomed.original_path).unwrap();

        let result = organizer.organize(&preview, &mut NullSink);
        assert!(!result.success);
        assert!(result.error_message.is_some());
        assert_eq!(result.total_files_organized, 1);

        let survivor = &preview.categorized_files[0];
        assert!(dir.join("Documents").join(&survivor.file_name).exists());
        assert!(!survivor.original_path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unique_destination_treats_broken_symlink_as_taken() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        std::os::unix::fs::symlink("/nonexistent/target", dir.join("notes.txt"))
            .expect("Failed to create symlink");
        std::os::unix::fs::symlink("/nonexistent/other", dir.join("notes (1).txt"))
            .expect("Failed to create symlink");

        assert_eq!(
            unique_destination(&dir.join("notes.txt")),
            dir.join("notes (2).txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_organize_does_not_replace_broken_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        fs::create_dir(dir.join("Documents")).unwrap();
        let link = dir.join("Documents").join("notes.txt");
        std::os::unix::fs::symlink("/nonexistent/target", &link).expect("Failed to create symlink");
        write(dir, "notes.txt", "fresh");

        let organizer = FileOrganizer::default();
        let preview = organizer.analyze(dir, &mut NullSink);
        let result = organizer.organize(&preview, &mut NullSink);

        assert!(result.success);
        let moved = dir.join("Documents").join("notes (1).txt");
        assert_eq!(result.organized_files[0].new_path, moved);
        assert_eq!(fs::read_to_string(&moved).unwrap(), "fresh");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_organize_blocked_category_folder_fails_without_moving() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path();
        write(dir, "report.pdf", "r");

        let organizer = FileOrganizer::default();
        let preview = organizer.analyze(dir, &mut NullSink);
        assert_eq!(preview.total_files, 1);

        // A plain file now sits where the category folder should go.
        write(dir, "Documents", "not a folder");

        let result = organizer.organize(&preview, &mut NullSink);
        assert!(!result.success);
        assert_eq!(result.total_files_organized, 0);
        assert!(result.organized_files.is_empty());
        let message = result.error_message.expect("failure carries a message");
        assert!(message.starts_with("Failed to create directory"));
        assert!(message.contains(&dir.join("Documents").display().to_string()));
        assert!(dir.join("report.pdf").is_file());
        assert!(dir.join("Documents").is_file());
    }
}
