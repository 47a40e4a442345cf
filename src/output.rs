//! Output formatting and styling module.
//!
//! Everything the terminal sees goes through here: colored status lines, the
//! progress bar fed by organizer events, and the preview/result tables.

use crate::events::{EventSink, OrganizerEvent, Stage};
use crate::file_organizer::OrganizationResult;
use crate::scanner::Preview;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for file operations.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{prefix:>11.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the category breakdown of a preview.
    ///
    /// ```no_run
    /// use foldersort::file_organizer::FileOrganizer;
    /// use foldersort::events::NullSink;
    /// use foldersort::output::OutputFormatter;
    /// use std::path::Path;
    ///
    /// let preview = FileOrganizer::default().analyze(Path::new("/tmp/downloads"), &mut NullSink);
    /// OutputFormatter::preview_table(&preview);
    /// ```
    pub fn preview_table(preview: &Preview) {
        Self::header("PREVIEW");
        println!("Folder: {}", preview.source_folder.display());

        let name_width = preview
            .category_summaries
            .iter()
            .map(|s| s.category_name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "   {:<width$} | {:>6} | {}",
            "Category".bold(),
            "Files".bold(),
            "Size".bold(),
            width = name_width
        );
        println!("{}", "-".repeat(name_width + 26));

        for summary in &preview.category_summaries {
            println!(
                "{} {:<width$} | {:>6} | {}",
                summary.icon,
                summary.category_name,
                summary.file_count.to_string().green(),
                format_size(summary.total_size_bytes),
                width = name_width
            );
        }

        println!("{}", "-".repeat(name_width + 26));
        println!(
            "   {:<width$} | {:>6} | {}",
            "Total".bold(),
            preview.total_files.to_string().green().bold(),
            format_size(preview.total_size_bytes),
            width = name_width
        );
    }

    /// Prints the outcome of an organize run.
    pub fn result_summary(result: &OrganizationResult) {
        Self::header("SUMMARY");

        if result.success {
            Self::success(&format!(
                "Organized {} {} into {} {}",
                result.total_files_organized,
                plural(result.total_files_organized, "file", "files"),
                result.categories_created,
                plural(result.categories_created, "category", "categories"),
            ));
        } else {
            Self::error(result.error_message.as_deref().unwrap_or("Organization failed"));
            if result.total_files_organized > 0 {
                Self::warning(&format!(
                    "{} {} had already been moved and were left in place",
                    result.total_files_organized,
                    plural(result.total_files_organized, "file", "files"),
                ));
            }
        }

        println!(
            "Completed at {}",
            result.completed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// Formats a byte count with binary units.
///
/// ```
/// use foldersort::output::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Event sink that drives a terminal progress bar.
///
/// Log messages are printed above the bar. In quiet mode nothing is drawn.
pub struct ProgressReporter {
    bar: ProgressBar,
    stage: Option<Stage>,
    quiet: bool,
}

impl ProgressReporter {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            OutputFormatter::create_progress_bar(0)
        };
        Self {
            bar,
            stage: None,
            quiet,
        }
    }

    /// Clears the bar so the next phase starts on a clean line.
    pub fn finish(&mut self) {
        self.bar.finish_and_clear();
        self.stage = None;
    }
}

impl EventSink for ProgressReporter {
    fn emit(&mut self, event: OrganizerEvent) {
        match event {
            OrganizerEvent::Progress(progress) => {
                if self.stage != Some(progress.stage) {
                    if self.stage.is_some() {
                        self.bar.finish_and_clear();
                    }
                    if !self.quiet {
                        self.bar = OutputFormatter::create_progress_bar(0);
                    }
                    self.bar.set_prefix(progress.stage.as_str());
                    self.stage = Some(progress.stage);
                }
                self.bar.set_length(progress.total_count as u64);
                self.bar.set_position(progress.processed_count as u64);
                self.bar.set_message(progress.current_file);
            }
            OrganizerEvent::Log(message) => {
                if !self.quiet {
                    self.bar.println(format!("  {}", message.dimmed()));
                }
            }
        }
    }
}
