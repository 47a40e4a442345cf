//! Command-line interface module for foldersort.
//!
//! Glues the two phases together for a terminal user: load configuration,
//! analyze the folder, show the preview, ask for confirmation, organize and
//! print the result.

use crate::config::SortConfig;
use crate::file_organizer::FileOrganizer;
use crate::output::{OutputFormatter, ProgressReporter};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Analyze and move files.
    Organize {
        /// Skip the confirmation prompt.
        assume_yes: bool,
    },
    /// Analyze only; nothing is moved.
    Preview,
}

/// How results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

/// Runs the CLI with the configuration found by [`SortConfig::load`].
///
/// # Examples
///
/// ```no_run
/// use foldersort::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// let result = run_cli(OrganizeCommand::Preview, Path::new("/home/user/Downloads"));
/// if let Err(e) = result {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_config(command, dir_path, None, OutputMode::Text)
}

/// Runs the CLI with an optional configuration file and output mode.
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
    mode: OutputMode,
) -> Result<(), String> {
    let config =
        SortConfig::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))?;
    let organizer = FileOrganizer::from_config(&config)
        .map_err(|e| format!("Error applying configuration: {}", e))?;

    let stdin = io::stdin();
    run_with_organizer(&organizer, command, dir_path, mode, &mut stdin.lock())
}

/// Runs one analyze/confirm/organize cycle, reading the confirmation from
/// `input`.
pub fn run_with_organizer<R: BufRead>(
    organizer: &FileOrganizer,
    command: OrganizeCommand,
    dir_path: &Path,
    mode: OutputMode,
    input: &mut R,
) -> Result<(), String> {
    let quiet = mode == OutputMode::Json;
    let mut reporter = ProgressReporter::new(quiet);

    if !quiet {
        OutputFormatter::info(&format!("Analyzing contents of: {}", dir_path.display()));
    }
    let preview = organizer.analyze(dir_path, &mut reporter);
    reporter.finish();

    if let Some(message) = &preview.error_message {
        return Err(message.clone());
    }

    if command == OrganizeCommand::Preview {
        match mode {
            OutputMode::Json => print_json(&preview)?,
            OutputMode::Text => {
                OutputFormatter::preview_table(&preview);
                OutputFormatter::success("Preview complete. No files were modified.");
            }
        }
        return Ok(());
    }

    if preview.is_empty() {
        if quiet {
            print_json(&organizer.organize(&preview, &mut reporter))?;
        } else {
            OutputFormatter::warning("No files found to organize.");
        }
        return Ok(());
    }

    if !quiet {
        OutputFormatter::preview_table(&preview);
    }

    let assume_yes = matches!(command, OrganizeCommand::Organize { assume_yes: true });
    if !assume_yes {
        // Keep stdout clean for the JSON document.
        let mut prompt_out: Box<dyn Write> = if quiet {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        if !confirm("Move these files?", input, &mut prompt_out) {
            let message = "Operation cancelled. No files were modified.";
            if quiet {
                let _ = writeln!(prompt_out, "{}", message);
            } else {
                OutputFormatter::warning(message);
            }
            return Ok(());
        }
    }

    let result = organizer.organize(&preview, &mut reporter);
    reporter.finish();

    match mode {
        OutputMode::Json => print_json(&result)?,
        OutputMode::Text => OutputFormatter::result_summary(&result),
    }

    match result.error_message {
        Some(message) if !result.success => Err(message),
        _ => Ok(()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Error serializing output: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Asks a yes/no question on `out`; anything but `y`/`yes` means no.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) -> bool {
    let _ = write!(out, "{} [y/N] ", prompt);
    let _ = out.flush();
    read_yes(input)
}

fn read_yes<R: BufRead>(input: &mut R) -> bool {
    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Reads a folder path from `input`, stripping surrounding quotes that
/// terminals add on drag-and-drop.
pub fn prompt_folder<R: BufRead>(input: &mut R) -> Option<String> {
    print!("Folder to organize: ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    input.read_line(&mut line).ok()?;
    let path = line.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
