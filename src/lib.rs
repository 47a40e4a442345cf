//! foldersort - sort the files of a folder into category subfolders
//!
//! The library splits the work into two phases. [`FileOrganizer::analyze`]
//! classifies every top-level file by extension and returns a [`Preview`];
//! [`FileOrganizer::organize`] takes that preview and moves the files,
//! renaming on collisions. Progress and log messages are reported through an
//! [`EventSink`].

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod scanner;

pub use config::{ScanFilter, SortConfig};
pub use error::{SortError, SortResult};
pub use events::{ChannelSink, EventSink, NullSink, OrganizerEvent, ProgressEvent, Stage};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{FileOrganizer, OrganizationResult, OrganizedFileRecord};
pub use scanner::{CategorizedFile, CategorySummary, Preview};

pub use cli::{OrganizeCommand, OutputMode, run_cli};
