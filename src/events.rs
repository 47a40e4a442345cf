//! Progress and log notifications emitted while scanning and organizing.
//!
//! Events are delivered synchronously on the caller's thread through an
//! [`EventSink`]. The presentation layer decides what to do with them.

use std::fmt;
use std::sync::mpsc::Sender;

/// Which phase produced a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyzing,
    Organizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyzing => "Analyzing",
            Stage::Organizing => "Organizing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted once per file handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Name of the file just handled.
    pub current_file: String,
    /// 1-based count of files handled so far in this phase.
    pub processed_count: usize,
    pub total_count: usize,
    pub stage: Stage,
}

impl ProgressEvent {
    /// Percentage of the phase completed, `0.0` when there is nothing to do.
    ///
    /// ```
    /// use foldersort::events::{ProgressEvent, Stage};
    ///
    /// let event = ProgressEvent {
    ///     current_file: "a.txt".to_string(),
    ///     processed_count: 1,
    ///     total_count: 4,
    ///     stage: Stage::Analyzing,
    /// };
    /// assert_eq!(event.progress_percentage(), 25.0);
    /// ```
    pub fn progress_percentage(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.processed_count as f64 / self.total_count as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrganizerEvent {
    Progress(ProgressEvent),
    Log(String),
}

/// Receiver of [`OrganizerEvent`]s.
///
/// Implemented for closures, for [`NullSink`] and for [`ChannelSink`].
pub trait EventSink {
    fn emit(&mut self, event: OrganizerEvent);

    fn progress(&mut self, event: ProgressEvent) {
        self.emit(OrganizerEvent::Progress(event));
    }

    /// Sends a free-text message, mirrored to the `log` facade.
    fn log(&mut self, message: String) {
        log::info!("{}", message);
        self.emit(OrganizerEvent::Log(message));
    }
}

impl<F> EventSink for F
where
    F: FnMut(OrganizerEvent),
{
    fn emit(&mut self, event: OrganizerEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: OrganizerEvent) {}
}

/// Forwards events to an `mpsc` channel.
///
/// A dropped receiver is not an error; events are then discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<OrganizerEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<OrganizerEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: OrganizerEvent) {
        let _ = self.sender.send(event);
    }
}
