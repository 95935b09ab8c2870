//! Event type definitions for session reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the photo sorter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory scanning events
    Scan(ScanEvent),
    /// Sorting session events
    Session(SessionEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// An entry could not be read but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_photos: usize },
}

/// How a photo came to be treated as a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
    /// Byte-identical to an already sorted photo
    Exact,
    /// Visually similar to an already sorted photo
    Similar { distance: u32 },
    /// Flagged by the user
    Manual,
}

impl std::fmt::Display for DuplicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateKind::Exact => write!(f, "exact"),
            DuplicateKind::Similar { distance } => write!(f, "similar, distance {}", distance),
            DuplicateKind::Manual => write!(f, "manual"),
        }
    }
}

/// Events during a sorting session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A previous session is being continued
    Resumed {
        cursor: usize,
        sorted: usize,
        skipped: usize,
        deleted: usize,
    },
    /// A photo listed by the scan no longer exists
    PhotoVanished { path: PathBuf },
    /// A duplicate was found but left for the user to decide
    DuplicateDetected {
        path: PathBuf,
        original: PathBuf,
        kind: DuplicateKind,
    },
    /// A photo was moved into the Duplicates folder
    DuplicateMoved {
        path: PathBuf,
        destination: PathBuf,
        original: Option<PathBuf>,
        kind: DuplicateKind,
    },
    /// A new event folder was created
    FolderCreated { name: String },
    /// A photo was filed into an event folder
    Moved {
        path: PathBuf,
        folder: String,
        destination: PathBuf,
    },
    /// A photo was skipped
    Skipped { path: PathBuf },
    /// A photo was moved into the trash holding area
    Deleted { path: PathBuf },
    /// The user declined to delete
    DeletionCancelled,
    /// The most recent action was reversed
    Undone { restored: PathBuf },
    /// The most recent action could not be reversed
    UndoFailed { message: String },
    /// Something failed but the session continues
    Warning { message: String },
    /// The key pressed does not map to an action
    InvalidChoice,
    /// The trash holding area was emptied for good
    TrashPurged { count: usize },
    /// The session ended
    Finished { summary: SessionSummary },
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Every photo was processed
    Completed,
    /// The user quit
    Quit,
    /// Ctrl+C
    Interrupted,
}

/// Summary of a sorting session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub outcome: SessionOutcome,
    /// Photos filed into event folders
    pub sorted: usize,
    pub skipped: usize,
    pub deleted: usize,
    /// Photos moved into the Duplicates folder
    pub duplicates: usize,
    /// Photos found by the scan
    pub total: usize,
    /// Index of the next unprocessed photo
    pub cursor: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionOutcome::Completed => write!(f, "completed"),
            SessionOutcome::Quit => write!(f, "quit"),
            SessionOutcome::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Session(SessionEvent::DuplicateMoved {
            path: PathBuf::from("/photos/b.jpg"),
            destination: PathBuf::from("/photos/Duplicates/b.jpg"),
            original: Some(PathBuf::from("/photos/Vacation/a.jpg")),
            kind: DuplicateKind::Exact,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Session(SessionEvent::DuplicateMoved { kind, .. }) => {
                assert_eq!(kind, DuplicateKind::Exact);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn duplicate_kind_display() {
        assert_eq!(DuplicateKind::Exact.to_string(), "exact");
        assert_eq!(
            DuplicateKind::Similar { distance: 3 }.to_string(),
            "similar, distance 3"
        );
    }
}
