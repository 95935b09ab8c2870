//! # Error Module
//!
//! User-friendly error types for the photo sorter.
//!
//! ## Design Principles
//! - **Never lose a photo** - a failed move leaves the source untouched
//! - **Include context** - paths, folder names, what went wrong
//! - **Fatal vs recoverable** - only `SorterError` ends a session; the
//!   component errors are reported and the session carries on

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Session state error: {0}")]
    State(#[from] StateError),

    #[error("Could not open log file {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while listing photos
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Cannot access {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Errors that occur while hashing a photo
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Could not read {path} for hashing: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Invalid perceptual hash: {value}")]
    InvalidHex { value: String },
}

/// Errors from the on-disk hash index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Could not read hash index {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Hash index {path} is corrupt ({reason}). Starting with an empty index.")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Could not save hash index {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize hash index: {0}")]
    SerializationFailed(String),
}

/// Errors from the persisted session state
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Could not save session state {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not delete session state {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session state: {0}")]
    SerializationFailed(String),
}

/// Errors from event folder and file move operations
#[derive(Error, Debug)]
pub enum FolderError {
    #[error("Folder name cannot be empty")]
    EmptyName,

    #[error("Folder name contains invalid character: {0}")]
    InvalidCharacter(char),

    #[error("Folder name is reserved: {0}")]
    ReservedName(String),

    #[error("Folder already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Destination is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to list folders in {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create folder {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to empty trash {path}: {source}")]
    Purge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the external image viewer
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Image file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to launch viewer for {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported operating system: {0}")]
    UnsupportedPlatform(String),
}

/// Reasons an undo request could not be carried out
#[derive(Error, Debug)]
pub enum UndoError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Cannot undo: file not found at {path}")]
    MissingFile { path: PathBuf },

    #[error("Cannot undo: {0}")]
    Restore(#[from] FolderError),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SorterError>;
