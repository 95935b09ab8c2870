//! # Photo Sorter
//!
//! Sort a folder of photos into event folders, one keypress per photo.
//!
//! ## Core Philosophy
//! - **Never lose a photo** - deletes go to a holding area first, and the
//!   last move or delete can be undone
//! - **Pick up where you left off** - progress is saved after every photo
//! - **Don't sort the same photo twice** - exact and near-identical copies
//!   of already sorted photos are set aside automatically
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Scanning, hashing, duplicate detection and the sorting session
//! - `events` - Reports from the engine to the UI
//! - `error` - User-friendly error types
//! - `cli` - Interactive terminal front end (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SorterError};

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing to stderr
///
/// This should be called by the application entry point. Does nothing if
/// a subscriber is already installed.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize tracing to append to `log_file`.
///
/// Used by the interactive CLI so log lines never land on the screen.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_file_logging(log_file: &Path) -> Result<()> {
    let open_error = |source| SorterError::Log {
        path: log_file.to_path_buf(),
        source,
    };

    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).map_err(open_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(open_error)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
