//! # Scanner Module
//!
//! Lists the photos under the directory being sorted.
//!
//! The result is a snapshot: a sorted list of absolute paths taken once at
//! session start. Hidden files and directories (including the sorter's own
//! `.photosorter` and `.trash`) are never listed.
//!
//! ## Example
//! ```rust,ignore
//! use photo_sorter::core::scanner::{PhotoScanner, WalkDirScanner};
//!
//! let photos = WalkDirScanner::default().scan("/Users/me/Pictures/2021".as_ref())?.photos;
//! ```

mod filter;
mod walker;

pub(crate) use filter::is_hidden;
pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::{Path, PathBuf};

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered photos, sorted
    pub photos: Vec<PathBuf>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for photo scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait PhotoScanner {
    /// Scan `root` and return the photos found.
    ///
    /// Fails only when `root` is missing or not a directory.
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    /// Scan with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError>;
}
