//! # Trash Module
//!
//! Deleted photos are not removed straight away. They are moved into a
//! hidden holding area under the photo root, where an undo can still find
//! them, and the area is emptied for good when the session ends.

use crate::core::folders::move_photo;
use crate::error::FolderError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The trash holding area of one photo root
#[derive(Debug, Clone)]
pub struct TrashArea {
    dir: PathBuf,
}

impl TrashArea {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Number of entries currently held. A missing area holds nothing.
    pub fn count(&self) -> usize {
        fs::read_dir(&self.dir)
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Move `photo` into the holding area. Returns where it ended up.
    pub fn move_in(&self, photo: &Path) -> Result<PathBuf, FolderError> {
        fs::create_dir_all(&self.dir).map_err(|source| FolderError::Create {
            path: self.dir.clone(),
            source,
        })?;

        let held = move_photo(photo, &self.dir)?;
        debug!("Moved to trash: {}", photo.display());
        Ok(held)
    }

    /// Permanently delete everything held. Returns how many entries went.
    pub fn purge(&self) -> Result<usize, FolderError> {
        let count = self.count();
        if count == 0 {
            return Ok(0);
        }

        fs::remove_dir_all(&self.dir).map_err(|source| FolderError::Purge {
            path: self.dir.clone(),
            source,
        })?;

        info!("Emptied trash: {} file(s) permanently deleted", count);
        Ok(count)
    }
}
