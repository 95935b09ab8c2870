//! Where a session keeps its files.

use std::path::{Path, PathBuf};

/// Hidden directory under the photo root holding all bookkeeping files
pub const DATA_DIR: &str = ".photosorter";

/// Hidden directory under the photo root used as the trash holding area
pub const TRASH_DIR: &str = ".trash";

/// Paths derived from the photo root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub state_file: PathBuf,
    pub index_file: PathBuf,
    pub log_file: PathBuf,
    pub trash_dir: PathBuf,
}

impl SessionPaths {
    pub fn new(root: &Path) -> Self {
        let data_dir = root.join(DATA_DIR);
        Self {
            root: root.to_path_buf(),
            state_file: data_dir.join("state.json"),
            index_file: data_dir.join("cache").join("image_hashes.json"),
            log_file: data_dir.join("sorter.log"),
            trash_dir: root.join(TRASH_DIR),
            data_dir,
        }
    }
}
