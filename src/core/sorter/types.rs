//! Types shared between the sorting engine and whatever UI drives it.

use crate::core::classifier::{Classification, DEFAULT_THRESHOLD};
use crate::core::scanner::ScanConfig;
use std::path::PathBuf;

/// A decision for the photo on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// File into the n-th listed event folder, 1-based
    Folder(usize),
    /// Create a new event folder and file into it
    NewFolder,
    Skip,
    /// Move into the trash holding area, after confirmation
    Delete,
    /// Move into the Duplicates folder
    Duplicate,
    /// Reverse the most recent move or delete
    Undo,
    /// Save and stop
    Quit,
    /// Ctrl+C: save and stop
    Interrupt,
    /// A key that means nothing
    Invalid,
}

impl Choice {
    /// Map a keypress to a choice. Digits select folders, letters are
    /// case-insensitive.
    pub fn from_key(key: char) -> Self {
        match key.to_ascii_lowercase() {
            '1'..='9' => Choice::Folder(key as usize - '0' as usize),
            'n' => Choice::NewFolder,
            's' => Choice::Skip,
            'd' => Choice::Delete,
            'u' => Choice::Duplicate,
            'z' => Choice::Undo,
            'q' => Choice::Quit,
            '\u{3}' => Choice::Interrupt,
            _ => Choice::Invalid,
        }
    }
}

/// Everything a UI needs to show for one photo
#[derive(Debug, Clone)]
pub struct PhotoView {
    pub path: PathBuf,
    /// 1-based position in the scanned list
    pub position: usize,
    pub total: usize,
    /// Event folders, in the order the digit keys select them
    pub folders: Vec<String>,
    /// Set when the photo duplicates a sorted one and was not auto-handled
    pub duplicate: Classification,
    pub sorted: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub duplicates: usize,
    /// Whether an undo would do something
    pub can_undo: bool,
}

/// The interactive side of a session
pub trait SessionUi {
    /// Show a photo and wait for a decision
    fn present(&mut self, view: &PhotoView) -> Choice;

    /// Ask for a new folder name. `None` cancels.
    fn prompt_folder_name(&mut self) -> Option<String>;

    /// Ask a yes/no question
    fn confirm(&mut self, question: &str) -> bool;
}

/// Settings for a sorting session
#[derive(Debug, Clone)]
pub struct SorterConfig {
    /// Directory being sorted
    pub root: PathBuf,
    /// Maximum perceptual distance for a similar duplicate
    pub threshold: u32,
    /// Move detected duplicates without asking
    pub auto_duplicates: bool,
    pub scan_config: ScanConfig,
}

impl SorterConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            threshold: DEFAULT_THRESHOLD,
            auto_duplicates: true,
            scan_config: ScanConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_choices() {
        assert_eq!(Choice::from_key('1'), Choice::Folder(1));
        assert_eq!(Choice::from_key('9'), Choice::Folder(9));
        assert_eq!(Choice::from_key('N'), Choice::NewFolder);
        assert_eq!(Choice::from_key('s'), Choice::Skip);
        assert_eq!(Choice::from_key('d'), Choice::Delete);
        assert_eq!(Choice::from_key('U'), Choice::Duplicate);
        assert_eq!(Choice::from_key('z'), Choice::Undo);
        assert_eq!(Choice::from_key('q'), Choice::Quit);
        assert_eq!(Choice::from_key('\u{3}'), Choice::Interrupt);
    }

    #[test]
    fn unknown_keys_are_invalid() {
        assert_eq!(Choice::from_key('0'), Choice::Invalid);
        assert_eq!(Choice::from_key('x'), Choice::Invalid);
        assert_eq!(Choice::from_key(' '), Choice::Invalid);
    }
}
