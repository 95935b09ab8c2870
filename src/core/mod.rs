//! # Core Module
//!
//! The UI-agnostic sorting engine.
//!
//! ## Modules
//! - `scanner` - Lists the photos under a directory
//! - `hasher` - Computes content and perceptual hashes
//! - `index` - Remembers the hashes of sorted photos
//! - `classifier` - Decides whether a photo is a duplicate
//! - `session` - Persists progress and the undo log
//! - `folders` - Event folders and file moves
//! - `trash` - Holding area for deleted photos
//! - `viewer` - Shows the current photo
//! - `sorter` - Runs the interactive session

pub mod classifier;
pub mod folders;
pub mod hasher;
pub mod index;
pub mod scanner;
pub mod session;
pub mod sorter;
pub mod trash;
pub mod viewer;

// Re-export commonly used types
pub use classifier::{Classification, DuplicateClassifier};
pub use hasher::PerceptualHash;
pub use index::HashIndex;
pub use session::{SessionPaths, SessionState};
pub use sorter::{Choice, PhotoView, SessionUi, SortingEngine};
