//! # Sorter Module
//!
//! The interactive sorting session.
//!
//! ## Session Flow
//! 1. **Scan** - List the photos under the root, sorted
//! 2. **Resume** - Continue from the saved cursor
//! 3. **Classify** - Check each photo against the hash index; duplicates
//!    can be moved aside without asking
//! 4. **Decide** - Ask the [`SessionUi`] what to do with the photo
//! 5. **Apply** - Move, skip, delete or flag it, then save the session
//!
//! A failed move or folder creation leaves everything as it was and the
//! same photo is asked about again. Undo reverses the move or delete made
//! just before, and only that one.
//!
//! ## Example
//! ```rust,ignore
//! let mut engine = SortingEngine::builder("/Users/me/Pictures/2021")
//!     .threshold(5)
//!     .viewer(Box::new(SystemViewer::new()))
//!     .build()?;
//! let summary = engine.run(&mut terminal_ui)?;
//! ```

mod engine;
mod types;

pub use engine::{SortingEngine, SortingEngineBuilder};
pub use types::{Choice, PhotoView, SessionUi, SorterConfig};
