//! # Session Module
//!
//! Resumable progress for a sorting session: the cursor, the counters, the
//! skipped set and the log of reversible actions, saved as
//! `<root>/.photosorter/state.json` after every change.

mod paths;
mod state;
mod store;

pub use paths::{SessionPaths, DATA_DIR, TRASH_DIR};
pub use state::{Action, ActionKind, SessionState};
pub use store::SessionStore;
