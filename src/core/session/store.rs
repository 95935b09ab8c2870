//! Loading and saving the session record.

use super::state::SessionState;
use crate::error::StateError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads and writes `state.json`
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_file: &Path) -> Self {
        Self {
            path: state_file.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state.
    ///
    /// A missing file starts a fresh session. So does an unreadable or
    /// malformed one, after a warning. Never fails.
    pub fn load(&self) -> SessionState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SessionState::default(),
            Err(e) => {
                warn!("Could not read session state {}: {}", self.path.display(), e);
                return SessionState::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => {
                debug!("Loaded session state from {}", self.path.display());
                state
            }
            Err(e) => {
                warn!(
                    "Session state {} is corrupted ({}). Starting fresh.",
                    self.path.display(),
                    e
                );
                SessionState::default()
            }
        }
    }

    /// Overwrite the state file with `state`
    pub fn save(&self, state: &SessionState) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StateError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StateError::SerializationFailed(e.to_string()))?;

        fs::write(&self.path, json).map_err(|source| StateError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Forget the saved state. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StateError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StateError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::state::Action;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> SessionStore {
        SessionStore::new(&temp_dir.path().join(".photosorter/state.json"))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(store_in(&temp_dir).load(), SessionState::default());
    }

    #[test]
    fn save_then_load_restores_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let mut state = SessionState {
            cursor: 4,
            sorted_count: 2,
            skipped_count: 1,
            duplicate_count: 1,
            ..Default::default()
        };
        state.record_skip(&temp_dir.path().join("c.jpg"));
        state.record_action(Action::moved(
            &temp_dir.path().join("a.jpg"),
            &temp_dir.path().join("Trip/a.jpg"),
        ));

        store.save(&state).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load(), state);
    }

    #[test]
    fn corrupted_file_loads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), SessionState::default());
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.save(&SessionState::default()).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }
}
