//! The persisted session record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What a reversible action did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Filed into an event folder
    Moved,
    /// Moved into the trash holding area
    Deleted,
}

/// One entry of the action log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

impl Action {
    pub fn moved(old_path: &Path, new_path: &Path) -> Self {
        Self {
            kind: ActionKind::Moved,
            old_path: old_path.to_path_buf(),
            new_path: new_path.to_path_buf(),
        }
    }

    pub fn deleted(old_path: &Path, new_path: &Path) -> Self {
        Self {
            kind: ActionKind::Deleted,
            old_path: old_path.to_path_buf(),
            new_path: new_path.to_path_buf(),
        }
    }
}

/// Progress of a sorting session.
///
/// Every field has a default so partially written or older files still
/// load. Counters never go below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Position in the scanned photo list of the next photo to present
    #[serde(rename = "last_index")]
    pub cursor: usize,
    pub sorted_count: usize,
    pub skipped_count: usize,
    pub deleted_count: usize,
    pub duplicate_count: usize,
    pub skipped_files: Vec<PathBuf>,
    pub action_history: Vec<Action>,
    /// Photos moved into Duplicates. Not undoable, kept so a resumed
    /// session can tell where they came from.
    pub duplicate_moves: Vec<Action>,
}

impl SessionState {
    /// Append `action` unless it equals the most recent entry
    pub fn record_action(&mut self, action: Action) {
        if self.action_history.last() != Some(&action) {
            self.action_history.push(action);
        }
    }

    pub fn last_action(&self) -> Option<&Action> {
        self.action_history.last()
    }

    pub fn pop_last_action(&mut self) -> Option<Action> {
        self.action_history.pop()
    }

    /// Remember a skipped photo. Paths already recorded are not repeated.
    pub fn record_skip(&mut self, path: &Path) {
        if !self.skipped_files.iter().any(|p| p == path) {
            self.skipped_files.push(path.to_path_buf());
        }
    }

    pub fn record_duplicate(&mut self, old_path: &Path, new_path: &Path) {
        self.duplicate_moves.push(Action::moved(old_path, new_path));
    }

    /// Where each photo this session relocated came from, keyed by the
    /// path it lives at now
    pub fn relocations(&self) -> HashMap<PathBuf, PathBuf> {
        self.action_history
            .iter()
            .chain(&self.duplicate_moves)
            .map(|action| (action.new_path.clone(), action.old_path.clone()))
            .collect()
    }

    /// Photos accounted for by a decision
    pub fn handled(&self) -> usize {
        self.sorted_count + self.skipped_count + self.deleted_count + self.duplicate_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_consecutive_actions_are_recorded_once() {
        let mut state = SessionState::default();
        let action = Action::moved(Path::new("/p/a.jpg"), Path::new("/p/Trip/a.jpg"));

        state.record_action(action.clone());
        state.record_action(action.clone());
        assert_eq!(state.action_history.len(), 1);

        state.record_action(Action::deleted(Path::new("/p/b.jpg"), Path::new("/p/.trash/b.jpg")));
        state.record_action(action);
        assert_eq!(state.action_history.len(), 3);
    }

    #[test]
    fn pop_returns_most_recent_first() {
        let mut state = SessionState::default();
        let first = Action::moved(Path::new("/p/a.jpg"), Path::new("/p/Trip/a.jpg"));
        let second = Action::deleted(Path::new("/p/b.jpg"), Path::new("/p/.trash/b.jpg"));
        state.record_action(first.clone());
        state.record_action(second.clone());

        assert_eq!(state.last_action(), Some(&second));
        assert_eq!(state.pop_last_action(), Some(second));
        assert_eq!(state.pop_last_action(), Some(first));
        assert_eq!(state.pop_last_action(), None);
    }

    #[test]
    fn skipped_files_behave_as_a_set() {
        let mut state = SessionState::default();
        state.record_skip(Path::new("/p/a.jpg"));
        state.record_skip(Path::new("/p/b.jpg"));
        state.record_skip(Path::new("/p/a.jpg"));

        assert_eq!(
            state.skipped_files,
            vec![PathBuf::from("/p/a.jpg"), PathBuf::from("/p/b.jpg")]
        );
    }

    #[test]
    fn relocations_cover_history_and_duplicates() {
        let mut state = SessionState::default();
        state.record_action(Action::moved(Path::new("/p/a.jpg"), Path::new("/p/Trip/a.jpg")));
        state.record_action(Action::deleted(Path::new("/p/b.jpg"), Path::new("/p/.trash/b.jpg")));
        state.record_duplicate(Path::new("/p/c.jpg"), Path::new("/p/Duplicates/c.jpg"));

        let relocations = state.relocations();
        assert_eq!(relocations.len(), 3);
        assert_eq!(
            relocations.get(Path::new("/p/Trip/a.jpg")),
            Some(&PathBuf::from("/p/a.jpg"))
        );
        assert_eq!(
            relocations.get(Path::new("/p/Duplicates/c.jpg")),
            Some(&PathBuf::from("/p/c.jpg"))
        );
    }

    #[test]
    fn serializes_with_stable_keys() {
        let mut state = SessionState {
            cursor: 3,
            sorted_count: 2,
            ..Default::default()
        };
        state.record_action(Action::moved(Path::new("/p/a.jpg"), Path::new("/p/Trip/a.jpg")));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["last_index"], 3);
        assert_eq!(json["sorted_count"], 2);
        assert_eq!(json["action_history"][0]["action"], "moved");
        assert_eq!(json["action_history"][0]["old_path"], "/p/a.jpg");
        assert_eq!(json["action_history"][0]["new_path"], "/p/Trip/a.jpg");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let state: SessionState =
            serde_json::from_str(r#"{"last_index": 7, "deleted_count": 1}"#).unwrap();

        assert_eq!(state.cursor, 7);
        assert_eq!(state.deleted_count, 1);
        assert_eq!(state.sorted_count, 0);
        assert!(state.action_history.is_empty());
        assert!(state.duplicate_moves.is_empty());
    }
}
