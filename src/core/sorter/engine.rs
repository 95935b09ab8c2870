//! Sorting session implementation.

use super::types::{Choice, PhotoView, SessionUi, SorterConfig};
use crate::core::classifier::{Classification, DuplicateClassifier, Inspection};
use crate::core::folders::{
    create_folder, ensure_folder, list_folders, move_file, move_photo, DUPLICATES_FOLDER,
};
use crate::core::index::HashIndex;
use crate::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
use crate::core::session::{Action, ActionKind, SessionPaths, SessionState, SessionStore};
use crate::core::trash::TrashArea;
use crate::core::viewer::{NullViewer, Viewer};
use crate::error::{FolderError, ScanError, SorterError, UndoError};
use crate::events::{
    null_sender, DuplicateKind, Event, EventSender, SessionEvent, SessionOutcome, SessionSummary,
};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What the loop does after a choice has been applied
enum Step {
    /// The cursor moved forward
    Advance,
    /// Present the same photo again
    Retry,
    /// An undo moved the cursor back
    Back,
    /// The session is over
    End(SessionOutcome),
}

/// Builder for a [`SortingEngine`]
pub struct SortingEngineBuilder {
    config: SorterConfig,
    classifier: Option<DuplicateClassifier>,
    viewer: Option<Box<dyn Viewer>>,
    interrupt: Option<Arc<AtomicBool>>,
    events: Option<EventSender>,
}

impl SortingEngineBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: SorterConfig::new(root),
            classifier: None,
            viewer: None,
            interrupt: None,
            events: None,
        }
    }

    /// Set the similar-duplicate threshold
    pub fn threshold(mut self, threshold: u32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Move detected duplicates without asking (default on)
    pub fn auto_duplicates(mut self, enabled: bool) -> Self {
        self.config.auto_duplicates = enabled;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Use a specific classifier instead of one built from the threshold.
    /// The classifier's threshold then replaces any set here.
    pub fn classifier(mut self, classifier: DuplicateClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the photo viewer (default shows nothing)
    pub fn viewer(mut self, viewer: Box<dyn Viewer>) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Flag that ends the session before the next photo once set
    pub fn interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Where to report what happens
    pub fn events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Check the root, then open the hash index and the saved session
    pub fn build(self) -> Result<SortingEngine, SorterError> {
        let root = &self.config.root;
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound { path: root.clone() }.into());
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root.clone() }.into());
        }
        let root = std::path::absolute(root).map_err(|e| ScanError::Unreadable {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        let events = self.events.unwrap_or_else(null_sender);
        let paths = SessionPaths::new(&root);

        let (index, index_warning) = HashIndex::open(&root, &paths.index_file);
        if let Some(error) = index_warning {
            events.send(Event::Session(SessionEvent::Warning {
                message: error.to_string(),
            }));
        }

        let store = SessionStore::new(&paths.state_file);
        let state = store.load();
        let classifier = self
            .classifier
            .unwrap_or_else(|| DuplicateClassifier::new(self.config.threshold));

        Ok(SortingEngine {
            config: SorterConfig {
                root,
                threshold: classifier.threshold(),
                ..self.config
            },
            trash: TrashArea::new(&paths.trash_dir),
            paths,
            classifier,
            index,
            store,
            state,
            photos: Vec::new(),
            viewer: self.viewer.unwrap_or_else(|| Box::new(NullViewer)),
            interrupt: self.interrupt.unwrap_or_default(),
            events,
            undo_spent: false,
        })
    }
}

/// Drives one interactive sorting session over a photo root
pub struct SortingEngine {
    config: SorterConfig,
    paths: SessionPaths,
    classifier: DuplicateClassifier,
    index: HashIndex,
    store: SessionStore,
    state: SessionState,
    trash: TrashArea,
    photos: Vec<PathBuf>,
    viewer: Box<dyn Viewer>,
    interrupt: Arc<AtomicBool>,
    events: EventSender,
    undo_spent: bool,
}

impl SortingEngine {
    pub fn builder(root: impl Into<PathBuf>) -> SortingEngineBuilder {
        SortingEngineBuilder::new(root)
    }

    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn index(&self) -> &HashIndex {
        &self.index
    }

    /// Photos of the current session, in presentation order
    pub fn photos(&self) -> &[PathBuf] {
        &self.photos
    }

    /// Scan, resume and run the decision loop until every photo is handled,
    /// the user quits or the session is interrupted.
    ///
    /// The trash holding area is emptied when the session ends, however it
    /// ends. Only a failed scan is an error.
    pub fn run(&mut self, ui: &mut dyn SessionUi) -> Result<SessionSummary, SorterError> {
        let start = Instant::now();
        info!(
            "Session started at {} for {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.config.root.display()
        );

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan = scanner.scan_with_events(&self.config.root, &self.events)?;
        for error in &scan.errors {
            debug!("Scan: {}", error);
        }
        self.photos = self.session_photos(scan.photos);
        info!("Found {} photos", self.photos.len());

        self.resume();
        self.offer_trash_purge(ui);

        let outcome = if self.photos.is_empty() {
            SessionOutcome::Completed
        } else {
            self.sort_loop(ui)
        };

        Ok(self.finish(outcome, start))
    }

    /// The scanned photos with every photo this session already moved put
    /// back at the path it had when it was presented. Keeps earlier
    /// decisions in front of the cursor after their files changed place.
    fn session_photos(&self, scanned: Vec<PathBuf>) -> Vec<PathBuf> {
        let relocations = self.state.relocations();
        if relocations.is_empty() {
            return scanned;
        }

        let mut photos: Vec<PathBuf> = scanned
            .into_iter()
            .filter(|photo| !relocations.contains_key(photo))
            .chain(relocations.values().cloned())
            .collect();
        photos.sort();
        photos.dedup();
        photos
    }

    fn resume(&mut self) {
        if self.state.cursor > self.photos.len() {
            warn!(
                "Saved position {} is past the {} photos found, starting at the end",
                self.state.cursor,
                self.photos.len()
            );
            self.state.cursor = self.photos.len();
        }

        if self.state.cursor > 0 {
            info!("Resuming at photo {}", self.state.cursor + 1);
            self.emit(SessionEvent::Resumed {
                cursor: self.state.cursor,
                sorted: self.state.sorted_count,
                skipped: self.state.skipped_count,
                deleted: self.state.deleted_count,
            });
        }
    }

    fn offer_trash_purge(&mut self, ui: &mut dyn SessionUi) {
        let held = self.trash.count();
        if held == 0 {
            return;
        }

        let question = format!(
            "Found {} file(s) in trash from previous session. Empty trash now?",
            held
        );
        if ui.confirm(&question) {
            self.purge_trash();
        }
    }

    fn sort_loop(&mut self, ui: &mut dyn SessionUi) -> SessionOutcome {
        while self.state.cursor < self.photos.len() {
            if self.interrupted() {
                return SessionOutcome::Interrupted;
            }

            let photo = self.photos[self.state.cursor].clone();
            if !photo.exists() {
                debug!("Skipping vanished photo {}", photo.display());
                self.emit(SessionEvent::PhotoVanished { path: photo });
                self.state.cursor += 1;
                self.persist();
                continue;
            }

            let inspection = self.classifier.inspect(&photo, &self.index);
            if let (Some(kind), Some(original)) = (
                inspection.classification.kind(),
                inspection.classification.original(),
            ) {
                let original = original.to_path_buf();
                if self.config.auto_duplicates {
                    if self.file_duplicate(&photo, Some(original.as_path()), kind) {
                        continue;
                    }
                } else {
                    self.emit(SessionEvent::DuplicateDetected {
                        path: photo.clone(),
                        original,
                        kind,
                    });
                }
            }

            if let Err(e) = self.viewer.open(&photo) {
                warn!("Could not open viewer: {}", e);
                self.emit(SessionEvent::Warning {
                    message: e.to_string(),
                });
            }

            let step = loop {
                if self.interrupted() {
                    break Step::End(SessionOutcome::Interrupted);
                }

                let view = self.view(&photo, &inspection.classification);
                let choice = ui.present(&view);
                match self.apply(choice, &photo, &inspection, &view.folders, ui) {
                    Step::Retry => continue,
                    step => break step,
                }
            };

            self.viewer.close();
            match step {
                Step::Advance => self.undo_spent = false,
                Step::Back | Step::Retry => {}
                Step::End(outcome) => return outcome,
            }
        }

        SessionOutcome::Completed
    }

    fn view(&self, photo: &Path, duplicate: &Classification) -> PhotoView {
        let folders = list_folders(&self.config.root).unwrap_or_else(|e| {
            warn!("Could not list folders: {}", e);
            Vec::new()
        });

        PhotoView {
            path: photo.to_path_buf(),
            position: self.state.cursor + 1,
            total: self.photos.len(),
            folders,
            duplicate: duplicate.clone(),
            sorted: self.state.sorted_count,
            skipped: self.state.skipped_count,
            deleted: self.state.deleted_count,
            duplicates: self.state.duplicate_count,
            can_undo: self.can_undo(),
        }
    }

    fn apply(
        &mut self,
        choice: Choice,
        photo: &Path,
        inspection: &Inspection,
        folders: &[String],
        ui: &mut dyn SessionUi,
    ) -> Step {
        match choice {
            Choice::Folder(n) => match n.checked_sub(1).and_then(|i| folders.get(i)) {
                Some(name) => self.file_into(photo, name, inspection),
                None => {
                    self.emit(SessionEvent::InvalidChoice);
                    Step::Retry
                }
            },
            Choice::NewFolder => {
                let name = ui.prompt_folder_name();
                if self.interrupted() {
                    return Step::End(SessionOutcome::Interrupted);
                }
                let Some(name) = name else {
                    return Step::Retry;
                };
                match create_folder(&self.config.root, &name) {
                    Ok(path) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or(name);
                        info!("Created folder {}", name);
                        self.emit(SessionEvent::FolderCreated { name: name.clone() });
                        self.file_into(photo, &name, inspection)
                    }
                    Err(e) => self.recoverable(e),
                }
            }
            Choice::Skip => {
                self.state.record_skip(photo);
                self.state.skipped_count += 1;
                self.state.cursor += 1;
                self.persist();
                info!("SKIPPED: {}", photo.display());
                self.emit(SessionEvent::Skipped {
                    path: photo.to_path_buf(),
                });
                Step::Advance
            }
            Choice::Delete => {
                if !ui.confirm("Are you sure you want to delete this photo?") {
                    self.emit(SessionEvent::DeletionCancelled);
                    return Step::Retry;
                }
                self.delete(photo)
            }
            Choice::Duplicate => {
                let original = inspection.classification.original().map(Path::to_path_buf);
                if self.file_duplicate(photo, original.as_deref(), DuplicateKind::Manual) {
                    Step::Advance
                } else {
                    Step::Retry
                }
            }
            Choice::Undo => self.undo_step(),
            Choice::Quit => {
                info!("User quit at photo {}", self.state.cursor + 1);
                Step::End(SessionOutcome::Quit)
            }
            Choice::Interrupt => Step::End(SessionOutcome::Interrupted),
            Choice::Invalid => {
                self.emit(SessionEvent::InvalidChoice);
                Step::Retry
            }
        }
    }

    /// Move `photo` into event folder `name` and index it at its new path
    fn file_into(&mut self, photo: &Path, name: &str, inspection: &Inspection) -> Step {
        let folder = self.config.root.join(name);
        let destination = match move_photo(photo, &folder) {
            Ok(destination) => destination,
            Err(e) => return self.recoverable(e),
        };

        self.state.record_action(Action::moved(photo, &destination));
        self.state.sorted_count += 1;
        self.state.cursor += 1;
        self.persist();
        info!("MOVED: {} -> {}", photo.display(), destination.display());

        // A duplicate filed by hand leaves the index pointing at its original
        if !inspection.classification.is_duplicate() {
            self.index_moved(&destination, inspection);
        }
        self.emit(SessionEvent::Moved {
            path: photo.to_path_buf(),
            folder: name.to_string(),
            destination,
        });
        Step::Advance
    }

    fn index_moved(&mut self, destination: &Path, inspection: &Inspection) {
        let fingerprint = match &inspection.fingerprint {
            Some(fingerprint) => fingerprint.clone(),
            None => match self.classifier.fingerprint(destination) {
                Ok(fingerprint) => fingerprint,
                Err(e) => {
                    warn!("Not indexed: {}", e);
                    return;
                }
            },
        };

        if let Err(e) = self.index.add(
            destination,
            &fingerprint.content_hash,
            fingerprint.perceptual_hash.as_deref(),
        ) {
            self.warn(e.to_string());
        }
    }

    fn delete(&mut self, photo: &Path) -> Step {
        let held = match self.trash.move_in(photo) {
            Ok(held) => held,
            Err(e) => return self.recoverable(e),
        };

        self.state.record_action(Action::deleted(photo, &held));
        self.state.deleted_count += 1;
        self.state.cursor += 1;
        self.persist();
        info!("DELETED: {}", photo.display());
        self.emit(SessionEvent::Deleted {
            path: photo.to_path_buf(),
        });
        Step::Advance
    }

    /// Move `photo` into the Duplicates folder. Returns false, after
    /// reporting, when the move failed.
    fn file_duplicate(
        &mut self,
        photo: &Path,
        original: Option<&Path>,
        kind: DuplicateKind,
    ) -> bool {
        let moved = ensure_folder(&self.config.root, DUPLICATES_FOLDER)
            .and_then(|folder| move_photo(photo, &folder));
        let destination = match moved {
            Ok(destination) => destination,
            Err(e) => {
                self.recoverable(e);
                return false;
            }
        };

        self.state.record_duplicate(photo, &destination);
        self.state.duplicate_count += 1;
        self.state.cursor += 1;
        self.persist();
        info!(
            "DUPLICATE ({}): {} -> {}",
            kind,
            photo.display(),
            destination.display()
        );
        self.emit(SessionEvent::DuplicateMoved {
            path: photo.to_path_buf(),
            destination,
            original: original.map(Path::to_path_buf),
            kind,
        });
        true
    }

    fn undo_step(&mut self) -> Step {
        match self.undo() {
            Ok(restored) => {
                self.persist();
                info!("UNDO: restored {}", restored.display());
                self.emit(SessionEvent::Undone { restored });
                Step::Back
            }
            Err(e) => {
                debug!("Undo failed: {}", e);
                self.emit(SessionEvent::UndoFailed {
                    message: e.to_string(),
                });
                Step::Retry
            }
        }
    }

    /// Whether the newest logged action was taken on the photo just before
    /// the cursor and has not been followed by an undo already. A skip, a
    /// duplicate or a vanished file in between closes the window too.
    pub fn can_undo(&self) -> bool {
        if self.undo_spent {
            return false;
        }
        let previous = self
            .state
            .cursor
            .checked_sub(1)
            .and_then(|i| self.photos.get(i));

        match (self.state.last_action(), previous) {
            (Some(action), Some(previous)) => action.old_path == *previous,
            _ => false,
        }
    }

    /// Reverse the most recent action. History and counters only change
    /// once the file is back in place.
    pub fn undo(&mut self) -> Result<PathBuf, UndoError> {
        if !self.can_undo() {
            return Err(UndoError::NothingToUndo);
        }
        let action = self
            .state
            .last_action()
            .cloned()
            .ok_or(UndoError::NothingToUndo)?;

        if !action.new_path.exists() {
            return Err(UndoError::MissingFile {
                path: action.new_path,
            });
        }

        if let Some(parent) = action.old_path.parent() {
            fs::create_dir_all(parent).map_err(|source| FolderError::Create {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        move_file(&action.new_path, &action.old_path)?;

        self.state.pop_last_action();
        match action.kind {
            ActionKind::Moved => {
                self.state.sorted_count = self.state.sorted_count.saturating_sub(1);
                if let Err(e) = self.index.remove(&action.new_path) {
                    self.warn(e.to_string());
                }
            }
            ActionKind::Deleted => {
                self.state.deleted_count = self.state.deleted_count.saturating_sub(1);
            }
        }
        self.state.cursor = self.state.cursor.saturating_sub(1);
        self.undo_spent = true;

        Ok(action.old_path)
    }

    fn finish(&mut self, outcome: SessionOutcome, start: Instant) -> SessionSummary {
        self.viewer.close();
        self.persist();
        self.purge_trash();

        let summary = SessionSummary {
            outcome,
            sorted: self.state.sorted_count,
            skipped: self.state.skipped_count,
            deleted: self.state.deleted_count,
            duplicates: self.state.duplicate_count,
            total: self.photos.len(),
            cursor: self.state.cursor,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Session {} at {}: {} sorted, {} skipped, {} deleted, {} duplicates, {}/{} photos processed",
            outcome,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            summary.sorted,
            summary.skipped,
            summary.deleted,
            summary.duplicates,
            summary.cursor,
            summary.total
        );
        self.emit(SessionEvent::Finished {
            summary: summary.clone(),
        });
        summary
    }

    fn purge_trash(&mut self) {
        match self.trash.purge() {
            Ok(0) => {}
            Ok(count) => self.emit(SessionEvent::TrashPurged { count }),
            Err(e) => self.warn(e.to_string()),
        }
    }

    /// Save the session, reporting but surviving a failure
    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            self.warn(e.to_string());
        }
    }

    fn recoverable(&mut self, error: FolderError) -> Step {
        self.warn(error.to_string());
        Step::Retry
    }

    fn warn(&self, message: String) {
        warn!("{}", message);
        self.emit(SessionEvent::Warning { message });
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    fn emit(&self, event: SessionEvent) {
        self.events.send(Event::Session(event));
    }
}
