//! Terminal front end for a sorting session.

use console::{style, Key, Term};
use indicatif::ProgressBar;
use photo_sorter::core::classifier::Classification;
use photo_sorter::core::sorter::{Choice, PhotoView, SessionUi};
use photo_sorter::events::{
    Event, EventReceiver, ScanEvent, SessionEvent, SessionOutcome, SessionSummary,
};
use std::path::Path;

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 40;

/// Reads single keypresses and renders the session on the terminal
pub struct TerminalUi {
    term: Term,
    events: EventReceiver,
    spinner: Option<ProgressBar>,
}

impl TerminalUi {
    pub fn new(term: Term, events: EventReceiver, spinner: ProgressBar) -> Self {
        Self {
            term,
            events,
            spinner: Some(spinner),
        }
    }

    /// Print remaining notices and the session summary
    pub fn finish(&mut self, summary: &SessionSummary) {
        self.stop_spinner();
        self.term.write_line("").ok();
        self.show_notices();

        if summary.total == 0 {
            self.term.write_line("No photos found to sort.").ok();
            return;
        }

        let rule = "=".repeat(RULE_WIDTH);
        self.term.write_line(&rule).ok();
        self.term
            .write_line(&format!("  {}", style("Sorting Session Summary").bold()))
            .ok();
        self.term.write_line(&rule).ok();
        for (label, count) in [
            ("Photos sorted:   ", summary.sorted),
            ("Photos skipped:  ", summary.skipped),
            ("Photos deleted:  ", summary.deleted),
            ("Duplicates found:", summary.duplicates),
        ] {
            self.term
                .write_line(&format!("  {} {}", label, style(count).cyan()))
                .ok();
        }
        self.term
            .write_line(&format!(
                "  Remaining:        {}",
                style(summary.total.saturating_sub(summary.cursor)).cyan()
            ))
            .ok();
        self.term.write_line(&rule).ok();

        let closing = match summary.outcome {
            SessionOutcome::Completed => style("All photos processed!".to_string()).green(),
            SessionOutcome::Quit => {
                style("Progress saved. Run again to continue where you left off.".to_string())
            }
            SessionOutcome::Interrupted => {
                style("Sorting interrupted. Progress saved.".to_string()).yellow()
            }
        };
        self.term.write_line(&format!("{}", closing)).ok();
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn show_notices(&self) {
        let notices: Vec<String> = self.events.drain().iter().filter_map(notice).collect();
        for line in &notices {
            self.term.write_line(line).ok();
        }
        if !notices.is_empty() {
            self.term.write_line("").ok();
        }
    }

    fn render(&self, view: &PhotoView) {
        let completed = view.position.saturating_sub(1);
        let (percent, filled) = if view.total > 0 {
            (completed * 100 / view.total, completed * BAR_WIDTH / view.total)
        } else {
            (0, 0)
        };
        let rule = "=".repeat(RULE_WIDTH);

        self.term.write_line(&rule).ok();
        self.term
            .write_line(&format!(
                "  {} - [{}/{}] ({}%)",
                style("Photo Sorter").bold().cyan(),
                view.position,
                view.total,
                percent
            ))
            .ok();
        self.term
            .write_line(&format!(
                "  {}{}",
                style("█".repeat(filled)).green(),
                style("░".repeat(BAR_WIDTH - filled)).dim()
            ))
            .ok();
        self.term.write_line(&rule).ok();
        self.term.write_line("").ok();

        self.term
            .write_line(&format!("Current Photo: {}", style(file_name(&view.path)).bold()))
            .ok();
        self.term
            .write_line(&format!("Full Path: {}", style(display_path(&view.path)).dim()))
            .ok();
        self.term
            .write_line(&format!(
                "Sorted {}  Skipped {}  Deleted {}  Duplicates {}",
                style(view.sorted).cyan(),
                style(view.skipped).cyan(),
                style(view.deleted).cyan(),
                style(view.duplicates).cyan()
            ))
            .ok();
        self.term.write_line("").ok();

        if let Some(original) = view.duplicate.original() {
            let how = match &view.duplicate {
                Classification::Similar { distance, .. } => {
                    format!("looks like (distance {})", distance)
                }
                _ => "is identical to".to_string(),
            };
            self.term
                .write_line(&format!(
                    "{} This photo {} {}",
                    style("⚠").yellow().bold(),
                    how,
                    style(display_path(original)).yellow()
                ))
                .ok();
            self.term.write_line("").ok();
        }

        if !view.folders.is_empty() {
            self.term.write_line("Event Folders:").ok();
            for (i, folder) in view.folders.iter().take(9).enumerate() {
                self.term
                    .write_line(&format!("  {}) {}", style(i + 1).bold(), folder))
                    .ok();
            }
            if view.folders.len() > 9 {
                let more = format!(
                    "(+{} more, only the first 9 can be picked)",
                    view.folders.len() - 9
                );
                self.term
                    .write_line(&format!("  {}", style(more).dim()))
                    .ok();
            }
            self.term.write_line("").ok();
        }

        self.term.write_line("Actions:").ok();
        if !view.folders.is_empty() {
            self.term.write_line("  [1-9] Move to event folder").ok();
        }
        self.term.write_line("  [N]   Create new event folder").ok();
        self.term.write_line("  [S]   Skip this photo").ok();
        self.term.write_line("  [D]   Delete this photo").ok();
        self.term.write_line("  [U]   Mark as duplicate").ok();
        let undo = "  [Z]   Undo last action";
        if view.can_undo {
            self.term.write_line(undo).ok();
        } else {
            self.term.write_line(&format!("{}", style(undo).dim())).ok();
        }
        self.term.write_line("  [Q]   Quit and save progress").ok();
        self.term.write_line("").ok();
        self.term.write_str("Choose action: ").ok();
    }
}

impl SessionUi for TerminalUi {
    fn present(&mut self, view: &PhotoView) -> Choice {
        self.stop_spinner();
        self.term.clear_screen().ok();
        self.show_notices();
        self.render(view);

        match self.term.read_key() {
            Ok(Key::Char(c)) => {
                self.term.write_line(&c.to_string()).ok();
                Choice::from_key(c)
            }
            Ok(_) => Choice::Invalid,
            // Ctrl+C in raw mode surfaces as an interrupted read
            Err(_) => Choice::Interrupt,
        }
    }

    fn prompt_folder_name(&mut self) -> Option<String> {
        self.term
            .write_str("Enter new folder name (or press Enter to cancel): ")
            .ok();
        match self.term.read_line() {
            Ok(name) if !name.trim().is_empty() => Some(name),
            _ => None,
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.stop_spinner();
        self.show_notices();
        self.term
            .write_str(&format!("{} (Y/N): ", style(question).bold()))
            .ok();
        let answer = matches!(self.term.read_key(), Ok(Key::Char('y' | 'Y')));
        self.term
            .write_line(if answer { "Y" } else { "N" })
            .ok();
        answer
    }
}

/// One-line description of an event, for the notices shown above a photo
fn notice(event: &Event) -> Option<String> {
    let line = match event {
        Event::Scan(ScanEvent::Completed { total_photos }) => {
            format!("Found {} photos.", style(total_photos).cyan())
        }
        Event::Scan(_) => return None,
        Event::Session(event) => match event {
            SessionEvent::Resumed {
                cursor,
                sorted,
                skipped,
                deleted,
            } => format!(
                "Resuming from photo {}. Previous sessions: {} sorted, {} skipped, {} deleted.",
                cursor + 1,
                sorted,
                skipped,
                deleted
            ),
            SessionEvent::PhotoVanished { path } => format!(
                "{}",
                style(format!("{} no longer exists, skipped.", file_name(path))).dim()
            ),
            SessionEvent::DuplicateDetected { .. } | SessionEvent::Finished { .. } => return None,
            SessionEvent::DuplicateMoved { path, original, kind, .. } => {
                let matched = original
                    .as_deref()
                    .map(|o| format!(", matches {}", display_path(o)))
                    .unwrap_or_default();
                format!(
                    "{} Moved {} to Duplicates ({}{})",
                    style("⧉").yellow(),
                    file_name(path),
                    kind,
                    matched
                )
            }
            SessionEvent::FolderCreated { name } => {
                format!("{} Created folder {}", style("+").green(), style(name).bold())
            }
            SessionEvent::Moved { path, folder, .. } => format!(
                "{} Moved {} to {}",
                style("✓").green().bold(),
                file_name(path),
                style(folder).bold()
            ),
            SessionEvent::Skipped { path } => format!("Skipped {}", file_name(path)),
            SessionEvent::Deleted { path } => {
                format!("{} Moved {} to trash", style("✗").red(), file_name(path))
            }
            SessionEvent::DeletionCancelled => "Deletion cancelled.".to_string(),
            SessionEvent::Undone { restored } => {
                format!("{} Restored {}", style("↶").cyan(), display_path(restored))
            }
            SessionEvent::UndoFailed { message } => format!("{}", style(message).yellow()),
            SessionEvent::Warning { message } => {
                format!("{} {}", style("⚠").yellow(), style(message).yellow())
            }
            SessionEvent::InvalidChoice => format!("{}", style("Invalid choice.").red()),
            SessionEvent::TrashPurged { count } => {
                format!("Permanently deleted {} photo(s) from trash.", count)
            }
        },
    };
    Some(line)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `~`-relative path when under the home directory
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}
