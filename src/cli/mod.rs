//! # CLI Module
//!
//! Command-line interface for the photo sorter.
//!
//! ## Usage
//! ```bash
//! # Sort a directory
//! photo-sort ~/Pictures/2021
//!
//! # Stricter similar-photo matching
//! photo-sort ~/Pictures/2021 --threshold 3
//!
//! # Decide about duplicates yourself
//! photo-sort ~/Pictures/2021 --no-auto-duplicates
//!
//! # Start over from the first photo
//! photo-sort ~/Pictures/2021 --reset
//! ```

mod terminal;

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_sorter::core::classifier::{DuplicateClassifier, DEFAULT_THRESHOLD};
use photo_sorter::core::session::{SessionPaths, SessionStore};
use photo_sorter::core::sorter::SortingEngine;
use photo_sorter::core::viewer::{NullViewer, SystemViewer, Viewer};
use photo_sorter::error::{Result, ScanError};
use photo_sorter::events::EventChannel;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use terminal::TerminalUi;
use tracing::warn;

/// Photo Sorter - file a year of photos into event folders, one key at a time
#[derive(Parser, Debug)]
#[command(name = "photo-sort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of photos to sort
    directory: PathBuf,

    /// Similar-photo threshold (lower = stricter, 0-64)
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Ask about duplicates instead of moving them to Duplicates
    #[arg(long)]
    no_auto_duplicates: bool,

    /// Don't open photos in the system image viewer
    #[arg(long)]
    no_viewer: bool,

    /// Forget saved progress and start from the first photo
    #[arg(long)]
    reset: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    run_session(cli)
}

fn run_session(cli: Cli) -> Result<()> {
    let term = Term::stdout();
    let root = cli.directory;

    // Checked here so a bad path never gets a .photosorter directory
    if !root.exists() {
        return Err(ScanError::DirectoryNotFound { path: root }.into());
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory { path: root }.into());
    }

    let paths = SessionPaths::new(&root);
    if let Err(e) = photo_sorter::init_file_logging(&paths.log_file) {
        term.write_line(&format!("{} {}", style("⚠").yellow(), e)).ok();
    }

    term.write_line(&format!(
        "{} {}",
        style("Photo Sorter").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();

    if cli.reset {
        SessionStore::new(&paths.state_file).clear()?;
        term.write_line("Saved progress cleared. Starting from the first photo.")
            .ok();
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl+C handler: {}", e);
    }

    let classifier = DuplicateClassifier::new(cli.threshold);
    if !classifier.perceptual_available() {
        term.write_line(&format!(
            "{}",
            style("Perceptual hashing unavailable in this build: only exact duplicates will be detected.")
                .yellow()
        ))
        .ok();
    }

    let viewer: Box<dyn Viewer> = if cli.no_viewer {
        Box::new(NullViewer)
    } else {
        Box::new(SystemViewer::new())
    };

    let (sender, receiver) = EventChannel::new();

    let mut engine = SortingEngine::builder(&root)
        .auto_duplicates(!cli.no_auto_duplicates)
        .classifier(classifier)
        .viewer(viewer)
        .interrupt(Arc::clone(&interrupt))
        .events(sender)
        .build()?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("Scanning for photos...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut ui = TerminalUi::new(term, receiver, spinner);
    let summary = engine.run(&mut ui)?;
    ui.finish(&summary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["photo-sort", "/photos"]).unwrap();
        assert_eq!(cli.directory, PathBuf::from("/photos"));
        assert_eq!(cli.threshold, 5);
        assert!(!cli.no_auto_duplicates);
        assert!(!cli.no_viewer);
        assert!(!cli.reset);
    }

    #[test]
    fn flags() {
        let cli = Cli::try_parse_from([
            "photo-sort",
            "/photos",
            "--threshold",
            "3",
            "--no-auto-duplicates",
            "--no-viewer",
            "--reset",
        ])
        .unwrap();
        assert_eq!(cli.threshold, 3);
        assert!(cli.no_auto_duplicates);
        assert!(cli.no_viewer);
        assert!(cli.reset);
    }

    #[test]
    fn directory_is_required() {
        assert!(Cli::try_parse_from(["photo-sort"]).is_err());
    }
}
