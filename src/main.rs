//! # photo-sort CLI
//!
//! Interactive photo sorter.
//!
//! ## Usage
//! ```bash
//! photo-sort ~/Pictures/2021
//! photo-sort ~/Pictures/2021 --threshold 3 --no-viewer
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
