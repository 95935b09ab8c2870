//! # Viewer Module
//!
//! Shows the photo being decided on in the operating system's image viewer.
//!
//! Viewing is best-effort. The session keeps going when no viewer can be
//! launched, and closing a viewer never reports failure.

use crate::error::ViewerError;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Something that can show one photo at a time
pub trait Viewer {
    /// Show `path`, closing whatever was shown before
    fn open(&mut self, path: &Path) -> Result<(), ViewerError>;

    /// Close the shown photo, if any
    fn close(&mut self);
}

/// Viewer that shows nothing
#[derive(Debug, Default)]
pub struct NullViewer;

impl Viewer for NullViewer {
    fn open(&mut self, path: &Path) -> Result<(), ViewerError> {
        if !path.exists() {
            return Err(ViewerError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn close(&mut self) {}
}

/// The platform's default image viewer, run as a child process.
///
/// - macOS: `open -g -a Preview`, closed through AppleScript
/// - Linux: `xdg-open`, closed by killing the child
/// - Windows: `cmd /C start`, closed with `taskkill`
#[derive(Debug)]
pub struct SystemViewer {
    child: Option<Child>,
    shown: Option<PathBuf>,
    settle: Duration,
}

impl SystemViewer {
    pub fn new() -> Self {
        Self {
            child: None,
            shown: None,
            settle: Duration::from_millis(300),
        }
    }

    fn launch(path: &Path) -> Result<Child, ViewerError> {
        let mut command = if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.args(["-g", "-a", "Preview"]).arg(path);
            c
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]).arg(path);
            c
        } else if cfg!(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd")) {
            let mut c = Command::new("xdg-open");
            c.arg(path);
            c
        } else {
            return Err(ViewerError::UnsupportedPlatform(
                std::env::consts::OS.to_string(),
            ));
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ViewerError::Launch {
                path: path.to_path_buf(),
                source,
            })
    }

    fn run_quietly(program: &str, args: &[&str]) {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = status {
            debug!("{} failed: {}", program, e);
        }
    }
}

impl Default for SystemViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewer for SystemViewer {
    fn open(&mut self, path: &Path) -> Result<(), ViewerError> {
        self.close();

        if !path.exists() {
            return Err(ViewerError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let child = Self::launch(path)?;
        self.child = Some(child);
        self.shown = Some(path.to_path_buf());

        if cfg!(target_os = "macos") {
            thread::sleep(self.settle);
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.shown.take().is_none() {
            return;
        }

        if cfg!(target_os = "macos") {
            Self::run_quietly(
                "osascript",
                &[
                    "-e",
                    "tell application \"Preview\" to if (count of windows) > 0 then close front window",
                ],
            );
        } else if cfg!(target_os = "windows") {
            Self::run_quietly("taskkill", &["/F", "/IM", "Microsoft.Photos.exe"]);
        }

        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Drop for SystemViewer {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn null_viewer_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut viewer = NullViewer;

        let missing = temp_dir.path().join("gone.jpg");
        assert!(matches!(
            viewer.open(&missing),
            Err(ViewerError::NotFound { .. })
        ));

        let present = temp_dir.path().join("a.jpg");
        std::fs::write(&present, "A").unwrap();
        assert!(viewer.open(&present).is_ok());
        viewer.close();
    }

    #[test]
    fn system_viewer_rejects_missing_file_without_launching() {
        let temp_dir = TempDir::new().unwrap();
        let mut viewer = SystemViewer::new();

        let result = viewer.open(&temp_dir.path().join("gone.jpg"));
        assert!(matches!(result, Err(ViewerError::NotFound { .. })));
        assert!(viewer.child.is_none());
    }

    #[test]
    fn closing_an_idle_viewer_is_harmless() {
        let mut viewer = SystemViewer::new();
        viewer.close();
        viewer.close();
    }
}
