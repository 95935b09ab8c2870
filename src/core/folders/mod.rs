//! # Folders Module
//!
//! Event folders and the file moves between them.
//!
//! Event folders are the plain, non-hidden subdirectories of the photo
//! root. `Duplicates` is reserved for photos flagged as duplicates and is
//! never offered as a destination.

use crate::core::scanner::is_hidden;
use crate::error::FolderError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Folder that receives duplicates
pub const DUPLICATES_FOLDER: &str = "Duplicates";

/// Characters that may not appear in a folder name
pub const INVALID_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Event folders under `root`, sorted by name
pub fn list_folders(root: &Path) -> Result<Vec<String>, FolderError> {
    let entries = fs::read_dir(root).map_err(|source| FolderError::List {
        path: root.to_path_buf(),
        source,
    })?;

    let mut folders: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| !is_hidden(&entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name != DUPLICATES_FOLDER)
        .collect();

    folders.sort();
    Ok(folders)
}

/// Check a user-entered folder name and return it trimmed
pub fn validate_folder_name(name: &str) -> Result<&str, FolderError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(FolderError::EmptyName);
    }
    if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(FolderError::InvalidCharacter(c));
    }
    if name == "." || name == ".." {
        return Err(FolderError::ReservedName(name.to_string()));
    }

    Ok(name)
}

/// Create a new event folder named `name` under `root`
pub fn create_folder(root: &Path, name: &str) -> Result<PathBuf, FolderError> {
    let name = validate_folder_name(name)?;
    let path = root.join(name);

    if path.exists() {
        return Err(FolderError::AlreadyExists {
            name: name.to_string(),
        });
    }

    fs::create_dir(&path).map_err(|source| FolderError::Create {
        path: path.clone(),
        source,
    })?;

    debug!("Created folder {}", path.display());
    Ok(path)
}

/// Make sure `root/name` exists as a directory, creating it if needed
pub fn ensure_folder(root: &Path, name: &str) -> Result<PathBuf, FolderError> {
    let path = root.join(name);
    fs::create_dir_all(&path).map_err(|source| FolderError::Create {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// First free path for `file_name` in `dest_dir`: `name.ext`, then
/// `name_1.ext`, `name_2.ext` and so on
pub fn unique_destination(dest_dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dest_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dest_dir.join(format!("{}_{}{}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Move `source` into `dest_dir`, renaming on collision. Returns the new path.
pub fn move_photo(source: &Path, dest_dir: &Path) -> Result<PathBuf, FolderError> {
    if !source.is_file() {
        return Err(FolderError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    if !dest_dir.is_dir() {
        return Err(FolderError::NotADirectory {
            path: dest_dir.to_path_buf(),
        });
    }

    let file_name = source.file_name().ok_or_else(|| FolderError::SourceNotFound {
        path: source.to_path_buf(),
    })?;
    let destination = unique_destination(dest_dir, Path::new(file_name));

    move_file(source, &destination)?;
    Ok(destination)
}

/// Move `source` to exactly `destination`, which must not exist yet
pub fn move_file(source: &Path, destination: &Path) -> Result<(), FolderError> {
    let error = |source_err: io::Error| FolderError::Move {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: source_err,
    };

    if destination.exists() {
        return Err(error(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }

    fs::rename(source, destination)
        .or_else(|_| copy_then_delete(source, destination))
        .map_err(error)?;

    debug!("Moved {} -> {}", source.display(), destination.display());
    Ok(())
}

/// Cross-filesystem move: copy, verify the size, then delete the source
fn copy_then_delete(source: &Path, destination: &Path) -> io::Result<()> {
    let source_size = fs::metadata(source)?.len();
    fs::copy(source, destination)?;

    let dest_size = fs::metadata(destination)?.len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(io::Error::other(format!(
            "Copy verification failed: source {} bytes, dest {} bytes",
            source_size, dest_size
        )));
    }

    fs::remove_file(source)
}
