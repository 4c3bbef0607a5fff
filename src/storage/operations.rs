//! Storage operations
//!
//! Handles the file browser's filesystem operations: list, create, delete,
//! read, save and rename.

use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::cmp::Ordering;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use crate::error::StorageError;
use crate::process::ProcessRunner;
use crate::storage::results::{
    DeletedKind, DirectoryItem, DirectoryListing, FileContent, RenameResult, SaveResult,
};
use crate::storage::validation::{extension_of, has_extension};

const RETRIES: u32 = 3;

/// Retries `op` when Windows briefly holds a lock on the entry
fn with_retries<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Err(e) if attempt < RETRIES && e.kind() == ErrorKind::PermissionDenied => {
                thread::sleep(Duration::from_millis(100 * attempt as u64));
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn format_modified(time: io::Result<SystemTime>) -> String {
    time.map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| "N/A".to_string())
}

/// Lists the contents of a directory, directories first
pub fn list_directory(path: &Path) -> Result<DirectoryListing, StorageError> {
    let display = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(StorageError::DirectoryNotFound(display));
    }
    if !path.is_dir() {
        return Err(StorageError::NotADirectory(display));
    }

    let entries = with_retries(|| fs::read_dir(path)).map_err(|e| {
        error!("Failed to list directory {}: {}", display, e);
        if e.kind() == ErrorKind::PermissionDenied {
            StorageError::DirectoryNotReadable(display.clone())
        } else {
            StorageError::from(e)
        }
    })?;

    let mut items = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let full_path = entry.path();

        // Follow links so a linked project shows up as a directory
        let metadata = fs::metadata(&full_path).or_else(|_| fs::symlink_metadata(&full_path));
        let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
        let size = match &metadata {
            Ok(m) if m.is_file() => Some(m.len()),
            _ => None,
        };
        let modified = format_modified(
            metadata
                .as_ref()
                .map_err(|e| io::Error::new(e.kind(), e.to_string()))
                .and_then(|m| m.modified()),
        );
        let has_index = is_dir.then(|| full_path.join("index.php").exists());

        items.push(DirectoryItem {
            is_php: extension_of(&full_path) == "php",
            path: full_path.to_string_lossy().to_string(),
            name,
            is_dir,
            size,
            modified,
            has_index,
        });
    }

    items.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    info!("Listed directory {} - {} entries", display, items.len());

    Ok(DirectoryListing {
        item_count: items.len(),
        items,
        current_path: display,
    })
}

/// Creates `base/name`
pub fn create_directory(base: &Path, name: &str) -> Result<PathBuf, StorageError> {
    let new_path = base.join(name.trim());
    if new_path.exists() {
        return Err(StorageError::AlreadyExists(
            "A directory with this name already exists".into(),
        ));
    }

    fs::create_dir_all(&new_path)?;
    info!("Created directory {}", new_path.display());
    Ok(new_path)
}

/// Deletes a file, a link, or a directory tree.
///
/// A link is removed without descending into its target.
pub fn delete_item(path: &Path) -> Result<DeletedKind, StorageError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            StorageError::FileNotFound(path.to_string_lossy().to_string())
        } else {
            StorageError::from(e)
        }
    })?;

    let kind = if metadata.file_type().is_symlink() {
        // Directory links on Windows need rmdir, everything else unlink
        with_retries(|| fs::remove_file(path).or_else(|_| fs::remove_dir(path)))?;
        DeletedKind::Link
    } else if metadata.is_dir() {
        with_retries(|| fs::remove_dir_all(path))?;
        DeletedKind::Directory
    } else {
        with_retries(|| fs::remove_file(path))?;
        DeletedKind::File
    };

    info!("Deleted {:?} {}", kind, path.display());
    Ok(kind)
}

/// Creates a new file, adding `.txt` when `name` has no extension.
/// Returns the final file name.
pub fn create_file(base: &Path, name: &str, content: &str) -> Result<String, StorageError> {
    let mut file_name = name.trim().to_string();
    if !has_extension(&file_name) {
        file_name.push_str(".txt");
    }

    let new_file = base.join(&file_name);
    if new_file.exists() {
        return Err(StorageError::AlreadyExists(
            "A file with this name already exists".into(),
        ));
    }

    fs::write(&new_file, content)?;
    info!("Created file {}", new_file.display());
    Ok(file_name)
}

/// Reads a text file no larger than `max_bytes`
pub fn read_file(path: &Path, max_bytes: u64) -> Result<FileContent, StorageError> {
    let display = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(StorageError::FileNotFound(display));
    }
    if !path.is_file() {
        return Err(StorageError::NotAFile(display));
    }

    let metadata = fs::metadata(path)?;
    if metadata.len() > max_bytes {
        return Err(StorageError::FileTooLarge(max_bytes / (1024 * 1024)));
    }

    let bytes = fs::read(path)?;
    Ok(FileContent {
        content: String::from_utf8_lossy(&bytes).to_string(),
        path: display,
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        extension: extension_of(path),
        size: metadata.len(),
        modified: format_modified(metadata.modified()),
    })
}

/// Overwrites an existing file after copying it to `<path>.bak`.
///
/// A failed backup is logged and does not stop the save.
pub fn save_file(path: &Path, content: &str) -> Result<SaveResult, StorageError> {
    let display = path.to_string_lossy().to_string();
    if !path.exists() {
        return Err(StorageError::FileNotFound(display));
    }

    if fs::metadata(path)?.permissions().readonly() {
        return Err(StorageError::FileNotWritable(display));
    }

    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);

    let backup_written = match fs::copy(path, &backup) {
        Ok(_) => true,
        Err(e) => {
            warn!("Backup of {} failed, saving anyway: {}", display, e);
            false
        }
    };

    fs::write(path, content)?;
    info!("Saved {} ({} bytes)", display, content.len());

    Ok(SaveResult {
        backup_path: backup.to_string_lossy().to_string(),
        backup_written,
    })
}

/// Renames `old_path` to `new_path` without overwriting anything
pub fn rename_file(old_path: &Path, new_path: &Path) -> Result<RenameResult, StorageError> {
    if !old_path.exists() {
        return Err(StorageError::FileNotFound(
            old_path.to_string_lossy().to_string(),
        ));
    }

    let new_name = new_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if new_path.exists() {
        return Err(StorageError::AlreadyExists(format!(
            "A file with this name already exists: {}",
            new_name
        )));
    }

    match new_path.parent() {
        Some(dir) if dir.as_os_str().is_empty() || dir.is_dir() => {}
        _ => return Err(StorageError::TargetDirectoryMissing),
    }

    if let Some(dir) = old_path.parent() {
        if fs::metadata(dir).map(|m| m.permissions().readonly()).unwrap_or(false) {
            return Err(StorageError::PermissionDenied);
        }
    }

    with_retries(|| fs::rename(old_path, new_path))?;
    info!("Renamed {} to {}", old_path.display(), new_path.display());

    Ok(RenameResult {
        new_path: new_path.to_string_lossy().to_string(),
        new_name,
    })
}

/// Creates the repos root. Returns `false` when it already existed.
pub fn create_repos_folder(repos_root: &Path) -> Result<bool, StorageError> {
    if repos_root.exists() {
        return Ok(false);
    }
    fs::create_dir_all(repos_root)?;
    info!("Created repos folder {}", repos_root.display());
    Ok(true)
}

/// Command that opens `path` in the platform file browser
pub fn file_browser_command(path: &Path) -> Option<(String, Vec<String>)> {
    let path = path.to_string_lossy().to_string();
    if cfg!(windows) {
        Some(("explorer".to_string(), vec![path]))
    } else if cfg!(target_os = "macos") {
        Some(("open".to_string(), vec![path]))
    } else if cfg!(unix) {
        Some(("xdg-open".to_string(), vec![path]))
    } else {
        None
    }
}

/// Opens `path` in the platform file browser without waiting for it
pub async fn open_in_file_browser(
    runner: &dyn ProcessRunner,
    path: &Path,
) -> Result<(), StorageError> {
    if !path.exists() {
        return Err(StorageError::DirectoryNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let (program, args) = file_browser_command(path).ok_or(StorageError::Unsupported)?;
    runner.spawn_detached(&program, &args).await?;
    info!("Opened {} with {}", path.display(), program);
    Ok(())
}
