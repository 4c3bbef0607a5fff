//! Error types
//!
//! Defines domain-specific error types for each module of the link manager.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Link lifecycle errors.
///
/// None of these are fatal to the host process; the protocol layer turns
/// every variant into a structured `success: false` response.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid link name: {0}")]
    InvalidName(String),

    #[error("Source folder not found: {0}")]
    TargetMissing(String),

    #[error("A link with this name already exists")]
    AlreadyExists,

    #[error("Symlink not found: {0}")]
    NotFound(String),

    #[error("Could not prepare script: {0}")]
    ScriptGenerationFailed(#[from] ScriptError),
}

/// Script generator errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script directory not available: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory/file service errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("This is not a directory: {0}")]
    NotADirectory(String),

    #[error("Directory is not readable (permission issue): {0}")]
    DirectoryNotReadable(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("This is not a file: {0}")]
    NotAFile(String),

    #[error("File is not writable (permission issue): {0}")]
    FileNotWritable(String),

    #[error("File is too large (more than {0}MB)")]
    FileTooLarge(u64),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Target directory does not exist")]
    TargetDirectoryMissing,

    #[error("No write permission in the directory")]
    PermissionDenied,

    #[error("This feature is not supported on this platform")]
    Unsupported,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Server startup and transport errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_failure_reads_as_preparation_failure() {
        let err: LinkError = ScriptError::MissingDirectory(PathBuf::from("/nope")).into();
        assert_eq!(
            err.to_string(),
            "Could not prepare script: script directory not available: /nope"
        );
    }

    #[test]
    fn storage_messages_match_the_ui_wording() {
        assert_eq!(
            StorageError::FileTooLarge(5).to_string(),
            "File is too large (more than 5MB)"
        );
        assert_eq!(
            StorageError::DirectoryNotFound("/x".into()).to_string(),
            "Directory not found: /x"
        );
    }
}
