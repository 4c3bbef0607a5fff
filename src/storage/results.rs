//! Storage result types
//!
//! Defines result structures returned by directory/file operations.

use serde::Serialize;

/// One entry of a directory listing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryItem {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub is_php: bool,
    pub size: Option<u64>,
    pub modified: String,
    /// Only set for directories: whether an `index.php` sits inside
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_index: Option<bool>,
}

/// Result of a directory listing operation
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryListing {
    pub items: Vec<DirectoryItem>,
    pub current_path: String,
    pub item_count: usize,
}

/// Result of a file read operation
#[derive(Debug, Clone, Serialize)]
pub struct FileContent {
    pub content: String,
    pub path: String,
    pub name: String,
    pub extension: String,
    pub size: u64,
    pub modified: String,
}

/// Result of a file save operation
#[derive(Debug, Clone)]
pub struct SaveResult {
    pub backup_path: String,
    pub backup_written: bool,
}

/// Result of a rename operation
#[derive(Debug, Clone)]
pub struct RenameResult {
    pub new_path: String,
    pub new_name: String,
}

/// What `delete_item` removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedKind {
    Directory,
    File,
    /// A symlink/junction; its target is untouched
    Link,
}
