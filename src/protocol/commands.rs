//! Module `commands`
//!
//! Defines the requests the admin page can send.

use serde::Deserialize;

/// A parsed admin request.
///
/// Field names follow the form fields the page posts.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    // Links
    CreateSymlink { source: String, name: String },
    RemoveSymlink { name: String },
    CheckSymlink { name: String },
    GetSymlinks,
    GetHtdocsFolders,
    CreateSymlinkBatch { source: String, name: String },
    CreateRemoveBatch { name: String },

    // Files and directories
    ListDirectory {
        #[serde(default)]
        path: Option<String>,
    },
    CreateDirectory { path: String, name: String },
    DeleteItem { path: String },
    CreateFile {
        path: String,
        name: String,
        #[serde(default)]
        content: String,
    },
    ReadFile { path: String },
    SaveFile { path: String, content: String },
    RenameFile { old_path: String, new_path: String },
    OpenExplorer { path: String },

    // Repos root
    CreateReposFolder,
    CheckReposExists,
}

impl Request {
    /// Action name as sent on the wire
    pub fn action(&self) -> &'static str {
        match self {
            Request::CreateSymlink { .. } => "create_symlink",
            Request::RemoveSymlink { .. } => "remove_symlink",
            Request::CheckSymlink { .. } => "check_symlink",
            Request::GetSymlinks => "get_symlinks",
            Request::GetHtdocsFolders => "get_htdocs_folders",
            Request::CreateSymlinkBatch { .. } => "create_symlink_batch",
            Request::CreateRemoveBatch { .. } => "create_remove_batch",
            Request::ListDirectory { .. } => "list_directory",
            Request::CreateDirectory { .. } => "create_directory",
            Request::DeleteItem { .. } => "delete_item",
            Request::CreateFile { .. } => "create_file",
            Request::ReadFile { .. } => "read_file",
            Request::SaveFile { .. } => "save_file",
            Request::RenameFile { .. } => "rename_file",
            Request::OpenExplorer { .. } => "open_explorer",
            Request::CreateReposFolder => "create_repos_folder",
            Request::CheckReposExists => "check_repos_exists",
        }
    }
}
