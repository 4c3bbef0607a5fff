//! Request handlers for the admin API.
//!
//! Dispatches each [`Request`] to the link manager or the file service and
//! turns every outcome, failures included, into a JSON body. Nothing raised
//! by an operation escapes this module.

use log::{error, info, warn};
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LinkError, StorageError};
use crate::protocol::Request;
use crate::protocol::responses::{
    CheckResponse, LinkAction, LinkResponse, ScriptResponse, status, to_body,
};
use crate::script::LinkOperation;
use crate::server::AppState;
use crate::storage::{self, DeletedKind};

/// Dispatches a parsed request to its handler.
pub async fn handle_request(state: &AppState, request: Request) -> Value {
    info!("Handling '{}'", request.action());

    match request {
        Request::CreateSymlink { source, name } => {
            let outcome = state.links.create(&source, &name).await;
            to_body(&LinkResponse::from_outcome(LinkAction::Create, outcome))
        }
        Request::RemoveSymlink { name } => {
            let outcome = state.links.remove(&name).await;
            to_body(&LinkResponse::from_outcome(LinkAction::Remove, outcome))
        }
        Request::CheckSymlink { name } => handle_check(state, &name).await,
        Request::GetSymlinks => match state.links.list_links().await {
            Ok(links) => to_body(&links),
            Err(e) => {
                error!("Could not list links: {}", e);
                json!([])
            }
        },
        Request::GetHtdocsFolders => match state.links.web_root_folders().await {
            Ok(folders) => to_body(&folders),
            Err(e) => {
                error!("Could not list web root folders: {}", e);
                json!([])
            }
        },
        Request::CreateSymlinkBatch { source, name } => {
            handle_manual_script(state, state.links.create_operation(&source, &name))
        }
        Request::CreateRemoveBatch { name } => {
            handle_manual_script(state, state.links.remove_operation(&name))
        }
        Request::ListDirectory { path } => {
            let path = path
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| state.repos_root());
            match blocking(move || storage::list_directory(&path)).await {
                Ok(listing) => to_body(&listing),
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
        Request::CreateDirectory { path, name } => {
            let result = blocking(move || storage::create_directory(Path::new(&path), &name)).await;
            reply(result, |_| "Directory created successfully".to_string())
        }
        Request::DeleteItem { path } => {
            let result = blocking(move || storage::delete_item(Path::new(&path))).await;
            reply(result, |kind| {
                let message = match kind {
                    DeletedKind::Directory => "Directory deleted",
                    DeletedKind::File => "File deleted",
                    DeletedKind::Link => "Link deleted",
                };
                message.to_string()
            })
        }
        Request::CreateFile {
            path,
            name,
            content,
        } => {
            let result =
                blocking(move || storage::create_file(Path::new(&path), &name, &content)).await;
            reply(result, |name| format!("File created successfully: {}", name))
        }
        Request::ReadFile { path } => {
            let max = state.max_read_size();
            match blocking(move || storage::read_file(Path::new(&path), max)).await {
                Ok(file) => {
                    let mut body = to_body(&file);
                    if let Value::Object(map) = &mut body {
                        map.insert("success".into(), Value::Bool(true));
                    }
                    body
                }
                Err(e) => failure(e),
            }
        }
        Request::SaveFile { path, content } => {
            match blocking(move || storage::save_file(Path::new(&path), &content)).await {
                Ok(saved) => {
                    if !saved.backup_written {
                        warn!("Saved without backup, {} not written", saved.backup_path);
                    }
                    json!({
                        "success": true,
                        "message": "File saved successfully",
                        "backup": saved.backup_path,
                    })
                }
                Err(e) => failure(e),
            }
        }
        Request::RenameFile { old_path, new_path } => {
            let result = blocking(move || {
                storage::rename_file(Path::new(&old_path), Path::new(&new_path))
            })
            .await;
            match result {
                Ok(renamed) => json!({
                    "success": true,
                    "message": "File renamed successfully",
                    "new_path": renamed.new_path,
                    "new_name": renamed.new_name,
                }),
                Err(e) => failure(e),
            }
        }
        Request::OpenExplorer { path } => {
            let result = storage::open_in_file_browser(state.runner.as_ref(), Path::new(&path)).await;
            reply(result, |_| "Folder opened".to_string())
        }
        Request::CreateReposFolder => {
            let root = state.repos_root();
            let display = root.to_string_lossy().to_string();
            match blocking(move || storage::create_repos_folder(&root)).await {
                Ok(false) => status(true, "Repos folder already exists"),
                Ok(true) => status(true, format!("Repos folder created successfully: {}", display)),
                Err(e) => {
                    error!("Could not create repos folder {}: {}", display, e);
                    status(
                        false,
                        "Could not create Repos folder. There might be a permission issue.",
                    )
                }
            }
        }
        Request::CheckReposExists => {
            let root = state.repos_root();
            let exists = tokio::fs::metadata(&root)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            json!({ "exists": exists, "path": root.to_string_lossy() })
        }
    }
}

async fn handle_check(state: &AppState, name: &str) -> Value {
    match state.links.check(name).await {
        Ok(report) => to_body(&CheckResponse::from(report)),
        Err(e) => json!({
            "exists": false,
            "path": state.links.web_root().join(name.trim()).to_string_lossy(),
            "message": e.to_string(),
        }),
    }
}

fn handle_manual_script(
    state: &AppState,
    operation: Result<LinkOperation, LinkError>,
) -> Value {
    match operation.and_then(|op| state.links.manual_script(op)) {
        Ok(script) => to_body(&ScriptResponse::from(script)),
        Err(e) => {
            warn!("Manual script not created: {}", e);
            status(false, e.to_string())
        }
    }
}

/// Runs blocking file-service work off the async runtime
async fn blocking<T, F>(work: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| Err(StorageError::Io(io::Error::other(e))))
}

fn reply<T>(result: Result<T, StorageError>, message: impl FnOnce(T) -> String) -> Value {
    match result {
        Ok(value) => status(true, message(value)),
        Err(e) => failure(e),
    }
}

fn failure(e: StorageError) -> Value {
    warn!("File operation failed: {}", e);
    status(false, e.to_string())
}
