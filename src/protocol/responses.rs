//! Response bodies
//!
//! Serialized with snake_case field names; optional fields are left out
//! rather than sent as `null`.

use serde::Serialize;
use serde_json::{Value, json};

use crate::links::{CheckReport, OperationResult};
use crate::probe::LinkState;
use crate::script::{ElevationScript, ScriptFlavor, templates::sh_quote};

/// Answer to `create_symlink` and `remove_symlink`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LinkResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_executed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_path: Option<String>,
}

/// Which link operation a [`LinkResponse`] reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Create,
    Remove,
}

impl LinkResponse {
    pub fn from_outcome(action: LinkAction, outcome: OperationResult) -> Self {
        let mut response = LinkResponse {
            success: outcome.is_success(),
            message: String::new(),
            auto_executed: None,
            batch_created: None,
            batch_path: None,
        };

        match (action, outcome) {
            (LinkAction::Create, OperationResult::Success)
            | (LinkAction::Create, OperationResult::SuccessViaFallbackScript(_)) => {
                response.message = "Symlink created successfully!".into();
                response.auto_executed = Some(true);
            }
            (LinkAction::Remove, OperationResult::Success) => {
                response.message = "Symlink removed".into();
            }
            (LinkAction::Remove, OperationResult::SuccessViaFallbackScript(_)) => {
                response.message = "Symlink removed successfully!".into();
                response.auto_executed = Some(true);
            }
            (action, OperationResult::FailureNeedsManualScript(path)) => {
                let verb = match action {
                    LinkAction::Create => "create",
                    LinkAction::Remove => "remove",
                };
                response.message = format!(
                    "Could not {} automatically. Elevation script is ready, you can run it manually.",
                    verb
                );
                response.batch_created = Some(true);
                response.batch_path = Some(path.to_string_lossy().to_string());
            }
            (_, OperationResult::Failure(e)) => {
                response.message = e.to_string();
            }
        }

        response
    }
}

/// Answer to `check_symlink`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheckResponse {
    pub exists: bool,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_symlink: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_normal_dir: Option<bool>,
    pub message: String,
}

impl From<CheckReport> for CheckResponse {
    fn from(report: CheckReport) -> Self {
        let path = report.path.to_string_lossy().to_string();
        let (exists, is_symlink, is_normal_dir, message) = match report.state {
            LinkState::Absent => (false, None, None, "Symlink/directory not found"),
            LinkState::NormalDirectory => (
                false,
                None,
                Some(true),
                "Normal folder exists but not a symlink",
            ),
            LinkState::Symlink { .. } => (true, Some(true), None, "Symlink found and ready to use"),
            LinkState::Unknown => (false, None, None, "Symlink not found"),
        };

        CheckResponse {
            exists,
            path,
            is_symlink,
            is_normal_dir,
            message: message.to_string(),
        }
    }
}

/// Answer to `create_symlink_batch` and `create_remove_batch`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ScriptResponse {
    pub success: bool,
    pub batch_path: String,
    /// Command line the operator can paste to run the script
    pub command: String,
    pub message: String,
}

impl From<ElevationScript> for ScriptResponse {
    fn from(script: ElevationScript) -> Self {
        let flavor = script.flavor();
        let batch_path = script.into_path().to_string_lossy().to_string();
        let command = match flavor {
            ScriptFlavor::Batch => format!("\"{}\"", batch_path),
            ScriptFlavor::Shell => format!("/bin/sh {}", sh_quote(&batch_path)),
        };

        ScriptResponse {
            success: true,
            batch_path,
            command,
            message: "Elevation script created".to_string(),
        }
    }
}

/// `{"success": .., "message": ..}`
pub fn status(success: bool, message: impl Into<String>) -> Value {
    json!({ "success": success, "message": message.into() })
}

/// Serializes a response body; a serialization failure becomes a failure body
pub fn to_body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| status(false, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use std::path::PathBuf;

    #[test]
    fn fallback_success_is_reported_as_auto_executed() {
        let response = LinkResponse::from_outcome(
            LinkAction::Remove,
            OperationResult::SuccessViaFallbackScript(PathBuf::from("/tmp/remove_a.sh")),
        );
        assert_eq!(
            to_body(&response),
            json!({
                "success": true,
                "message": "Symlink removed successfully!",
                "auto_executed": true
            })
        );
    }

    #[test]
    fn manual_script_outcome_carries_the_path() {
        let response = LinkResponse::from_outcome(
            LinkAction::Create,
            OperationResult::FailureNeedsManualScript(PathBuf::from("/tmp/symlink_a.sh")),
        );
        assert!(!response.success);
        assert_eq!(response.batch_created, Some(true));
        assert_eq!(response.batch_path.as_deref(), Some("/tmp/symlink_a.sh"));
        assert!(response.message.starts_with("Could not create automatically"));
    }

    #[test]
    fn failures_only_carry_a_message() {
        let body = to_body(&LinkResponse::from_outcome(
            LinkAction::Create,
            OperationResult::Failure(LinkError::AlreadyExists),
        ));
        assert_eq!(
            body,
            json!({"success": false, "message": "A link with this name already exists"})
        );
    }

    #[test]
    fn check_reports_plain_directories_as_not_links() {
        let response = CheckResponse::from(CheckReport {
            path: PathBuf::from("/srv/www/site"),
            state: LinkState::NormalDirectory,
        });
        assert!(!response.exists);
        assert_eq!(response.is_normal_dir, Some(true));
        assert_eq!(response.is_symlink, None);
    }
}
