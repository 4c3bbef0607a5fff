//! Result types for link operations

use std::path::PathBuf;

use crate::error::LinkError;
use crate::probe::LinkState;

/// Outcome of one create/remove request
#[derive(Debug)]
pub enum OperationResult {
    /// Done without elevation
    Success,
    /// Done by the auto-launched elevated script at this path
    SuccessViaFallbackScript(PathBuf),
    /// Not verified in time; the script at this path is left for the operator
    FailureNeedsManualScript(PathBuf),
    Failure(LinkError),
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OperationResult::Success | OperationResult::SuccessViaFallbackScript(_)
        )
    }

    /// Script the operator has to run, if any
    pub fn manual_script(&self) -> Option<&PathBuf> {
        match self {
            OperationResult::FailureNeedsManualScript(path) => Some(path),
            _ => None,
        }
    }
}

/// State of one web-root name as reported by `check_symlink`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub path: PathBuf,
    pub state: LinkState,
}
