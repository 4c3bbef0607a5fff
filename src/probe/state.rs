//! Derived link state of one web-root entry

use std::path::{Path, PathBuf};

/// What a name in the web root currently is.
///
/// Computed on demand and never stored; `NormalDirectory` and `Symlink` are
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Absent,
    NormalDirectory,
    /// A symlink or junction; `target` is `None` when it could not be read
    Symlink { target: Option<PathBuf> },
    /// Exists but is neither a directory nor a link, or could not be inspected
    Unknown,
}

impl LinkState {
    pub fn is_absent(&self) -> bool {
        matches!(self, LinkState::Absent)
    }

    pub fn is_link(&self) -> bool {
        matches!(self, LinkState::Symlink { .. })
    }

    /// True for the two states a link operation acts on
    pub fn is_dir_or_link(&self) -> bool {
        matches!(self, LinkState::NormalDirectory | LinkState::Symlink { .. })
    }

    pub fn target(&self) -> Option<&Path> {
        match self {
            LinkState::Symlink { target } => target.as_deref(),
            _ => None,
        }
    }
}
