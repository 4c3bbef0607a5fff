//! Script value types

use std::path::{Path, PathBuf};

use crate::links::LinkName;

/// The link operation a script performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOperation {
    Create { name: LinkName, target: PathBuf },
    Remove { name: LinkName },
}

impl LinkOperation {
    pub fn name(&self) -> &LinkName {
        match self {
            LinkOperation::Create { name, .. } | LinkOperation::Remove { name } => name,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            LinkOperation::Create { .. } => "create",
            LinkOperation::Remove { .. } => "remove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptVariant {
    /// Silent: performs the operation, prints SUCCESS/FAILED, deletes itself
    Quick,
    /// Self-elevating, prints a report and waits for a key before deleting itself
    Interactive,
}

/// Script language, picked by host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFlavor {
    /// `cmd.exe` batch file using `mklink /D`
    Batch,
    /// POSIX `sh` script using `ln -s`
    Shell,
}

impl ScriptFlavor {
    pub fn native() -> Self {
        if cfg!(windows) {
            ScriptFlavor::Batch
        } else {
            ScriptFlavor::Shell
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ScriptFlavor::Batch => "bat",
            ScriptFlavor::Shell => "sh",
        }
    }
}

/// A generated script on disk.
///
/// Single use: handing it to `ProcessRunner::launch_elevated` or to the
/// operator via [`ElevationScript::into_path`] consumes the value, and the
/// script deletes its own file once it has run.
#[derive(Debug)]
pub struct ElevationScript {
    path: PathBuf,
    operation: LinkOperation,
    variant: ScriptVariant,
    flavor: ScriptFlavor,
}

impl ElevationScript {
    pub fn new(
        path: PathBuf,
        operation: LinkOperation,
        variant: ScriptVariant,
        flavor: ScriptFlavor,
    ) -> Self {
        Self {
            path,
            operation,
            variant,
            flavor,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn operation(&self) -> &LinkOperation {
        &self.operation
    }

    pub fn variant(&self) -> ScriptVariant {
        self.variant
    }

    pub fn flavor(&self) -> ScriptFlavor {
        self.flavor
    }

    /// Hands the script over for manual execution
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
