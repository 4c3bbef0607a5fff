//! In-process runner doubles used by unit tests

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::process::{CommandOutput, ProcessRunner, SystemRunner};
use crate::script::ElevationScript;

/// What happens when an elevated launch is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Elevation {
    /// Run the script right away with `/bin/sh`, as if the operator accepted
    RunInline,
    /// Do nothing, as if the operator dismissed the prompt
    Decline,
    /// The launcher itself could not be started
    LaunchError,
}

/// How plain (non-elevated) commands behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FastPath {
    /// Run the real command
    System,
    /// Report "access denied" without touching anything
    Refuse,
}

pub(crate) struct FakeRunner {
    elevation: Elevation,
    fast_path: FastPath,
    pub launched: Mutex<Vec<PathBuf>>,
    pub commands: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new(elevation: Elevation, fast_path: FastPath) -> Self {
        Self {
            elevation,
            fast_path,
            launched: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launched.lock().unwrap().len()
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn launch_elevated(&self, script: ElevationScript) -> io::Result<()> {
        self.launched.lock().unwrap().push(script.path().to_path_buf());
        match self.elevation {
            Elevation::RunInline => {
                std::process::Command::new("/bin/sh")
                    .arg(script.path())
                    .stdout(std::process::Stdio::null())
                    .status()?;
                Ok(())
            }
            Elevation::Decline => Ok(()),
            Elevation::LaunchError => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "elevation launcher missing",
            )),
        }
    }

    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self.commands
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));
        match self.fast_path {
            FastPath::System => SystemRunner::new("true").run(program, args).await,
            FastPath::Refuse => Ok(CommandOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "Access is denied.".to_string(),
            }),
        }
    }

    async fn spawn_detached(&self, program: &str, args: &[String]) -> io::Result<()> {
        self.commands
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));
        Ok(())
    }
}
