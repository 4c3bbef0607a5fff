//! Process runner implementation backed by `tokio::process`

use async_trait::async_trait;
use log::{debug, info};
use std::io;
use std::process::Stdio;
use tokio::process::Command;

use crate::process::CommandOutput;
use crate::script::{ElevationScript, ScriptFlavor};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Launches external programs on behalf of the link manager and file service.
///
/// An elevation request can be declined by the operator without any error
/// surfacing here; callers have to re-probe the filesystem to learn what
/// happened.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Starts `script` under an elevation request without waiting for it.
    /// The script is consumed: it runs at most once and deletes itself.
    async fn launch_elevated(&self, script: ElevationScript) -> io::Result<()>;

    /// Runs a command to completion and captures its output.
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;

    /// Starts a program in the background without elevation or output capture.
    async fn spawn_detached(&self, program: &str, args: &[String]) -> io::Result<()>;
}

/// Runner for the host system
pub struct SystemRunner {
    elevation_program: String,
}

impl SystemRunner {
    pub fn new(elevation_program: impl Into<String>) -> Self {
        Self {
            elevation_program: elevation_program.into(),
        }
    }

    fn detached(program: &str, args: &[String]) -> Command {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        command
    }
}

/// Builds the command line that asks the platform to run `script` elevated.
///
/// Batch scripts go through PowerShell `Start-Process -Verb RunAs` with a
/// hidden window; shell scripts are handed to a polkit-style launcher.
pub fn elevation_invocation(elevation_program: &str, script: &ElevationScript) -> (String, Vec<String>) {
    let path = script.path().to_string_lossy().to_string();
    match script.flavor() {
        ScriptFlavor::Batch => (
            elevation_program.to_string(),
            vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!(
                    "Start-Process '{}' -Verb RunAs -WindowStyle Hidden",
                    path.replace('\'', "''")
                ),
            ],
        ),
        ScriptFlavor::Shell => (
            elevation_program.to_string(),
            vec!["/bin/sh".to_string(), path],
        ),
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn launch_elevated(&self, script: ElevationScript) -> io::Result<()> {
        let (program, args) = elevation_invocation(&self.elevation_program, &script);
        info!(
            "Requesting elevation for {} script {}",
            script.operation().verb(),
            script.path().display()
        );
        Self::detached(&program, &args).spawn()?;
        Ok(())
    }

    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        debug!("Running {} {:?}", program, args);
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let output = command.output().await?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn spawn_detached(&self, program: &str, args: &[String]) -> io::Result<()> {
        debug!("Spawning {} {:?}", program, args);
        Self::detached(program, args).spawn()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkName;
    use crate::script::{LinkOperation, ScriptVariant};
    use std::path::PathBuf;

    fn script(flavor: ScriptFlavor, path: &str) -> ElevationScript {
        ElevationScript::new(
            PathBuf::from(path),
            LinkOperation::Remove {
                name: LinkName::parse("site").unwrap(),
            },
            ScriptVariant::Quick,
            flavor,
        )
    }

    #[test]
    fn batch_scripts_use_start_process_runas() {
        let (program, args) = elevation_invocation(
            "powershell",
            &script(ScriptFlavor::Batch, r"C:\xampp\htdocs\remove_site_1.bat"),
        );
        assert_eq!(program, "powershell");
        assert_eq!(
            args.last().unwrap(),
            r"Start-Process 'C:\xampp\htdocs\remove_site_1.bat' -Verb RunAs -WindowStyle Hidden"
        );
    }

    #[test]
    fn shell_scripts_are_passed_to_the_launcher() {
        let (program, args) =
            elevation_invocation("pkexec", &script(ScriptFlavor::Shell, "/srv/remove_site_1.sh"));
        assert_eq!(program, "pkexec");
        assert_eq!(args, vec!["/bin/sh", "/srv/remove_site_1.sh"]);
    }

    #[test]
    fn combined_output_joins_streams() {
        let output = CommandOutput {
            status: Some(2),
            stdout: "out".into(),
            stderr: "err".into(),
        };
        assert!(!output.success());
        assert_eq!(output.combined(), "out\nerr");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_captures_exit_code_and_output() {
        let runner = SystemRunner::new("pkexec");
        let output = runner
            .run("sh", &["-c".to_string(), "echo hello; exit 3".to_string()])
            .await
            .unwrap();
        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
    }
}
