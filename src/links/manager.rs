//! Symlink lifecycle manager
//!
//! Create:  checked -> (already exists | elevating -> verifying -> (done | fallback ready))
//! Remove:  fast attempt -> (done | elevating -> verifying -> (done | fallback ready))
//!
//! The elevated script runs detached and has no way to report back, so after
//! launching it the manager waits a settle period and re-probes the
//! destination. A slow prompt can therefore produce a fallback even though
//! the script later succeeds; the operator confirms with `check`.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LinkSettings;
use crate::error::LinkError;
use crate::links::{CheckReport, LinkName, NameLocks, OperationResult};
use crate::probe::{LinkProber, LinkState};
use crate::process::ProcessRunner;
use crate::script::{ElevationScript, LinkOperation, ScriptGenerator, ScriptVariant};
use crate::storage::validation::normalize_path;

pub struct LinkManager {
    web_root: PathBuf,
    public_base_url: String,
    prober: Arc<dyn LinkProber>,
    runner: Arc<dyn ProcessRunner>,
    scripts: ScriptGenerator,
    settings: LinkSettings,
    locks: NameLocks,
}

impl LinkManager {
    pub fn new(
        web_root: impl AsRef<str>,
        public_base_url: impl Into<String>,
        prober: Arc<dyn LinkProber>,
        runner: Arc<dyn ProcessRunner>,
        scripts: ScriptGenerator,
        settings: LinkSettings,
    ) -> Self {
        Self {
            web_root: normalize_path(web_root.as_ref()),
            public_base_url: public_base_url.into(),
            prober,
            runner,
            scripts,
            settings,
            locks: NameLocks::default(),
        }
    }

    pub fn web_root(&self) -> &Path {
        &self.web_root
    }

    pub(crate) fn prober(&self) -> &dyn LinkProber {
        self.prober.as_ref()
    }

    /// Where `name` lives in the web root
    pub fn destination(&self, name: &LinkName) -> PathBuf {
        self.web_root.join(name.as_str())
    }

    /// Public URL of `name`
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), name)
    }

    /// Links `web_root/name` to the directory `target` through an elevated script.
    pub async fn create(&self, target: &str, name: &str) -> OperationResult {
        let name = match LinkName::parse(name) {
            Ok(name) => name,
            Err(e) => return OperationResult::Failure(e),
        };
        let _guard = self.locks.acquire(name.as_str()).await;

        let target = normalize_path(target);
        let destination = self.destination(&name);
        info!(
            "Create link '{}': {} -> {}",
            name,
            destination.display(),
            target.display()
        );

        match tokio::fs::metadata(&target).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                warn!("Create link '{}' rejected: source {} missing", name, target.display());
                return OperationResult::Failure(LinkError::TargetMissing(
                    target.to_string_lossy().to_string(),
                ));
            }
        }

        if !self.prober.probe(&destination).await.is_absent() {
            // Read again in case the first answer predates a deletion that just finished
            let state = self.prober.probe(&destination).await;
            if !state.is_absent() {
                warn!("Create link '{}' rejected: destination is {:?}", name, state);
                return OperationResult::Failure(LinkError::AlreadyExists);
            }
        }

        let operation = LinkOperation::Create {
            name: name.clone(),
            target,
        };
        let script = match self.scripts.generate(operation.clone(), ScriptVariant::Quick) {
            Ok(script) => script,
            Err(e) => {
                warn!("Create link '{}': {}", name, e);
                return OperationResult::Failure(e.into());
            }
        };

        let script_path = script.path().to_path_buf();
        if !self.elevate(script).await {
            return self.manual_fallback(operation, script_path);
        }

        if self.verify(&destination, LinkState::is_dir_or_link).await {
            info!("Create link '{}' verified", name);
            OperationResult::SuccessViaFallbackScript(script_path)
        } else {
            info!("Create link '{}' not verified", name);
            self.manual_fallback(operation, script_path)
        }
    }

    /// Removes the link (or empty directory) `web_root/name`.
    ///
    /// Tries a plain removal first and only asks for elevation when that fails.
    pub async fn remove(&self, name: &str) -> OperationResult {
        let name = match LinkName::parse(name) {
            Ok(name) => name,
            Err(e) => return OperationResult::Failure(e),
        };
        let _guard = self.locks.acquire(name.as_str()).await;

        let destination = self.destination(&name);
        let state = self.prober.probe(&destination).await;
        info!("Remove link '{}': {} is {:?}", name, destination.display(), state);

        if !state.is_dir_or_link() {
            return OperationResult::Failure(LinkError::NotFound(
                destination.to_string_lossy().to_string(),
            ));
        }

        if self.try_direct_removal(&destination, &state).await {
            self.pause_and_settle(&destination).await;
            info!("Remove link '{}' done without elevation", name);
            return OperationResult::Success;
        }

        let operation = LinkOperation::Remove { name: name.clone() };
        let script = match self.scripts.generate(operation.clone(), ScriptVariant::Quick) {
            Ok(script) => script,
            Err(e) => {
                warn!("Remove link '{}': {}", name, e);
                return OperationResult::Failure(e.into());
            }
        };

        let script_path = script.path().to_path_buf();
        if !self.elevate(script).await {
            return self.manual_fallback(operation, script_path);
        }

        if self.verify(&destination, LinkState::is_absent).await {
            self.pause_and_settle(&destination).await;
            info!("Remove link '{}' verified", name);
            OperationResult::SuccessViaFallbackScript(script_path)
        } else {
            info!("Remove link '{}' not verified", name);
            self.manual_fallback(operation, script_path)
        }
    }

    /// Reports what `web_root/name` currently is
    pub async fn check(&self, name: &str) -> Result<CheckReport, LinkError> {
        let name = LinkName::parse(name)?;
        let path = self.destination(&name);
        let state = self.prober.probe(&path).await;
        Ok(CheckReport { path, state })
    }

    /// Writes the interactive script for the operator to run by hand
    pub fn manual_script(&self, operation: LinkOperation) -> Result<ElevationScript, LinkError> {
        Ok(self.scripts.generate(operation, ScriptVariant::Interactive)?)
    }

    /// Builds a create operation from raw request input
    pub fn create_operation(&self, target: &str, name: &str) -> Result<LinkOperation, LinkError> {
        Ok(LinkOperation::Create {
            name: LinkName::parse(name)?,
            target: normalize_path(target),
        })
    }

    /// Builds a remove operation from raw request input
    pub fn remove_operation(&self, name: &str) -> Result<LinkOperation, LinkError> {
        Ok(LinkOperation::Remove {
            name: LinkName::parse(name)?,
        })
    }

    /// Hands the operator a script that is still on disk.
    ///
    /// A quick script that ran and failed has already deleted itself; an
    /// interactive one is written in its place.
    fn manual_fallback(&self, operation: LinkOperation, quick_script: PathBuf) -> OperationResult {
        if quick_script.exists() {
            info!("Manual script left at {}", quick_script.display());
            return OperationResult::FailureNeedsManualScript(quick_script);
        }

        match self.scripts.generate(operation, ScriptVariant::Interactive) {
            Ok(script) => {
                let path = script.into_path();
                info!(
                    "{} is gone, manual script written to {}",
                    quick_script.display(),
                    path.display()
                );
                OperationResult::FailureNeedsManualScript(path)
            }
            Err(e) => {
                warn!("Could not write manual script: {}", e);
                OperationResult::Failure(e.into())
            }
        }
    }

    async fn elevate(&self, script: ElevationScript) -> bool {
        let path = script.path().to_path_buf();
        match self.runner.launch_elevated(script).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not launch elevated script {}: {}", path.display(), e);
                false
            }
        }
    }

    async fn try_direct_removal(&self, destination: &Path, state: &LinkState) -> bool {
        let (program, args) = removal_command(destination, state);
        let reported_success = match self.runner.run(&program, &args).await {
            Ok(output) => {
                if !output.success() {
                    debug!("{} failed: {}", program, output.combined().trim());
                }
                output.success()
            }
            Err(e) => {
                debug!("Could not run {}: {}", program, e);
                false
            }
        };

        reported_success || self.prober.probe(destination).await.is_absent()
    }

    /// Waits the settle period, then probes until `done` holds or attempts run out
    async fn verify(&self, destination: &Path, done: fn(&LinkState) -> bool) -> bool {
        tokio::time::sleep(self.settings.settle_period()).await;

        let attempts = self.settings.verify_attempts.max(1);
        for attempt in 1..=attempts {
            let state = self.prober.probe(destination).await;
            debug!(
                "Verify {} ({}/{}): {:?}",
                destination.display(),
                attempt,
                attempts,
                state
            );
            if done(&state) {
                return true;
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.verify_interval()).await;
            }
        }
        false
    }

    /// Gives the filesystem a moment after a removal, then reads the entry once more
    async fn pause_and_settle(&self, destination: &Path) {
        tokio::time::sleep(self.settings.removal_pause()).await;
        let state = self.prober.probe(destination).await;
        if !state.is_absent() {
            warn!("{} reappeared after removal as {:?}", destination.display(), state);
        }
    }
}

/// Plain, non-elevated removal command for `destination`
pub fn removal_command(destination: &Path, state: &LinkState) -> (String, Vec<String>) {
    let path = destination.to_string_lossy().to_string();
    if cfg!(windows) {
        (
            "cmd".to_string(),
            vec!["/C".to_string(), "rmdir".to_string(), path],
        )
    } else if state.is_link() {
        (
            "rm".to_string(),
            vec!["-f".to_string(), "--".to_string(), path],
        )
    } else {
        ("rmdir".to_string(), vec!["--".to_string(), path])
    }
}
