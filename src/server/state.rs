//! Shared application state handed to every request

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::links::LinkManager;
use crate::probe::{LinkProber, platform_prober};
use crate::process::{ProcessRunner, SystemRunner};
use crate::script::{ScriptFlavor, ScriptGenerator};
use crate::storage::validation::normalize_path;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub links: Arc<LinkManager>,
    pub runner: Arc<dyn ProcessRunner>,
}

impl AppState {
    /// State for the host system: real process runner and platform prober
    pub fn from_config(config: AppConfig) -> Self {
        let runner: Arc<dyn ProcessRunner> =
            Arc::new(SystemRunner::new(config.links.elevation_program.clone()));
        let prober = platform_prober(Arc::clone(&runner));
        Self::with_collaborators(config, prober, runner, ScriptFlavor::native())
    }

    /// State with injected prober, runner and script flavor
    pub fn with_collaborators(
        config: AppConfig,
        prober: Arc<dyn LinkProber>,
        runner: Arc<dyn ProcessRunner>,
        flavor: ScriptFlavor,
    ) -> Self {
        let web_root = normalize_path(&config.paths.web_root);
        let script_dir = normalize_path(&config.script_dir_path().to_string_lossy());
        let scripts = ScriptGenerator::new(
            &web_root,
            script_dir,
            config.server.public_base_url.clone(),
            flavor,
        );
        let links = LinkManager::new(
            web_root.to_string_lossy(),
            config.server.public_base_url.clone(),
            prober,
            Arc::clone(&runner),
            scripts,
            config.links.clone(),
        );

        Self {
            config: Arc::new(config),
            links: Arc::new(links),
            runner,
        }
    }

    pub fn repos_root(&self) -> PathBuf {
        self.config.repos_root_path()
    }

    pub fn max_read_size(&self) -> u64 {
        self.config.files.max_read_size_bytes()
    }
}
