//! Configuration management for webroot-linker
//!
//! Settings are layered: built-in defaults, then an optional `config.toml`,
//! then environment variables prefixed with `WEBROOT_LINKER`
//! (e.g. `WEBROOT_LINKER__LINKS__SETTLE_PERIOD_MS=1000`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub paths: PathsSection,
    pub links: LinkSettings,
    pub files: FileSettings,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSection {
    /// IP address to bind the admin API
    pub bind_address: String,

    /// Port for the admin API
    pub port: u16,

    /// Base URL the web server publishes the web root under
    pub public_base_url: String,
}

/// Filesystem locations the tool works with
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathsSection {
    /// Directory served by the web server; links are created directly inside it
    pub web_root: String,

    /// Where the developer keeps project checkouts
    pub repos_root: String,

    /// Where elevation scripts are written. Empty means the web root.
    pub script_dir: String,
}

/// Timing and elevation knobs of the link lifecycle
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LinkSettings {
    /// Wait after launching an elevated script before re-probing
    pub settle_period_ms: u64,

    /// Pause after a removal before the final cache-clearing probe
    pub removal_pause_ms: u64,

    /// Number of probes in the verifying step
    pub verify_attempts: u32,

    /// Delay between verifying probes
    pub verify_interval_ms: u64,

    /// Program used to request elevation
    pub elevation_program: String,
}

/// Directory/file service limits
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FileSettings {
    /// Largest file `read_file` will return, in MB
    pub max_read_size_mb: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8088,
            public_base_url: "http://localhost".to_string(),
        }
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        let web_root = if cfg!(windows) {
            r"C:\xampp\htdocs"
        } else {
            "/var/www/html"
        };

        let home = std::env::var("USERPROFILE")
            .or_else(|_| std::env::var("HOME"))
            .unwrap_or_else(|_| ".".to_string());
        let repos_root = PathBuf::from(home).join("source").join("repos");

        Self {
            web_root: web_root.to_string(),
            repos_root: repos_root.to_string_lossy().to_string(),
            script_dir: String::new(),
        }
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        let elevation_program = if cfg!(windows) { "powershell" } else { "pkexec" };
        Self {
            settle_period_ms: 3000,
            removal_pause_ms: 500,
            verify_attempts: 1,
            verify_interval_ms: 500,
            elevation_program: elevation_program.to_string(),
        }
    }
}

impl Default for FileSettings {
    fn default() -> Self {
        Self { max_read_size_mb: 5 }
    }
}

impl AppConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("webroot-linker/config").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("WEBROOT_LINKER").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.server.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.paths.web_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "web_root cannot be empty".into(),
            ));
        }

        if self.links.verify_attempts == 0 {
            return Err(config::ConfigError::Message(
                "verify_attempts must be greater than 0".into(),
            ));
        }

        if self.links.elevation_program.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "elevation_program cannot be empty".into(),
            ));
        }

        if self.files.max_read_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_read_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    pub fn web_root_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.web_root)
    }

    pub fn repos_root_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.repos_root)
    }

    /// Script directory, falling back to the web root
    pub fn script_dir_path(&self) -> PathBuf {
        if self.paths.script_dir.trim().is_empty() {
            self.web_root_path()
        } else {
            PathBuf::from(&self.paths.script_dir)
        }
    }
}

impl LinkSettings {
    pub fn settle_period(&self) -> Duration {
        Duration::from_millis(self.settle_period_ms)
    }

    pub fn removal_pause(&self) -> Duration {
        Duration::from_millis(self.removal_pause_ms)
    }

    pub fn verify_interval(&self) -> Duration {
        Duration::from_millis(self.verify_interval_ms)
    }

    /// Settings with every wait set to zero, for tests and scripted callers
    pub fn immediate() -> Self {
        Self {
            settle_period_ms: 0,
            removal_pause_ms: 0,
            verify_interval_ms: 0,
            ..Self::default()
        }
    }
}

impl FileSettings {
    /// Maximum readable file size in bytes
    pub fn max_read_size_bytes(&self) -> u64 {
        self.max_read_size_mb.saturating_mul(1024 * 1024)
    }
}
