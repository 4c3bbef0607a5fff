//! Script generator
//!
//! Names every script after its operation, link name and a millisecond
//! timestamp so concurrent operations on different names never collide.

use chrono::Local;
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::ScriptError;
use crate::script::templates::{self, ScriptContext};
use crate::script::{ElevationScript, LinkOperation, ScriptFlavor, ScriptVariant};

const MAX_NAME_ATTEMPTS: u32 = 16;

pub struct ScriptGenerator {
    web_root: PathBuf,
    script_dir: PathBuf,
    public_base_url: String,
    flavor: ScriptFlavor,
}

impl ScriptGenerator {
    pub fn new(
        web_root: impl Into<PathBuf>,
        script_dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        flavor: ScriptFlavor,
    ) -> Self {
        Self {
            web_root: web_root.into(),
            script_dir: script_dir.into(),
            public_base_url: public_base_url.into(),
            flavor,
        }
    }

    /// Writes a fresh script for `operation` and returns it.
    ///
    /// Never reuses an earlier file: a name that is already taken gets a
    /// numeric suffix.
    pub fn generate(
        &self,
        operation: LinkOperation,
        variant: ScriptVariant,
    ) -> Result<ElevationScript, ScriptError> {
        if !self.script_dir.is_dir() {
            return Err(ScriptError::MissingDirectory(self.script_dir.clone()));
        }

        let destination = self.web_root.join(operation.name().as_str());
        let url = format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            operation.name()
        );
        let body = templates::render(
            self.flavor,
            variant,
            &operation,
            &ScriptContext {
                web_root: &self.web_root,
                destination: &destination,
                url: &url,
            },
        );

        let stem = self.file_stem(&operation, variant);
        let path = self.write_unique(&stem, &body)?;

        info!(
            "Prepared {:?} {} script for '{}' at {}",
            variant,
            operation.verb(),
            operation.name(),
            path.display()
        );

        Ok(ElevationScript::new(path, operation, variant, self.flavor))
    }

    fn file_stem(&self, operation: &LinkOperation, variant: ScriptVariant) -> String {
        let prefix = match (variant, operation) {
            (ScriptVariant::Quick, LinkOperation::Create { .. }) => "symlink",
            (ScriptVariant::Quick, LinkOperation::Remove { .. }) => "remove",
            (ScriptVariant::Interactive, LinkOperation::Create { .. }) => "temp_symlink",
            (ScriptVariant::Interactive, LinkOperation::Remove { .. }) => "temp_remove",
        };
        format!(
            "{}_{}_{}",
            prefix,
            operation.name(),
            Local::now().format("%Y%m%d%H%M%S%3f")
        )
    }

    fn write_unique(&self, stem: &str, body: &str) -> Result<PathBuf, ScriptError> {
        let extension = self.flavor.extension();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}_{}.{}", stem, attempt, extension)
            };
            let path = self.script_dir.join(file_name);

            match create_script_file(&path) {
                Ok(mut file) => {
                    file.write_all(body.as_bytes())
                        .and_then(|_| file.flush())
                        .map_err(|source| {
                            let _ = fs::remove_file(&path);
                            ScriptError::Write {
                                path: path.clone(),
                                source,
                            }
                        })?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Script name {} taken, trying another", path.display());
                    continue;
                }
                Err(source) => return Err(ScriptError::Write { path, source }),
            }
        }

        Err(ScriptError::Write {
            path: self.script_dir.join(format!("{}.{}", stem, extension)),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free script name"),
        })
    }
}

#[cfg(unix)]
fn create_script_file(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o755)
        .open(path)
}

#[cfg(not(unix))]
fn create_script_file(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
