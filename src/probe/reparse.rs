//! Reparse-point prober
//!
//! Junctions do not always surface through `symlink_metadata`, so plain
//! directories are double-checked with `fsutil reparsepoint query` and the
//! link target is taken from its `Print Name:` line when `read_link` fails.

use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::probe::{LinkProber, LinkState, NativeProber};
use crate::process::ProcessRunner;

/// Markers in `fsutil` output that identify a link-like reparse point
const LINK_MARKERS: [&str; 3] = ["Reparse Tag Value", "Symbolic Link", "Mount Point"];
const PRINT_NAME_LABEL: &str = "Print Name:";

/// What a reparse-point query said about a path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReparseQuery {
    pub is_link: bool,
    pub print_name: Option<String>,
}

/// Parses `fsutil reparsepoint query` output.
///
/// Empty output means "not a reparse point".
pub fn parse_reparse_query(output: &str) -> ReparseQuery {
    if output.trim().is_empty() {
        return ReparseQuery::default();
    }

    let is_link = LINK_MARKERS.iter().any(|marker| output.contains(marker));
    let print_name = output.lines().find_map(|line| {
        let (_, rest) = line.split_once(PRINT_NAME_LABEL)?;
        let rest = rest.trim();
        (!rest.is_empty()).then(|| rest.to_string())
    });

    ReparseQuery {
        is_link,
        print_name,
    }
}

pub struct ReparsePointProber {
    runner: Arc<dyn ProcessRunner>,
}

impl ReparsePointProber {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    async fn query(&self, path: &Path) -> ReparseQuery {
        let args = vec![
            "reparsepoint".to_string(),
            "query".to_string(),
            path.to_string_lossy().to_string(),
        ];
        match self.runner.run("fsutil", &args).await {
            Ok(output) => parse_reparse_query(&output.stdout),
            Err(e) => {
                debug!("fsutil query failed for {}: {}", path.display(), e);
                ReparseQuery::default()
            }
        }
    }
}

#[async_trait]
impl LinkProber for ReparsePointProber {
    async fn probe(&self, path: &Path) -> LinkState {
        match NativeProber.probe(path).await {
            LinkState::Symlink { target: Some(target) } => LinkState::Symlink {
                target: Some(target),
            },
            LinkState::Symlink { target: None } => LinkState::Symlink {
                target: self.query(path).await.print_name.map(PathBuf::from),
            },
            LinkState::NormalDirectory => {
                let query = self.query(path).await;
                if query.is_link {
                    LinkState::Symlink {
                        target: query.print_name.map(PathBuf::from),
                    }
                } else {
                    LinkState::NormalDirectory
                }
            }
            other => other,
        }
    }
}
