//! Prober built on the platform's own link APIs

use async_trait::async_trait;
use log::debug;
use std::io;
use std::path::Path;

use crate::probe::{LinkProber, LinkState};

/// Uses `symlink_metadata` and `read_link` only
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProber;

#[async_trait]
impl LinkProber for NativeProber {
    async fn probe(&self, path: &Path) -> LinkState {
        match tokio::fs::symlink_metadata(path).await {
            Ok(meta) if meta.file_type().is_symlink() => LinkState::Symlink {
                target: tokio::fs::read_link(path).await.ok(),
            },
            Ok(meta) if meta.is_dir() => LinkState::NormalDirectory,
            Ok(_) => LinkState::Unknown,
            Err(e) if e.kind() == io::ErrorKind::NotFound => LinkState::Absent,
            Err(e) => {
                debug!("Could not inspect {}: {}", path.display(), e);
                LinkState::Unknown
            }
        }
    }
}
