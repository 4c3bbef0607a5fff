//! Link prober
//!
//! Classifies one filesystem path as absent, a plain directory, a link
//! (symlink or junction) or something else. Two implementations share the
//! [`LinkProber`] contract: a native one built on `symlink_metadata`, and a
//! Windows one that falls back to `fsutil reparsepoint query` output.

pub mod native;
pub mod reparse;
pub mod state;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::process::ProcessRunner;

pub use native::NativeProber;
pub use reparse::{ReparsePointProber, ReparseQuery, parse_reparse_query};
pub use state::LinkState;

/// Computes the [`LinkState`] of a path.
///
/// Implementations must not cache: every call reads the filesystem again,
/// so a probe right after a deletion sees the deletion.
#[async_trait]
pub trait LinkProber: Send + Sync {
    async fn probe(&self, path: &Path) -> LinkState;
}

/// Picks the prober for the host platform
pub fn platform_prober(runner: Arc<dyn ProcessRunner>) -> Arc<dyn LinkProber> {
    if cfg!(windows) {
        Arc::new(ReparsePointProber::new(runner))
    } else {
        Arc::new(NativeProber)
    }
}
