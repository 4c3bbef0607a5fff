//! Symlink lifecycle management
//!
//! Creates and removes directory links under the web root. The filesystem is
//! the only registry: every operation re-probes instead of remembering.

pub mod inventory;
pub mod locks;
pub mod manager;
pub mod name;
pub mod results;

pub use inventory::{LinkEntry, WebRootFolder};
pub use locks::NameLocks;
pub use manager::LinkManager;
pub use name::LinkName;
pub use results::{CheckReport, OperationResult};
