//! Directory and file service
//!
//! Plain filesystem operations behind the file browser: listing, create,
//! delete, read, write and rename.

pub mod operations;
pub mod results;
pub mod validation;

pub use operations::*;
pub use results::{DeletedKind, DirectoryItem, DirectoryListing, FileContent, RenameResult, SaveResult};
