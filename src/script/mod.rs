//! Elevation script generation
//!
//! Writes single-use, self-deleting scripts that perform one link operation.
//! The quick variant is meant for unattended elevated execution; the
//! interactive variant is for the operator to run by hand.

pub mod generator;
pub mod templates;
pub mod types;

pub use generator::ScriptGenerator;
pub use types::{ElevationScript, LinkOperation, ScriptFlavor, ScriptVariant};
