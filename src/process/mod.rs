//! Process runner
//!
//! Launches external programs: elevated, detached script launches and
//! plain synchronous commands with captured output.

pub mod results;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use results::CommandOutput;
pub use runner::{ProcessRunner, SystemRunner, elevation_invocation};
