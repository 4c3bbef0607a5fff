//! Error handling
//!
//! Defines error types for the link manager, the file service and the server.

pub mod types;

pub use types::*;
