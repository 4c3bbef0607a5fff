//! Server core functionality
//!
//! HTTP transport for the admin API and the state shared by its handlers.

pub mod core;
pub mod state;

pub use core::{Server, router};
pub use state::AppState;
