//! Admin API protocol
//!
//! One JSON object per call, selected by its `action` field. Every action
//! answers with a JSON object; operation failures are reported inside it.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::Request;
pub use handlers::handle_request;
pub use parser::parse_request;
