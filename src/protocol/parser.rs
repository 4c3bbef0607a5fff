//! Request parsing

use crate::protocol::Request;

/// Parses a request body such as `{"action":"remove_symlink","name":"shop"}`
pub fn parse_request(body: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(body)
}
