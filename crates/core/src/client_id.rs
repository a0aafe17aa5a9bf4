//! Client identifier rules.
//!
//! Client ids are opaque strings chosen by the browser (usually a UUID).
//! The registry never rejects a lookup outright; a malformed id simply
//! resolves to no connection. The HTTP edge uses [`validate_client_id`] to
//! refuse malformed ids before they reach the registry.

use crate::error::CoreError;

/// Longest accepted client id, in bytes.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Whether `id` is a well-formed client id.
///
/// Non-empty, at most [`MAX_CLIENT_ID_LEN`] bytes, and free of whitespace
/// and control characters.
pub fn is_valid_client_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CLIENT_ID_LEN
        && !id.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Validate a client id supplied by a caller.
pub fn validate_client_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() {
        return Err(CoreError::Validation("client_id must not be empty".to_string()));
    }
    if id.len() > MAX_CLIENT_ID_LEN {
        return Err(CoreError::Validation(format!(
            "client_id must be at most {MAX_CLIENT_ID_LEN} bytes, got {}",
            id.len()
        )));
    }
    if !is_valid_client_id(id) {
        return Err(CoreError::Validation(
            "client_id must not contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}
