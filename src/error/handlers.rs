//! Error handlers
//!
//! Maps server errors onto wire status codes and logs them.

use crate::error::types::ChatServerError;
use crate::protocol::StatusCode;
use log::error;

/// Handle a chat server error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat Server Error: {}", err);
}

/// Convert error to the status code reported to the client
pub fn error_to_status_code(err: &ChatServerError) -> StatusCode {
    match err {
        ChatServerError::Registry(_) => StatusCode::BadRequest,
        ChatServerError::Codec(_) => StatusCode::BadRequest,
        ChatServerError::IoError(_) => StatusCode::InternalServerError,
        ChatServerError::ConfigError(_) => StatusCode::InternalServerError,
    }
}
