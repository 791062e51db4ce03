//! Error types
//!
//! Defines domain-specific error types for each module of the chat server.

use std::fmt;
use std::io;

use crate::registry::ConnectionHandle;

/// User registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NameTaken(String),
    HandleInUse(ConnectionHandle),
    InvalidName(String),
    NotFound,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NameTaken(name) => {
                write!(f, "Username is not available: {}", name)
            }
            RegistryError::HandleInUse(handle) => {
                write!(f, "Connection {} already has a registered user", handle)
            }
            RegistryError::InvalidName(reason) => write!(f, "Invalid username: {}", reason),
            RegistryError::NotFound => write!(f, "User is not registered"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Wire codec errors
#[derive(Debug)]
pub enum CodecError {
    Malformed(String),
    Encode(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed(msg) => write!(f, "Malformed request: {}", msg),
            CodecError::Encode(msg) => write!(f, "Failed to encode payload: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Registry(RegistryError),
    Codec(CodecError),
    IoError(io::Error),
    ConfigError(config::ConfigError),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Registry(e) => write!(f, "Registry error: {}", e),
            ChatServerError::Codec(e) => write!(f, "Codec error: {}", e),
            ChatServerError::IoError(e) => write!(f, "I/O error: {}", e),
            ChatServerError::ConfigError(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<RegistryError> for ChatServerError {
    fn from(error: RegistryError) -> Self {
        ChatServerError::Registry(error)
    }
}

impl From<CodecError> for ChatServerError {
    fn from(error: CodecError) -> Self {
        ChatServerError::Codec(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::IoError(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::ConfigError(error)
    }
}
