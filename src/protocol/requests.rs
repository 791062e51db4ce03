//! Module `requests`
//!
//! Defines the requests a client can send and the result of dispatching
//! one against the registry.

use serde::Deserialize;

use crate::presence::UserStatus;
use crate::protocol::{Operation, Payload};
use crate::registry::ConnectionHandle;

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Request {
    RegisterUser {
        username: String,
    },
    UpdateStatus {
        status: UserStatus,
    },
    GetUsers {
        #[serde(default)]
        username: Option<String>,
    },
    SendMessage {
        #[serde(default)]
        recipient: Option<String>,
        content: String,
    },
    UnregisterUser,
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::RegisterUser { .. } => Operation::RegisterUser,
            Request::UpdateStatus { .. } => Operation::UpdateStatus,
            Request::GetUsers { .. } => Operation::GetUsers,
            Request::SendMessage { .. } => Operation::SendMessage,
            Request::UnregisterUser => Operation::UnregisterUser,
        }
    }
}

/// What the connection should do after the reply is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Continue,
    CloseConnection,
}

/// A payload addressed to another connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: ConnectionHandle,
    pub payload: Payload,
}

/// Full result of handling one request.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub status: DispatchStatus,
    pub reply: Payload,
    pub deliveries: Vec<Delivery>,
}

impl DispatchResult {
    pub fn reply(reply: Payload) -> Self {
        Self {
            status: DispatchStatus::Continue,
            reply,
            deliveries: Vec::new(),
        }
    }

    pub fn close(reply: Payload) -> Self {
        Self {
            status: DispatchStatus::CloseConnection,
            reply,
            deliveries: Vec::new(),
        }
    }

    pub fn with_deliveries(mut self, deliveries: Vec<Delivery>) -> Self {
        self.deliveries = deliveries;
        self
    }
}
