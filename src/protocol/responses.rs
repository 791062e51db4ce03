//! Response payloads
//!
//! Codec-agnostic structures the server sends to clients. A `WireCodec`
//! turns these into bytes.

use serde::{Deserialize, Serialize};

use crate::presence::UserStatus;
use crate::registry::User;

/// Kind of exchange a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RegisterUser,
    SendMessage,
    UpdateStatus,
    GetUsers,
    IncomingMessage,
    UnregisterUser,
    /// Reply to a request that could not be decoded or was refused before dispatch.
    Unknown,
}

/// Outcome classification of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Ok,
    BadRequest,
    InternalServerError,
}

impl StatusCode {
    /// Numeric form, HTTP style.
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
        }
    }
}

/// Delivery mode of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Broadcast,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserListType {
    All,
    Single,
}

/// One row of a user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub status: UserStatus,
}

impl From<&User> for UserEntry {
    fn from(user: &User) -> Self {
        Self {
            username: user.name().to_string(),
            status: user.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListResult {
    #[serde(rename = "type")]
    pub list_type: UserListType,
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessageResult {
    pub sender: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

/// Operation-specific body of a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadResult {
    #[default]
    None,
    UserList(UserListResult),
    IncomingMessage(IncomingMessageResult),
}

impl PayloadResult {
    pub fn is_none(&self) -> bool {
        matches!(self, PayloadResult::None)
    }
}

/// Structured reply or broadcast sent to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub operation: Operation,
    pub status_code: StatusCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "PayloadResult::is_none")]
    pub result: PayloadResult,
}

impl Payload {
    pub fn is_ok(&self) -> bool {
        self.status_code == StatusCode::Ok
    }

    /// Returns the user list body, if any.
    pub fn user_list(&self) -> Option<&UserListResult> {
        match &self.result {
            PayloadResult::UserList(list) => Some(list),
            _ => None,
        }
    }

    /// Returns the incoming message body, if any.
    pub fn incoming_message(&self) -> Option<&IncomingMessageResult> {
        match &self.result {
            PayloadResult::IncomingMessage(message) => Some(message),
            _ => None,
        }
    }
}
