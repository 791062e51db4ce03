//! Response builder
//!
//! Assembles payloads from registry state. Nothing here touches bytes;
//! encoding is left to a `WireCodec`.
//!
//! `build_user_list` applies idle decay to every user it visits, so the
//! reported statuses already reflect elapsed idle time. It mutates the
//! registry and must run under the same lock as writes.

use std::time::Instant;

use crate::presence::refresh_status;
use crate::protocol::{
    IncomingMessageResult, MessageType, Operation, Payload, PayloadResult, StatusCode, UserEntry,
    UserListResult, UserListType,
};
use crate::registry::UserRegistry;

const USER_LIST_SENT: &str = "Connected users list sent successfully";
const USER_NOT_FOUND: &str = "The requested user does not exist";
const MESSAGE_RECEIVED: &str = "New message received";

/// Generic status/message envelope for acknowledgements and errors.
pub fn build_simple(
    operation: Operation,
    status_code: StatusCode,
    message: impl Into<String>,
) -> Payload {
    Payload {
        operation,
        status_code,
        message: message.into(),
        result: PayloadResult::None,
    }
}

/// Lists every user, or the single user named `username`.
///
/// With a filter the scan stops at the first match; an unknown name yields
/// a `BadRequest` payload with an empty list.
pub fn build_user_list(registry: &mut UserRegistry, username: Option<&str>) -> Payload {
    let now = Instant::now();
    let threshold = registry.idle_threshold();
    let mut users = Vec::new();

    for user in registry.iter_mut() {
        refresh_status(user, now, threshold);

        if let Some(name) = username {
            if user.name() != name {
                continue;
            }
            users.push(UserEntry::from(&*user));
            break;
        }

        users.push(UserEntry::from(&*user));
    }

    let list_type = match username {
        Some(_) => UserListType::Single,
        None => UserListType::All,
    };

    let (status_code, message) = if username.is_some() && users.is_empty() {
        (StatusCode::BadRequest, USER_NOT_FOUND)
    } else {
        (StatusCode::Ok, USER_LIST_SENT)
    };

    Payload {
        operation: Operation::GetUsers,
        status_code,
        message: message.to_string(),
        result: PayloadResult::UserList(UserListResult { list_type, users }),
    }
}

/// Wraps a chat message for delivery to a recipient.
pub fn build_incoming_message(sender: &str, content: &str, message_type: MessageType) -> Payload {
    Payload {
        operation: Operation::IncomingMessage,
        status_code: StatusCode::Ok,
        message: MESSAGE_RECEIVED.to_string(),
        result: PayloadResult::IncomingMessage(IncomingMessageResult {
            sender: sender.to_string(),
            content: content.to_string(),
            message_type,
        }),
    }
}
