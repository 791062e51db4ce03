//! Request handlers for the Rax chat server.
//!
//! Each handler runs with exclusive access to the user registry and
//! returns the reply for the requesting connection plus any payloads that
//! must be delivered to other connections.

use log::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::handlers::error_to_status_code;
use crate::error::{ChatServerError, RegistryError};
use crate::presence::UserStatus;
use crate::protocol::{
    Delivery, DispatchResult, MessageType, Operation, Request, StatusCode, build_incoming_message,
    build_simple, build_user_list,
};
use crate::registry::{ConnectionHandle, UserFilter, UserKey, UserRegistry};

/// Dispatches a decoded request from `handle` to its handler.
///
/// Connections without a registered user may only register. For registered
/// users every request counts as activity and refreshes their presence
/// before it is handled.
pub fn handle_request(
    registry: &mut UserRegistry,
    handle: ConnectionHandle,
    origin: &str,
    request: &Request,
    config: &ServerConfig,
) -> DispatchResult {
    let registered = registry.lookup(&UserFilter::by_handle(handle)).is_some();
    if registered {
        if let Err(e) = registry.update_last_interaction(handle) {
            warn!("Could not record activity for {}: {}", handle, e);
        }
        let changed = registry.refresh_presence(handle);
        if changed == Some(true) {
            debug!("Presence of {} refreshed after activity", handle);
        }
    }

    match request {
        Request::RegisterUser { username } => {
            handle_register(registry, handle, origin, username, config)
        }
        _ if !registered => DispatchResult::reply(build_simple(
            request.operation(),
            StatusCode::BadRequest,
            "Register a username first",
        )),
        Request::UpdateStatus { status } => handle_update_status(registry, handle, *status),
        Request::GetUsers { username } => {
            DispatchResult::reply(build_user_list(registry, username.as_deref()))
        }
        Request::SendMessage { recipient, content } => {
            handle_send_message(registry, handle, recipient.as_deref(), content)
        }
        Request::UnregisterUser => handle_unregister(registry, handle),
    }
}

/// Reply for a registry operation that failed.
fn registry_failure(operation: Operation, error: RegistryError) -> DispatchResult {
    let message = error.to_string();
    let status_code = error_to_status_code(&ChatServerError::from(error));
    DispatchResult::reply(build_simple(operation, status_code, message))
}

/// Checks a requested username before it reaches the registry.
fn validate_username(username: &str, max_length: usize) -> Result<(), RegistryError> {
    if username.is_empty() {
        return Err(RegistryError::InvalidName("username cannot be empty".into()));
    }
    if username.len() > max_length {
        return Err(RegistryError::InvalidName(format!(
            "username longer than {} bytes",
            max_length
        )));
    }
    if username.chars().any(char::is_control) {
        return Err(RegistryError::InvalidName(
            "username contains control characters".into(),
        ));
    }
    Ok(())
}

fn handle_register(
    registry: &mut UserRegistry,
    handle: ConnectionHandle,
    origin: &str,
    username: &str,
    config: &ServerConfig,
) -> DispatchResult {
    if let Some(user) = registry.lookup(&UserFilter::by_handle(handle)) {
        return DispatchResult::reply(build_simple(
            Operation::RegisterUser,
            StatusCode::BadRequest,
            format!("Connection is already registered as '{}'", user.name()),
        ));
    }

    let username = username.trim();
    let result = validate_username(username, config.max_username_length)
        .and_then(|_| registry.register(handle, username, origin).map(|_| ()));

    match result {
        Ok(()) => {
            info!("User '{}' registered from {} ({})", username, origin, handle);
            DispatchResult::reply(build_simple(
                Operation::RegisterUser,
                StatusCode::Ok,
                "User registered successfully",
            ))
        }
        Err(e) => registry_failure(Operation::RegisterUser, e),
    }
}

fn handle_update_status(
    registry: &mut UserRegistry,
    handle: ConnectionHandle,
    status: UserStatus,
) -> DispatchResult {
    match registry.set_status(&UserKey::Handle(handle), status, true) {
        Ok(()) => DispatchResult::reply(build_simple(
            Operation::UpdateStatus,
            StatusCode::Ok,
            format!("Status changed to {}", status),
        )),
        Err(e) => registry_failure(Operation::UpdateStatus, e),
    }
}

fn handle_send_message(
    registry: &UserRegistry,
    handle: ConnectionHandle,
    recipient: Option<&str>,
    content: &str,
) -> DispatchResult {
    if content.trim().is_empty() {
        return DispatchResult::reply(build_simple(
            Operation::SendMessage,
            StatusCode::BadRequest,
            "Message content cannot be empty",
        ));
    }

    let Some(sender) = registry.lookup(&UserFilter::by_handle(handle)) else {
        return registry_failure(Operation::SendMessage, RegistryError::NotFound);
    };
    let sender_name = sender.name();

    let deliveries: Vec<Delivery> = match recipient {
        None => {
            let payload = build_incoming_message(sender_name, content, MessageType::Broadcast);
            registry
                .iter()
                .filter(|user| user.connection_handle() != handle)
                .map(|user| Delivery {
                    recipient: user.connection_handle(),
                    payload: payload.clone(),
                })
                .collect()
        }
        Some(name) if name == sender_name => {
            return DispatchResult::reply(build_simple(
                Operation::SendMessage,
                StatusCode::BadRequest,
                "Cannot send a direct message to yourself",
            ));
        }
        Some(name) => match registry.lookup(&UserFilter::by_name(name)) {
            Some(target) => vec![Delivery {
                recipient: target.connection_handle(),
                payload: build_incoming_message(sender_name, content, MessageType::Direct),
            }],
            None => {
                return DispatchResult::reply(build_simple(
                    Operation::SendMessage,
                    StatusCode::BadRequest,
                    format!("Recipient '{}' is not connected", name),
                ));
            }
        },
    };

    debug!(
        "Message from '{}' routed to {} connection(s)",
        sender_name,
        deliveries.len()
    );

    DispatchResult::reply(build_simple(
        Operation::SendMessage,
        StatusCode::Ok,
        "Message sent",
    ))
    .with_deliveries(deliveries)
}

fn handle_unregister(registry: &mut UserRegistry, handle: ConnectionHandle) -> DispatchResult {
    match registry.remove(handle, true) {
        Ok(()) => DispatchResult::close(build_simple(
            Operation::UnregisterUser,
            StatusCode::Ok,
            "User unregistered, goodbye",
        )),
        Err(e) => registry_failure(Operation::UnregisterUser, e),
    }
}
