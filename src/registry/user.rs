//! Module `user`
//!
//! Defines the `User` record held by the registry and the opaque
//! `ConnectionHandle` that ties it to a transport connection.

use std::fmt;
use std::time::Instant;

use crate::presence::UserStatus;

/// Opaque identifier of a client's transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(u64);

impl ConnectionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered chat user.
///
/// Name, origin and connection handle are fixed at registration. Status
/// and activity are only changed through the registry and presence rules.
#[derive(Debug, Clone)]
pub struct User {
    connection_handle: ConnectionHandle,
    name: String,
    origin: String,
    status: UserStatus,
    status_auto_updated: bool,
    last_interaction_at: Instant,
}

impl User {
    /// Creates an online user whose last interaction is now.
    pub(crate) fn new(connection_handle: ConnectionHandle, name: String, origin: String) -> Self {
        Self {
            connection_handle,
            name,
            origin,
            status: UserStatus::Online,
            status_auto_updated: false,
            last_interaction_at: Instant::now(),
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn connection_handle(&self) -> ConnectionHandle {
        self.connection_handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Network address the user connected from. Informational only.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Returns whether the current status was set by the idle rules rather
    /// than by an explicit status change.
    pub fn status_auto_updated(&self) -> bool {
        self.status_auto_updated
    }

    pub fn last_interaction_at(&self) -> Instant {
        self.last_interaction_at
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Records activity by the user at the current instant.
    pub fn update_last_interaction(&mut self) {
        self.last_interaction_at = Instant::now();
    }

    #[cfg(test)]
    pub(crate) fn set_last_interaction_at(&mut self, at: Instant) {
        self.last_interaction_at = at;
    }

    /// Explicit status change. Clears the auto-updated flag.
    pub(crate) fn set_status(&mut self, status: UserStatus) {
        self.status = status;
        self.status_auto_updated = false;
    }

    /// Status change made by the idle rules.
    pub(crate) fn set_auto_status(&mut self, status: UserStatus) {
        self.status = status;
        self.status_auto_updated = true;
    }
}
