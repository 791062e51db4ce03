//! Registry store
//!
//! Ordered, duplicate-free collection of the currently connected users.

use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::RegistryError;
use crate::presence::{UserStatus, refresh_status};
use crate::registry::{ConnectionHandle, User};

/// Process-wide registry handle. Every operation, including list building
/// that applies idle decay, runs while holding this lock.
pub type SharedRegistry = Arc<Mutex<UserRegistry>>;

/// Lookup criteria. Unset fields match any user.
#[derive(Debug, Clone, Default)]
pub struct UserFilter<'a> {
    pub name: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub handle: Option<ConnectionHandle>,
}

impl<'a> UserFilter<'a> {
    pub fn by_name(name: &'a str) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn by_handle(handle: ConnectionHandle) -> Self {
        Self {
            handle: Some(handle),
            ..Self::default()
        }
    }

    pub fn with_origin(mut self, origin: &'a str) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.origin.is_none() && self.handle.is_none()
    }

    fn matches(&self, user: &User) -> bool {
        self.name.is_none_or(|name| user.name() == name)
            && self.origin.is_none_or(|origin| user.origin() == origin)
            && self.handle.is_none_or(|handle| user.connection_handle() == handle)
    }
}

/// Target of an explicit status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Handle(ConnectionHandle),
    Name(String),
}

impl UserKey {
    fn matches(&self, user: &User) -> bool {
        match self {
            UserKey::Handle(handle) => user.connection_handle() == *handle,
            UserKey::Name(name) => user.name() == name,
        }
    }
}

/// Registry of connected users, iterated in registration order.
#[derive(Debug)]
pub struct UserRegistry {
    users: Vec<User>,
    count: usize,
    idle_threshold: Duration,
}

impl UserRegistry {
    pub fn new(idle_threshold: Duration) -> Self {
        Self {
            users: Vec::new(),
            count: 0,
            idle_threshold,
        }
    }

    /// Wraps the registry for sharing between connection tasks.
    pub fn shared(idle_threshold: Duration) -> SharedRegistry {
        Arc::new(Mutex::new(Self::new(idle_threshold)))
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    /// Returns the first user, in registration order, matching every set
    /// field of `filter`. An empty filter yields the first registered user.
    pub fn lookup(&self, filter: &UserFilter<'_>) -> Option<&User> {
        if filter.is_empty() {
            debug!("Registry lookup without filters, returning first user");
        }
        self.users.iter().find(|user| filter.matches(user))
    }

    pub(crate) fn lookup_mut(&mut self, filter: &UserFilter<'_>) -> Option<&mut User> {
        self.users.iter_mut().find(|user| filter.matches(user))
    }

    /// Registers a new online user at the end of the registration order.
    ///
    /// Fails without touching the registry if the name is empty or taken,
    /// or if the connection already has a user.
    pub fn register(
        &mut self,
        handle: ConnectionHandle,
        name: &str,
        origin: &str,
    ) -> Result<&User, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName("username cannot be empty".into()));
        }

        if self.users.iter().any(|user| user.name() == name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }

        if self.users.iter().any(|user| user.connection_handle() == handle) {
            return Err(RegistryError::HandleInUse(handle));
        }

        self.users
            .push(User::new(handle, name.to_string(), origin.to_string()));
        self.count += 1;

        debug!(
            "Registered {} as '{}' from {} ({} users)",
            handle, name, origin, self.count
        );

        let index = self.users.len() - 1;
        Ok(&self.users[index])
    }

    /// Removes the user bound to `handle`, keeping the others in order.
    ///
    /// A missing user is `NotFound` when `strict`, otherwise a no-op.
    pub fn remove(&mut self, handle: ConnectionHandle, strict: bool) -> Result<(), RegistryError> {
        match self
            .users
            .iter()
            .position(|user| user.connection_handle() == handle)
        {
            Some(index) => {
                let user = self.users.remove(index);
                self.count -= 1;
                debug!(
                    "Removed '{}' ({}), {} users remain",
                    user.name(),
                    handle,
                    self.count
                );
                Ok(())
            }
            None if strict => Err(RegistryError::NotFound),
            None => Ok(()),
        }
    }

    /// Records activity for the user bound to `handle`.
    pub fn update_last_interaction(
        &mut self,
        handle: ConnectionHandle,
    ) -> Result<(), RegistryError> {
        let user = self
            .lookup_mut(&UserFilter::by_handle(handle))
            .ok_or(RegistryError::NotFound)?;
        user.update_last_interaction();
        Ok(())
    }

    /// Explicitly sets a user's status, clearing the auto-updated flag.
    ///
    /// A missing user is `NotFound` when `strict`, otherwise a no-op.
    pub fn set_status(
        &mut self,
        key: &UserKey,
        status: UserStatus,
        strict: bool,
    ) -> Result<(), RegistryError> {
        match self.users.iter_mut().find(|user| key.matches(user)) {
            Some(user) => {
                user.set_status(status);
                debug!("Status of '{}' set to {}", user.name(), status);
                Ok(())
            }
            None if strict => Err(RegistryError::NotFound),
            None => Ok(()),
        }
    }

    /// Applies the idle rules to one user now. Returns `None` if no user is
    /// bound to `handle`, otherwise whether the status changed.
    pub fn refresh_presence(&mut self, handle: ConnectionHandle) -> Option<bool> {
        let threshold = self.idle_threshold;
        let user = self.lookup_mut(&UserFilter::by_handle(handle))?;
        Some(refresh_status(user, Instant::now(), threshold))
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.count, self.users.len());
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Users in registration order. Each call starts from the first user.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.iter()
    }

    /// Mutable walk in registration order, used to apply idle decay while
    /// scanning.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut User> {
        self.users.iter_mut()
    }
}
