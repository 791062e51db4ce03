//! User registry
//!
//! Owns the connected users, enforces name and connection uniqueness, and
//! keeps them in registration order.

pub mod store;
pub mod user;

pub use store::{SharedRegistry, UserFilter, UserKey, UserRegistry};
pub use user::{ConnectionHandle, User};
