//! Presence tracking
//!
//! Online/offline status values and the idle-timeout rules that decide
//! when a user's reported status should follow their activity.

pub mod status;
pub mod tracker;

pub use status::UserStatus;
pub use tracker::refresh_status;
