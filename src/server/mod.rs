//! Server core functionality
//!
//! Listener setup and the accept loop that hands each connection to its
//! own session task.

pub mod core;

pub use core::Server;
