//! Client connection management
//!
//! Per-connection session loop and the outbound queues used to deliver
//! payloads to connected clients.

pub mod handler;
pub mod outbox;

pub use handler::handle_client;
pub use outbox::Outbox;
