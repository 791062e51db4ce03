//! Chat protocol implementation
//!
//! Request and payload types, the response builder, the wire codec, and
//! request dispatch against the user registry.

pub mod builder;
pub mod codec;
pub mod handlers;
pub mod requests;
pub mod responses;

pub use builder::{build_incoming_message, build_simple, build_user_list};
pub use codec::{JsonLineCodec, WireCodec};
pub use handlers::handle_request;
pub use requests::{Delivery, DispatchResult, DispatchStatus, Request};
pub use responses::{
    IncomingMessageResult, MessageType, Operation, Payload, PayloadResult, StatusCode, UserEntry,
    UserListResult, UserListType,
};
