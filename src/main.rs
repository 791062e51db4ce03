//! RAX Chat Server - Entry Point
//!
//! A Rust chat server that tracks connected users and their presence.

use log::info;
use std::process;

use rax_chat_server::error::ChatServerError;
use rax_chat_server::error::handlers::handle_error;
use rax_chat_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat server...");

    if let Err(e) = run().await {
        handle_error(&e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ChatServerError> {
    let config = ServerConfig::load()?;
    let server = Server::bind(config).await?;
    server.start().await;
    Ok(())
}
