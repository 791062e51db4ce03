use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use crate::client::handler::SessionContext;
use crate::client::{Outbox, handle_client};
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::protocol::{JsonLineCodec, Operation, StatusCode, WireCodec, build_simple};
use crate::registry::{ConnectionHandle, UserRegistry};

pub struct Server {
    listener: TcpListener,
    ctx: SessionContext,
    next_handle: AtomicU64,
}

impl Server {
    /// Binds the listener and creates an empty registry sized by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        Self::bind_with_codec(config, Arc::new(JsonLineCodec)).await
    }

    pub async fn bind_with_codec(
        config: ServerConfig,
        codec: Arc<dyn WireCodec>,
    ) -> Result<Self, ChatServerError> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        info!("Server bound to {}", listener.local_addr()?);

        let ctx = SessionContext {
            registry: UserRegistry::shared(config.idle_threshold()),
            outbox: Outbox::new(),
            codec,
            config: Arc::new(config),
        };

        Ok(Self {
            listener,
            ctx,
            next_handle: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one spawned task per client.
    pub async fn start(&self) {
        info!(
            "Starting Rax chat server (max {} clients, idle after {}s)",
            self.ctx.config.max_clients, self.ctx.config.idle_threshold_secs
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let handle = ConnectionHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
                    let ctx = self.ctx.clone();

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, handle, ctx).await {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Admits a new connection if there is capacity, then runs its session.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    handle: ConnectionHandle,
    ctx: SessionContext,
) -> Result<(), ChatServerError> {
    let Some(outgoing) = ctx.outbox.try_attach(handle, ctx.config.max_clients).await else {
        warn!("Rejecting {}: connection limit reached", client_addr);
        let reply = build_simple(
            Operation::Unknown,
            StatusCode::InternalServerError,
            "Too many connections. Try again later.",
        );
        stream.write_all(&ctx.codec.encode_payload(&reply)?).await?;
        stream.shutdown().await?;
        return Ok(());
    };

    info!(
        "Accepted client {} as {} ({}/{} connections)",
        client_addr,
        handle,
        ctx.outbox.len().await,
        ctx.config.max_clients
    );

    handle_client(stream, client_addr, handle, outgoing, ctx).await;
    Ok(())
}
