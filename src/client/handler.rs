use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

use crate::client::Outbox;
use crate::client::outbox::PayloadReceiver;
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::error::handlers::error_to_status_code;
use crate::protocol::{
    DispatchStatus, Operation, StatusCode, WireCodec, build_simple, handle_request,
};
use crate::registry::{ConnectionHandle, SharedRegistry};

/// Shared services a connection session needs.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: SharedRegistry,
    pub outbox: Outbox,
    pub codec: Arc<dyn WireCodec>,
    pub config: Arc<ServerConfig>,
}

/// Outcome of reading one request frame.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Line,
    TooLong,
    Closed,
}

/// Reads one newline-terminated frame into `line`, buffering at most
/// `limit` bytes plus the terminator.
async fn read_frame<R>(reader: &mut R, line: &mut Vec<u8>, limit: usize) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let bound = limit as u64 + 1;
    let n = (&mut *reader).take(bound).read_until(b'\n', line).await?;

    if n == 0 {
        Ok(Frame::Closed)
    } else if line.ends_with(b"\n") || (n as u64) < bound {
        Ok(Frame::Line)
    } else {
        Ok(Frame::TooLong)
    }
}

/// Drops input up to and including the next newline. Returns `false` on EOF.
async fn skip_line<R>(reader: &mut R) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(false);
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Handles one chat connection using Tokio async runtime.
///
/// - Reads newline-terminated request frames and decodes them with the codec.
/// - Dispatches each request with the registry locked, then releases the
///   lock before queueing the reply and any deliveries.
/// - A writer task drains the connection's outbox queue onto the socket.
/// - On exit the user is removed (non-strict) and the queue detached.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    handle: ConnectionHandle,
    outgoing: PayloadReceiver,
    ctx: SessionContext,
) {
    let origin = client_addr.ip().to_string();
    let (read_half, write_half) = stream.into_split();
    let writer = tokio::spawn(write_payloads(
        write_half,
        outgoing,
        Arc::clone(&ctx.codec),
        client_addr,
    ));

    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        match read_frame(&mut reader, &mut line, ctx.config.max_line_length).await {
            Ok(Frame::Closed) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(Frame::TooLong) => {
                warn!(
                    "Request from {} exceeds {} bytes, discarding line",
                    client_addr, ctx.config.max_line_length
                );
                let reply =
                    build_simple(Operation::Unknown, StatusCode::BadRequest, "Request too long");
                ctx.outbox.deliver(handle, reply).await;

                match skip_line(&mut reader).await {
                    Ok(true) => continue,
                    Ok(false) => {
                        info!("Connection closed by client {}", client_addr);
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read from {}: {}", client_addr, e);
                        break;
                    }
                }
            }
            Ok(Frame::Line) => {
                let request = match ctx.codec.decode_request(&line) {
                    Ok(request) => request,
                    Err(e) => {
                        let err = ChatServerError::from(e);
                        warn!("Undecodable request from {}: {}", client_addr, err);
                        let reply =
                            build_simple(Operation::Unknown, error_to_status_code(&err), err.to_string());
                        ctx.outbox.deliver(handle, reply).await;
                        continue;
                    }
                };
                debug!("Received from {} ({}): {:?}", client_addr, handle, request);

                let result = {
                    let mut registry = ctx.registry.lock().await;
                    handle_request(&mut registry, handle, &origin, &request, &ctx.config)
                };

                debug!(
                    "Reply to {}: {} {}",
                    client_addr,
                    result.reply.status_code.code(),
                    result.reply.message
                );
                ctx.outbox.deliver(handle, result.reply).await;
                for delivery in result.deliveries {
                    if !ctx.outbox.deliver(delivery.recipient, delivery.payload).await {
                        debug!("Recipient {} disconnected before delivery", delivery.recipient);
                    }
                }

                if result.status == DispatchStatus::CloseConnection {
                    info!("Client {} unregistered", client_addr);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    // Idempotent after an explicit unregister.
    if let Err(e) = ctx.registry.lock().await.remove(handle, false) {
        warn!("Failed to remove {} from registry: {}", handle, e);
    }
    ctx.outbox.detach(handle).await;

    if let Err(e) = writer.await {
        error!("Writer task for {} failed: {}", client_addr, e);
    }
    info!("Client {} disconnected", client_addr);
}

/// Encodes queued payloads onto the socket until the queue closes.
async fn write_payloads(
    mut write_half: OwnedWriteHalf,
    mut outgoing: PayloadReceiver,
    codec: Arc<dyn WireCodec>,
    client_addr: SocketAddr,
) {
    while let Some(payload) = outgoing.recv().await {
        let bytes = match codec.encode_payload(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Dropping payload for {}: {}", client_addr, e);
                continue;
            }
        };
        if let Err(e) = write_half.write_all(&bytes).await {
            error!("Failed to write to {}: {}", client_addr, e);
            return;
        }
    }
    let _ = write_half.shutdown().await;
}
