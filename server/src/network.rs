//! Server network layer: TCP accept loop and per-connection tasks

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::game::{Game, ServerEvent};
use crate::round::QuestionSource;
use crate::session::{ConnectionHandle, ConnectionId};
use log::{debug, error, info, warn};
use shared::{write_message, Message, MessageReader, ProtocolError};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Trivia server bound to its listening socket
pub struct Server {
    listener: TcpListener,
    game: Game,
}

impl Server {
    pub async fn bind(
        config: ServerConfig,
        questions: Box<dyn QuestionSource>,
    ) -> Result<Self, ServerError> {
        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            game: Game::new(config, questions),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs until the game finishes
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs until the game finishes or `shutdown` resolves.
    ///
    /// On shutdown the game is finished early: final standings are
    /// broadcast and every connection is closed.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let Server { listener, game } = self;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut orchestrator = tokio::spawn(game.run(event_rx));
        let mut next_id: ConnectionId = 1;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let id = next_id;
                        next_id += 1;
                        info!("[+] connection {} from {}", id, addr);
                        tokio::spawn(handle_connection(stream, id, event_tx.clone()));
                    }
                    Err(e) => warn!("Failed to accept connection: {}", e),
                },
                result = &mut orchestrator => {
                    if let Err(e) = result {
                        error!("Orchestrator task failed: {}", e);
                    }
                    break;
                }
                _ = &mut shutdown => {
                    info!("Shutting down");
                    let _ = event_tx.send(ServerEvent::Shutdown);
                    if let Err(e) = orchestrator.await {
                        error!("Orchestrator task failed: {}", e);
                    }
                    break;
                }
            }
        }

        info!("No longer accepting connections");
        Ok(())
    }
}

/// Longest a single outbound write may block before the peer is dropped
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads messages from one client and hands outbound traffic to a writer task.
///
/// The task ends when the peer closes the stream, the transport fails, or
/// the writer stops (the game released the connection handle, or a write
/// failed or timed out). In every case the game is told the connection is
/// gone, which it treats like BYE.
async fn handle_connection(
    stream: TcpStream,
    id: ConnectionId,
    events: mpsc::UnboundedSender<ServerEvent>,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = MessageReader::new(BufReader::new(read_half));
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let handle = ConnectionHandle::new(id, outbound_tx);
    if events.send(ServerEvent::Connected { id, handle }).is_err() {
        return;
    }
    let mut writer = tokio::spawn(write_outbound(write_half, outbound_rx, id));

    loop {
        tokio::select! {
            inbound = reader.next_message() => match inbound {
                Ok(Some(message)) => {
                    if events.send(ServerEvent::MessageReceived { id, message }).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    info!("[-] connection {} closed by peer", id);
                    break;
                }
                Err(ProtocolError::Malformed(e)) => {
                    warn!("Ignoring malformed message from connection {}: {}", id, e);
                }
                Err(e) => {
                    warn!("Receive error from connection {}: {}", id, e);
                    break;
                }
            },
            _ = &mut writer => {
                debug!("Connection {} writer stopped", id);
                break;
            }
        }
    }

    // The game drops the handle on disconnect, which ends a running writer
    let _ = events.send(ServerEvent::Disconnected { id });
}

/// Writes queued messages until the queue closes, then shuts the stream down.
///
/// Returns early if a write fails or does not complete within
/// [`WRITE_TIMEOUT`].
async fn write_outbound<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    id: ConnectionId,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        match timeout(WRITE_TIMEOUT, write_message(&mut writer, &message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Send error to connection {}: {}", id, e);
                return;
            }
            Err(_) => {
                warn!("Send to connection {} timed out", id);
                return;
            }
        }
    }

    debug!("Connection {} released by the game", id);
    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown of connection {} failed: {}", id, e);
    }
}
