// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a
//! client connection: decode a request, dispatch it to the account engine,
//! encode exactly one response, repeat.

use super::guard::ConnectionGuard;
use super::session::SessionState;
use crate::core::protocol::{ServerCodec, WireRequest, WireResponse};
use crate::core::state::ServerState;
use crate::core::{Command, TradePostError};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// The next step for the connection's main loop to take.
enum NextAction {
    Continue,
    ExitLoop,
}

/// Manages the full lifecycle of a client connection.
pub struct ConnectionHandler<S> {
    framed: Framed<S, ServerCodec>,
    addr: SocketAddr,
    state: Arc<ServerState>,
    session_id: u64,
    shutdown_rx: broadcast::Receiver<()>,
    session: SessionState,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        socket: S,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: u64,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            framed: Framed::new(socket, ServerCodec::new()),
            addr,
            state,
            session_id,
            shutdown_rx,
            session: SessionState::new(),
        }
    }

    /// The main event loop for the connection, handling incoming frames and
    /// shutdown signals. Strict request/response: each decoded request
    /// produces exactly one response before the next request is read.
    pub async fn run(&mut self) -> Result<(), TradePostError> {
        let _guard = ConnectionGuard::new(self.state.clone(), self.session_id, self.addr);
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Connection handler for {} received shutdown signal.", self.addr);
                    let _ = self
                        .framed
                        .send(WireResponse::error("Server is shutting down."))
                        .await;
                    break;
                }
                result = self.framed.next() => {
                    match result {
                        Some(Ok(request)) => {
                            debug!("Session {}: Received request: {:?}", self.session_id, request);
                            match self.process_request(request).await {
                                Ok(NextAction::Continue) => {}
                                Ok(NextAction::ExitLoop) => break,
                                // Business and protocol errors are recovered
                                // into an ERROR response; transport-level
                                // failures terminate the session.
                                Err(e) if e.is_recoverable() => {
                                    debug!("Session {}: Error response: {}", self.session_id, e);
                                    self.framed.send(WireResponse::error(e.to_string())).await?;
                                }
                                Err(e) => return Err(e),
                            }
                        }
                        Some(Err(e)) => {
                            if is_normal_disconnect(&e) {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Connection error for {}: {}", self.addr, e);
                            }
                            break;
                        }
                        None => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Parses a request envelope, routes it as a command, and sends the
    /// response.
    async fn process_request(
        &mut self,
        request: WireRequest,
    ) -> Result<NextAction, TradePostError> {
        let command = Command::try_from(request)?;
        debug!(
            "Session {}: Received command: {}",
            self.session_id,
            command.name()
        );

        // Any request before authentication other than LOGIN is rejected.
        if !self.session.is_authenticated && !matches!(command, Command::Login { .. }) {
            return Err(TradePostError::Unauthenticated);
        }

        let engine = &self.state.engine;
        match command {
            Command::Login { nickname } => {
                info!("Processing login for {nickname}.");
                let account = engine.login_or_create(&nickname).await?;
                self.session.authenticate(&nickname);
                if let Some(mut client) = self.state.clients.get_mut(&self.session_id) {
                    client.nickname = Some(nickname);
                }
                let response = WireResponse::success(json!({
                    "account": account,
                    "items": engine.catalog().all(),
                }));
                self.framed.send(response).await?;
                Ok(NextAction::Continue)
            }
            Command::Logout => {
                let response = WireResponse::success(json!({
                    "message": "Logged out successfully.",
                }));
                self.framed.send(response).await?;
                info!(
                    "Client {} ({}) logged out.",
                    self.addr,
                    self.session.nickname.as_deref().unwrap_or("unauthenticated")
                );
                Ok(NextAction::ExitLoop)
            }
            Command::GetBalance { nickname } => {
                debug!("Fetching balance for {nickname}.");
                let credits = engine.get_balance(&nickname).await?;
                let response = WireResponse::success(json!({ "credits": credits }));
                self.framed.send(response).await?;
                Ok(NextAction::Continue)
            }
            Command::BuyItem {
                nickname,
                item_name,
            } => {
                let account = engine.buy_item(&nickname, &item_name).await?;
                let response = WireResponse::success(json!({ "account": account }));
                self.framed.send(response).await?;
                Ok(NextAction::Continue)
            }
            Command::SellItem {
                nickname,
                item_name,
            } => {
                let account = engine.sell_item(&nickname, &item_name).await?;
                let response = WireResponse::success(json!({ "account": account }));
                self.framed.send(response).await?;
                Ok(NextAction::Continue)
            }
        }
    }
}

/// Helper function to check for non-critical disconnection errors.
fn is_normal_disconnect(e: &TradePostError) -> bool {
    matches!(e, TradePostError::Io(io_err) if matches!(
        io_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
