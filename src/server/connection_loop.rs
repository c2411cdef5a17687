// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling
//! graceful shutdown.

use super::context::ServerContext;
use crate::connection::ConnectionHandler;
use crate::core::protocol::{ServerCodec, WireResponse};
use crate::core::state::ClientInfo;
use futures::SinkExt;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

/// The main server loop that accepts connections and handles graceful shutdown.
pub async fn run(ctx: ServerContext) {
    let mut session_id_counter: u64 = 0;
    let mut client_tasks = JoinSet::new();

    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to create SIGINT stream");
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to create SIGTERM stream");

    loop {
        tokio::select! {
            biased;

            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown.");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown.");
                break;
            }

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        // The connection cap keeps thread-per-connection spawning
                        // bounded; connections beyond it are refused, not queued.
                        let Ok(permit) = ctx.connection_permits.clone().try_acquire_owned() else {
                            warn!("Refusing connection from {addr}: client limit reached.");
                            client_tasks.spawn(refuse_connection(socket));
                            continue;
                        };

                        info!("Client connected from {addr}.");
                        session_id_counter = session_id_counter.wrapping_add(1);
                        let session_id = session_id_counter;
                        let state = ctx.state.clone();
                        let shutdown_rx = ctx.shutdown_tx.subscribe();

                        state.clients.insert(session_id, ClientInfo {
                            addr,
                            session_id,
                            nickname: None,
                            connected_at: Instant::now(),
                        });

                        client_tasks.spawn(async move {
                            let _permit = permit;
                            let mut handler = ConnectionHandler::new(
                                socket, addr, state, session_id, shutdown_rx,
                            );
                            if let Err(e) = handler.run().await {
                                warn!("Connection from {} terminated unexpectedly: {}", addr, e);
                            }
                            debug!("Client connection {addr} closed.");
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res {
                    if e.is_panic() {
                        error!("A client handler panicked: {e:?}");
                    }
                }
            },
        }
    }

    info!("Shutting down. Sending signal to all sessions.");
    if ctx.shutdown_tx.send(()).is_err() {
        debug!("No active sessions to signal.");
    }

    if tokio::time::timeout(Duration::from_secs(10), async {
        while client_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for sessions to finish; aborting the rest.");
        client_tasks.shutdown().await;
    }
    info!("All client connections closed. Server shutdown complete.");
}

/// Answers one ERROR frame on an over-capacity connection, then drops it.
async fn refuse_connection(socket: TcpStream) {
    let mut framed = Framed::new(socket, ServerCodec::new());
    let _ = framed
        .send(WireResponse::error("Server is at capacity, try again later."))
        .await;
}
