// src/server/context.rs

//! Holds all state required by the running server.

use crate::core::state::ServerState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};

/// Everything the accept loop needs: the bound listener, the shared state,
/// the shutdown channel and the connection-cap semaphore.
pub struct ServerContext {
    pub listener: TcpListener,
    pub state: Arc<ServerState>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub connection_permits: Arc<Semaphore>,
}
