// src/core/state.rs

//! The shared server state handed to every connection handler.

use crate::config::Config;
use crate::core::engine::AccountEngine;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::time::Instant;

/// Metadata about one connected client, for logging and observability.
#[derive(Debug)]
pub struct ClientInfo {
    pub addr: SocketAddr,
    pub session_id: u64,
    /// Set once the session authenticates.
    pub nickname: Option<String>,
    pub connected_at: Instant,
}

/// Process-wide shared state: the configuration, the account engine and the
/// map of currently connected clients.
#[derive(Debug)]
pub struct ServerState {
    pub config: Config,
    pub engine: AccountEngine,
    pub clients: DashMap<u64, ClientInfo>,
}

impl ServerState {
    pub fn new(config: Config, engine: AccountEngine) -> Self {
        Self {
            config,
            engine,
            clients: DashMap::new(),
        }
    }
}
