// src/server/initialization.rs

//! Performs the server's startup sequence: store, engine, state, listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::cache::AccountCache;
use crate::core::engine::AccountEngine;
use crate::core::state::ServerState;
use crate::core::store::AccountStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};
use tracing::info;

/// Opens the durable store, assembles the account engine and binds the
/// listening socket.
pub async fn setup(config: Config) -> Result<ServerContext> {
    let store = AccountStore::open(
        &config.db_path,
        config.starting_credit_min,
        config.starting_credit_max,
    )
    .await
    .with_context(|| format!("Failed to open account store at '{}'", config.db_path))?;

    let cache = AccountCache::new(config.cache_capacity);
    let engine = AccountEngine::new(cache, store);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Server running on {addr}.");

    let (shutdown_tx, _) = broadcast::channel(1);
    let connection_permits = Arc::new(Semaphore::new(config.max_clients));
    let state = Arc::new(ServerState::new(config, engine));

    Ok(ServerContext {
        listener,
        state,
        shutdown_tx,
        connection_permits,
    })
}
