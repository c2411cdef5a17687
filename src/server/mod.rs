// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;

mod connection_loop;
mod context;
mod initialization;

pub use context::ServerContext;

/// The main server startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    // 1. Open the store, build the engine and bind the listener.
    let server_context = initialization::setup(config).await?;

    // 2. Start the main connection acceptance loop. This runs until shutdown.
    connection_loop::run(server_context).await;

    Ok(())
}
