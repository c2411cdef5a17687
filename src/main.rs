// src/main.rs

//! The main entry point for the tradepost application. Runs as the account
//! server by default, or as the interactive client with `--client`.

use anyhow::Result;
use std::env;
use tracing::error;
use tracing_subscriber::filter::EnvFilter;
use tradepost::config::Config;
use tradepost::{client, server};

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("tradepost version {VERSION}");
        return Ok(());
    }

    let client_mode = args
        .iter()
        .any(|arg| arg == "-c" || arg == "--client");

    // An explicit --config must load; without the flag, defaults apply.
    let config_flag = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1).cloned());
    let mut config = match &config_flag {
        Some(path) => match Config::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load configuration from \"{path}\": {e}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Positional overrides: host, then port.
    match parse_positional(&args) {
        Ok((host, port)) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: tradepost [host] [port] [--config /path/to/config.toml] [--client]");
            std::process::exit(1);
        }
    }

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .compact()
        .with_ansi(true)
        .init();

    if client_mode {
        client::run(&config.host, config.port).await
    } else if let Err(e) = server::run(config).await {
        error!("Server runtime error: {}", e);
        Err(e)
    } else {
        Ok(())
    }
}

/// Extracts the optional positional `host` and `port` arguments, skipping
/// flags and the `--config` value.
fn parse_positional(args: &[String]) -> Result<(Option<String>, Option<u16>), String> {
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            iter.next();
        } else if !arg.starts_with('-') {
            positional.push(arg.clone());
        }
    }

    let host = positional.first().cloned();
    let port = match positional.get(1) {
        Some(raw) => Some(
            raw.parse::<u16>()
                .map_err(|_| format!("Invalid port number: {raw}"))?,
        ),
        None => None,
    };
    Ok((host, port))
}
