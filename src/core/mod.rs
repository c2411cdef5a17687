// src/core/mod.rs

//! The central module containing the core logic and data structures of tradepost.

pub mod account;
pub mod cache;
pub mod catalog;
pub mod commands;
pub mod engine;
pub mod errors;
pub mod protocol;
pub mod state;
pub mod store;

pub use commands::Command;
pub use errors::TradePostError;
