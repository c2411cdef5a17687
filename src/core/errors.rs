// src/core/errors.rs

//! Defines the primary error type for the entire application.

use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum TradePostError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame of {0} bytes exceeds the maximum frame size")]
    FrameTooLarge(usize),

    #[error("Malformed frame: {0}")]
    Decode(String),

    #[error("Unknown request kind '{0}'")]
    UnknownRequestKind(u16),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Item '{0}' is not sold here")]
    UnknownItem(String),

    #[error("Item '{0}' is already owned")]
    AlreadyOwned(String),

    #[error("Item '{0}' is not owned")]
    NotOwned(String),

    #[error("Insufficient credits: item costs {price}, balance is {balance}")]
    InsufficientFunds { price: i64, balance: i64 },

    #[error("Store Error: {0}")]
    Store(String),
}

impl TradePostError {
    /// Returns true for failures that are reported to the client as an ERROR
    /// response while the session keeps running. Transport and decode failures
    /// are not recoverable and terminate the session instead.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            TradePostError::Io(_) | TradePostError::FrameTooLarge(_) | TradePostError::Decode(_)
        )
    }
}

// --- From trait implementations for easy error conversion ---

impl From<serde_json::Error> for TradePostError {
    fn from(e: serde_json::Error) -> Self {
        TradePostError::Decode(e.to_string())
    }
}

impl From<sqlx::Error> for TradePostError {
    fn from(e: sqlx::Error) -> Self {
        TradePostError::Store(e.to_string())
    }
}
