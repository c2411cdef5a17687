// src/core/commands.rs

//! Parses wire request envelopes into the typed `Command` enum the session
//! handler dispatches on.

use crate::core::TradePostError;
use crate::core::protocol::{RequestKind, WireRequest};
use serde_json::{Map, Value};
use strum_macros::IntoStaticStr;

/// A fully parsed client request.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Login { nickname: String },
    Logout,
    GetBalance { nickname: String },
    BuyItem { nickname: String, item_name: String },
    SellItem { nickname: String, item_name: String },
}

impl Command {
    /// The protocol name of the command, for logging.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl TryFrom<WireRequest> for Command {
    type Error = TradePostError;

    fn try_from(request: WireRequest) -> Result<Self, Self::Error> {
        let kind = request
            .request_kind()
            .ok_or(TradePostError::UnknownRequestKind(request.kind))?;
        let payload = &request.payload;

        let command = match kind {
            RequestKind::Login => Command::Login {
                nickname: required_string(payload, "nickname")?,
            },
            RequestKind::Logout => Command::Logout,
            RequestKind::GetBalance => Command::GetBalance {
                nickname: required_string(payload, "nickname")?,
            },
            RequestKind::BuyItem => Command::BuyItem {
                nickname: required_string(payload, "nickname")?,
                item_name: required_string(payload, "item_name")?,
            },
            RequestKind::SellItem => Command::SellItem {
                nickname: required_string(payload, "nickname")?,
                item_name: required_string(payload, "item_name")?,
            },
        };
        Ok(command)
    }
}

/// Extracts a mandatory, non-empty string field from a request payload.
fn required_string(payload: &Map<String, Value>, field: &str) -> Result<String, TradePostError> {
    match payload.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(TradePostError::InvalidRequest(format!(
            "field '{field}' must not be empty"
        ))),
        Some(_) => Err(TradePostError::InvalidRequest(format!(
            "field '{field}' must be a string"
        ))),
        None => Err(TradePostError::InvalidRequest(format!(
            "missing field '{field}'"
        ))),
    }
}
