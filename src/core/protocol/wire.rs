// src/core/protocol/wire.rs

//! Implements the request/response envelope structures and the corresponding
//! `Encoder` and `Decoder` for network communication.
//!
//! Frames are a 4-byte big-endian length prefix followed by a JSON body. The
//! envelopes carry closed integer tags (`kind`, `status`) rather than open
//! string tags, so the protocol stays language-neutral and forward-compatible.

use crate::core::TradePostError;
use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use strum_macros::FromRepr;
use tokio_util::codec::{Decoder, Encoder};

/// Length of the frame header.
const LENGTH_PREFIX_LEN: usize = 4;

/// Protocol-level limit to prevent denial-of-service via oversized frames.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// The closed set of request kinds a client may send.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RequestKind {
    Login = 1,
    Logout = 2,
    GetBalance = 3,
    BuyItem = 4,
    SellItem = 5,
}

/// The closed set of response statuses the server may answer with.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ResponseStatus {
    Success = 200,
    Error = 300,
}

/// A request envelope as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    pub kind: u16,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl WireRequest {
    /// Builds a request envelope from a kind and a JSON object payload.
    pub fn new(kind: RequestKind, payload: Value) -> Self {
        Self {
            kind: kind as u16,
            payload: into_object(payload),
        }
    }

    /// Resolves the numeric tag into a `RequestKind`, if it is a known one.
    pub fn request_kind(&self) -> Option<RequestKind> {
        RequestKind::from_repr(self.kind)
    }
}

/// A response envelope as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub status: u16,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl WireResponse {
    /// Builds a SUCCESS response carrying the given JSON object payload.
    pub fn success(payload: Value) -> Self {
        Self {
            status: ResponseStatus::Success as u16,
            payload: into_object(payload),
        }
    }

    /// Builds an ERROR response carrying a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_string(), Value::String(message.into()));
        Self {
            status: ResponseStatus::Error as u16,
            payload,
        }
    }

    pub fn response_status(&self) -> Option<ResponseStatus> {
        ResponseStatus::from_repr(self.status)
    }

    pub fn is_success(&self) -> bool {
        self.response_status() == Some(ResponseStatus::Success)
    }
}

/// Coerces a JSON value into an object map. Non-object values are nested under
/// a `data` key so envelope payloads are always string-to-value mappings.
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    }
}

/// A `tokio_util::codec` implementation for length-prefixed JSON envelopes.
///
/// The codec is directional: `Tx` is what this side sends, `Rx` is what it
/// receives. The server and client aliases below fix the two orientations.
#[derive(Debug)]
pub struct EnvelopeCodec<Tx, Rx> {
    _marker: PhantomData<fn(Rx) -> Tx>,
}

impl<Tx, Rx> Default for EnvelopeCodec<Tx, Rx> {
    fn default() -> Self {
        Self::new()
    }
}

/// The codec orientation used by the server: sends responses, reads requests.
pub type ServerCodec = EnvelopeCodec<WireResponse, WireRequest>;

/// The codec orientation used by the client: sends requests, reads responses.
pub type ClientCodec = EnvelopeCodec<WireRequest, WireResponse>;

impl<Tx, Rx> EnvelopeCodec<Tx, Rx> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<Tx: Serialize, Rx> Encoder<Tx> for EnvelopeCodec<Tx, Rx> {
    type Error = TradePostError;

    fn encode(&mut self, item: Tx, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = serde_json::to_vec(&item)?;
        if body.len() > MAX_FRAME_SIZE {
            return Err(TradePostError::FrameTooLarge(body.len()));
        }
        dst.reserve(LENGTH_PREFIX_LEN + body.len());
        dst.put_u32(body.len() as u32);
        dst.extend_from_slice(&body);
        Ok(())
    }
}

impl<Tx, Rx: DeserializeOwned> Decoder for EnvelopeCodec<Tx, Rx> {
    type Item = Rx;
    type Error = TradePostError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_PREFIX_LEN {
            return Ok(None);
        }

        let mut length_bytes = [0u8; LENGTH_PREFIX_LEN];
        length_bytes.copy_from_slice(&src[..LENGTH_PREFIX_LEN]);
        let body_len = u32::from_be_bytes(length_bytes) as usize;

        if body_len > MAX_FRAME_SIZE {
            return Err(TradePostError::FrameTooLarge(body_len));
        }

        if src.len() < LENGTH_PREFIX_LEN + body_len {
            // Not a full frame yet; reserve space and wait for more data.
            src.reserve(LENGTH_PREFIX_LEN + body_len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_LEN);
        let body = src.split_to(body_len);
        let item = serde_json::from_slice(&body)
            .map_err(|e| TradePostError::Decode(e.to_string()))?;
        Ok(Some(item))
    }
}
