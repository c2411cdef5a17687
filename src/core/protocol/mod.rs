// src/core/protocol/mod.rs

//! The wire protocol: tagged request/response envelopes and the framing codec.

mod wire;

pub use wire::{
    ClientCodec, EnvelopeCodec, MAX_FRAME_SIZE, RequestKind, ResponseStatus, ServerCodec,
    WireRequest, WireResponse,
};
