// src/connection/mod.rs

mod guard;
mod handler;
mod session;

pub use handler::ConnectionHandler;
pub use session::SessionState;
