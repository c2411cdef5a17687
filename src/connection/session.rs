// src/connection/session.rs

//! Defines the state associated with a single client session.

/// Holds the state specific to a single client session. A session starts
/// unauthenticated, becomes authenticated on a successful LOGIN, and is
/// destroyed on logout, transport failure or disconnect.
#[derive(Debug, Default)]
pub struct SessionState {
    /// True once the client has logged in with a nickname.
    pub is_authenticated: bool,
    /// The nickname supplied at login.
    pub nickname: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the session as authenticated for the given nickname.
    pub fn authenticate(&mut self, nickname: &str) {
        self.is_authenticated = true;
        self.nickname = Some(nickname.to_string());
    }
}
