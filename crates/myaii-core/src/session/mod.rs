//! Avatar session lifecycle.
//!
//! - `lifecycle`: the [`AvatarSession`] facade that owns the state machine
//! - `SessionState` / `SessionStatus`: the states it moves through

mod lifecycle;

pub use lifecycle::AvatarSession;

use serde::Serialize;
use std::fmt;

use crate::streaming::SessionHandle;

/// Observable status of an avatar session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Connecting => write!(f, "connecting"),
            SessionStatus::Connected => write!(f, "connected"),
            SessionStatus::Error => write!(f, "error"),
        }
    }
}

/// State held by the facade.
#[derive(Debug, Clone, Default)]
pub(crate) enum SessionState {
    #[default]
    Idle,
    Connecting,
    Connected(SessionHandle),
    Error(String),
}

impl SessionState {
    pub(crate) fn status(&self) -> SessionStatus {
        match self {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Connecting => SessionStatus::Connecting,
            SessionState::Connected(_) => SessionStatus::Connected,
            SessionState::Error(_) => SessionStatus::Error,
        }
    }
}
