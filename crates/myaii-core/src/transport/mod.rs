//! Media transport collaborator.
//!
//! The WebRTC room that carries the avatar's audio and video is a sink from
//! this crate's point of view: it receives the credentials of a started
//! session and nothing else. This module also owns the process-wide media
//! initialization guard, which must run once before any room is joined.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::error::Result;

static MEDIA_GLOBALS: AtomicBool = AtomicBool::new(false);

/// Register process-wide media globals.
///
/// Idempotent; returns `true` only for the call that performed the
/// registration.
pub fn ensure_media_globals() -> bool {
    let registered = MEDIA_GLOBALS
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();
    if registered {
        info!("Media globals registered");
    } else {
        debug!("Media globals already registered");
    }
    registered
}

/// Tear down process-wide media globals.
///
/// Idempotent; returns `true` only for the call that performed the teardown.
pub fn release_media_globals() -> bool {
    let released = MEDIA_GLOBALS
        .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();
    if released {
        info!("Media globals released");
    }
    released
}

/// Whether media globals are currently registered
pub fn media_globals_registered() -> bool {
    MEDIA_GLOBALS.load(Ordering::Acquire)
}

/// Credentials admitting a client into the media room of a session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportCredentials {
    pub server_url: String,
    pub token: String,
}

impl std::fmt::Debug for TransportCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportCredentials")
            .field("server_url", &self.server_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A real-time media room client.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Join the room described by `credentials`.
    async fn connect(&self, credentials: &TransportCredentials) -> Result<()>;

    /// Leave the room, if joined.
    async fn disconnect(&self) -> Result<()>;
}

/// Transport that records the room it would join and logs transitions.
///
/// Used where no media pipeline is available, e.g. the CLI.
#[derive(Debug, Default)]
pub struct LoggingTransport {
    room: std::sync::Mutex<Option<String>>,
}

impl LoggingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the joined room
    pub fn room(&self) -> Option<String> {
        self.room.lock().ok().and_then(|room| room.clone())
    }
}

#[async_trait]
impl MediaTransport for LoggingTransport {
    async fn connect(&self, credentials: &TransportCredentials) -> Result<()> {
        if !media_globals_registered() {
            debug!("Joining media room before media globals were registered");
        }
        let mut room = self
            .room
            .lock()
            .map_err(|_| crate::error::Error::LockPoisoned)?;
        info!(server_url = %credentials.server_url, "Joining media room");
        *room = Some(credentials.server_url.clone());
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let mut room = self
            .room
            .lock()
            .map_err(|_| crate::error::Error::LockPoisoned)?;
        if let Some(url) = room.take() {
            info!(server_url = %url, "Left media room");
        }
        Ok(())
    }
}
