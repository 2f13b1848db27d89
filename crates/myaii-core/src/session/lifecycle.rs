//! Session facade: start, send and stop against one logical avatar slot.
//!
//! State transitions happen under a single mutex so concurrent callers see
//! `connecting`/`connected` instead of racing to open a second remote
//! session. The lock is never held across an await.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::{SessionState, SessionStatus};
use crate::config::StreamingConfig;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::streaming::{NewSessionOptions, SessionHandle, StreamingClient, TaskType};

#[derive(Debug, Default)]
struct Slot {
    state: SessionState,
    /// Bumped by every start and stop; a start only commits its result if
    /// nothing else happened since it began.
    epoch: u64,
}

/// Avatar session facade owning the lifecycle state machine.
pub struct AvatarSession {
    client: StreamingClient,
    retry: RetryPolicy,
    slot: Mutex<Slot>,
}

impl AvatarSession {
    /// Create a facade using the client's configured retry policy.
    pub fn new(client: StreamingClient) -> Self {
        let retry = client.config().retry.clone();
        Self::with_retry(client, retry)
    }

    /// Create a facade with an explicit retry policy.
    pub fn with_retry(client: StreamingClient, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Build client and facade from configuration.
    pub fn from_config(config: StreamingConfig) -> Result<Self> {
        Ok(Self::new(StreamingClient::new(config)?))
    }

    pub fn client(&self) -> &StreamingClient {
        &self.client
    }

    /// Whether the provider API key is available.
    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        self.slot().state.status()
    }

    /// Handle of the connected session, if any
    pub fn handle(&self) -> Option<SessionHandle> {
        match &self.slot().state {
            SessionState::Connected(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    /// Message of the failure that put the session into `error`
    pub fn last_error(&self) -> Option<String> {
        match &self.slot().state {
            SessionState::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Start a session: token, create, start, under the retry policy.
    ///
    /// Returns the existing handle when already connected and
    /// [`Error::SessionBusy`] when another start is in flight.
    pub async fn start(&self, options: &NewSessionOptions) -> Result<SessionHandle> {
        let epoch = {
            let mut slot = self.slot();
            if let SessionState::Connected(handle) = &slot.state {
                debug!(session_id = %handle.session_id(), "Avatar session already connected");
                return Ok(handle.clone());
            }
            if matches!(slot.state, SessionState::Connecting) {
                return Err(Error::SessionBusy(
                    "an avatar session start is already in progress".to_string(),
                ));
            }
            slot.state = SessionState::Connecting;
            slot.epoch += 1;
            slot.epoch
        };
        let pending = PendingStart {
            session: self,
            epoch,
            armed: true,
        };

        info!("Starting avatar session");
        let abandoned = Mutex::new(None);
        let result = self
            .retry
            .run("avatar session start", || self.open(options, &abandoned))
            .await;
        pending.disarm();

        let committed = {
            let mut slot = self.slot();
            if slot.epoch == epoch && matches!(slot.state, SessionState::Connecting) {
                slot.state = match &result {
                    Ok(handle) => SessionState::Connected(handle.clone()),
                    Err(e) => SessionState::Error(e.to_string()),
                };
                true
            } else {
                false
            }
        };

        if !committed {
            if let Ok(handle) = &result {
                info!(
                    session_id = %handle.session_id(),
                    "Avatar session stopped while connecting, releasing it"
                );
                self.client.stop_session(handle).await;
            }
            return Err(Error::Cancelled);
        }

        if let Err(e) = &result {
            warn!("Avatar session start failed: {}", e);
        }
        result
    }

    /// Send text to the connected session.
    pub async fn send(&self, text: &str, task_type: TaskType) -> Result<()> {
        let handle = self.handle().ok_or(Error::NotConnected)?;
        self.client.send_text(&handle, text, task_type).await
    }

    /// Return to `idle`, terminating the held session best-effort.
    pub async fn stop(&self) {
        let previous = {
            let mut slot = self.slot();
            slot.epoch += 1;
            std::mem::take(&mut slot.state)
        };

        match previous {
            SessionState::Connected(handle) => self.client.stop_session(&handle).await,
            SessionState::Connecting => {
                info!("Stop requested while connecting; the pending start will be cancelled")
            }
            SessionState::Idle | SessionState::Error(_) => debug!("No avatar session to stop"),
        }
    }

    /// One pass of token, create, start.
    ///
    /// A session created by an earlier pass whose start failed is stopped
    /// before a new one is created; the last failed pass leaves its handle
    /// in `abandoned` to be discarded.
    async fn open(
        &self,
        options: &NewSessionOptions,
        abandoned: &Mutex<Option<SessionHandle>>,
    ) -> Result<SessionHandle> {
        let previous = abandoned.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = previous {
            debug!(session_id = %handle.session_id(), "Stopping session left by a failed attempt");
            self.client.stop_session(&handle).await;
        }

        let token = self.client.create_token().await?;
        let handle = self.client.create_session(&token, options).await?;
        if let Err(e) = self.client.start_session(&handle).await {
            *abandoned.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
            return Err(e);
        }
        Ok(handle)
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        // Slot updates are single assignments; a panic elsewhere cannot leave
        // it half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets a `connecting` slot to `idle` if the start future is dropped
/// before it commits.
struct PendingStart<'a> {
    session: &'a AvatarSession,
    epoch: u64,
    armed: bool,
}

impl PendingStart<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingStart<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slot = self.session.slot();
        if slot.epoch == self.epoch && matches!(slot.state, SessionState::Connecting) {
            slot.state = SessionState::Idle;
            slot.epoch += 1;
            warn!("Avatar session start was abandoned before it finished");
        }
    }
}
