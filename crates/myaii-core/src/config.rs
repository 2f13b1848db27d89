//! Streaming provider configuration.
//!
//! Values come from serde defaults (usually via the CLI's TOML file) and are
//! then overridden by `MYAII_HEYGEN_*` environment variables.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::retry::RetryPolicy;
use crate::streaming::Quality;

/// Default provider base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.heygen.com";

pub const ENV_API_BASE_URL: &str = "MYAII_HEYGEN_API_BASE_URL";
pub const ENV_API_KEY: &str = "MYAII_HEYGEN_API_KEY";
pub const ENV_DEFAULT_AVATAR_ID: &str = "MYAII_HEYGEN_DEFAULT_AVATAR_ID";
pub const ENV_AVATAR_QUALITY: &str = "MYAII_HEYGEN_AVATAR_QUALITY";
pub const ENV_KNOWLEDGE_BASE_ID: &str = "MYAII_HEYGEN_KNOWLEDGE_BASE_ID";

/// Configuration for the avatar streaming provider
#[derive(Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Base URL of the streaming REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Long-lived API key used to issue session tokens
    #[serde(default)]
    pub api_key: Option<String>,

    /// Avatar used when a start request names none (empty = provider default)
    #[serde(default)]
    pub default_avatar_id: String,

    /// Media quality tier requested for new sessions
    #[serde(default)]
    pub quality: Quality,

    /// Knowledge base attached to new sessions
    #[serde(default)]
    pub knowledge_base_id: Option<String>,

    /// Per-request timeout; unset means requests may wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Retry policy for the start sequence
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: None,
            default_avatar_id: String::new(),
            quality: Quality::default(),
            knowledge_base_id: None,
            request_timeout_secs: None,
            retry: RetryPolicy::default(),
        }
    }
}

// api_key must never reach the logs
impl fmt::Debug for StreamingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("default_avatar_id", &self.default_avatar_id)
            .field("quality", &self.quality)
            .field("knowledge_base_id", &self.knowledge_base_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl StreamingConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply `MYAII_HEYGEN_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(avatar) = lookup(ENV_DEFAULT_AVATAR_ID) {
            self.default_avatar_id = avatar.trim().to_string();
        }
        if let Some(quality) = lookup(ENV_AVATAR_QUALITY) {
            match quality.parse() {
                Ok(q) => self.quality = q,
                Err(e) => warn!("Ignoring {}: {}", ENV_AVATAR_QUALITY, e),
            }
        }
        if let Some(kb) = lookup(ENV_KNOWLEDGE_BASE_ID) {
            self.knowledge_base_id = Some(kb.trim().to_string());
        }
    }

    /// The API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// The knowledge base id, if one is set and non-empty.
    pub fn knowledge_base_id(&self) -> Option<&str> {
        self.knowledge_base_id.as_deref().filter(|k| !k.is_empty())
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}
