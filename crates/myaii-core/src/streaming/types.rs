//! Streaming provider types: the session handle and wire bodies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transport::TransportCredentials;

/// Media quality tier requested for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Low => write!(f, "low"),
            Quality::Medium => write!(f, "medium"),
            Quality::High => write!(f, "high"),
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            other => Err(format!("unknown quality '{}'", other)),
        }
    }
}

/// How the avatar handles dispatched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Respond conversationally to the text
    #[default]
    Talk,
    /// Speak the text verbatim
    Repeat,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Talk => write!(f, "talk"),
            TaskType::Repeat => write!(f, "repeat"),
        }
    }
}

/// Options for opening a new avatar session.
#[derive(Debug, Clone, Default)]
pub struct NewSessionOptions {
    /// Avatar to render; falls back to the configured default
    pub avatar_id: Option<String>,
}

impl NewSessionOptions {
    pub fn with_avatar(avatar_id: impl Into<String>) -> Self {
        Self {
            avatar_id: Some(avatar_id.into()),
        }
    }
}

/// Handle to a remote avatar session.
///
/// Immutable once created. Both tokens are redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionHandle {
    session_id: String,
    session_token: String,
    transport_url: String,
    transport_token: String,
}

impl SessionHandle {
    pub(crate) fn new(
        session_id: String,
        session_token: String,
        transport_url: String,
        transport_token: String,
    ) -> Self {
        Self {
            session_id,
            session_token,
            transport_url,
            transport_token,
        }
    }

    /// Provider-assigned session identifier
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Bearer credential for calls on this session
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Media room endpoint
    pub fn transport_url(&self) -> &str {
        &self.transport_url
    }

    /// Media room admission token
    pub fn transport_token(&self) -> &str {
        &self.transport_token
    }

    /// Credentials for joining the media room.
    pub fn transport_credentials(&self) -> TransportCredentials {
        TransportCredentials {
            server_url: self.transport_url.clone(),
            token: self.transport_token.clone(),
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("session_token", &"<redacted>")
            .field("transport_url", &self.transport_url)
            .field("transport_token", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire bodies
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /v1/streaming.new`
#[derive(Debug, Serialize)]
pub(crate) struct NewSessionRequest<'a> {
    pub quality: Quality,
    pub version: &'a str,
    pub video_encoding: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<KnowledgeBaseRef<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct KnowledgeBaseRef<'a> {
    pub id: &'a str,
}

/// Success payload of `POST /v1/streaming.new`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NewSessionData {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Body of `streaming.start` and `streaming.stop`
#[derive(Debug, Serialize)]
pub(crate) struct SessionIdRequest<'a> {
    pub session_id: &'a str,
}

/// Body of `POST /v1/streaming.task`
#[derive(Debug, Serialize)]
pub(crate) struct TaskRequest<'a> {
    pub session_id: &'a str,
    pub text: &'a str,
    pub task_type: TaskType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> SessionHandle {
        SessionHandle::new(
            "S".to_string(),
            "T".to_string(),
            "wss://x".to_string(),
            "A".to_string(),
        )
    }

    #[test]
    fn test_handle_debug_redacts_tokens() {
        let debug = format!("{:?}", handle());
        assert!(debug.contains("\"S\""));
        assert!(debug.contains("wss://x"));
        assert!(!debug.contains("\"T\""));
        assert!(!debug.contains("\"A\""));
    }

    #[test]
    fn test_transport_credentials() {
        let creds = handle().transport_credentials();
        assert_eq!(creds.server_url, "wss://x");
        assert_eq!(creds.token, "A");
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!("HIGH".parse::<Quality>().unwrap(), Quality::High);
        assert_eq!(" medium ".parse::<Quality>().unwrap(), Quality::Medium);
        assert!("4k".parse::<Quality>().is_err());
    }

    #[test]
    fn test_new_session_request_omits_optional_fields() {
        let body = NewSessionRequest {
            quality: Quality::High,
            version: "v2",
            video_encoding: "H264",
            avatar_name: None,
            knowledge_base: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"quality": "high", "version": "v2", "video_encoding": "H264"})
        );
    }

    #[test]
    fn test_task_request_shape() {
        let body = TaskRequest {
            session_id: "S",
            text: "Hallo",
            task_type: TaskType::Repeat,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"session_id": "S", "text": "Hallo", "task_type": "repeat"})
        );
    }
}
