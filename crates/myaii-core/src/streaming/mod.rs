//! Client for the avatar streaming provider.
//!
//! Each operation is exactly one HTTP exchange against the provider's REST
//! API. The client holds no session state; handles are passed in by the
//! caller.
//!
//! # Usage
//!
//! ```rust,no_run
//! use myaii_core::config::StreamingConfig;
//! use myaii_core::streaming::{NewSessionOptions, StreamingClient, TaskType};
//!
//! #[tokio::main]
//! async fn main() -> myaii_core::Result<()> {
//!     let client = StreamingClient::new(StreamingConfig::from_env())?;
//!     let token = client.create_token().await?;
//!     let handle = client.create_session(&token, &NewSessionOptions::default()).await?;
//!     client.start_session(&handle).await?;
//!     client.send_text(&handle, "Hallo", TaskType::Talk).await?;
//!     client.stop_session(&handle).await;
//!     Ok(())
//! }
//! ```

mod types;

pub use types::{NewSessionOptions, Quality, SessionHandle, TaskType};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::StreamingConfig;
use crate::error::{Error, Result};
use types::{KnowledgeBaseRef, NewSessionData, NewSessionRequest, SessionIdRequest, TaskRequest};

const CREATE_TOKEN: &str = "create_token";
const STREAMING_NEW: &str = "streaming.new";
const STREAMING_START: &str = "streaming.start";
const STREAMING_TASK: &str = "streaming.task";
const STREAMING_STOP: &str = "streaming.stop";

const PROTOCOL_VERSION: &str = "v2";
const VIDEO_ENCODING: &str = "H264";

/// HTTP client for the streaming provider
#[derive(Clone)]
pub struct StreamingClient {
    config: StreamingConfig,
    http: reqwest::Client,
}

impl StreamingClient {
    /// Create a client from configuration
    pub fn new(config: StreamingConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Whether an API key is available. Logs the key length, never the key.
    pub fn is_configured(&self) -> bool {
        match self.config.api_key() {
            Some(key) => {
                debug!("Streaming API key configured (length {})", key.len());
                true
            }
            None => {
                warn!(
                    "Streaming API key not found; set {}",
                    crate::config::ENV_API_KEY
                );
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Provider operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Obtain a session-scoped bearer token using the API key.
    pub async fn create_token(&self) -> Result<String> {
        let api_key = self.config.api_key().ok_or_else(|| {
            Error::configuration(format!(
                "Streaming API key is not set ({})",
                crate::config::ENV_API_KEY
            ))
        })?;

        let response = self
            .http
            .post(self.url("/v1/streaming.create_token"))
            .header(CONTENT_TYPE, "application/json")
            .header("X-Api-Key", api_key)
            .send()
            .await?;

        let json = read_json(CREATE_TOKEN, response).await?;

        extract_token(&json).ok_or_else(|| {
            warn!("{}: response carried no token", CREATE_TOKEN);
            Error::provider(CREATE_TOKEN, None, "create_token: no token found in response")
        })
    }

    /// Open a new remote avatar session.
    ///
    /// The returned handle is not yet streaming; call [`start_session`](Self::start_session).
    pub async fn create_session(
        &self,
        session_token: &str,
        options: &NewSessionOptions,
    ) -> Result<SessionHandle> {
        let avatar_id = options
            .avatar_id
            .as_deref()
            .unwrap_or(&self.config.default_avatar_id);

        let body = NewSessionRequest {
            quality: self.config.quality,
            version: PROTOCOL_VERSION,
            video_encoding: VIDEO_ENCODING,
            avatar_name: Some(avatar_id).filter(|a| !a.is_empty()),
            knowledge_base: self.config.knowledge_base_id().map(|id| KnowledgeBaseRef { id }),
        };

        let response = self
            .authorized(STREAMING_NEW, "/v1/streaming.new", session_token, &body)
            .await?;
        let mut json = read_json(STREAMING_NEW, response).await?;

        let payload = if json.get("data").is_some_and(|data| !data.is_null()) {
            json["data"].take()
        } else {
            json
        };
        let data: NewSessionData = serde_json::from_value(payload).unwrap_or_default();

        match (
            non_empty(data.session_id),
            non_empty(data.url),
            non_empty(data.access_token),
        ) {
            (Some(session_id), Some(url), Some(access_token)) => {
                info!(session_id = %session_id, "Avatar session created");
                Ok(SessionHandle::new(
                    session_id,
                    session_token.to_string(),
                    url,
                    access_token,
                ))
            }
            _ => {
                warn!("{}: response is missing session fields", STREAMING_NEW);
                Err(Error::provider(
                    STREAMING_NEW,
                    None,
                    "streaming.new: session_id, url or access_token missing from response",
                ))
            }
        }
    }

    /// Begin streaming a created session. The transport becomes connectable after this.
    pub async fn start_session(&self, handle: &SessionHandle) -> Result<()> {
        let body = SessionIdRequest {
            session_id: handle.session_id(),
        };
        let response = self
            .authorized(
                STREAMING_START,
                "/v1/streaming.start",
                handle.session_token(),
                &body,
            )
            .await?;
        ensure_success(STREAMING_START, response).await?;

        info!(session_id = %handle.session_id(), "Avatar session started");
        Ok(())
    }

    /// Send text for the avatar to speak.
    ///
    /// Whitespace-only text is a no-op that succeeds without a request.
    pub async fn send_text(&self, handle: &SessionHandle, text: &str, task_type: TaskType) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Skipping empty avatar task");
            return Ok(());
        }

        let body = TaskRequest {
            session_id: handle.session_id(),
            text: trimmed,
            task_type,
        };
        let response = self
            .authorized(
                STREAMING_TASK,
                "/v1/streaming.task",
                handle.session_token(),
                &body,
            )
            .await?;
        ensure_success(STREAMING_TASK, response).await
    }

    /// Release provider resources for a session.
    ///
    /// Best-effort: failures are logged and never returned.
    pub async fn stop_session(&self, handle: &SessionHandle) {
        match self.try_stop_session(handle).await {
            Ok(()) => info!(session_id = %handle.session_id(), "Avatar session stopped"),
            Err(e) => warn!(
                session_id = %handle.session_id(),
                "{} failed: {}",
                STREAMING_STOP,
                e
            ),
        }
    }

    async fn try_stop_session(&self, handle: &SessionHandle) -> Result<()> {
        let body = SessionIdRequest {
            session_id: handle.session_id(),
        };
        let response = self
            .authorized(
                STREAMING_STOP,
                "/v1/streaming.stop",
                handle.session_token(),
                &body,
            )
            .await?;
        ensure_success(STREAMING_STOP, response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn authorized<B: Serialize>(
        &self,
        operation: &str,
        path: &str,
        session_token: &str,
        body: &B,
    ) -> Result<Response> {
        let url = self.url(path);
        debug!("Streaming request: {} POST {}", operation, url);

        let response = self
            .http
            .post(url)
            .bearer_auth(session_token)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

/// Read a JSON body, mapping non-success statuses and malformed bodies to
/// provider errors.
async fn read_json(operation: &'static str, response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(status_error(operation, status, &text));
    }

    serde_json::from_str(&text).map_err(|_| {
        warn!("{}: invalid JSON response", operation);
        Error::provider(
            operation,
            Some(status.as_u16()),
            format!("{}: invalid JSON response", operation),
        )
    })
}

/// Check the status of a call whose success body carries nothing we need.
async fn ensure_success(operation: &'static str, response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await.unwrap_or_default();
    Err(status_error(operation, status, &text))
}

fn status_error(operation: &'static str, status: StatusCode, body: &str) -> Error {
    warn!(status = status.as_u16(), "{} failed", operation);
    debug!("{} error body: {}", operation, body);

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| provider_message(&json))
        .unwrap_or_else(|| format!("{} failed ({})", operation, status.as_u16()));

    Error::provider(operation, Some(status.as_u16()), message)
}

/// Prefer the provider's `message`, then `error` (string or `{message}`).
fn provider_message(json: &Value) -> Option<String> {
    let text = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    json.get("message").and_then(text).or_else(|| {
        json.get("error").and_then(|err| {
            text(err).or_else(|| err.get("message").and_then(text))
        })
    })
}

/// The token may arrive under `data.token`, `data.session_token` or `token`.
fn extract_token(json: &Value) -> Option<String> {
    let candidates = [
        json.pointer("/data/token"),
        json.pointer("/data/session_token"),
        json.get("token"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|t| !t.is_empty())
        .map(String::from)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> StreamingClient {
        StreamingClient::new(StreamingConfig {
            api_base_url: server.url(),
            api_key: Some("test-key".to_string()),
            ..StreamingConfig::default()
        })
        .unwrap()
    }

    fn handle() -> SessionHandle {
        SessionHandle::new(
            "S".to_string(),
            "T".to_string(),
            "wss://x".to_string(),
            "A".to_string(),
        )
    }

    #[test]
    fn test_extract_token_aliases() {
        assert_eq!(extract_token(&json!({"data": {"token": "a"}})), Some("a".into()));
        assert_eq!(
            extract_token(&json!({"data": {"session_token": "b"}})),
            Some("b".into())
        );
        assert_eq!(extract_token(&json!({"token": "c"})), Some("c".into()));
        assert_eq!(
            extract_token(&json!({"data": {"token": "", "session_token": "d"}})),
            Some("d".into())
        );
        assert_eq!(extract_token(&json!({"data": {}})), None);
    }

    #[test]
    fn test_provider_message_preference() {
        assert_eq!(
            provider_message(&json!({"message": "m", "error": "e"})),
            Some("m".into())
        );
        assert_eq!(provider_message(&json!({"error": "e"})), Some("e".into()));
        assert_eq!(
            provider_message(&json!({"error": {"message": "nested"}})),
            Some("nested".into())
        );
        assert_eq!(provider_message(&json!({"code": 1})), None);
    }

    #[tokio::test]
    async fn test_create_token_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/streaming.create_token")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"token":"T"}}"#)
            .create_async()
            .await;

        let token = client_for(&server).create_token().await.unwrap();
        assert_eq!(token, "T");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_token_unauthorized_carries_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.create_token")
            .with_status(401)
            .with_body(r#"{"message":"Unauthorized"}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_token().await.unwrap_err();
        assert!(matches!(err, Error::Provider { status: Some(401), .. }));
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_create_token_fallback_message_on_plain_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.create_token")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let err = client_for(&server).create_token().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "create_token failed (502)");
    }

    #[tokio::test]
    async fn test_create_token_invalid_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.create_token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).create_token().await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_create_token_missing_token_field() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.create_token")
            .with_status(200)
            .with_body(r#"{"data":{}}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_token().await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[tokio::test]
    async fn test_create_token_without_key_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = StreamingClient::new(StreamingConfig {
            api_base_url: server.url(),
            ..StreamingConfig::default()
        })
        .unwrap();

        assert!(!client.is_configured());
        let err = client.create_token().await.unwrap_err();
        assert!(err.is_configuration());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_session_body_and_handle() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/streaming.new")
            .match_header("authorization", "Bearer T")
            .match_body(Matcher::Json(json!({
                "quality": "high",
                "version": "v2",
                "video_encoding": "H264",
                "avatar_name": "Anna",
            })))
            .with_status(200)
            .with_body(r#"{"data":{"session_id":"S","url":"wss://x","access_token":"A"}}"#)
            .create_async()
            .await;

        let handle = client_for(&server)
            .create_session("T", &NewSessionOptions::with_avatar("Anna"))
            .await
            .unwrap();

        assert_eq!(handle, self::handle());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_session_includes_knowledge_base_and_default_avatar() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/streaming.new")
            .match_body(Matcher::PartialJson(json!({
                "quality": "low",
                "avatar_name": "Default_Avatar",
                "knowledge_base": {"id": "kb-1"},
            })))
            .with_status(200)
            .with_body(r#"{"session_id":"S","url":"wss://x","access_token":"A"}"#)
            .create_async()
            .await;

        let client = StreamingClient::new(StreamingConfig {
            api_base_url: server.url(),
            api_key: Some("test-key".to_string()),
            default_avatar_id: "Default_Avatar".to_string(),
            quality: Quality::Low,
            knowledge_base_id: Some("kb-1".to_string()),
            ..StreamingConfig::default()
        })
        .unwrap();

        let handle = client
            .create_session("T", &NewSessionOptions::default())
            .await
            .unwrap();
        assert_eq!(handle.session_id(), "S");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_session_missing_access_token() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.new")
            .with_status(200)
            .with_body(r#"{"data":{"session_id":"S","url":"wss://x"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_session("T", &NewSessionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("access_token"));
    }

    #[tokio::test]
    async fn test_start_session_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.start")
            .match_header("authorization", "Bearer T")
            .match_body(Matcher::Json(json!({"session_id": "S"})))
            .with_status(400)
            .with_body("{}")
            .create_async()
            .await;

        let err = client_for(&server).start_session(&handle()).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "streaming.start failed (400)");
    }

    #[tokio::test]
    async fn test_send_text_dispatches_trimmed_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/streaming.task")
            .match_header("authorization", "Bearer T")
            .match_body(Matcher::Json(json!({
                "session_id": "S",
                "text": "Hallo",
                "task_type": "talk",
            })))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        client_for(&server)
            .send_text(&handle(), "  Hallo \n", TaskType::Talk)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_text_empty_is_noop() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        client.send_text(&handle(), "", TaskType::Talk).await.unwrap();
        client.send_text(&handle(), " \t\n ", TaskType::Repeat).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_text_provider_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/streaming.task")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server)
            .send_text(&handle(), "Hallo", TaskType::Talk)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_stop_session_never_fails() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("POST", "/v1/streaming.stop")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        client_for(&server).stop_session(&handle()).await;
        ok.assert_async().await;

        let mut failing = Server::new_async().await;
        let err = failing
            .mock("POST", "/v1/streaming.stop")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        client_for(&failing).stop_session(&handle()).await;
        err.assert_async().await;

        // Nothing listens on port 1
        let unreachable = StreamingClient::new(StreamingConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            api_key: Some("test-key".to_string()),
            ..StreamingConfig::default()
        })
        .unwrap();
        unreachable.stop_session(&handle()).await;
    }
}
