//! myaii-core - Core library for the MyAII companion
//!
//! This crate holds everything the `myaii` CLI needs apart from terminal I/O:
//!
//! - **streaming**: HeyGen streaming-avatar REST client
//! - **session**: Avatar session lifecycle (idle, connecting, connected, error)
//! - **transport**: Media transport seam and process-wide media globals
//! - **config**: Streaming configuration and environment overrides
//! - **storage**: Device-local key-value persistence
//! - **profile**: User profile and onboarding
//! - **diary**: Mood/sleep ratings and quick notes
//! - **topics**: Conversation topic selection
//! - **greetings**: Encouragements and the avatar's opening line

pub mod config;
pub mod diary;
pub mod error;
pub mod greetings;
pub mod profile;
pub mod retry;
pub mod session;
pub mod storage;
pub mod streaming;
pub mod topics;
pub mod transport;

// Re-export commonly used types
pub use config::StreamingConfig;
pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use session::{AvatarSession, SessionStatus};
pub use streaming::{NewSessionOptions, Quality, SessionHandle, StreamingClient, TaskType};
