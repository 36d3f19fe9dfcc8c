//! Client-side core for the real-time notification demo.
//!
//! Provides the server key codec, push subscription manager,
//! delivery reconciler, sound gate, persisted client state, and the
//! real-time channel client.

pub mod channel;
pub mod keys;
pub mod reconcile;
pub mod sound;
pub mod store;
pub mod subscription;

use serde::{Deserialize, Serialize};

/// A notification event, as delivered by the real-time channel or a
/// push payload. Consumed exactly once; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationEvent {
    pub message: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Platform-owned permission to show visible notifications.
/// Read-only to this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Default,
    Granted,
    Denied,
}

/// Unified error type for the notify-client crate.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("push subscription error: {0}")]
    Subscription(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("connection timeout")]
    Timeout,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}
