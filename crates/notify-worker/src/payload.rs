//! Push payload normalization.
//!
//! A push payload may be missing, malformed, or partially filled; the
//! agent must still end up with a complete notification. Every field
//! falls back independently, and a payload that fails to parse yields
//! the generic default notification rather than no notification.

use serde::Deserialize;

pub const DEFAULT_TITLE: &str = "New Notification";
pub const DEFAULT_BODY: &str = "You have a new message";
pub const DEFAULT_ICON: &str = "/notification-bell.png";
pub const DEFAULT_URL: &str = "/";

#[derive(Debug, Deserialize)]
struct WirePayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    data: Option<WireData>,
}

#[derive(Debug, Deserialize)]
struct WireData {
    #[serde(default)]
    url: Option<String>,
}

/// A push notification with every field resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Unique display tag; time-based when the payload carries none.
    pub tag: String,
    /// Target for a click on the notification.
    pub url: String,
}

impl NormalizedNotification {
    fn generic_default(now_ms: i64) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            icon: DEFAULT_ICON.to_string(),
            tag: format!("notification-{now_ms}"),
            url: DEFAULT_URL.to_string(),
        }
    }
}

/// Normalize a raw push payload. Pure; `now_ms` feeds the fallback tag.
pub fn normalize(raw: Option<&[u8]>, now_ms: i64) -> NormalizedNotification {
    let Some(raw) = raw else {
        return NormalizedNotification::generic_default(now_ms);
    };

    let payload: WirePayload = match serde_json::from_slice(raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed push payload, using generic notification");
            return NormalizedNotification::generic_default(now_ms);
        }
    };

    let title = payload
        .message
        .filter(|t| !t.is_empty())
        .or(payload.title.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let url = payload
        .url
        .filter(|u| !u.is_empty())
        .or_else(|| payload.data.and_then(|d| d.url).filter(|u| !u.is_empty()))
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    NormalizedNotification {
        title,
        body: payload.body.unwrap_or_default(),
        icon: payload
            .icon
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string()),
        tag: payload
            .tag
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("notification-{now_ms}")),
        url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_payload_yields_generic_default() {
        let n = normalize(None, 1_700_000_000_000);
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, DEFAULT_BODY);
        assert_eq!(n.tag, "notification-1700000000000");
        assert_eq!(n.url, DEFAULT_URL);
    }

    #[test]
    fn malformed_payload_yields_generic_default() {
        let n = normalize(Some(b"{definitely not json"), 42);
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, DEFAULT_BODY);
        assert_eq!(n.tag, "notification-42");
    }

    #[test]
    fn message_field_wins_over_title() {
        let raw = br#"{"message": "from message", "title": "from title"}"#;
        assert_eq!(normalize(Some(raw), 0).title, "from message");
    }

    #[test]
    fn empty_message_falls_through_to_title() {
        let raw = br#"{"message": "", "title": "fallback title"}"#;
        assert_eq!(normalize(Some(raw), 0).title, "fallback title");
    }

    #[test]
    fn title_is_used_when_message_is_absent() {
        let raw = br#"{"title": "only title"}"#;
        assert_eq!(normalize(Some(raw), 0).title, "only title");
    }

    #[test]
    fn parsed_payload_defaults_body_to_empty() {
        let raw = br#"{"message": "m"}"#;
        assert_eq!(normalize(Some(raw), 0).body, "");
    }

    #[test]
    fn top_level_url_wins_over_nested_data_url() {
        let raw = br#"{"message": "m", "url": "/top", "data": {"url": "/nested"}}"#;
        assert_eq!(normalize(Some(raw), 0).url, "/top");
    }

    #[test]
    fn nested_data_url_is_used_when_top_level_is_absent() {
        let raw = br#"{"message": "m", "data": {"url": "/nested"}}"#;
        assert_eq!(normalize(Some(raw), 0).url, "/nested");
    }

    #[test]
    fn payload_tag_is_preserved() {
        let raw = br#"{"message": "m", "tag": "custom-tag"}"#;
        assert_eq!(normalize(Some(raw), 99).tag, "custom-tag");
    }

    #[test]
    fn empty_strings_fall_back_like_missing_fields() {
        let raw = br#"{"message": "", "tag": "", "url": ""}"#;
        let n = normalize(Some(raw), 7);
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.tag, "notification-7");
        assert_eq!(n.url, DEFAULT_URL);
    }
}
