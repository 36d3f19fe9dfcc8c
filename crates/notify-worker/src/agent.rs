//! Suppression and click-routing decisions.
//!
//! Pure functions over a snapshot of the open browsing contexts, kept
//! free of platform I/O so the duplicate-suppression behavior can be
//! tested directly.

use crate::payload::NormalizedNotification;

/// A browsing context visible to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: u64,
    pub url: String,
}

/// Outcome of a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// A page is open; the real-time channel path owns delivery.
    Suppressed,
    Display(NormalizedNotification),
}

/// Decide whether a push displays or defers to the foreground path.
///
/// Known limitation, preserved deliberately: an open window only
/// proves a page exists, not that its real-time channel is connected
/// at this instant. A page mid-reconnect still suppresses the push,
/// which can drop the notification entirely.
pub fn reconcile_push(
    notification: NormalizedNotification,
    open_window_count: usize,
) -> PushOutcome {
    if open_window_count > 0 {
        tracing::info!(
            open_window_count,
            "Page open, suppressing background notification to avoid duplicate"
        );
        return PushOutcome::Suppressed;
    }
    PushOutcome::Display(notification)
}

/// What a click on a displayed notification should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Focus the existing window with this id.
    Focus(u64),
    /// No matching window; open a new one at this URL.
    OpenWindow(String),
}

/// Route a notification click: focus the first open window already at
/// the target URL, otherwise open a new one.
pub fn resolve_click(target_url: &str, windows: &[WindowInfo]) -> ClickAction {
    for window in windows {
        if window.url == target_url {
            return ClickAction::Focus(window.id);
        }
    }
    ClickAction::OpenWindow(target_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::normalize;

    fn notification() -> NormalizedNotification {
        normalize(Some(br#"{"message": "m", "url": "/inbox"}"#), 0)
    }

    #[test]
    fn open_window_suppresses_display() {
        assert_eq!(reconcile_push(notification(), 1), PushOutcome::Suppressed);
        assert_eq!(reconcile_push(notification(), 3), PushOutcome::Suppressed);
    }

    #[test]
    fn no_open_window_displays_exactly_the_notification() {
        let n = notification();
        assert_eq!(reconcile_push(n.clone(), 0), PushOutcome::Display(n));
    }

    #[test]
    fn click_focuses_matching_window() {
        let windows = vec![
            WindowInfo { id: 1, url: "/".to_string() },
            WindowInfo { id: 2, url: "/inbox".to_string() },
        ];
        assert_eq!(resolve_click("/inbox", &windows), ClickAction::Focus(2));
    }

    #[test]
    fn click_opens_new_window_when_none_matches() {
        let windows = vec![WindowInfo { id: 1, url: "/".to_string() }];
        assert_eq!(
            resolve_click("/inbox", &windows),
            ClickAction::OpenWindow("/inbox".to_string())
        );
    }

    #[test]
    fn click_with_no_windows_opens_target() {
        assert_eq!(
            resolve_click("/", &[]),
            ClickAction::OpenWindow("/".to_string())
        );
    }
}
