//! Background delivery agent.
//!
//! Runs outside the page context and renders fallback notifications
//! when no page is open. The platform activates it through discrete
//! triggers (install, activate, push, notification click); each
//! trigger handler delegates to a pure decision function so the
//! display/suppression logic needs no platform to test.

pub mod agent;
pub mod payload;

use agent::{ClickAction, PushOutcome, WindowInfo};
use payload::NormalizedNotification;

/// Unified error type for the notify-worker crate.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("platform call failed: {0}")]
    Platform(String),
}

/// The platform surface the agent drives.
pub trait WorkerPlatform {
    /// All currently open browsing contexts, including uncontrolled
    /// ones visible to the platform.
    fn open_windows(&self) -> Vec<WindowInfo>;

    fn show_notification(&self, notification: &NormalizedNotification) -> Result<(), WorkerError>;

    fn focus_window(&self, id: u64) -> Result<(), WorkerError>;

    fn open_window(&self, url: &str) -> Result<(), WorkerError>;
}

/// Handler-per-trigger wiring over a [`WorkerPlatform`].
pub struct DeliveryAgent<P> {
    platform: P,
}

impl<P: WorkerPlatform> DeliveryAgent<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn on_install(&self) {
        tracing::info!("Delivery agent installed");
    }

    pub fn on_activate(&self) {
        tracing::info!("Delivery agent activated");
    }

    /// Handle a server push. Never fails the event: a malformed
    /// payload degrades to the generic notification and a platform
    /// display failure is logged.
    pub fn on_push(&self, raw_payload: Option<&[u8]>) {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let notification = payload::normalize(raw_payload, now_ms);
        let open_windows = self.platform.open_windows();

        match agent::reconcile_push(notification, open_windows.len()) {
            PushOutcome::Suppressed => {}
            PushOutcome::Display(notification) => {
                tracing::info!(title = %notification.title, tag = %notification.tag, "Displaying background notification");
                if let Err(e) = self.platform.show_notification(&notification) {
                    tracing::warn!(error = %e, "Failed to display background notification");
                }
            }
        }
    }

    /// Handle a click on a displayed notification.
    pub fn on_notification_click(&self, target_url: &str) {
        match agent::resolve_click(target_url, &self.platform.open_windows()) {
            ClickAction::Focus(id) => {
                if let Err(e) = self.platform.focus_window(id) {
                    tracing::warn!(error = %e, id, "Failed to focus window");
                }
            }
            ClickAction::OpenWindow(url) => {
                if let Err(e) = self.platform.open_window(&url) {
                    tracing::warn!(error = %e, url, "Failed to open window");
                }
            }
        }
    }

    /// Closing a notification has no side effect beyond logging.
    pub fn on_notification_close(&self, tag: &str) {
        tracing::debug!(tag, "Notification closed");
    }
}
