//! Demo platform adapters.
//!
//! Stand-ins for the surfaces the core treats as external
//! collaborators: the push manager, the permission prompt, the
//! notification display and the audio element. Everything renders to
//! the log.

use notify_client::reconcile::ShowNotification;
use notify_client::subscription::{
    PushPlatform, PushSubscription, SubscribeOptions, SubscriptionKeys,
};
use notify_client::{NotifyError, PermissionState};
use tokio::sync::Mutex;

/// In-memory push manager: holds at most one subscription, like a
/// browser's push manager holds one per installation.
#[derive(Default)]
pub struct DemoPushPlatform {
    subscription: Mutex<Option<PushSubscription>>,
}

impl PushPlatform for DemoPushPlatform {
    async fn existing_subscription(&self) -> Result<Option<PushSubscription>, NotifyError> {
        Ok(self.subscription.lock().await.clone())
    }

    async fn subscribe(
        &self,
        options: &SubscribeOptions,
    ) -> Result<PushSubscription, NotifyError> {
        if !options.user_visible_only {
            return Err(NotifyError::Subscription(
                "silent subscriptions are not supported".into(),
            ));
        }
        let subscription = PushSubscription {
            endpoint: format!(
                "https://push.local/demo/{}",
                options.application_server_key.len()
            ),
            keys: SubscriptionKeys {
                p256dh: "demo-p256dh".to_string(),
                auth: "demo-auth".to_string(),
            },
        };
        *self.subscription.lock().await = Some(subscription.clone());
        Ok(subscription)
    }
}

/// Log-backed display surface with env-configured prompt answers.
pub struct DemoDisplay {
    initial_permission: PermissionState,
    sound_answer: bool,
}

impl DemoDisplay {
    /// `NOTIFY_PERMISSION` = `granted|denied|default` (default
    /// `granted`), `NOTIFY_SOUND` = `enabled|disabled` (default
    /// `enabled`) — the answers a user would give in the browser.
    pub fn from_env() -> Self {
        let initial_permission = match std::env::var("NOTIFY_PERMISSION").as_deref() {
            Ok("denied") => PermissionState::Denied,
            Ok("default") => PermissionState::Default,
            _ => PermissionState::Granted,
        };
        let sound_answer = !matches!(std::env::var("NOTIFY_SOUND").as_deref(), Ok("disabled"));
        Self {
            initial_permission,
            sound_answer,
        }
    }

    pub fn initial_permission(&self) -> PermissionState {
        self.initial_permission
    }

    /// The demo user answers the platform permission prompt.
    pub fn request_permission(&self) -> PermissionState {
        let granted = match self.initial_permission {
            PermissionState::Denied => PermissionState::Denied,
            _ => PermissionState::Granted,
        };
        tracing::info!(outcome = ?granted, "Permission prompt answered");
        granted
    }

    /// The demo user answers the one-time sound modal.
    pub fn prompt_sound(&self) -> bool {
        tracing::info!(enabled = self.sound_answer, "Sound prompt answered");
        self.sound_answer
    }

    /// Render a notification the way a browser would.
    pub fn show(&self, notification: &ShowNotification) {
        tracing::info!(
            title = %notification.title,
            body = notification.body.as_deref().unwrap_or(""),
            tag = %notification.tag,
            url = notification.url.as_deref().unwrap_or(""),
            "Notification displayed"
        );
        if notification.play_sound {
            tracing::info!(tag = %notification.tag, "Audible alert played");
        }
    }
}
