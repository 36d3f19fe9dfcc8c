//! Delivery reconciler.
//!
//! Decides, for each incoming notification event, the exactly-once
//! display action from the injected runtime context. Pure apart from
//! the per-session tag counter and the in-page event list, so the
//! whole decision table is unit-testable without a platform.

use serde::Serialize;

use crate::sound::SoundPreference;
use crate::{NotificationEvent, PermissionState};

/// Runtime state the decision depends on. Owned by the platform,
/// injected per event.
#[derive(Debug, Clone, Copy)]
pub struct ReconcilerContext {
    pub permission: PermissionState,
    pub sound: SoundPreference,
}

/// A fully resolved visible notification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShowNotification {
    pub title: String,
    pub body: Option<String>,
    pub url: Option<String>,
    /// Unique per shown notification within a session. Strictly
    /// increasing so the platform never coalesces distinct events
    /// under one tag.
    pub tag: String,
    pub play_sound: bool,
}

/// The reconciler's verdict for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayAction {
    /// Permission denied: the event stays in the in-page list only.
    Record,
    /// Permission not yet decided: the driver must prompt, then
    /// re-invoke with the updated context.
    RequestPermission,
    /// Visible display is allowed but the one-time sound prompt has
    /// not resolved yet; the driver defers the event into the
    /// [`SoundGate`](crate::sound::SoundGate).
    PromptSound,
    /// Show a visible notification.
    Show(ShowNotification),
}

/// Decision engine for foreground notification delivery.
#[derive(Debug, Default)]
pub struct DeliveryReconciler {
    counter: u64,
    recorded: Vec<NotificationEvent>,
}

impl DeliveryReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one incoming event against the current context.
    ///
    /// The event is always appended to the in-page list first; the
    /// returned action only governs the visible/audible side.
    pub fn on_notification_event(
        &mut self,
        event: NotificationEvent,
        context: &ReconcilerContext,
    ) -> DisplayAction {
        self.recorded.push(event.clone());
        self.decide(event, context)
    }

    /// Re-run the decision for an already recorded event after a
    /// permission or sound prompt resolved. Does not record again.
    pub fn redeliver(
        &mut self,
        event: NotificationEvent,
        context: &ReconcilerContext,
    ) -> DisplayAction {
        self.decide(event, context)
    }

    fn decide(&mut self, event: NotificationEvent, context: &ReconcilerContext) -> DisplayAction {
        match context.permission {
            PermissionState::Denied => DisplayAction::Record,
            PermissionState::Default => DisplayAction::RequestPermission,
            PermissionState::Granted => match context.sound {
                SoundPreference::Unset => DisplayAction::PromptSound,
                preference => DisplayAction::Show(self.build_notification(event, preference)),
            },
        }
    }

    fn build_notification(
        &mut self,
        event: NotificationEvent,
        sound: SoundPreference,
    ) -> ShowNotification {
        self.counter += 1;
        ShowNotification {
            title: event.message,
            body: event.body,
            url: event.url,
            tag: format!("notification-{}", self.counter),
            play_sound: sound == SoundPreference::Enabled,
        }
    }

    /// The in-page notification list: every event ever reconciled,
    /// in arrival order, regardless of display outcome.
    pub fn recorded(&self) -> &[NotificationEvent] {
        &self.recorded
    }
}
