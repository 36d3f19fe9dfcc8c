//! Sound gate: the "ask once, then remember" audio preference.
//!
//! The preference is a tagged state machine, `Unset` until the one-time
//! prompt resolves and terminal afterwards. Events arriving while the
//! prompt is outstanding are held and re-delivered once it resolves.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::NotificationEvent;

/// Persisted audible-alert preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundPreference {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

/// Tracks whether audio playback is permitted and holds events that
/// arrive while the user is still being asked.
#[derive(Debug, Default)]
pub struct SoundGate {
    preference: SoundPreference,
    pending: VecDeque<NotificationEvent>,
}

impl SoundGate {
    /// Rehydrate from the persisted preference.
    pub fn from_preference(preference: SoundPreference) -> Self {
        Self {
            preference,
            pending: VecDeque::new(),
        }
    }

    pub fn preference(&self) -> SoundPreference {
        self.preference
    }

    /// Whether a shown notification should play the audible alert.
    pub fn should_play_sound(&self) -> bool {
        self.preference == SoundPreference::Enabled
    }

    /// Whether the one-time prompt still has to be raised.
    pub fn needs_prompt(&self) -> bool {
        self.preference == SoundPreference::Unset
    }

    /// Hold an event until the outstanding prompt resolves.
    pub fn defer(&mut self, event: NotificationEvent) {
        self.pending.push_back(event);
    }

    /// Resolve the prompt. The preference becomes terminal and every
    /// held event is returned in arrival order for immediate delivery.
    pub fn resolve(&mut self, enabled: bool) -> Vec<NotificationEvent> {
        self.preference = if enabled {
            SoundPreference::Enabled
        } else {
            SoundPreference::Disabled
        };
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(message: &str) -> NotificationEvent {
        NotificationEvent {
            message: message.to_string(),
            body: None,
            url: None,
            tag: None,
        }
    }

    #[test]
    fn unset_preference_needs_prompt_and_stays_silent() {
        let gate = SoundGate::default();
        assert!(gate.needs_prompt());
        assert!(!gate.should_play_sound());
    }

    #[test]
    fn resolve_enabled_delivers_pending_in_order() {
        let mut gate = SoundGate::default();
        gate.defer(event("first"));
        gate.defer(event("second"));

        let drained = gate.resolve(true);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].message, "second");
        assert!(gate.should_play_sound());
        assert!(!gate.needs_prompt());
    }

    #[test]
    fn resolve_disabled_still_delivers_pending() {
        let mut gate = SoundGate::default();
        gate.defer(event("held"));

        let drained = gate.resolve(false);
        assert_eq!(drained.len(), 1);
        assert!(!gate.should_play_sound());
        assert!(!gate.needs_prompt());
    }

    #[test]
    fn resolved_preference_is_terminal_with_no_pending_left() {
        let mut gate = SoundGate::from_preference(SoundPreference::Enabled);
        assert!(!gate.needs_prompt());
        assert!(gate.resolve(true).is_empty());
    }
}
