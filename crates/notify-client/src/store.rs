//! Persisted client state.
//!
//! The user identity and the sound preference live in a small JSON
//! state file under the data directory. Single-writer is assumed; two
//! processes racing on the same file is an accepted non-goal.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::NotifyError;
use crate::sound::SoundPreference;

const STATE_FILE: &str = "client-state.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoredState {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    sound_preference: SoundPreference,
}

/// File-backed store for the user identity and sound preference.
pub struct ClientStore {
    path: PathBuf,
    state: StoredState,
}

impl ClientStore {
    /// Load the state file from `data_dir`, tolerating a missing file.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self, NotifyError> {
        let path = data_dir.into().join(STATE_FILE);
        let state = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => StoredState::default(),
            Err(error) => return Err(error.into()),
        };
        Ok(Self { path, state })
    }

    /// The stable per-installation user identity, generated and
    /// persisted on first use.
    pub fn ensure_user_id(&mut self) -> Result<String, NotifyError> {
        if let Some(id) = &self.state.user_id {
            return Ok(id.clone());
        }
        let id = format!("user-{}", chrono::Utc::now().timestamp_millis());
        self.state.user_id = Some(id.clone());
        self.save()?;
        tracing::info!(user_id = %id, "Generated new user identity");
        Ok(id)
    }

    pub fn sound_preference(&self) -> SoundPreference {
        self.state.sound_preference
    }

    /// Persist the terminal outcome of the sound prompt.
    pub fn set_sound_preference(&mut self, preference: SoundPreference) -> Result<(), NotifyError> {
        self.state.sound_preference = preference;
        self.save()
    }

    fn save(&self) -> Result<(), NotifyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
