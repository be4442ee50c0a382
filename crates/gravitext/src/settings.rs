//! Player preferences: audio switches and volumes, and the tutorial-seen flag.

use serde::{Deserialize, Serialize};

use crate::storage::{self, Persisted, Storage};

const TUTORIAL_KEY: &str = "gravitext_tutorial_shown";
const TUTORIAL_SEEN: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    #[serde(default)]
    version: u32,
    pub enabled: bool,
    pub volume: f32,
    pub music_enabled: bool,
    pub music_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            enabled: true,
            volume: 0.5,
            music_enabled: false,
            music_volume: 0.3,
        }
    }
}

impl Persisted for AudioSettings {
    const KEY: &'static str = "gravitext_audio";
    const VERSION: u32 = 1;

    fn version(&self) -> u32 {
        self.version
    }
}

impl AudioSettings {
    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Self = storage::load_or_default(storage);
        // Clamp values written by hand or by older builds
        settings.volume = settings.volume.clamp(0.0, 1.0);
        settings.music_volume = settings.music_volume.clamp(0.0, 1.0);
        settings
    }

    /// Flip sound effects on or off. Returns the new state.
    pub fn toggle(&mut self, storage: &mut dyn Storage) -> bool {
        self.enabled = !self.enabled;
        storage::save_or_log(storage, self);
        self.enabled
    }

    /// Flip background music on or off. Returns the new state.
    pub fn toggle_music(&mut self, storage: &mut dyn Storage) -> bool {
        self.music_enabled = !self.music_enabled;
        storage::save_or_log(storage, self);
        self.music_enabled
    }

    pub fn set_volume(&mut self, volume: f32, storage: &mut dyn Storage) {
        self.volume = volume.clamp(0.0, 1.0);
        storage::save_or_log(storage, self);
    }

    pub fn set_music_volume(&mut self, volume: f32, storage: &mut dyn Storage) {
        self.music_volume = volume.clamp(0.0, 1.0);
        storage::save_or_log(storage, self);
    }
}

pub fn tutorial_shown(storage: &dyn Storage) -> bool {
    storage.get(TUTORIAL_KEY).as_deref() == Some(TUTORIAL_SEEN)
}

pub fn mark_tutorial_shown(storage: &mut dyn Storage) {
    storage.set(TUTORIAL_KEY, TUTORIAL_SEEN);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn defaults_when_nothing_stored() {
        let storage = MemoryStorage::new();
        let settings = AudioSettings::load(&storage);
        assert!(settings.enabled);
        assert!(!settings.music_enabled);
        assert_eq!(settings.volume, 0.5);
        assert_eq!(settings.music_volume, 0.3);
    }

    #[test]
    fn changes_persist_and_clamp() {
        let mut storage = MemoryStorage::new();
        let mut settings = AudioSettings::load(&storage);
        assert!(!settings.toggle(&mut storage));
        assert!(settings.toggle_music(&mut storage));
        settings.set_volume(1.7, &mut storage);
        settings.set_music_volume(-0.2, &mut storage);

        let reloaded = AudioSettings::load(&storage);
        assert_eq!(reloaded, settings);
        assert_eq!(reloaded.volume, 1.0);
        assert_eq!(reloaded.music_volume, 0.0);
        assert!(!reloaded.enabled);
    }

    #[test]
    fn malformed_blob_gives_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(AudioSettings::KEY, "[1, 2");
        assert_eq!(AudioSettings::load(&storage), AudioSettings::default());
    }

    #[test]
    fn tutorial_flag() {
        let mut storage = MemoryStorage::new();
        assert!(!tutorial_shown(&storage));
        storage.set(TUTORIAL_KEY, "yes");
        assert!(!tutorial_shown(&storage));
        mark_tutorial_shown(&mut storage);
        assert!(tutorial_shown(&storage));
    }
}
