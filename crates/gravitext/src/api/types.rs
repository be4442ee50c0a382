use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::gravity::GravityDirection;
use crate::modes::Mode;

/// Unique identifier for a word block. Ids are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// A name that matched no achievement, mode or direction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{name}`")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl UnknownName {
    pub(crate) fn new(kind: &'static str, name: &str) -> Self {
        Self { kind, name: name.to_string() }
    }
}

/// A sound cue. The page's audio layer maps each cue to a synthesized voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    Create,
    Collision,
    Explosion,
    Freeze,
    Rainbow,
    Flip,
    Glue,
    Achievement,
}

/// HSL colour used for block fills and particle bursts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self { hue, saturation, lightness }
    }

    /// A vibrant random colour: any hue, 60-80% saturation, 50-65% lightness.
    pub fn vibrant(rng: &mut impl Rng) -> Self {
        Self {
            hue: rng.random_range(0.0..360.0),
            saturation: rng.random_range(60.0..80.0),
            lightness: rng.random_range(50.0..65.0),
        }
    }

    /// CSS fill string, e.g. `hsl(120, 70%, 55%)`.
    pub fn css(&self) -> String {
        format!(
            "hsl({:.0}, {:.0}%, {:.0}%)",
            self.hue, self.saturation, self.lightness
        )
    }

    /// Outline colour: the same hue ten points darker.
    pub fn stroke_css(&self) -> String {
        Self::new(self.hue, self.saturation, (self.lightness - 10.0).max(0.0)).css()
    }
}

/// Fire-and-forget notification from the core to the page (UI, audio, particles).
/// The core never waits on any of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    Notification { text: String },
    Sound { sound: Sound },
    Vibrate { pattern: Vec<u32> },
    Particles { x: f32, y: f32, color: String, count: u32 },
    /// Multi-hue burst; the page picks a random hue per particle.
    Explosion { x: f32, y: f32, count: u32 },
    AchievementUnlocked { id: String, name: String, icon: String },
    ChallengeCompleted { id: String, title: String },
    ChallengesRefreshed { date: String },
    GravityChanged { direction: GravityDirection, enabled: bool },
    ModeDeactivated { mode: Mode },
    ModeActivated { mode: Mode },
    TowerRecord { height: f32 },
}

impl GameEvent {
    pub fn notify(text: impl Into<String>) -> Self {
        GameEvent::Notification { text: text.into() }
    }

    pub fn particles(x: f32, y: f32, color: Hsl, count: u32) -> Self {
        GameEvent::Particles { x, y, color: color.css(), count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn vibrant_colour_stays_in_band() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let c = Hsl::vibrant(&mut rng);
            assert!((0.0..360.0).contains(&c.hue));
            assert!((60.0..80.0).contains(&c.saturation));
            assert!((50.0..65.0).contains(&c.lightness));
        }
    }

    #[test]
    fn css_strings() {
        let c = Hsl::new(200.0, 70.0, 55.0);
        assert_eq!(c.css(), "hsl(200, 70%, 55%)");
        assert_eq!(c.stroke_css(), "hsl(200, 70%, 45%)");
    }

    #[test]
    fn unknown_name_message() {
        let err = UnknownName::new("mode", "haiku");
        assert_eq!(err.to_string(), "unknown mode `haiku`");
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_string(&GameEvent::Sound { sound: Sound::Glue }).unwrap();
        assert_eq!(json, r#"{"kind":"sound","sound":"glue"}"#);
    }
}
