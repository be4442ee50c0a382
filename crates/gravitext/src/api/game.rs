use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::api::types::{GameEvent, Hsl, Sound};
use crate::core::clock::Clock;
use crate::core::gravity::GravityControl;
use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld};
use crate::core::timers::Timers;
use crate::events::EventBus;
use crate::settings::AudioSettings;
use crate::storage::Storage;

/// Tunables for one game session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Most fixed steps a single frame may run.
    pub max_substeps: u32,
    /// Play-field width in pixels.
    pub world_width: f32,
    /// Play-field height in pixels.
    pub world_height: f32,
    /// Gravity acceleration (px/s²) at strength 1.0.
    pub gravity: f32,
    /// Seed for every random draw in the session.
    pub seed: u64,
    /// Seconds between challenge progress checks.
    pub challenge_poll: f32,
    /// Seconds between calendar-day checks.
    pub challenge_refresh: f32,
    /// Seconds between tower height samples (tower mode only).
    pub tower_poll: f32,
    /// How long the freeze command stops time.
    pub freeze_duration: f32,
    /// Chaos mode waits a random time in this range between gravity shifts.
    pub chaos_interval: (f32, f32),
    /// Block speed (px/s) above which a contact plays the collision sound.
    pub impact_sound_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_substeps: 8,
            world_width: 800.0,
            world_height: 600.0,
            gravity: 1000.0,
            seed: 42,
            challenge_poll: 2.0,
            challenge_refresh: 60.0,
            tower_poll: 1.0,
            freeze_duration: 3.0,
            chaos_interval: (3.0, 5.0),
            impact_sound_speed: 120.0,
        }
    }
}

const WALL_THICKNESS: f32 = 60.0;

/// Shared services handed to every manager. Built once per session; nothing in the
/// crate reaches for global state.
pub struct GameContext {
    pub config: GameConfig,
    pub physics: PhysicsWorld,
    pub gravity: GravityControl,
    pub timers: Timers,
    pub bus: EventBus,
    pub rng: Pcg32,
    pub storage: Box<dyn Storage>,
    pub clock: Box<dyn Clock>,
    pub audio: AudioSettings,
    walls: Vec<PhysicsBody>,
}

impl GameContext {
    pub fn new(config: GameConfig, storage: Box<dyn Storage>, clock: Box<dyn Clock>) -> Self {
        let gravity = GravityControl::new(config.gravity);
        let mut physics = PhysicsWorld::new(gravity.vector());
        physics.set_dt(config.fixed_dt);
        let audio = AudioSettings::load(storage.as_ref());

        let mut ctx = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            physics,
            gravity,
            timers: Timers::new(),
            bus: EventBus::new(),
            storage,
            clock,
            audio,
            walls: Vec::with_capacity(4),
            config,
        };
        ctx.rebuild_walls();
        ctx
    }

    /// Publish an event to every subscriber and the page.
    pub fn emit(&mut self, event: GameEvent) {
        self.bus.publish(event);
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.emit(GameEvent::notify(text));
    }

    /// Sound cue; dropped while sound is switched off.
    pub fn play(&mut self, sound: Sound) {
        if self.audio.enabled {
            self.emit(GameEvent::Sound { sound });
        }
    }

    pub fn particles(&mut self, at: Vec2, color: Hsl, count: u32) {
        self.emit(GameEvent::particles(at.x, at.y, color, count));
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.config.world_width / 2.0, self.config.world_height / 2.0)
    }

    /// Change the play-field size and rebuild the walls around it.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.world_width = width.max(1.0);
        self.config.world_height = height.max(1.0);
        self.rebuild_walls();
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    fn rebuild_walls(&mut self) {
        for wall in self.walls.drain(..) {
            self.physics.remove_body(&wall);
        }
        let (w, h) = (self.config.world_width, self.config.world_height);
        let t = WALL_THICKNESS;
        // Floor, ceiling, left, right; each sits just outside the visible field
        let walls = [
            (Vec2::new(w / 2.0, h + t / 2.0), w + 2.0 * t, t),
            (Vec2::new(w / 2.0, -t / 2.0), w + 2.0 * t, t),
            (Vec2::new(-t / 2.0, h / 2.0), t, h + 2.0 * t),
            (Vec2::new(w + t / 2.0, h / 2.0), t, h + 2.0 * t),
        ];
        for (center, width, height) in walls {
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: width / 2.0,
                half_height: height / 2.0,
            })
            .with_position(center);
            let body = self.physics.create_body(None, &desc, ColliderMaterial::default());
            self.walls.push(body);
        }
    }
}
