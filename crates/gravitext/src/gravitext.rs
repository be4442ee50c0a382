//! The game as one value: shared context plus every manager.
//!
//! Player actions come in through the methods below or an [`InputQueue`]. [`Gravitext::step`]
//! advances timers, physics and glue by a fixed `dt`; everything the page should
//! show or play comes back out as [`GameEvent`]s.

use glam::Vec2;
use serde::Serialize;

use crate::achievements::{AchievementId, Achievements};
use crate::api::game::{GameConfig, GameContext};
use crate::api::types::{BlockId, GameEvent, Sound};
use crate::blocks::{BlockLabel, BlockManager};
use crate::challenges::{ChallengeCounters, Challenges};
use crate::commands::Command;
use crate::core::clock::Clock;
use crate::core::gravity::GravityDirection;
use crate::core::physics::CollisionPair;
use crate::core::timers::{TimerId, TimerTask};
use crate::events::SubscriberId;
use crate::input::queue::{InputEvent, InputQueue};
use crate::modes::{Mode, ModeController};
use crate::relations::WordRelations;
use crate::settings;
use crate::storage::Storage;

const CREATE_PARTICLES: u32 = 15;
const CLEAR_PARTICLES: u32 = 10;
const CREATE_VIBRATION_MS: u32 = 50;

/// What a submitted word turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A reserved word; its effect already ran.
    Command(Command),
    Block(BlockId),
    /// Blank input.
    Ignored,
}

/// Session summary for the HUD.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub total_words: u32,
    pub current_blocks: usize,
    pub achievements_unlocked: usize,
    pub achievements_total: usize,
    pub current_mode: Mode,
    pub gravity_enabled: bool,
    pub gravity_direction: GravityDirection,
    pub tower_height: f32,
    pub max_tower_height: f32,
    pub poem: String,
    pub glue_links: usize,
}

/// The whole game: shared context plus every manager.
pub struct Gravitext {
    pub(crate) ctx: GameContext,
    pub(crate) blocks: BlockManager,
    pub(crate) achievements: Achievements,
    pub(crate) challenges: Challenges,
    pub(crate) modes: ModeController,
    pub(crate) relations: WordRelations,
    /// Live freeze timer and the time scale to restore when it fires.
    pub(crate) frozen: Option<(TimerId, f32)>,
    collisions: Vec<CollisionPair>,
}

impl Gravitext {
    pub fn new(config: GameConfig, storage: Box<dyn Storage>, clock: Box<dyn Clock>) -> Self {
        let mut ctx = GameContext::new(config, storage, clock);
        let achievements = Achievements::load(&ctx);
        let challenges = Challenges::load(&mut ctx);

        let (poll, refresh, tower) = (
            ctx.config.challenge_poll,
            ctx.config.challenge_refresh,
            ctx.config.tower_poll,
        );
        ctx.timers.every(poll, TimerTask::ChallengePoll);
        ctx.timers.every(refresh, TimerTask::ChallengeRefresh);
        ctx.timers.every(tower, TimerTask::TowerPoll);

        log::info!(
            "Gravitext ready: {}x{}, {} words so far",
            ctx.config.world_width,
            ctx.config.world_height,
            achievements.total_words()
        );
        Self {
            ctx,
            blocks: BlockManager::new(),
            achievements,
            challenges,
            modes: ModeController::new(),
            relations: WordRelations::new(),
            frozen: None,
            collisions: Vec::with_capacity(64),
        }
    }

    // -- Player actions --

    /// Handle a word typed by the player: run it as a command if it is reserved,
    /// otherwise drop a new block at `at`.
    pub fn submit_word(&mut self, text: &str, at: Vec2) -> Submission {
        let word = text.trim();
        if word.is_empty() {
            return Submission::Ignored;
        }
        if let Some(cmd) = Command::parse(word) {
            cmd.execute(self, at);
            return Submission::Command(cmd);
        }

        let ctx = &mut self.ctx;
        let Some(id) = self.blocks.create_block(word, at, &mut ctx.physics, &mut ctx.rng) else {
            return Submission::Ignored;
        };
        if let Some(block) = self.blocks.get(id) {
            ctx.particles(at, block.color, CREATE_PARTICLES);
        }
        ctx.play(Sound::Create);
        ctx.emit(GameEvent::Vibrate {
            pattern: vec![CREATE_VIBRATION_MS],
        });

        self.achievements.increment_word_count(&mut self.ctx);
        self.relations
            .check_new_block(id, &self.blocks, &mut self.achievements, &mut self.ctx);
        let counters = self.counters();
        self.challenges
            .track_no_gravity_word(&counters, &mut self.achievements, &mut self.ctx);
        self.modes.add_word_to_poem(word);
        Submission::Block(id)
    }

    /// Switch gravity on or off. Returns the new state.
    pub fn toggle_gravity(&mut self) -> bool {
        let ctx = &mut self.ctx;
        let enabled = ctx.gravity.toggle(&mut ctx.physics);
        if enabled {
            ctx.notify("🌍 Гравитация включена");
        } else {
            ctx.notify("🌌 Левитация активирована!");
        }
        ctx.play(Sound::Flip);
        ctx.emit(GameEvent::GravityChanged {
            direction: ctx.gravity.direction(),
            enabled,
        });
        if !enabled {
            self.achievements.increment_levitation(&mut self.ctx);
        }
        log::info!("Gravity {}", if enabled { "on" } else { "off" });
        enabled
    }

    pub fn set_gravity_direction(&mut self, direction: GravityDirection) {
        let ctx = &mut self.ctx;
        ctx.gravity.set_direction(direction, &mut ctx.physics);
        ctx.emit(GameEvent::GravityChanged {
            direction,
            enabled: ctx.gravity.enabled(),
        });
    }

    pub fn set_gravity_strength(&mut self, strength: f32) {
        let ctx = &mut self.ctx;
        ctx.gravity.set_strength(strength, &mut ctx.physics);
    }

    /// Select a play mode by name. Unknown names return `false`.
    pub fn set_mode(&mut self, name: &str) -> bool {
        self.modes.set_mode(name, &mut self.ctx)
    }

    /// Remove every block with a farewell burst each.
    pub fn clear_all(&mut self) {
        let ctx = &mut self.ctx;
        for block in self.blocks.iter() {
            let (pos, _) = ctx.physics.body_position(&block.body);
            ctx.particles(pos, block.color, CLEAR_PARTICLES);
        }
        let removed = self.blocks.len();
        self.blocks.clear_all(&mut ctx.physics);
        ctx.notify("🗑️ Всё очищено!");
        ctx.play(Sound::Explosion);
        log::info!("Cleared {removed} blocks");
    }

    pub fn reset_achievements(&mut self) {
        self.achievements.reset(&mut self.ctx);
    }

    pub fn tutorial_shown(&self) -> bool {
        settings::tutorial_shown(self.ctx.storage.as_ref())
    }

    pub fn close_tutorial(&mut self) {
        settings::mark_tutorial_shown(self.ctx.storage.as_mut());
    }

    pub fn toggle_sound(&mut self) -> bool {
        let ctx = &mut self.ctx;
        ctx.audio.toggle(ctx.storage.as_mut())
    }

    /// Switch background music. Turning it on counts toward `music_lover`.
    pub fn toggle_music(&mut self) -> bool {
        let ctx = &mut self.ctx;
        let on = ctx.audio.toggle_music(ctx.storage.as_mut());
        if on {
            self.achievements.advance(AchievementId::MusicLover, &mut self.ctx);
        }
        on
    }

    pub fn set_volume(&mut self, volume: f32) {
        let ctx = &mut self.ctx;
        ctx.audio.set_volume(volume, ctx.storage.as_mut());
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        let ctx = &mut self.ctx;
        ctx.audio.set_music_volume(volume, ctx.storage.as_mut());
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.ctx.resize(width, height);
    }

    /// Apply every queued player action in order.
    pub fn handle_input(&mut self, input: &mut InputQueue) {
        for event in input.drain() {
            match event {
                InputEvent::SubmitWord { text, x, y } => {
                    self.submit_word(&text, Vec2::new(x, y));
                }
                InputEvent::ToggleGravity => {
                    self.toggle_gravity();
                }
                InputEvent::SetGravityDirection(direction) => self.set_gravity_direction(direction),
                InputEvent::SetGravityStrength(strength) => self.set_gravity_strength(strength),
                InputEvent::SelectMode(name) => {
                    self.set_mode(&name);
                }
                InputEvent::ClearAll => self.clear_all(),
                InputEvent::ToggleSound => {
                    self.toggle_sound();
                }
                InputEvent::ToggleMusic => {
                    self.toggle_music();
                }
                InputEvent::CloseTutorial => self.close_tutorial(),
                InputEvent::Resize { width, height } => self.resize(width, height),
            }
        }
    }

    // -- Simulation --

    /// Advance the game by `dt` seconds: timers first, then physics, glue and
    /// collision sounds.
    pub fn step(&mut self, dt: f32) {
        for task in self.ctx.timers.advance(dt) {
            self.run_task(task);
        }

        self.collisions.clear();
        self.ctx.physics.step_into(&mut self.collisions);
        if self.collisions.is_empty() {
            return;
        }

        let ctx = &mut self.ctx;
        self.blocks.handle_collisions(&self.collisions, &mut ctx.physics);

        let threshold = ctx.config.impact_sound_speed;
        let loud = self.collisions.iter().filter(|c| c.started).any(|c| {
            [c.block_a, c.block_b].into_iter().any(|id| {
                self.blocks
                    .get(id)
                    .is_some_and(|b| ctx.physics.velocity(&b.body).length() > threshold)
            })
        });
        if loud {
            ctx.play(Sound::Collision);
        }
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::ChallengePoll => {
                let counters = self.counters();
                self.challenges
                    .check_progress(&counters, &mut self.achievements, &mut self.ctx);
            }
            TimerTask::ChallengeRefresh => {
                self.challenges.update_challenges(&mut self.ctx);
            }
            TimerTask::TowerPoll => {
                if self.modes.current() != Mode::Tower {
                    return;
                }
                let height = self.blocks.tower_height(&self.ctx.physics);
                if self.modes.update_tower_height(height) {
                    self.ctx.emit(GameEvent::TowerRecord { height });
                }
                self.achievements.check_tower_height(height, &mut self.ctx);
            }
            TimerTask::ChaosShift => self.modes.chaos_shift(&mut self.ctx),
            TimerTask::FreezeRelease { restore } => {
                self.ctx.physics.set_time_scale(restore);
                self.frozen = None;
                log::debug!("Time resumes at scale {restore}");
            }
            TimerTask::SpinDamp => self.blocks.damp_spin(&mut self.ctx.physics),
        }
    }

    // -- Queries --

    /// Live counters the daily challenges are measured against.
    pub fn counters(&self) -> ChallengeCounters {
        ChallengeCounters {
            words_created: self.achievements.total_words(),
            synonym_pairs: self.relations.synonym_pairs(),
            antonym_pairs: self.relations.antonym_pairs(),
            tower_height: self.blocks.tower_height(&self.ctx.physics),
        }
    }

    /// Text overlay for this frame.
    pub fn labels(&self) -> Vec<BlockLabel> {
        self.blocks.labels(&self.ctx.physics)
    }

    pub fn stats(&self) -> GameStats {
        let progress = self.achievements.progress();
        GameStats {
            total_words: self.achievements.total_words(),
            current_blocks: self.blocks.len(),
            achievements_unlocked: progress.unlocked,
            achievements_total: progress.total,
            current_mode: self.modes.current(),
            gravity_enabled: self.ctx.gravity.enabled(),
            gravity_direction: self.ctx.gravity.direction(),
            tower_height: self.blocks.tower_height(&self.ctx.physics),
            max_tower_height: self.modes.max_tower_height(),
            poem: self.modes.poem(),
            glue_links: self.blocks.glue_count(),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn blocks(&self) -> &BlockManager {
        &self.blocks
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn challenges(&self) -> &Challenges {
        &self.challenges
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn relations(&self) -> &WordRelations {
        &self.relations
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        self.ctx.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.ctx.bus.unsubscribe(id)
    }

    /// Events published since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.ctx.bus.drain()
    }
}
