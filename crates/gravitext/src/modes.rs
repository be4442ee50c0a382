//! Play modes: free, poet, tower and chaos.
//!
//! Exactly one mode is active. Switching always runs the outgoing mode's
//! deactivation before the incoming mode's activation.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::api::game::GameContext;
use crate::api::types::{GameEvent, UnknownName};
use crate::core::gravity::GravityDirection;
use crate::core::timers::{TimerId, TimerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Free,
    Poet,
    Tower,
    Chaos,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Free, Mode::Poet, Mode::Tower, Mode::Chaos];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Free => "free",
            Mode::Poet => "poet",
            Mode::Tower => "tower",
            Mode::Chaos => "chaos",
        }
    }

    /// Display name shown on the mode buttons.
    pub fn title(self) -> &'static str {
        match self {
            Mode::Free => "Свободный",
            Mode::Poet => "Поэт",
            Mode::Tower => "Башня",
            Mode::Chaos => "Хаос",
        }
    }
}

impl FromStr for Mode {
    type Err = UnknownName;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "free" => Ok(Mode::Free),
            "poet" => Ok(Mode::Poet),
            "tower" => Ok(Mode::Tower),
            "chaos" => Ok(Mode::Chaos),
            _ => Err(UnknownName::new("mode", name)),
        }
    }
}

pub struct ModeController {
    current: Mode,
    poem: Vec<String>,
    max_height: f32,
    chaos_timer: Option<TimerId>,
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            current: Mode::Free,
            poem: Vec::new(),
            max_height: 0.0,
            chaos_timer: None,
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Switch by name. Unknown names return `false` and change nothing; asking for
    /// the mode that is already active returns `true` without re-running its hooks.
    pub fn set_mode(&mut self, name: &str, ctx: &mut GameContext) -> bool {
        match name.parse::<Mode>() {
            Ok(mode) => {
                self.switch_to(mode, ctx);
                true
            }
            Err(err) => {
                log::debug!("{err}");
                false
            }
        }
    }

    pub fn switch_to(&mut self, mode: Mode, ctx: &mut GameContext) {
        if mode == self.current {
            return;
        }
        let previous = self.current;
        self.deactivate(previous, ctx);
        self.current = mode;
        self.activate(mode, ctx);
        log::info!("Mode {} -> {}", previous.as_str(), mode.as_str());
    }

    /// Append a word to the poem. Ignored outside poet mode.
    pub fn add_word_to_poem(&mut self, word: &str) {
        if self.current == Mode::Poet {
            self.poem.push(word.to_string());
        }
    }

    pub fn poem(&self) -> String {
        self.poem.join(" ")
    }

    /// Record a tower height sample. Returns `true` on a new record, which only
    /// happens in tower mode.
    pub fn update_tower_height(&mut self, height: f32) -> bool {
        if self.current != Mode::Tower || height <= self.max_height {
            return false;
        }
        self.max_height = height;
        true
    }

    pub fn max_tower_height(&self) -> f32 {
        self.max_height
    }

    pub fn chaos_timer(&self) -> Option<TimerId> {
        self.chaos_timer
    }

    /// Timer callback: pick a random gravity direction and book the next shift.
    pub fn chaos_shift(&mut self, ctx: &mut GameContext) {
        if self.current != Mode::Chaos {
            self.chaos_timer = None;
            return;
        }
        let idx = ctx.rng.random_range(0..GravityDirection::ALL.len());
        let direction = GravityDirection::ALL[idx];
        ctx.gravity.set_direction(direction, &mut ctx.physics);
        ctx.notify(format!("Гравитация: {}", direction.arrow()));
        ctx.emit(GameEvent::GravityChanged {
            direction,
            enabled: ctx.gravity.enabled(),
        });
        self.schedule_chaos(ctx);
    }

    fn schedule_chaos(&mut self, ctx: &mut GameContext) {
        let (lo, hi) = ctx.config.chaos_interval;
        let delay = if hi > lo { ctx.rng.random_range(lo..hi) } else { lo };
        self.chaos_timer = Some(ctx.timers.after(delay, TimerTask::ChaosShift));
    }

    fn activate(&mut self, mode: Mode, ctx: &mut GameContext) {
        match mode {
            Mode::Free => {}
            Mode::Poet => self.poem.clear(),
            Mode::Tower => self.max_height = 0.0,
            Mode::Chaos => {
                if let Some(stale) = self.chaos_timer.take() {
                    ctx.timers.cancel(stale);
                }
                self.schedule_chaos(ctx);
            }
        }
        ctx.emit(GameEvent::ModeActivated { mode });
    }

    fn deactivate(&mut self, mode: Mode, ctx: &mut GameContext) {
        if mode == Mode::Chaos {
            if let Some(timer) = self.chaos_timer.take() {
                ctx.timers.cancel(timer);
            }
            ctx.gravity.set_direction(GravityDirection::Down, &mut ctx.physics);
            ctx.emit(GameEvent::GravityChanged {
                direction: GravityDirection::Down,
                enabled: ctx.gravity.enabled(),
            });
        }
        ctx.emit(GameEvent::ModeDeactivated { mode });
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}
