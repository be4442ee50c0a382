use gravitext::{FixedTimestep, GameEvent, Gravitext, InputEvent, InputQueue};
use serde::Serialize;

/// Wires the game core to the page's animation frame.
///
/// The page pushes player actions between frames; each `tick` applies them in
/// order, runs as many fixed steps as the frame time allows and moves the
/// events they produced into the outbox for the page to collect.
pub struct GameRunner {
    game: Gravitext,
    input: InputQueue,
    timestep: FixedTimestep,
    outbox: Vec<GameEvent>,
}

impl GameRunner {
    pub fn new(game: Gravitext) -> Self {
        let config = &game.context().config;
        let timestep = FixedTimestep::new(config.fixed_dt, config.max_substeps);
        Self {
            game,
            input: InputQueue::new(),
            timestep,
            outbox: Vec::with_capacity(64),
        }
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: apply queued input, then the fixed steps owed for `dt`.
    pub fn tick(&mut self, dt: f32) {
        self.game.handle_input(&mut self.input);

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.step(self.timestep.dt());
        }

        self.outbox.extend(self.game.drain_events());
    }

    /// Drop any partial step, e.g. when the tab becomes visible again.
    pub fn reset_clock(&mut self) {
        self.timestep.reset();
    }

    /// Events collected since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn game(&self) -> &Gravitext {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Gravitext {
        &mut self.game
    }

    // ---- JSON accessors read by the page script ----

    pub fn labels_json(&self) -> String {
        to_json(&self.game.labels(), "[]")
    }

    pub fn events_json(&mut self) -> String {
        let events = self.take_events();
        to_json(&events, "[]")
    }

    pub fn achievements_json(&self) -> String {
        to_json(&self.game.achievements().all(), "[]")
    }

    pub fn achievement_progress_json(&self) -> String {
        to_json(&self.game.achievements().progress(), "{}")
    }

    pub fn challenges_json(&self) -> String {
        to_json(self.game.challenges().current(), "[]")
    }

    pub fn challenge_progress_json(&self) -> String {
        to_json(&self.game.challenges().progress(), "{}")
    }

    pub fn stats_json(&self) -> String {
        to_json(&self.game.stats(), "{}")
    }

    pub fn audio_json(&self) -> String {
        to_json(&self.game.context().audio, "{}")
    }

    pub fn world_width(&self) -> f32 {
        self.game.context().config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.game.context().config.world_height
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        log::warn!("Could not encode page data: {err}");
        fallback.to_string()
    })
}
