//! Reserved words that trigger a global effect instead of creating a block.

use glam::Vec2;

use crate::achievements::AchievementId;
use crate::api::types::{GameEvent, Hsl, Sound};
use crate::core::timers::TimerTask;
use crate::gravitext::Gravitext;

/// Blocks farther than this from the blast centre are untouched.
pub const EXPLOSION_RADIUS: f32 = 1000.0;
/// Impulse on a block at the blast centre; falls off linearly with distance.
const EXPLOSION_IMPULSE: f32 = 15_000.0;
/// Blocks at the edge of the radius still get this share.
const EXPLOSION_MIN_FALLOFF: f32 = 0.1;
const EXPLOSION_PARTICLES: u32 = 100;

const RAINBOW_BURSTS: u32 = 50;
const RAINBOW_BURST_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Explosion,
    Freeze,
    Rainbow,
    AntiGravity,
    Glue,
    Unglue,
}

/// Every reserved word, in both languages, upper case.
const TABLE: &[(&str, Command)] = &[
    ("ВЗРЫВ", Command::Explosion),
    ("ВЗРЫВ!", Command::Explosion),
    ("BOOM", Command::Explosion),
    ("СТОП", Command::Freeze),
    ("СТОП!", Command::Freeze),
    ("STOP", Command::Freeze),
    ("FREEZE", Command::Freeze),
    ("РАДУГА", Command::Rainbow),
    ("RAINBOW", Command::Rainbow),
    ("COLOR", Command::Rainbow),
    ("АНТИГРАВИТИ", Command::AntiGravity),
    ("ANTIGRAVITY", Command::AntiGravity),
    ("FLIP", Command::AntiGravity),
    ("КЛЕЙ", Command::Glue),
    ("GLUE", Command::Glue),
    ("STICK", Command::Glue),
    ("РАСКЛЕЙ", Command::Unglue),
    ("UNGLUE", Command::Unglue),
    ("UNSTICK", Command::Unglue),
];

impl Command {
    /// Look up a typed word, ignoring case and surrounding whitespace.
    pub fn parse(word: &str) -> Option<Self> {
        let upper = word.trim().to_uppercase();
        TABLE.iter().find(|(w, _)| *w == upper).map(|&(_, cmd)| cmd)
    }

    /// Run the effect. `at` is where the word was typed; effects that need a
    /// location use it, the rest act on the whole field.
    pub fn execute(self, game: &mut Gravitext, at: Vec2) {
        log::info!("Command {self:?}");
        match self {
            Command::Explosion => explosion(game, at),
            Command::Freeze => freeze(game),
            Command::Rainbow => rainbow(game),
            Command::AntiGravity => anti_gravity(game),
            Command::Glue => glue(game),
            Command::Unglue => unglue(game),
        }
    }
}

/// All reserved words, for the help panel.
pub fn command_words() -> Vec<&'static str> {
    TABLE.iter().map(|&(w, _)| w).collect()
}

fn explosion(game: &mut Gravitext, at: Vec2) {
    let ctx = &mut game.ctx;
    for body in ctx.physics.dynamic_bodies() {
        let (pos, _) = ctx.physics.body_position(&body);
        let distance = pos.distance(at);
        if distance >= EXPLOSION_RADIUS {
            continue;
        }
        let falloff = (1.0 - distance / EXPLOSION_RADIUS).max(EXPLOSION_MIN_FALLOFF);
        let push = (pos - at).normalize_or_zero() * EXPLOSION_IMPULSE * falloff;
        ctx.physics.apply_impulse_at_point(&body, push, pos);
    }

    ctx.emit(GameEvent::Explosion {
        x: at.x,
        y: at.y,
        count: EXPLOSION_PARTICLES,
    });
    ctx.play(Sound::Explosion);
    ctx.notify("💥 ВЗРЫВ!");
    game.achievements.unlock(AchievementId::ExplosionMaster, &mut game.ctx);

    let counters = game.counters();
    game.challenges
        .track_explosion(&counters, &mut game.achievements, &mut game.ctx);
}

/// Stop time. Freezing again while frozen restarts the countdown and keeps the
/// time scale that was active before the first freeze.
fn freeze(game: &mut Gravitext) {
    let ctx = &mut game.ctx;
    let restore = match game.frozen.take() {
        Some((timer, restore)) => {
            ctx.timers.cancel(timer);
            restore
        }
        None => ctx.physics.time_scale(),
    };
    ctx.physics.set_time_scale(0.0);
    let timer = ctx
        .timers
        .after(ctx.config.freeze_duration, TimerTask::FreezeRelease { restore });
    game.frozen = Some((timer, restore));

    ctx.notify(format!(
        "❄️ Время остановлено на {} секунды!",
        ctx.config.freeze_duration
    ));
    ctx.play(Sound::Freeze);
    game.achievements.unlock(AchievementId::TimeMaster, &mut game.ctx);
}

fn rainbow(game: &mut Gravitext) {
    let ctx = &mut game.ctx;
    game.blocks.change_all_colors(&mut ctx.rng);

    let center = ctx.center();
    for i in 0..RAINBOW_BURSTS {
        let hue = i as f32 / RAINBOW_BURSTS as f32 * 360.0;
        ctx.particles(center, Hsl::new(hue, 80.0, 60.0), RAINBOW_BURST_SIZE);
    }
    ctx.notify("🌈 Радужные цвета!");
    ctx.play(Sound::Rainbow);
    game.achievements.unlock(AchievementId::RainbowArtist, &mut game.ctx);
}

fn anti_gravity(game: &mut Gravitext) {
    let ctx = &mut game.ctx;
    let direction = ctx.gravity.direction().opposite();
    ctx.gravity.set_direction(direction, &mut ctx.physics);
    ctx.emit(GameEvent::GravityChanged {
        direction,
        enabled: ctx.gravity.enabled(),
    });
    ctx.notify("🔄 Гравитация перевёрнута!");
    ctx.play(Sound::Flip);
    game.achievements.unlock(AchievementId::GravityFlipper, &mut game.ctx);
}

fn glue(game: &mut Gravitext) {
    let ctx = &mut game.ctx;
    game.blocks.make_sticky(&mut ctx.physics, &mut ctx.timers);
    ctx.notify("🔗 Блоки теперь липкие!");
    ctx.play(Sound::Glue);
    game.achievements.unlock(AchievementId::GlueMaster, &mut game.ctx);
}

fn unglue(game: &mut Gravitext) {
    let ctx = &mut game.ctx;
    game.blocks.make_unsticky(&mut ctx.physics, &mut ctx.timers);
    ctx.notify("🧊 Блоки расклеены!");
    ctx.play(Sound::Freeze);
}
