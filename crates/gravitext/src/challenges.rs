//! Daily challenges.
//!
//! Every player gets the same three challenges on a given UTC date: the slot types and
//! targets are pure functions of a hash of the date string. Progress is polled from
//! counters owned elsewhere ([`ChallengeCounters`]) rather than pushed by each
//! mutation site, so a missed update heals on the next poll.

use serde::{Deserialize, Serialize};

use crate::achievements::{AchievementId, Achievements};
use crate::api::game::GameContext;
use crate::api::types::{GameEvent, Sound};
use crate::storage::{self, Persisted};

/// Challenges offered per day.
pub const DAILY_SLOTS: usize = 3;
/// Completed challenges needed for `challenge_master`.
const MASTER_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    CreateWords,
    FindSynonyms,
    FindAntonyms,
    UseExplosion,
    BuildTower,
    NoGravityWords,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 6] = [
        ChallengeKind::CreateWords,
        ChallengeKind::FindSynonyms,
        ChallengeKind::FindAntonyms,
        ChallengeKind::UseExplosion,
        ChallengeKind::BuildTower,
        ChallengeKind::NoGravityWords,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeKind::CreateWords => "create_words",
            ChallengeKind::FindSynonyms => "find_synonyms",
            ChallengeKind::FindAntonyms => "find_antonyms",
            ChallengeKind::UseExplosion => "use_explosion",
            ChallengeKind::BuildTower => "build_tower",
            ChallengeKind::NoGravityWords => "no_gravity_words",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ChallengeKind::CreateWords => "📝",
            ChallengeKind::FindSynonyms => "🧲",
            ChallengeKind::FindAntonyms => "⚡",
            ChallengeKind::UseExplosion => "💥",
            ChallengeKind::BuildTower => "🏗️",
            ChallengeKind::NoGravityWords => "🌌",
        }
    }

    /// Target for this kind under a given day seed.
    pub fn target(self, seed: u64) -> u32 {
        let pick = |base: u64, span: u64| (base + seed % span) as u32;
        match self {
            ChallengeKind::CreateWords => pick(15, 20),
            ChallengeKind::FindSynonyms | ChallengeKind::FindAntonyms => pick(3, 5),
            ChallengeKind::UseExplosion => pick(2, 3),
            ChallengeKind::BuildTower => pick(300, 300),
            ChallengeKind::NoGravityWords => pick(5, 10),
        }
    }

    pub fn title(self, target: u32) -> String {
        match self {
            ChallengeKind::CreateWords => format!("Создай {target} слов"),
            ChallengeKind::FindSynonyms => format!("Найди {target} пар синонимов"),
            ChallengeKind::FindAntonyms => format!("Найди {target} пар антонимов"),
            ChallengeKind::UseExplosion => format!("Используй ВЗРЫВ {target} раз"),
            ChallengeKind::BuildTower => format!("Построй башню высотой {target}px"),
            ChallengeKind::NoGravityWords => format!("Создай {target} слов без гравитации"),
        }
    }

    /// The live counter this kind is measured against.
    fn read(self, counters: &ChallengeCounters, own: &ChallengesBlob) -> u32 {
        match self {
            ChallengeKind::CreateWords => counters.words_created,
            ChallengeKind::FindSynonyms => counters.synonym_pairs,
            ChallengeKind::FindAntonyms => counters.antonym_pairs,
            ChallengeKind::UseExplosion => own.explosion_count,
            ChallengeKind::BuildTower => counters.tower_height.max(0.0).floor() as u32,
            ChallengeKind::NoGravityWords => own.no_gravity_words_count,
        }
    }
}

/// Snapshot of counters owned by other components, taken at poll time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChallengeCounters {
    pub words_created: u32,
    pub synonym_pairs: u32,
    pub antonym_pairs: u32,
    pub tower_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub title: String,
    pub icon: String,
    pub target: u32,
    pub current: u32,
    pub completed: bool,
    pub reward: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChallengeProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengesBlob {
    #[serde(default)]
    version: u32,
    last_update: Option<String>,
    #[serde(default)]
    current_challenges: Vec<Challenge>,
    #[serde(default)]
    completed_challenges: Vec<String>,
    #[serde(default)]
    explosion_count: u32,
    #[serde(default)]
    no_gravity_words_count: u32,
}

impl Persisted for ChallengesBlob {
    const KEY: &'static str = "gravitext_challenges";
    const VERSION: u32 = 1;

    fn version(&self) -> u32 {
        self.version
    }
}

/// Rolling 32-bit string hash (`h = h * 31 + unit` over UTF-16 units, wrapping),
/// made non-negative.
pub fn hash_code(s: &str) -> u64 {
    let hash = s.encode_utf16().fold(0i32, |h, unit| {
        (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    i64::from(hash).unsigned_abs()
}

/// The challenge for one slot of a day.
pub fn generate_challenge(seed: u64, slot: usize) -> Challenge {
    let kinds = ChallengeKind::ALL;
    let kind = kinds[((seed + slot as u64) % kinds.len() as u64) as usize];
    let target = kind.target(seed);
    Challenge {
        id: format!("{}_{slot}", kind.as_str()),
        kind,
        title: kind.title(target),
        icon: kind.icon().to_string(),
        target,
        current: 0,
        completed: false,
        reward: target * 10,
    }
}

/// The full set for a `YYYY-MM-DD` date.
pub fn daily_challenges(date: &str) -> Vec<Challenge> {
    let seed = hash_code(date);
    (0..DAILY_SLOTS).map(|slot| generate_challenge(seed, slot)).collect()
}

pub struct Challenges {
    state: ChallengesBlob,
}

impl Challenges {
    /// Restore from storage, regenerate for today if needed, and make sure a set
    /// exists even when the stored one was empty.
    pub fn load(ctx: &mut GameContext) -> Self {
        let state = match storage::load::<ChallengesBlob>(ctx.storage.as_ref()) {
            Ok(Some(blob)) => blob,
            Ok(None) => ChallengesBlob::default(),
            Err(err) => {
                log::warn!("{err}; challenges start fresh");
                ChallengesBlob::default()
            }
        };
        let mut challenges = Self { state };

        challenges.update_challenges(ctx);
        if challenges.state.current_challenges.is_empty() {
            log::info!("No challenges stored; generating");
            let today = ctx.clock.today();
            challenges.state.current_challenges = daily_challenges(&today);
            challenges.state.last_update = Some(today);
            challenges.save(ctx);
        }
        challenges
    }

    pub fn should_update(&self, today: &str) -> bool {
        self.state.last_update.as_deref() != Some(today)
    }

    /// Replace the set when the calendar day changed. Returns whether it did.
    pub fn update_challenges(&mut self, ctx: &mut GameContext) -> bool {
        let today = ctx.clock.today();
        if !self.should_update(&today) {
            return false;
        }
        self.state.current_challenges = daily_challenges(&today);
        self.state.last_update = Some(today.clone());
        self.save(ctx);
        log::info!("New daily challenges for {today}");
        ctx.emit(GameEvent::ChallengesRefreshed { date: today });
        true
    }

    /// Re-read every open challenge's counter and complete those that reached
    /// their target. Completed challenges never reopen.
    pub fn check_progress(
        &mut self,
        counters: &ChallengeCounters,
        achievements: &mut Achievements,
        ctx: &mut GameContext,
    ) {
        let mut finished = Vec::new();
        for idx in 0..self.state.current_challenges.len() {
            let challenge = &self.state.current_challenges[idx];
            if challenge.completed {
                continue;
            }
            let value = challenge.kind.read(counters, &self.state);
            let challenge = &mut self.state.current_challenges[idx];
            challenge.current = value.min(challenge.target);
            if challenge.current >= challenge.target {
                challenge.completed = true;
                finished.push((challenge.id.clone(), challenge.title.clone()));
            }
        }
        if finished.is_empty() {
            return;
        }

        for (id, title) in finished {
            log::info!("Challenge complete: {title}");
            ctx.notify(format!("🎉 Челлендж выполнен: {title}!"));
            ctx.play(Sound::Achievement);
            ctx.emit(GameEvent::ChallengeCompleted { id: id.clone(), title });
            self.state.completed_challenges.push(id);
            if self.state.completed_challenges.len() >= MASTER_THRESHOLD {
                achievements.unlock(AchievementId::ChallengeMaster, ctx);
            }
        }
        self.save(ctx);
    }

    pub fn track_explosion(
        &mut self,
        counters: &ChallengeCounters,
        achievements: &mut Achievements,
        ctx: &mut GameContext,
    ) {
        self.state.explosion_count += 1;
        self.save(ctx);
        self.check_progress(counters, achievements, ctx);
    }

    /// Count a word created with gravity off. Ignored while gravity is on.
    pub fn track_no_gravity_word(
        &mut self,
        counters: &ChallengeCounters,
        achievements: &mut Achievements,
        ctx: &mut GameContext,
    ) {
        if ctx.gravity.enabled() {
            return;
        }
        self.state.no_gravity_words_count += 1;
        self.save(ctx);
        self.check_progress(counters, achievements, ctx);
    }

    pub fn current(&self) -> &[Challenge] {
        &self.state.current_challenges
    }

    /// Ids of every challenge ever completed, oldest first.
    pub fn history(&self) -> &[String] {
        &self.state.completed_challenges
    }

    pub fn explosion_count(&self) -> u32 {
        self.state.explosion_count
    }

    pub fn no_gravity_words(&self) -> u32 {
        self.state.no_gravity_words_count
    }

    pub fn progress(&self) -> ChallengeProgress {
        let total = self.state.current_challenges.len();
        let completed = self.state.current_challenges.iter().filter(|c| c.completed).count();
        ChallengeProgress {
            completed,
            total,
            percentage: if total > 0 {
                completed as f32 / total as f32 * 100.0
            } else {
                0.0
            },
        }
    }

    fn save(&mut self, ctx: &mut GameContext) {
        self.state.version = ChallengesBlob::VERSION;
        storage::save_or_log(ctx.storage.as_mut(), &self.state);
    }
}
