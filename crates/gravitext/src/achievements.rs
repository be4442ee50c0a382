//! Achievement catalog and per-player unlock/progress state.
//!
//! The catalog is static data; only `unlocked` and `progress` are persisted, keyed by
//! the achievement's string id. Unlocking is one-way until [`Achievements::reset`].

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::game::GameContext;
use crate::api::types::{GameEvent, Sound, UnknownName};
use crate::storage::{self, Persisted};

/// Tower height (px) that earns `tower_builder`.
pub const TOWER_GOAL: f32 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstWord,
    #[serde(rename = "word_master_10")]
    WordMaster10,
    #[serde(rename = "word_master_50")]
    WordMaster50,
    #[serde(rename = "word_master_100")]
    WordMaster100,
    TowerBuilder,
    LevitationMaster,
    ExplosionMaster,
    TimeMaster,
    RainbowArtist,
    GravityFlipper,
    GlueMaster,
    SynonymFinder,
    AntonymClash,
    WordMaster,
    ChallengeMaster,
    MusicLover,
}

impl AchievementId {
    pub const ALL: [AchievementId; 16] = [
        AchievementId::FirstWord,
        AchievementId::WordMaster10,
        AchievementId::WordMaster50,
        AchievementId::WordMaster100,
        AchievementId::TowerBuilder,
        AchievementId::LevitationMaster,
        AchievementId::ExplosionMaster,
        AchievementId::TimeMaster,
        AchievementId::RainbowArtist,
        AchievementId::GravityFlipper,
        AchievementId::GlueMaster,
        AchievementId::SynonymFinder,
        AchievementId::AntonymClash,
        AchievementId::WordMaster,
        AchievementId::ChallengeMaster,
        AchievementId::MusicLover,
    ];

    /// Word-count milestones, checked on every new word.
    const WORD_MILESTONES: [AchievementId; 3] = [
        AchievementId::WordMaster10,
        AchievementId::WordMaster50,
        AchievementId::WordMaster100,
    ];

    pub fn as_str(self) -> &'static str {
        self.info().key
    }

    pub fn info(self) -> &'static AchievementInfo {
        &CATALOG[self as usize]
    }
}

impl FromStr for AchievementId {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownName::new("achievement", s))
    }
}

/// Static catalog entry.
#[derive(Debug)]
pub struct AchievementInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// Progress needed to unlock; `None` for one-shot achievements.
    pub target: Option<u32>,
}

const fn entry(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    target: Option<u32>,
) -> AchievementInfo {
    AchievementInfo { key, name, description, icon, target }
}

// Indexed by `AchievementId as usize`.
static CATALOG: [AchievementInfo; 16] = [
    entry("first_word", "Первое слово", "Создай своё первое слово", "✨", None),
    entry("word_master_10", "Мастер слов", "Создай 10 слов", "📝", Some(10)),
    entry("word_master_50", "Гуру слов", "Создай 50 слов", "📚", Some(50)),
    entry("word_master_100", "Легенда слов", "Создай 100 слов", "👑", Some(100)),
    entry("tower_builder", "Строитель башен", "Построй башню высотой 500px", "🏗️", None),
    entry("levitation_master", "Мастер левитации", "Используй левитацию 10 раз", "🌌", Some(10)),
    entry("explosion_master", "Взрывник", "Используй команду ВЗРЫВ", "💥", None),
    entry("time_master", "Властелин времени", "Используй команду СТОП", "❄️", None),
    entry("rainbow_artist", "Радужный художник", "Используй команду РАДУГА", "🌈", None),
    entry("gravity_flipper", "Переворот гравитации", "Используй команду АНТИГРАВИТИ", "🔄", None),
    entry("glue_master", "Мастер клея", "Используй команду КЛЕЙ", "🔗", None),
    entry("synonym_finder", "Искатель синонимов", "Найди первую пару синонимов", "🧲", None),
    entry("antonym_clash", "Столкновение антонимов", "Создай первую пару антонимов", "⚡", None),
    entry("word_master", "Мастер связей", "Создай 10 пар связанных слов", "🎓", None),
    entry("challenge_master", "Мастер челленджей", "Выполни 10 ежедневных челленджей", "🎯", None),
    entry("music_lover", "Меломан", "Включи музыку 10 раз", "🎵", Some(10)),
];

/// Mutable per-achievement state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
}

impl AchievementState {
    fn fresh(id: AchievementId) -> Self {
        Self {
            unlocked: false,
            progress: id.info().target.map(|_| 0),
        }
    }
}

/// Catalog entry merged with its live state, as shown in the achievements panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementView {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AchievementProgress {
    pub unlocked: usize,
    pub total: usize,
    pub percentage: f32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AchievementsBlob {
    #[serde(default)]
    version: u32,
    achievements: BTreeMap<String, AchievementState>,
    #[serde(default)]
    total_words_created: u32,
}

impl Persisted for AchievementsBlob {
    const KEY: &'static str = "gravitext_achievements";
    const VERSION: u32 = 1;

    fn version(&self) -> u32 {
        self.version
    }
}

pub struct Achievements {
    states: [AchievementState; 16],
    total_words: u32,
}

impl Achievements {
    pub fn new() -> Self {
        Self {
            states: AchievementId::ALL.map(AchievementState::fresh),
            total_words: 0,
        }
    }

    /// Restore from storage. Unknown ids in the blob are dropped; ids missing from
    /// it keep their defaults. A malformed or outdated blob means a fresh start.
    pub fn load(ctx: &GameContext) -> Self {
        let mut achievements = Self::new();
        match storage::load::<AchievementsBlob>(ctx.storage.as_ref()) {
            Ok(Some(blob)) => {
                for (key, state) in blob.achievements {
                    match key.parse::<AchievementId>().ok() {
                        Some(id) => achievements.states[id as usize] = state,
                        None => log::debug!("Dropping unknown achievement {key:?}"),
                    }
                }
                achievements.total_words = blob.total_words_created;
                log::info!(
                    "Achievements loaded: {}/{} unlocked",
                    achievements.unlocked_count(),
                    AchievementId::ALL.len()
                );
            }
            Ok(None) => {}
            Err(err) => log::warn!("{err}; achievements start fresh"),
        }
        achievements
    }

    pub fn state(&self, id: AchievementId) -> AchievementState {
        self.states[id as usize]
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.states[id as usize].unlocked
    }

    pub fn total_words(&self) -> u32 {
        self.total_words
    }

    /// Unlock `id`. Returns `false` if it was already unlocked.
    pub fn unlock(&mut self, id: AchievementId, ctx: &mut GameContext) -> bool {
        if !self.unlock_quiet(id, ctx) {
            return false;
        }
        self.save(ctx);
        true
    }

    /// Unlock by string id; unknown ids are ignored.
    pub fn unlock_named(&mut self, key: &str, ctx: &mut GameContext) -> bool {
        key.parse::<AchievementId>().is_ok_and(|id| self.unlock(id, ctx))
    }

    /// Set progress while locked, unlocking once `value` reaches the target.
    pub fn update_progress(&mut self, id: AchievementId, value: u32, ctx: &mut GameContext) {
        if self.update_progress_quiet(id, value, ctx) {
            self.save(ctx);
        }
    }

    /// Progress + 1 while locked.
    pub fn advance(&mut self, id: AchievementId, ctx: &mut GameContext) {
        let state = self.states[id as usize];
        if state.unlocked {
            return;
        }
        let next = state.progress.unwrap_or(0).saturating_add(1);
        self.update_progress(id, next, ctx);
    }

    /// Count one more created word and re-check every word milestone.
    pub fn increment_word_count(&mut self, ctx: &mut GameContext) {
        self.total_words = self.total_words.saturating_add(1);
        if self.total_words == 1 {
            self.unlock_quiet(AchievementId::FirstWord, ctx);
        }
        for id in AchievementId::WORD_MILESTONES {
            self.update_progress_quiet(id, self.total_words, ctx);
        }
        self.save(ctx);
    }

    pub fn check_tower_height(&mut self, height: f32, ctx: &mut GameContext) {
        if height >= TOWER_GOAL {
            self.unlock(AchievementId::TowerBuilder, ctx);
        }
    }

    pub fn increment_levitation(&mut self, ctx: &mut GameContext) {
        self.advance(AchievementId::LevitationMaster, ctx);
    }

    pub fn unlocked_achievements(&self) -> Vec<AchievementView> {
        self.views().filter(|v| v.unlocked).collect()
    }

    pub fn locked_achievements(&self) -> Vec<AchievementView> {
        self.views().filter(|v| !v.unlocked).collect()
    }

    /// Whole catalog in display order.
    pub fn all(&self) -> Vec<AchievementView> {
        self.views().collect()
    }

    pub fn progress(&self) -> AchievementProgress {
        let total = AchievementId::ALL.len();
        let unlocked = self.unlocked_count();
        AchievementProgress {
            unlocked,
            total,
            percentage: unlocked as f32 / total as f32 * 100.0,
        }
    }

    /// Lock everything, zero all progress and the word counter.
    pub fn reset(&mut self, ctx: &mut GameContext) {
        *self = Self::new();
        self.save(ctx);
        log::info!("Achievements reset");
    }

    fn unlocked_count(&self) -> usize {
        self.states.iter().filter(|s| s.unlocked).count()
    }

    fn views(&self) -> impl Iterator<Item = AchievementView> + '_ {
        AchievementId::ALL.into_iter().map(|id| {
            let info = id.info();
            let state = self.states[id as usize];
            AchievementView {
                id: info.key,
                name: info.name,
                description: info.description,
                icon: info.icon,
                unlocked: state.unlocked,
                progress: state.progress,
                target: info.target,
            }
        })
    }

    fn unlock_quiet(&mut self, id: AchievementId, ctx: &mut GameContext) -> bool {
        let state = &mut self.states[id as usize];
        if state.unlocked {
            return false;
        }
        state.unlocked = true;

        let info = id.info();
        log::info!("Achievement unlocked: {}", info.key);
        ctx.emit(GameEvent::AchievementUnlocked {
            id: info.key.to_string(),
            name: info.name.to_string(),
            icon: info.icon.to_string(),
        });
        ctx.play(Sound::Achievement);
        true
    }

    fn update_progress_quiet(&mut self, id: AchievementId, value: u32, ctx: &mut GameContext) -> bool {
        let state = &mut self.states[id as usize];
        if state.unlocked {
            return false;
        }
        state.progress = Some(value);
        if id.info().target.is_some_and(|target| value >= target) {
            self.unlock_quiet(id, ctx);
        }
        true
    }

    fn save(&self, ctx: &mut GameContext) {
        let blob = AchievementsBlob {
            version: AchievementsBlob::VERSION,
            achievements: AchievementId::ALL
                .into_iter()
                .map(|id| (id.as_str().to_string(), self.states[id as usize]))
                .collect(),
            total_words_created: self.total_words,
        };
        storage::save_or_log(ctx.storage.as_mut(), &blob);
    }
}

impl Default for Achievements {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::GameConfig;
    use crate::core::clock::FixedClock;
    use crate::storage::{MemoryStorage, Storage};

    fn ctx() -> GameContext {
        GameContext::new(
            GameConfig::default(),
            Box::new(MemoryStorage::new()),
            Box::new(FixedClock::new("2024-05-01")),
        )
    }

    fn unlocked_events(ctx: &mut GameContext) -> Vec<String> {
        ctx.bus
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::AchievementUnlocked { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn catalog_keys_match_serde_names() {
        for id in AchievementId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(id.as_str().parse::<AchievementId>(), Ok(id));
        }
        assert!("nope".parse::<AchievementId>().is_err());
    }

    #[test]
    fn unlock_is_one_way_and_notifies_once() {
        let mut ctx = ctx();
        let mut a = Achievements::new();
        assert!(a.unlock(AchievementId::GlueMaster, &mut ctx));
        assert!(!a.unlock(AchievementId::GlueMaster, &mut ctx));
        assert_eq!(unlocked_events(&mut ctx), vec!["glue_master".to_string()]);
        assert!(!a.unlock_named("unknown", &mut ctx));
    }

    #[test]
    fn word_milestones_unlock_exactly_at_threshold() {
        let mut ctx = ctx();
        let mut a = Achievements::new();

        a.increment_word_count(&mut ctx);
        assert!(a.is_unlocked(AchievementId::FirstWord));
        assert_eq!(unlocked_events(&mut ctx), vec!["first_word".to_string()]);

        for n in 2..=100 {
            a.increment_word_count(&mut ctx);
            assert_eq!(a.is_unlocked(AchievementId::WordMaster10), n >= 10, "at {n}");
            assert_eq!(a.is_unlocked(AchievementId::WordMaster50), n >= 50, "at {n}");
            assert_eq!(a.is_unlocked(AchievementId::WordMaster100), n >= 100, "at {n}");
        }
        assert_eq!(a.total_words(), 100);
        // Progress freezes at the unlock value
        assert_eq!(a.state(AchievementId::WordMaster10).progress, Some(10));
    }

    #[test]
    fn levitation_needs_ten() {
        let mut ctx = ctx();
        let mut a = Achievements::new();
        for _ in 0..9 {
            a.increment_levitation(&mut ctx);
        }
        assert!(!a.is_unlocked(AchievementId::LevitationMaster));
        a.increment_levitation(&mut ctx);
        assert!(a.is_unlocked(AchievementId::LevitationMaster));
    }

    #[test]
    fn tower_goal() {
        let mut ctx = ctx();
        let mut a = Achievements::new();
        a.check_tower_height(499.0, &mut ctx);
        assert!(!a.is_unlocked(AchievementId::TowerBuilder));
        a.check_tower_height(500.0, &mut ctx);
        assert!(a.is_unlocked(AchievementId::TowerBuilder));
    }

    #[test]
    fn progress_summary() {
        let mut ctx = ctx();
        let mut a = Achievements::new();
        assert_eq!(a.progress().unlocked, 0);
        a.unlock(AchievementId::TimeMaster, &mut ctx);
        a.unlock(AchievementId::RainbowArtist, &mut ctx);
        a.unlock(AchievementId::ExplosionMaster, &mut ctx);
        a.unlock(AchievementId::GlueMaster, &mut ctx);
        let p = a.progress();
        assert_eq!((p.unlocked, p.total), (4, 16));
        assert_eq!(p.percentage, 25.0);
        assert_eq!(a.unlocked_achievements().len(), 4);
        assert_eq!(a.locked_achievements().len(), 12);
    }

    #[test]
    fn state_survives_reload() {
        let mut ctx = ctx();
        let mut a = Achievements::new();
        a.increment_word_count(&mut ctx);
        a.increment_word_count(&mut ctx);
        a.unlock(AchievementId::TimeMaster, &mut ctx);

        let b = Achievements::load(&ctx);
        assert_eq!(b.total_words(), 2);
        assert!(b.is_unlocked(AchievementId::FirstWord));
        assert!(b.is_unlocked(AchievementId::TimeMaster));
        assert_eq!(b.state(AchievementId::WordMaster10).progress, Some(2));
    }

    #[test]
    fn malformed_or_foreign_blobs_fall_back() {
        let mut ctx = ctx();
        ctx.storage.set(AchievementsBlob::KEY, "{not json");
        assert_eq!(Achievements::load(&ctx).total_words(), 0);

        ctx.storage.set(
            AchievementsBlob::KEY,
            r#"{"version":1,"achievements":{"glue_master":{"unlocked":true},"retired":{"unlocked":true}},"totalWordsCreated":7}"#,
        );
        let a = Achievements::load(&ctx);
        assert!(a.is_unlocked(AchievementId::GlueMaster));
        assert_eq!(a.progress().unlocked, 1);
        assert_eq!(a.state(AchievementId::WordMaster10).progress, Some(0));
        assert_eq!(a.total_words(), 7);

        // Unversioned blob from an older build
        ctx.storage.set(
            AchievementsBlob::KEY,
            r#"{"achievements":{"glue_master":{"unlocked":true}},"totalWordsCreated":7}"#,
        );
        assert_eq!(Achievements::load(&ctx).progress().unlocked, 0);
    }

    #[test]
    fn reset_locks_everything() {
        let mut ctx = ctx();
        let mut a = Achievements::new();
        for _ in 0..12 {
            a.increment_word_count(&mut ctx);
        }
        a.reset(&mut ctx);
        assert_eq!(a.progress().unlocked, 0);
        assert_eq!(a.total_words(), 0);
        assert_eq!(Achievements::load(&ctx).total_words(), 0);
    }
}
