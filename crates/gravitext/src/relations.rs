//! Synonym and antonym detection between live word blocks.
//!
//! A small bilingual lexicon decides whether two words are related. Synonyms pull
//! toward each other, antonyms push apart. Each distinct word pair counts once per
//! session.

use std::collections::HashSet;

use crate::achievements::{AchievementId, Achievements};
use crate::api::game::GameContext;
use crate::api::types::{BlockId, Hsl};
use crate::blocks::BlockManager;

/// Related pairs needed for `word_master`.
const WORD_MASTER_PAIRS: u32 = 10;
/// Velocity change (px/s) given to each block of a related pair.
const RELATION_KICK: f32 = 150.0;
const RELATION_PARTICLES: u32 = 12;

const SYNONYMS: &[(&str, &str)] = &[
    ("большой", "огромный"),
    ("маленький", "крошечный"),
    ("быстрый", "скорый"),
    ("умный", "мудрый"),
    ("друг", "товарищ"),
    ("радость", "счастье"),
    ("красивый", "прекрасный"),
    ("дом", "жилище"),
    ("путь", "дорога"),
    ("смелый", "храбрый"),
    ("big", "large"),
    ("small", "tiny"),
    ("fast", "quick"),
    ("smart", "clever"),
    ("happy", "glad"),
    ("friend", "buddy"),
    ("beautiful", "pretty"),
    ("begin", "start"),
];

const ANTONYMS: &[(&str, &str)] = &[
    ("день", "ночь"),
    ("свет", "тьма"),
    ("добро", "зло"),
    ("горячий", "холодный"),
    ("белый", "чёрный"),
    ("верх", "низ"),
    ("любовь", "ненависть"),
    ("война", "мир"),
    ("начало", "конец"),
    ("big", "small"),
    ("day", "night"),
    ("light", "dark"),
    ("good", "evil"),
    ("hot", "cold"),
    ("black", "white"),
    ("up", "down"),
    ("love", "hate"),
    ("war", "peace"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Synonym,
    Antonym,
}

fn fold(word: &str) -> String {
    word.trim().to_lowercase().replace('ё', "е")
}

fn listed(table: &[(&str, &str)], a: &str, b: &str) -> bool {
    table.iter().any(|&(x, y)| {
        let (x, y) = (fold(x), fold(y));
        (x == a && y == b) || (x == b && y == a)
    })
}

/// How two words relate, ignoring case. A word is never related to itself.
pub fn relation(a: &str, b: &str) -> Option<Relation> {
    let (a, b) = (fold(a), fold(b));
    if a == b {
        None
    } else if listed(SYNONYMS, &a, &b) {
        Some(Relation::Synonym)
    } else if listed(ANTONYMS, &a, &b) {
        Some(Relation::Antonym)
    } else {
        None
    }
}

pub struct WordRelations {
    seen: HashSet<(String, String)>,
    synonym_pairs: u32,
    antonym_pairs: u32,
}

impl WordRelations {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            synonym_pairs: 0,
            antonym_pairs: 0,
        }
    }

    pub fn synonym_pairs(&self) -> u32 {
        self.synonym_pairs
    }

    pub fn antonym_pairs(&self) -> u32 {
        self.antonym_pairs
    }

    /// Compare a freshly created block against every other live block. Returns the
    /// partners it formed a new pair with.
    pub fn check_new_block(
        &mut self,
        id: BlockId,
        blocks: &BlockManager,
        achievements: &mut Achievements,
        ctx: &mut GameContext,
    ) -> Vec<(BlockId, Relation)> {
        let Some(new_block) = blocks.get(id) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for other in blocks.iter().filter(|b| b.id != id) {
            let Some(kind) = relation(&new_block.text, &other.text) else {
                continue;
            };
            let (a, b) = (fold(&new_block.text), fold(&other.text));
            let key = if a <= b { (a, b) } else { (b, a) };
            if !self.seen.insert(key) {
                continue;
            }

            let (pa, _) = ctx.physics.body_position(&new_block.body);
            let (pb, _) = ctx.physics.body_position(&other.body);
            let toward = (pb - pa).normalize_or_zero();
            let dir = match kind {
                Relation::Synonym => toward,
                Relation::Antonym => -toward,
            };
            for (body, sign) in [(new_block.body, 1.0), (other.body, -1.0)] {
                let v = ctx.physics.velocity(&body);
                ctx.physics.set_velocity(&body, v + dir * sign * RELATION_KICK);
            }

            let mid = (pa + pb) / 2.0;
            match kind {
                Relation::Synonym => {
                    self.synonym_pairs += 1;
                    ctx.notify(format!("🧲 Синонимы: {} + {}", new_block.text, other.text));
                    ctx.particles(mid, Hsl::new(200.0, 80.0, 60.0), RELATION_PARTICLES);
                    achievements.unlock(AchievementId::SynonymFinder, ctx);
                }
                Relation::Antonym => {
                    self.antonym_pairs += 1;
                    ctx.notify(format!("⚡ Антонимы: {} ↔ {}", new_block.text, other.text));
                    ctx.particles(mid, Hsl::new(0.0, 80.0, 60.0), RELATION_PARTICLES);
                    achievements.unlock(AchievementId::AntonymClash, ctx);
                }
            }
            if self.synonym_pairs + self.antonym_pairs >= WORD_MASTER_PAIRS {
                achievements.unlock(AchievementId::WordMaster, ctx);
            }
            log::debug!("{kind:?}: {} / {}", new_block.text, other.text);
            found.push((other.id, kind));
        }
        found
    }
}

impl Default for WordRelations {
    fn default() -> Self {
        Self::new()
    }
}
