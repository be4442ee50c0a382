//! Word blocks: creation, removal, derived geometry and the glue graph.
//!
//! The manager is the only owner of the active block list and of every glue spring.
//! The physics world just simulates them.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::api::types::{BlockId, Hsl};
use crate::core::physics::{
    BodyDesc, ColliderDesc, ColliderMaterial, CollisionPair, JointHandle, PhysicsBody,
    PhysicsWorld, SpringDesc,
};
use crate::core::timers::{TimerId, TimerTask, Timers};

/// Horizontal space per character.
pub const CHAR_WIDTH: f32 = 25.0;
/// Extra width around the text.
pub const PADDING: f32 = 30.0;
/// No block is ever narrower than this.
pub const MIN_WIDTH: f32 = 80.0;
pub const BLOCK_HEIGHT: f32 = 50.0;
const CORNER_RADIUS: f32 = 10.0;
/// Longer words are heavier.
const DENSITY_PER_CHAR: f32 = 0.001;

/// Closest two glued block centres may sit.
pub const GLUE_MIN_LENGTH: f32 = 50.0;
const GLUE_STIFFNESS: f32 = 2000.0;
const GLUE_DAMPING: f32 = 50.0;
/// Share of velocity each block keeps at the moment it is glued.
const GLUE_VELOCITY_KEEP: f32 = 0.7;

/// Spin (rad/s) above which glued chains are slowed down.
const SPIN_LIMIT: f32 = 12.0;
const SPIN_DECAY: f32 = 0.85;
const SPIN_DAMP_PERIOD: f32 = 0.1;
/// How long spin damping keeps running after glue is switched on.
pub const SPIN_DAMP_DURATION: f32 = 15.0;

/// Collider surface parameters that glue mode changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub friction: f32,
    pub restitution: f32,
    /// Linear damping; plays the role of air drag.
    pub air_drag: f32,
}

/// Surface of a freshly created block.
pub const LOOSE: Surface = Surface {
    friction: 0.3,
    restitution: 0.6,
    air_drag: 0.6,
};

/// Surface while glue mode is on: grippy, dull, draggy.
pub const GLUED: Surface = Surface {
    friction: 1.0,
    restitution: 0.2,
    air_drag: 1.2,
};

/// Size of the block for a word: width grows with character count, never below
/// [`MIN_WIDTH`]; height is constant.
pub fn block_size(word: &str) -> Vec2 {
    let chars = word.chars().count() as f32;
    Vec2::new((chars * CHAR_WIDTH + PADDING).max(MIN_WIDTH), BLOCK_HEIGHT)
}

/// A word turned into a rigid body.
#[derive(Debug, Clone)]
pub struct WordBlock {
    pub id: BlockId,
    pub text: String,
    pub color: Hsl,
    pub size: Vec2,
    pub body: PhysicsBody,
}

/// Per-frame overlay data for drawing a block's label at its live pose.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockLabel {
    pub id: BlockId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub width: f32,
    pub height: f32,
    pub fill: String,
    pub stroke: String,
}

#[derive(Debug, Clone, Copy)]
struct GlueLink {
    pair: (BlockId, BlockId),
    joint: JointHandle,
}

fn pair_key(a: BlockId, b: BlockId) -> (BlockId, BlockId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct BlockManager {
    blocks: Vec<WordBlock>,
    next_id: u32,
    sticky: bool,
    glue: Vec<GlueLink>,
    glued_pairs: HashSet<(BlockId, BlockId)>,
    spin_damper: Option<TimerId>,
}

impl BlockManager {
    pub fn new() -> Self {
        Self {
            blocks: Vec::with_capacity(64),
            next_id: 1,
            sticky: false,
            glue: Vec::new(),
            glued_pairs: HashSet::new(),
            spin_damper: None,
        }
    }

    /// Drop a new word block at `at`. Returns `None` (and changes nothing) when the
    /// text is blank.
    pub fn create_block(
        &mut self,
        text: &str,
        at: Vec2,
        physics: &mut PhysicsWorld,
        rng: &mut impl Rng,
    ) -> Option<BlockId> {
        let word = text.trim();
        if word.is_empty() {
            return None;
        }

        let size = block_size(word);
        let color = Hsl::vibrant(rng);
        let surface = if self.sticky { GLUED } else { LOOSE };

        let id = BlockId(self.next_id);
        self.next_id += 1;

        let desc = BodyDesc::dynamic(ColliderDesc::RoundCuboid {
            half_width: size.x / 2.0,
            half_height: size.y / 2.0,
            border_radius: CORNER_RADIUS,
        })
        .with_position(at)
        .with_linear_damping(surface.air_drag);
        let material = ColliderMaterial {
            restitution: surface.restitution,
            friction: surface.friction,
            density: DENSITY_PER_CHAR * word.chars().count() as f32,
        };
        let body = physics.create_body(Some(id), &desc, material);

        self.blocks.push(WordBlock {
            id,
            text: word.to_string(),
            color,
            size,
            body,
        });
        log::debug!("Block {} created: {:?}", id.0, word);
        Some(id)
    }

    /// Remove one block (and any glue attached to it). Returns `false` for unknown ids.
    pub fn remove_block(&mut self, id: BlockId, physics: &mut PhysicsWorld) -> bool {
        let Some(idx) = self.blocks.iter().position(|b| b.id == id) else {
            return false;
        };
        let block = self.blocks.remove(idx);
        physics.remove_body(&block.body);
        self.glue.retain(|link| link.pair.0 != id && link.pair.1 != id);
        self.glued_pairs.retain(|&(a, b)| a != id && b != id);
        true
    }

    /// Remove every block. Glue mode itself stays as it was.
    pub fn clear_all(&mut self, physics: &mut PhysicsWorld) {
        for block in self.blocks.drain(..) {
            physics.remove_body(&block.body);
        }
        self.glue.clear();
        self.glued_pairs.clear();
    }

    pub fn get(&self, id: BlockId) -> Option<&WordBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Blocks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &WordBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn position(&self, id: BlockId, physics: &PhysicsWorld) -> Option<Vec2> {
        self.get(id).map(|b| physics.body_position(&b.body).0)
    }

    /// The block whose centre is highest on screen (smallest y).
    pub fn highest(&self, physics: &PhysicsWorld) -> Option<BlockId> {
        self.blocks
            .iter()
            .map(|b| (b.id, physics.body_position(&b.body).0.y))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// The block whose centre is lowest on screen (largest y).
    pub fn lowest(&self, physics: &PhysicsWorld) -> Option<BlockId> {
        self.blocks
            .iter()
            .map(|b| (b.id, physics.body_position(&b.body).0.y))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Vertical span between the highest and lowest block centres; 0 with no blocks.
    pub fn tower_height(&self, physics: &PhysicsWorld) -> f32 {
        let mut ys = self.blocks.iter().map(|b| physics.body_position(&b.body).0.y);
        let Some(first) = ys.next() else {
            return 0.0;
        };
        let (min, max) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        (max - min).abs()
    }

    /// Give every block a fresh random colour. Physics state is untouched.
    pub fn change_all_colors(&mut self, rng: &mut impl Rng) {
        for block in self.blocks.iter_mut() {
            block.color = Hsl::vibrant(rng);
        }
    }

    // -- Glue --

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn glue_count(&self) -> usize {
        self.glue.len()
    }

    pub fn is_glued(&self, a: BlockId, b: BlockId) -> bool {
        self.glued_pairs.contains(&pair_key(a, b))
    }

    /// Enter glue mode: grippy surfaces on every block, and from now on each new
    /// block-block contact becomes a spring. Spin damping runs for
    /// [`SPIN_DAMP_DURATION`] seconds; calling again restarts it.
    pub fn make_sticky(&mut self, physics: &mut PhysicsWorld, timers: &mut Timers) {
        self.sticky = true;
        for block in &self.blocks {
            apply_surface(physics, &block.body, GLUED);
        }
        if let Some(old) = self.spin_damper.take() {
            timers.cancel(old);
        }
        self.spin_damper = Some(timers.every_for(
            SPIN_DAMP_PERIOD,
            SPIN_DAMP_DURATION,
            TimerTask::SpinDamp,
        ));
        log::info!("Glue on ({} blocks)", self.blocks.len());
    }

    /// Leave glue mode: remove every glue spring and restore loose surfaces.
    /// Returns how many springs were removed. A no-op when glue is not active.
    pub fn make_unsticky(&mut self, physics: &mut PhysicsWorld, timers: &mut Timers) -> usize {
        if !self.sticky && self.glue.is_empty() {
            return 0;
        }
        let removed = self.glue.len();
        for link in self.glue.drain(..) {
            physics.remove_joint(link.joint);
        }
        self.glued_pairs.clear();
        for block in &self.blocks {
            apply_surface(physics, &block.body, LOOSE);
        }
        if let Some(damper) = self.spin_damper.take() {
            timers.cancel(damper);
        }
        self.sticky = false;
        log::info!("Glue off, {removed} links removed");
        removed
    }

    /// Turn fresh block-block contacts into glue springs while glue mode is on.
    /// Each unordered pair is glued at most once. Returns the number of new links.
    pub fn handle_collisions(&mut self, pairs: &[CollisionPair], physics: &mut PhysicsWorld) -> usize {
        if !self.sticky {
            return 0;
        }
        let mut created = 0;
        for pair in pairs.iter().filter(|p| p.started && p.block_a != p.block_b) {
            let key = pair_key(pair.block_a, pair.block_b);
            if self.glued_pairs.contains(&key) {
                continue;
            }
            let (Some(a), Some(b)) = (self.get(key.0), self.get(key.1)) else {
                continue;
            };
            let (body_a, body_b) = (a.body, b.body);

            let distance = physics
                .body_position(&body_a)
                .0
                .distance(physics.body_position(&body_b).0);
            let joint = physics.create_spring(
                &body_a,
                &body_b,
                &SpringDesc {
                    rest_length: distance.max(GLUE_MIN_LENGTH),
                    stiffness: GLUE_STIFFNESS,
                    damping: GLUE_DAMPING,
                },
            );
            for body in [body_a, body_b] {
                let v = physics.velocity(&body);
                physics.set_velocity(&body, v * GLUE_VELOCITY_KEEP);
            }

            self.glued_pairs.insert(key);
            self.glue.push(GlueLink { pair: key, joint });
            created += 1;
        }
        created
    }

    /// One tick of the post-glue spin limiter.
    pub fn damp_spin(&self, physics: &mut PhysicsWorld) {
        for block in &self.blocks {
            let w = physics.angular_velocity(&block.body);
            if w.abs() > SPIN_LIMIT {
                physics.set_angular_velocity(&block.body, w * SPIN_DECAY);
            }
        }
    }

    /// Label overlay for the current frame.
    pub fn labels(&self, physics: &PhysicsWorld) -> Vec<BlockLabel> {
        self.blocks
            .iter()
            .map(|b| {
                let (pos, rotation) = physics.body_position(&b.body);
                BlockLabel {
                    id: b.id,
                    text: b.text.clone(),
                    x: pos.x,
                    y: pos.y,
                    rotation,
                    width: b.size.x,
                    height: b.size.y,
                    fill: b.color.css(),
                    stroke: b.color.stroke_css(),
                }
            })
            .collect()
    }
}

impl Default for BlockManager {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_surface(physics: &mut PhysicsWorld, body: &PhysicsBody, surface: Surface) {
    physics.set_surface(body, surface.friction, surface.restitution);
    physics.set_linear_damping(body, surface.air_drag);
}
