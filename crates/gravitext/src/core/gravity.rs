use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::PhysicsWorld;
use crate::api::types::UnknownName;

/// Cardinal gravity direction in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityDirection {
    Up,
    Down,
    Left,
    Right,
}

impl GravityDirection {
    pub const ALL: [GravityDirection; 4] = [
        GravityDirection::Up,
        GravityDirection::Down,
        GravityDirection::Left,
        GravityDirection::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            GravityDirection::Up => GravityDirection::Down,
            GravityDirection::Down => GravityDirection::Up,
            GravityDirection::Left => GravityDirection::Right,
            GravityDirection::Right => GravityDirection::Left,
        }
    }

    /// Unit vector in Y-down screen coordinates.
    pub fn unit(self) -> Vec2 {
        match self {
            GravityDirection::Up => Vec2::new(0.0, -1.0),
            GravityDirection::Down => Vec2::new(0.0, 1.0),
            GravityDirection::Left => Vec2::new(-1.0, 0.0),
            GravityDirection::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            GravityDirection::Up => "↑",
            GravityDirection::Down => "↓",
            GravityDirection::Left => "←",
            GravityDirection::Right => "→",
        }
    }
}

impl FromStr for GravityDirection {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(GravityDirection::Up),
            "down" => Ok(GravityDirection::Down),
            "left" => Ok(GravityDirection::Left),
            "right" => Ok(GravityDirection::Right),
            _ => Err(UnknownName::new("gravity direction", s)),
        }
    }
}

/// Strength slider range.
pub const MIN_STRENGTH: f32 = 0.0;
pub const MAX_STRENGTH: f32 = 3.0;

/// Velocity kept by every free body when levitation starts.
const LEVITATION_VELOCITY_KEEP: f32 = 0.5;

/// Player-facing gravity switches. Writes the resulting vector into the physics world.
#[derive(Debug, Clone)]
pub struct GravityControl {
    enabled: bool,
    strength: f32,
    direction: GravityDirection,
    /// Acceleration in px/s² at strength 1.0.
    base: f32,
}

impl GravityControl {
    pub fn new(base: f32) -> Self {
        Self {
            enabled: true,
            strength: 1.0,
            direction: GravityDirection::Down,
            base,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn direction(&self) -> GravityDirection {
        self.direction
    }

    /// The acceleration vector the world should currently use.
    pub fn vector(&self) -> Vec2 {
        if self.enabled {
            self.direction.unit() * self.base * self.strength
        } else {
            Vec2::ZERO
        }
    }

    /// Flip gravity on or off. Turning it off also halves every free body's velocity
    /// so the scene drifts instead of flying apart. Returns the new state.
    pub fn toggle(&mut self, physics: &mut PhysicsWorld) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            for body in physics.dynamic_bodies() {
                let v = physics.velocity(&body);
                physics.set_velocity(&body, v * LEVITATION_VELOCITY_KEEP);
            }
        }
        self.apply(physics);
        self.enabled
    }

    pub fn set_direction(&mut self, direction: GravityDirection, physics: &mut PhysicsWorld) {
        self.direction = direction;
        self.apply(physics);
    }

    /// Clamped to the slider range. Non-finite input is ignored.
    pub fn set_strength(&mut self, strength: f32, physics: &mut PhysicsWorld) {
        if !strength.is_finite() {
            log::warn!("Ignoring gravity strength {strength}");
            return;
        }
        self.strength = strength.clamp(MIN_STRENGTH, MAX_STRENGTH);
        self.apply(physics);
    }

    pub fn apply(&self, physics: &mut PhysicsWorld) {
        physics.set_gravity(self.vector());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BlockId;
    use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial};

    #[test]
    fn opposite_is_an_involution() {
        for dir in GravityDirection::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn direction_and_strength_drive_world_gravity() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let mut gravity = GravityControl::new(1000.0);
        gravity.apply(&mut physics);
        assert_eq!(physics.gravity(), Vec2::new(0.0, 1000.0));

        gravity.set_direction(GravityDirection::Left, &mut physics);
        gravity.set_strength(2.0, &mut physics);
        assert_eq!(physics.gravity(), Vec2::new(-2000.0, 0.0));

        gravity.set_strength(99.0, &mut physics);
        assert_eq!(gravity.strength(), MAX_STRENGTH);
    }

    #[test]
    fn non_finite_strength_keeps_the_old_value() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let mut gravity = GravityControl::new(1000.0);
        gravity.set_strength(1.5, &mut physics);

        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            gravity.set_strength(bad, &mut physics);
            assert_eq!(gravity.strength(), 1.5);
            assert_eq!(physics.gravity(), Vec2::new(0.0, 1500.0));
        }
    }

    #[test]
    fn toggling_off_zeroes_gravity_and_slows_bodies() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let body = physics.create_body(
            Some(BlockId(1)),
            &BodyDesc::dynamic(ColliderDesc::Cuboid {
                half_width: 5.0,
                half_height: 5.0,
            }),
            ColliderMaterial::default(),
        );
        physics.set_velocity(&body, Vec2::new(100.0, -40.0));

        let mut gravity = GravityControl::new(1000.0);
        assert!(!gravity.toggle(&mut physics));
        assert_eq!(physics.gravity(), Vec2::ZERO);
        assert!((physics.velocity(&body).x - 50.0).abs() < 0.001);

        // Direction changes while off are remembered but not applied
        gravity.set_direction(GravityDirection::Up, &mut physics);
        assert_eq!(physics.gravity(), Vec2::ZERO);
        assert!(gravity.toggle(&mut physics));
        assert_eq!(physics.gravity(), Vec2::new(0.0, -1000.0));
    }

    #[test]
    fn parse_direction_names() {
        assert_eq!("LEFT".parse(), Ok(GravityDirection::Left));
        let err = "sideways".parse::<GravityDirection>().unwrap_err();
        assert_eq!(err.to_string(), "unknown gravity direction `sideways`");
    }
}
