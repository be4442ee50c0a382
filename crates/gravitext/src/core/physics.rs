use glam::Vec2;
use rapier2d::prelude::*;
use std::sync::Mutex;

use crate::api::types::BlockId;

// ---------------------------------------------------------------------------
// glam <-> nalgebra conversions
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

/// `user_data` marker for bodies that are not word blocks (walls).
const NO_BLOCK: u128 = u128::MAX;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Cuboid { half_width: f32, half_height: f32 },
    /// Rectangle with rounded corners. The half extents include the rounding.
    RoundCuboid { half_width: f32, half_height: f32, border_radius: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
            ColliderDesc::RoundCuboid { half_width, half_height, border_radius } => {
                let r = border_radius.min(half_width).min(half_height);
                ColliderBuilder::round_cuboid(half_width - r, half_height - r, r)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            collider,
            linear_damping: 0.0,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            ..Self::dynamic(collider)
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    /// Set the linear damping (velocity decay). Plays the role of air friction.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }
}

/// Handle pair referencing Rapier internals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// Handle to a joint in the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointHandle(pub(crate) ImpulseJointHandle);

/// Spring linking two body centres. Pulls toward `rest_length` from either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDesc {
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

/// A collision event between two word blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub block_a: BlockId,
    pub block_b: BlockId,
    /// `true` when the collision just started, `false` when it ended.
    pub started: bool,
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        self.collisions
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut events) = self.collisions.lock() {
            events.push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are not used; the trait requires the method.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single struct.
/// Y-down pixel coordinates: positive Y gravity pulls toward the floor.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    dt: f32,
    time_scale: f32,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    pub fn new(gravity: Vec2) -> Self {
        let integration_parameters = IntegrationParameters::default();
        Self {
            gravity: vec2_to_na(gravity),
            dt: integration_parameters.dt,
            time_scale: 1.0,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep (before time scaling).
    pub fn set_dt(&mut self, dt: f32) {
        self.dt = dt;
    }

    pub fn gravity(&self) -> Vec2 {
        na_to_vec2(&self.gravity)
    }

    /// Replace the gravity vector and wake every sleeping body so it reacts.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vec2_to_na(gravity);
        for (_, rb) in self.bodies.iter_mut() {
            if rb.is_dynamic() {
                rb.wake_up(true);
            }
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Scale simulated time. `0.0` pauses the simulation entirely.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Create a rigid body + collider and return handles.
    /// The owning block (if any) is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        owner: Option<BlockId>,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .linear_damping(desc.linear_damping)
            .user_data(owner.map_or(NO_BLOCK, |id| id.0 as u128))
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body, its colliders and any joints attached to it.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Every non-static body currently in the simulation.
    pub fn dynamic_bodies(&self) -> Vec<PhysicsBody> {
        self.colliders
            .iter()
            .filter_map(|(collider_handle, collider)| {
                let body_handle = collider.parent()?;
                let rb = self.bodies.get(body_handle)?;
                rb.is_dynamic().then_some(PhysicsBody {
                    body_handle,
                    collider_handle,
                })
            })
            .collect()
    }

    /// Step the simulation and collect block-block collision events into the provided Vec.
    /// Does nothing while the time scale is zero.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
        if self.time_scale <= 0.0 {
            return;
        }
        self.integration_parameters.dt = self.dt * self.time_scale;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Resolve collider handles → body handles → block ids; walls drop out here
        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            if let (Some(a), Some(b)) = (self.collider_to_block(h1), self.collider_to_block(h2)) {
                collision_events.push(CollisionPair {
                    block_a: a,
                    block_b: b,
                    started,
                });
            }
        }
    }

    /// Apply an instantaneous impulse at a world-space point (may add spin).
    pub fn apply_impulse_at_point(&mut self, body: &PhysicsBody, impulse: Vec2, point: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse_at_point(
                vec2_to_na(impulse),
                nalgebra::Point2::new(point.x, point.y),
                true,
            );
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec2 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn angular_velocity(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.angvel())
            .unwrap_or(0.0)
    }

    pub fn set_angular_velocity(&mut self, body: &PhysicsBody, angvel: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_angvel(angvel, true);
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> (Vec2, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Change surface friction and bounciness without touching the body's motion.
    pub fn set_surface(&mut self, body: &PhysicsBody, friction: f32, restitution: f32) {
        if let Some(collider) = self.colliders.get_mut(body.collider_handle) {
            collider.set_friction(friction);
            collider.set_restitution(restitution);
        }
    }

    /// Current `(friction, restitution)` of a body's collider.
    pub fn surface(&self, body: &PhysicsBody) -> Option<(f32, f32)> {
        self.colliders
            .get(body.collider_handle)
            .map(|c| (c.friction(), c.restitution()))
    }

    pub fn set_linear_damping(&mut self, body: &PhysicsBody, damping: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linear_damping(damping);
        }
    }

    pub fn linear_damping(&self, body: &PhysicsBody) -> f32 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.linear_damping())
            .unwrap_or(0.0)
    }

    /// Number of rigid bodies in the simulation (walls included).
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- Joint methods --

    /// Link two body centres with a spring. Returns a handle for later removal.
    pub fn create_spring(
        &mut self,
        body_a: &PhysicsBody,
        body_b: &PhysicsBody,
        desc: &SpringDesc,
    ) -> JointHandle {
        let joint = SpringJointBuilder::new(desc.rest_length, desc.stiffness, desc.damping)
            .local_anchor1(nalgebra::Point2::origin())
            .local_anchor2(nalgebra::Point2::origin())
            .build();
        JointHandle(
            self.impulse_joints
                .insert(body_a.body_handle, body_b.body_handle, joint, true),
        )
    }

    /// Remove a joint from the simulation. Removing an already-gone joint is a no-op.
    pub fn remove_joint(&mut self, handle: JointHandle) {
        self.impulse_joints.remove(handle.0, true);
    }

    pub fn has_joint(&self, handle: JointHandle) -> bool {
        self.impulse_joints.get(handle.0).is_some()
    }

    /// Number of joints in the simulation.
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // -- private helpers --

    fn collider_to_block(&self, collider_handle: ColliderHandle) -> Option<BlockId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        (body.user_data != NO_BLOCK).then(|| BlockId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
