//! Rigid-body physics capability
//!
//! The game only needs boxes: fixed boxes for the stack and dynamic boxes
//! for debris. Bodies are addressed by opaque `BodyHandle`s so gameplay code
//! never touches engine types.

pub mod rapier;

pub use rapier::RapierWorld;

use glam::{Quat, Vec3};

/// Opaque handle to a body in a `PhysicsWorld`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Description of a box body to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBody {
    /// Centre of the box
    pub position: Vec3,
    /// Half of width, height and depth
    pub half_extents: Vec3,
    /// Mass; zero makes the body fixed in space
    pub mass: f32,
}

impl BoxBody {
    /// A fixed (static) box
    pub fn fixed(position: Vec3, size: Vec3) -> Self {
        Self {
            position,
            half_extents: size / 2.0,
            mass: 0.0,
        }
    }

    /// A dynamic box; a non-positive mass falls back to fixed
    pub fn dynamic(position: Vec3, size: Vec3, mass: f32) -> Self {
        Self {
            position,
            half_extents: size / 2.0,
            mass: mass.max(0.0),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.mass <= 0.0
    }
}

/// What the game needs from a physics engine.
///
/// Stale handles are ignored by every method.
pub trait PhysicsWorld {
    /// Create a box body and its collider
    fn add_box(&mut self, body: BoxBody) -> BodyHandle;

    /// Remove a body and its collider
    fn remove_body(&mut self, handle: BodyHandle);

    /// Replace the collision shape of a body with a box of new half-extents
    fn set_box_shape(&mut self, handle: BodyHandle, half_extents: Vec3);

    /// Teleport a body (used for fixed bodies moved by gameplay)
    fn set_position(&mut self, handle: BodyHandle, position: Vec3);

    /// Current position and orientation of a body
    fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)>;

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Remove every body
    fn clear(&mut self);

    /// Number of live bodies
    fn body_count(&self) -> usize;
}
