//! Gameplay simulation module
//!
//! All gameplay logic lives here:
//! - Cut geometry is pure and works on plain footprints
//! - Stack layers are fixed bodies moved only by gameplay
//! - Debris is driven by physics and mirrored onto the scene
//! - Autopilot randomness comes from a seeded RNG only

pub mod autopilot;
pub mod body;
pub mod bridge;
pub mod geometry;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use body::{BodyPair, Layer, Overhang};
pub use bridge::{Debris, SimulationBridge};
pub use geometry::{
    Axis, Footprint, Overlap, compute_overlap, cut_footprint, next_footprint, overhang_footprint,
};
pub use state::{GameEvent, GamePhase, GameSession, Pilot, Snapshot, Stack};
pub use tick::{TickInput, tick};
