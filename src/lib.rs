//! Tower Stack - A block-stacking arcade game
//!
//! Core modules:
//! - `sim`: Gameplay simulation (cut geometry, stack state machine, autopilot)
//! - `physics`: Rigid-body world used for falling debris
//! - `scene`: Retained box scene and camera handed to the renderer
//! - `settings`: Data-driven gameplay tuning

pub mod physics;
pub mod scene;
pub mod settings;
pub mod sim;

pub use physics::{BodyHandle, BoxBody, PhysicsWorld, RapierWorld};
pub use scene::{BoxScene, Camera, MeshId, Scene};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Near clip plane of the orthographic camera
    pub const CAMERA_NEAR: f32 = 0.0;
    /// Far clip plane of the orthographic camera
    pub const CAMERA_FAR: f32 = 100.0;
    /// Camera start position (always looks at the origin)
    pub const CAMERA_START: [f32; 3] = [4.0, 4.0, 4.0];

    /// Milliseconds per second, for converting frame times
    pub const MS_PER_SEC: f32 = 1000.0;
}
