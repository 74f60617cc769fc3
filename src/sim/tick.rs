//! Per-frame update
//!
//! Called once per rendered frame with the frame timestamp. Input queued
//! since the previous frame is applied first, then the mover, the camera and
//! the physics world advance by the elapsed time.

use super::state::{GamePhase, GameSession};
use crate::physics::PhysicsWorld;
use crate::scene::Scene;

/// Input gathered between two frames
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer down / touch start / space
    pub interact: bool,
    /// Restart key or button
    pub restart: bool,
}

impl TickInput {
    /// Clear one-shot inputs after they were applied
    pub fn clear(&mut self) {
        self.interact = false;
        self.restart = false;
    }
}

/// Advance the session to frame timestamp `time_ms`.
///
/// The first frame after a start only records the timestamp. Elapsed time
/// is clamped to `max_frame_ms` so a backgrounded tab does not fling the
/// mover off the stack in one step.
pub fn tick<W: PhysicsWorld, S: Scene>(session: &mut GameSession<W, S>, input: &TickInput, time_ms: f64) {
    if input.restart {
        session.restart();
    } else if input.interact {
        session.interact();
    }

    let Some(last) = session.last_time else {
        session.last_time = Some(time_ms);
        return;
    };
    session.last_time = Some(time_ms);

    let elapsed = ((time_ms - last) as f32).clamp(0.0, session.settings.max_frame_ms);
    if session.phase == GamePhase::Idle {
        return;
    }

    session.advance_mover(elapsed);
    session.follow_camera(elapsed);

    let evicted = session.bridge.advance(
        &mut session.world,
        &mut session.scene,
        &mut session.debris,
        elapsed,
    );
    if evicted > 0 {
        log::trace!("Evicted {} debris pieces", evicted);
    }
}
