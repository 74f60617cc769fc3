//! Physics → scene synchronization
//!
//! Each frame the world is stepped by the elapsed time and every debris
//! piece has its simulated transform copied onto its mesh. Stack layers are
//! fixed bodies moved by gameplay and are never synced from physics.

use std::collections::VecDeque;

use super::body::Overhang;
use crate::consts::MS_PER_SEC;
use crate::physics::PhysicsWorld;
use crate::scene::Scene;
use crate::settings::Settings;

/// Falling pieces, oldest first
#[derive(Debug, Clone, Default)]
pub struct Debris {
    pieces: VecDeque<Overhang>,
}

impl Debris {
    pub fn new() -> Self {
        Self {
            pieces: VecDeque::new(),
        }
    }

    pub fn push(&mut self, piece: Overhang) {
        self.pieces.push_back(piece);
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overhang> {
        self.pieces.iter()
    }

    /// Forget every piece without touching world or scene (they are being
    /// cleared wholesale)
    pub fn forget_all(&mut self) {
        self.pieces.clear();
    }
}

/// Steps physics and mirrors debris onto the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBridge {
    /// Debris whose centre drops below this height is removed
    pub floor: f32,
    /// Most debris alive at once
    pub max_debris: usize,
}

impl SimulationBridge {
    pub fn new(settings: &Settings) -> Self {
        Self {
            floor: settings.debris_floor,
            max_debris: settings.max_debris.max(1),
        }
    }

    /// Step the world by `elapsed_ms`, sync debris meshes, then evict what
    /// fell out of play. Returns how many pieces were evicted.
    pub fn advance<W: PhysicsWorld, S: Scene>(
        &self,
        world: &mut W,
        scene: &mut S,
        debris: &mut Debris,
        elapsed_ms: f32,
    ) -> usize {
        world.step(elapsed_ms / MS_PER_SEC);

        let before = debris.len();
        debris.pieces.retain_mut(|piece| {
            match piece.sync(world, scene) {
                Some(position) if position.y >= self.floor => true,
                _ => {
                    log::trace!("Evicting debris at {:?}", piece.pair.footprint.position);
                    piece.pair.despawn(world, scene);
                    false
                }
            }
        });

        while debris.len() > self.max_debris {
            if let Some(oldest) = debris.pieces.pop_front() {
                oldest.pair.despawn(world, scene);
            }
        }

        before - debris.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::physics::RapierWorld;
    use crate::scene::BoxScene;
    use crate::sim::geometry::Footprint;

    fn spawn_piece(world: &mut RapierWorld, scene: &mut BoxScene, y: f32) -> Overhang {
        let footprint = Footprint::new(Vec3::new(0.0, y, 0.0), 1.0, 1.0);
        Overhang::spawn(world, scene, footprint, 1.0, 1.0, 0)
    }

    #[test]
    fn test_advance_moves_meshes_with_bodies() {
        let settings = Settings::default();
        let bridge = SimulationBridge::new(&settings);
        let mut world = RapierWorld::new(settings.gravity);
        let mut scene = BoxScene::new();
        let mut debris = Debris::new();
        let piece = spawn_piece(&mut world, &mut scene, 5.0);
        debris.push(piece);

        for _ in 0..10 {
            bridge.advance(&mut world, &mut scene, &mut debris, 16.0);
        }

        let (body_pos, _) = world.transform(piece.pair.body).unwrap();
        let mesh = scene.get(piece.pair.mesh).unwrap();
        assert!(body_pos.y < 5.0);
        assert_eq!(mesh.position, body_pos);
        assert_eq!(debris.iter().next().unwrap().pair.footprint.position, body_pos);
    }

    #[test]
    fn test_debris_below_floor_is_evicted() {
        let settings = Settings {
            debris_floor: 0.0,
            ..Default::default()
        };
        let bridge = SimulationBridge::new(&settings);
        let mut world = RapierWorld::new(settings.gravity);
        let mut scene = BoxScene::new();
        let mut debris = Debris::new();
        debris.push(spawn_piece(&mut world, &mut scene, -0.5));
        debris.push(spawn_piece(&mut world, &mut scene, 50.0));

        let evicted = bridge.advance(&mut world, &mut scene, &mut debris, 16.0);
        assert_eq!(evicted, 1);
        assert_eq!(debris.len(), 1);
        assert_eq!(world.body_count(), 1);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_oldest_debris_evicted_over_cap() {
        let settings = Settings {
            max_debris: 2,
            ..Default::default()
        };
        let bridge = SimulationBridge::new(&settings);
        let mut world = RapierWorld::new(settings.gravity);
        let mut scene = BoxScene::new();
        let mut debris = Debris::new();
        let first = spawn_piece(&mut world, &mut scene, 10.0);
        debris.push(first);
        debris.push(spawn_piece(&mut world, &mut scene, 20.0));
        debris.push(spawn_piece(&mut world, &mut scene, 30.0));

        let evicted = bridge.advance(&mut world, &mut scene, &mut debris, 16.0);
        assert_eq!(evicted, 1);
        assert_eq!(debris.len(), 2);
        assert!(world.transform(first.pair.body).is_none());
        assert!(scene.get(first.pair.mesh).is_none());
    }
}
