//! Paired visual + physical boxes
//!
//! A `BodyPair` owns one mesh in the scene and one body in the physics world
//! and caches the footprint they were last set to. Stack layers move both
//! halves by hand; debris lets physics drive the mesh.

use glam::Vec3;

use super::geometry::{Axis, Footprint, Overlap, cut_footprint};
use crate::physics::{BodyHandle, BoxBody, PhysicsWorld};
use crate::scene::{MeshId, Scene};

/// A mesh and a body that represent the same box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPair {
    pub mesh: MeshId,
    pub body: BodyHandle,
    /// Current centre and extents
    pub footprint: Footprint,
    /// Box height
    pub height: f32,
    /// Size the mesh geometry was built with (scale is relative to this)
    geometry: Vec3,
}

impl BodyPair {
    /// Create the mesh and the body. Zero mass makes the body fixed.
    pub fn spawn<W: PhysicsWorld, S: Scene>(
        world: &mut W,
        scene: &mut S,
        footprint: Footprint,
        height: f32,
        mass: f32,
        color: u32,
    ) -> Self {
        let size = footprint.size(height);
        let mesh = scene.add_box(size, footprint.position, color);
        let desc = if mass > 0.0 {
            BoxBody::dynamic(footprint.position, size, mass)
        } else {
            BoxBody::fixed(footprint.position, size)
        };
        let body = world.add_box(desc);
        Self {
            mesh,
            body,
            footprint,
            height,
            geometry: size,
        }
    }

    /// Remove both halves
    pub fn despawn<W: PhysicsWorld, S: Scene>(&self, world: &mut W, scene: &mut S) {
        world.remove_body(self.body);
        scene.remove(self.mesh);
    }

    /// Move both halves to `position`
    fn place<W: PhysicsWorld, S: Scene>(&mut self, world: &mut W, scene: &mut S, position: Vec3) {
        self.footprint.position = position;
        scene.set_position(self.mesh, position);
        world.set_position(self.body, position);
    }

    /// Mesh scale that turns the built geometry into the current footprint
    fn visual_scale(&self) -> Vec3 {
        self.footprint.size(self.height) / self.geometry
    }
}

/// A block on the stack: the foundation, a placed layer or the current mover.
///
/// Layers are fixed bodies; only gameplay moves them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub pair: BodyPair,
    /// Motion axis (the foundation never moves)
    pub axis: Option<Axis>,
}

impl Layer {
    pub fn spawn<W: PhysicsWorld, S: Scene>(
        world: &mut W,
        scene: &mut S,
        footprint: Footprint,
        height: f32,
        axis: Option<Axis>,
        color: u32,
    ) -> Self {
        Self {
            pair: BodyPair::spawn(world, scene, footprint, height, 0.0, color),
            axis,
        }
    }

    #[inline]
    pub fn footprint(&self) -> &Footprint {
        &self.pair.footprint
    }

    /// Coordinate along the motion axis (None for the foundation)
    pub fn coordinate(&self) -> Option<f32> {
        self.axis.map(|axis| axis.of(self.pair.footprint.position))
    }

    /// Slide along the motion axis, keeping mesh and body together
    pub fn slide<W: PhysicsWorld, S: Scene>(&mut self, world: &mut W, scene: &mut S, distance: f32) {
        let Some(axis) = self.axis else {
            return;
        };
        let position = self.pair.footprint.position + axis.unit() * distance;
        self.pair.place(world, scene, position);
    }

    /// Trim to the part resting on the support.
    ///
    /// The mesh is rescaled, both halves are recentred, and the collider is
    /// rebuilt at the new size since physics shapes cannot be rescaled.
    pub fn cut<W: PhysicsWorld, S: Scene>(&mut self, world: &mut W, scene: &mut S, overlap: &Overlap) {
        let cut = cut_footprint(&self.pair.footprint, overlap);
        self.pair.footprint.width = cut.width;
        self.pair.footprint.depth = cut.depth;
        self.pair.place(world, scene, cut.position);
        scene.set_scale(self.pair.mesh, self.pair.visual_scale());
        world.set_box_shape(self.pair.body, cut.size(self.pair.height) / 2.0);
    }
}

/// A falling piece: a cut-off overhang or a whole missed layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overhang {
    pub pair: BodyPair,
}

impl Overhang {
    pub fn spawn<W: PhysicsWorld, S: Scene>(
        world: &mut W,
        scene: &mut S,
        footprint: Footprint,
        height: f32,
        mass: f32,
        color: u32,
    ) -> Self {
        Self {
            pair: BodyPair::spawn(world, scene, footprint, height, mass, color),
        }
    }

    /// Copy the simulated transform onto the mesh. Returns the new centre.
    pub fn sync<W: PhysicsWorld, S: Scene>(&mut self, world: &W, scene: &mut S) -> Option<Vec3> {
        let (position, orientation) = world.transform(self.pair.body)?;
        self.pair.footprint.position = position;
        scene.set_position(self.pair.mesh, position);
        scene.set_orientation(self.pair.mesh, orientation);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::physics::RapierWorld;
    use crate::scene::BoxScene;
    use crate::sim::geometry::compute_overlap;

    fn footprint(x: f32, y: f32, z: f32) -> Footprint {
        Footprint::new(Vec3::new(x, y, z), 3.0, 3.0)
    }

    #[test]
    fn test_layer_slide_moves_both_halves() {
        let mut world = RapierWorld::new(-10.0);
        let mut scene = BoxScene::new();
        let mut layer = Layer::spawn(&mut world, &mut scene, footprint(-10.0, 1.0, 0.0), 1.0, Some(Axis::X), 0);

        assert!(!world.is_dynamic(layer.pair.body));

        layer.slide(&mut world, &mut scene, 2.5);
        assert_eq!(layer.coordinate(), Some(-7.5));
        assert_eq!(scene.get(layer.pair.mesh).unwrap().position, Vec3::new(-7.5, 1.0, 0.0));
        let (pos, _) = world.transform(layer.pair.body).unwrap();
        assert_eq!(pos, Vec3::new(-7.5, 1.0, 0.0));
    }

    #[test]
    fn test_foundation_does_not_slide() {
        let mut world = RapierWorld::new(-10.0);
        let mut scene = BoxScene::new();
        let mut base = Layer::spawn(&mut world, &mut scene, footprint(0.0, 0.0, 0.0), 1.0, None, 0);
        base.slide(&mut world, &mut scene, 5.0);
        assert_eq!(base.footprint().position, Vec3::ZERO);
        assert_eq!(base.coordinate(), None);
    }

    #[test]
    fn test_layer_cut_rescales_and_rebuilds_shape() {
        let mut world = RapierWorld::new(-10.0);
        let mut scene = BoxScene::new();
        let base = Layer::spawn(&mut world, &mut scene, footprint(0.0, 0.0, 0.0), 1.0, None, 0);
        let mut top = Layer::spawn(&mut world, &mut scene, footprint(0.0, 1.0, 1.0), 1.0, Some(Axis::Z), 0);

        let overlap = compute_overlap(top.footprint(), base.footprint(), Axis::Z);
        top.cut(&mut world, &mut scene, &overlap);

        assert_eq!(top.footprint().depth, 2.0);
        assert_eq!(top.footprint().width, 3.0);
        assert_eq!(top.footprint().position, Vec3::new(0.0, 1.0, 0.5));

        let mesh = scene.get(top.pair.mesh).unwrap();
        assert_eq!(mesh.position, Vec3::new(0.0, 1.0, 0.5));
        assert!((mesh.scale - Vec3::new(1.0, 1.0, 2.0 / 3.0)).length() < 1e-6);

        let half = world.box_half_extents(top.pair.body).unwrap();
        assert!((half - Vec3::new(1.5, 0.5, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_overhang_sync_copies_physics() {
        let mut world = RapierWorld::new(-10.0);
        let mut scene = BoxScene::new();
        let mut piece = Overhang::spawn(&mut world, &mut scene, footprint(2.0, 1.0, 0.0), 1.0, 5.0, 0);
        assert!(world.is_dynamic(piece.pair.body));

        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let pos = piece.sync(&world, &mut scene).unwrap();
        assert!(pos.y < 1.0);
        assert_eq!(scene.get(piece.pair.mesh).unwrap().position, pos);

        piece.pair.despawn(&mut world, &mut scene);
        assert_eq!(world.body_count(), 0);
        assert!(scene.is_empty());
        assert!(piece.sync(&world, &mut scene).is_none());
    }

    #[test]
    fn test_overhang_sync_copies_rotation() {
        let mut world = RapierWorld::new(-10.0);
        let mut scene = BoxScene::new();
        let _base = Layer::spawn(&mut world, &mut scene, footprint(0.0, 0.0, 0.0), 1.0, None, 0);
        // Centre of mass past the edge of the support, so the piece tips over it
        let mut piece = Overhang::spawn(&mut world, &mut scene, footprint(2.5, 1.0, 0.0), 1.0, 5.0, 0);

        for _ in 0..40 {
            world.step(1.0 / 60.0);
        }
        piece.sync(&world, &mut scene).unwrap();

        let (_, rotation) = world.transform(piece.pair.body).unwrap();
        let mesh = scene.get(piece.pair.mesh).unwrap();
        assert_eq!(mesh.orientation, rotation);
        assert!(
            rotation.angle_between(Quat::IDENTITY) > 0.05,
            "piece should have tipped, rotation = {:?}",
            rotation
        );
    }
}
