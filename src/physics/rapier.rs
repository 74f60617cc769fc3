use std::collections::HashMap;
use std::num::NonZeroUsize;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use super::{BodyHandle, BoxBody, PhysicsWorld};

// ---------------------------------------------------------------------------
// Conversion helpers (private) — glam ↔ nalgebra
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn na_to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn na_to_quat(q: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Rapier handles behind one `BodyHandle`
#[derive(Debug, Clone, Copy)]
struct RapierBody {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    mass: f32,
}

fn box_collider(half_extents: Vec3, mass: f32) -> Collider {
    let builder = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z);
    if mass > 0.0 {
        builder.mass(mass).build()
    } else {
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// RapierWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier3D boilerplate behind the `PhysicsWorld` trait.
pub struct RapierWorld {
    gravity: Vector<Real>,
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
    handles: HashMap<BodyHandle, RapierBody>,
    next_id: u32,
}

impl RapierWorld {
    /// Create a world with gravity along y (negative is down).
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity_y, 0.0],
            integration_parameters: IntegrationParameters::default(),
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
            handles: HashMap::new(),
            next_id: 1,
        }
    }

    /// Run `iterations` constraint solver iterations per step (at least one).
    pub fn with_solver_iterations(mut self, iterations: usize) -> Self {
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(iterations).unwrap_or(NonZeroUsize::MIN);
        self
    }

    pub fn solver_iterations(&self) -> usize {
        self.integration_parameters.num_solver_iterations.get()
    }

    pub fn gravity(&self) -> Vec3 {
        na_to_vec3(&self.gravity)
    }

    /// Half-extents of a body's collider, if it still exists.
    pub fn box_half_extents(&self, handle: BodyHandle) -> Option<Vec3> {
        let entry = self.handles.get(&handle)?;
        let cuboid = self.colliders.get(entry.collider)?.shape().as_cuboid()?;
        Some(na_to_vec3(&cuboid.half_extents))
    }

    /// Whether a body is simulated (has mass) rather than fixed.
    pub fn is_dynamic(&self, handle: BodyHandle) -> bool {
        self.handles
            .get(&handle)
            .and_then(|entry| self.bodies.get(entry.body))
            .map(|rb| rb.is_dynamic())
            .unwrap_or(false)
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_box(&mut self, desc: BoxBody) -> BodyHandle {
        let builder = if desc.is_fixed() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let rb = builder.translation(vec3_to_na(desc.position)).build();
        let body = self.bodies.insert(rb);

        let collider = self.colliders.insert_with_parent(
            box_collider(desc.half_extents, desc.mass),
            body,
            &mut self.bodies,
        );

        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.handles.insert(
            handle,
            RapierBody {
                body,
                collider,
                mass: desc.mass,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if let Some(entry) = self.handles.remove(&handle) {
            self.bodies.remove(
                entry.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    fn set_box_shape(&mut self, handle: BodyHandle, half_extents: Vec3) {
        // Rapier cannot rescale a cuboid in place; swap in a new collider
        let Some(entry) = self.handles.get_mut(&handle) else {
            return;
        };
        self.colliders.remove(
            entry.collider,
            &mut self.island_manager,
            &mut self.bodies,
            true,
        );
        entry.collider = self.colliders.insert_with_parent(
            box_collider(half_extents, entry.mass),
            entry.body,
            &mut self.bodies,
        );
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(rb) = self
            .handles
            .get(&handle)
            .and_then(|entry| self.bodies.get_mut(entry.body))
        {
            rb.set_translation(vec3_to_na(position), true);
        }
    }

    fn transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        let entry = self.handles.get(&handle)?;
        let rb = self.bodies.get(entry.body)?;
        Some((na_to_vec3(rb.translation()), na_to_quat(rb.rotation())))
    }

    fn step(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        self.integration_parameters.dt = dt;
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
            &(),
        );
    }

    fn clear(&mut self) {
        // Handle ids keep counting so handles from before the clear stay stale
        let next_id = self.next_id;
        let gravity = self.gravity.y;
        let params = std::mem::take(&mut self.integration_parameters);
        *self = Self::new(gravity);
        self.integration_parameters = params;
        self.next_id = next_id;
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_box_does_not_fall() {
        let mut world = RapierWorld::new(-10.0);
        let handle = world.add_box(BoxBody::fixed(Vec3::new(0.0, 2.0, 0.0), Vec3::ONE));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let (pos, _) = world.transform(handle).unwrap();
        assert_eq!(pos, Vec3::new(0.0, 2.0, 0.0));
        assert!(!world.is_dynamic(handle));
    }

    #[test]
    fn dynamic_box_falls() {
        let mut world = RapierWorld::new(-10.0);
        let handle = world.add_box(BoxBody::dynamic(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE, 5.0));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let (pos, _) = world.transform(handle).unwrap();
        assert!(pos.y < 5.0, "box should have fallen, y = {}", pos.y);
        assert!(world.is_dynamic(handle));
    }

    #[test]
    fn set_box_shape_replaces_collider() {
        let mut world = RapierWorld::new(-10.0);
        let handle = world.add_box(BoxBody::fixed(Vec3::ZERO, Vec3::new(3.0, 1.0, 3.0)));
        world.set_box_shape(handle, Vec3::new(1.0, 0.5, 1.5));
        let half = world.box_half_extents(handle).unwrap();
        assert!((half - Vec3::new(1.0, 0.5, 1.5)).length() < 1e-6);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let mut world = RapierWorld::new(-10.0);
        let a = world.add_box(BoxBody::fixed(Vec3::ZERO, Vec3::ONE));
        let b = world.add_box(BoxBody::dynamic(Vec3::Y, Vec3::ONE, 1.0));
        world.remove_body(a);
        assert_eq!(world.body_count(), 1);
        assert!(world.transform(a).is_none());

        // Removing twice is harmless
        world.remove_body(a);

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert!(world.transform(b).is_none());

        let c = world.add_box(BoxBody::fixed(Vec3::ZERO, Vec3::ONE));
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn zero_dt_is_ignored() {
        let mut world = RapierWorld::new(-10.0);
        let handle = world.add_box(BoxBody::dynamic(Vec3::Y, Vec3::ONE, 1.0));
        world.step(0.0);
        let (pos, rot) = world.transform(handle).unwrap();
        assert_eq!(pos, Vec3::Y);
        assert!(rot.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn solver_iterations_survive_clear() {
        let mut world = RapierWorld::new(-10.0).with_solver_iterations(12);
        assert_eq!(world.solver_iterations(), 12);
        world.clear();
        assert_eq!(world.solver_iterations(), 12);

        let world = RapierWorld::new(-10.0).with_solver_iterations(0);
        assert_eq!(world.solver_iterations(), 1);
    }
}
