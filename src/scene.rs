//! Visual scene capability
//!
//! The game never draws anything itself. It keeps a retained list of box
//! meshes plus an orthographic camera, and the page's renderer draws
//! whatever the latest snapshot says.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_FAR, CAMERA_NEAR, CAMERA_START};

/// Opaque handle to a mesh in a `Scene`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// What the game needs from a scene graph.
///
/// Unknown ids are ignored by every method.
pub trait Scene {
    /// Add a box mesh with the given geometry size, centre and RGB colour
    fn add_box(&mut self, size: Vec3, position: Vec3, color: u32) -> MeshId;

    fn remove(&mut self, id: MeshId);

    fn set_position(&mut self, id: MeshId, position: Vec3);

    /// Scale relative to the geometry size the mesh was created with
    fn set_scale(&mut self, id: MeshId, scale: Vec3);

    fn set_orientation(&mut self, id: MeshId, orientation: Quat);

    /// Remove every mesh
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A box mesh as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxMesh {
    pub id: MeshId,
    /// Geometry size (width, height, depth)
    pub size: Vec3,
    pub position: Vec3,
    pub scale: Vec3,
    pub orientation: Quat,
    /// 0xRRGGBB
    pub color: u32,
}

/// Retained scene of box meshes, stored flat.
/// Designed for small counts (a tower plus its debris).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoxScene {
    meshes: Vec<BoxMesh>,
    next_id: u32,
}

impl BoxScene {
    pub fn new() -> Self {
        Self {
            meshes: Vec::with_capacity(64),
            next_id: 1,
        }
    }

    pub fn get(&self, id: MeshId) -> Option<&BoxMesh> {
        self.meshes.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: MeshId) -> Option<&mut BoxMesh> {
        self.meshes.iter_mut().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxMesh> {
        self.meshes.iter()
    }
}

impl Scene for BoxScene {
    fn add_box(&mut self, size: Vec3, position: Vec3, color: u32) -> MeshId {
        // Ids start at 1 even for a Default-constructed scene
        let id = MeshId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.meshes.push(BoxMesh {
            id,
            size,
            position,
            scale: Vec3::ONE,
            orientation: Quat::IDENTITY,
            color,
        });
        id
    }

    fn remove(&mut self, id: MeshId) {
        // Keep insertion order; the renderer draws in this order
        self.meshes.retain(|m| m.id != id);
    }

    fn set_position(&mut self, id: MeshId, position: Vec3) {
        if let Some(mesh) = self.get_mut(id) {
            mesh.position = position;
        }
    }

    fn set_scale(&mut self, id: MeshId, scale: Vec3) {
        if let Some(mesh) = self.get_mut(id) {
            mesh.scale = scale;
        }
    }

    fn set_orientation(&mut self, id: MeshId, orientation: Quat) {
        if let Some(mesh) = self.get_mut(id) {
            mesh.orientation = orientation;
        }
    }

    fn clear(&mut self) {
        self.meshes.clear();
    }

    fn len(&self) -> usize {
        self.meshes.len()
    }
}

/// Orthographic camera looking at the origin from a fixed diagonal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera with a view `width` units wide at the given aspect ratio
    pub fn new(width: f32, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::from_array(CAMERA_START),
            look_at: Vec3::ZERO,
            left: -width / 2.0,
            right: width / 2.0,
            top: 0.0,
            bottom: 0.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        };
        camera.resize(aspect);
        camera
    }

    /// Recompute vertical bounds for a new viewport aspect ratio
    pub fn resize(&mut self, aspect: f32) {
        let width = self.right - self.left;
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        let height = width / aspect;
        self.top = height / 2.0;
        self.bottom = -height / 2.0;
    }

    /// Put the camera back at its start position
    pub fn reset(&mut self) {
        self.position = Vec3::from_array(CAMERA_START);
        self.look_at = Vec3::ZERO;
    }

    /// Rise by `step` while below `target_y`
    pub fn follow(&mut self, target_y: f32, step: f32) {
        if self.position.y < target_y {
            self.position.y += step;
        }
    }
}

/// HSL (degrees, 0-1, 0-1) to 0xRRGGBB
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> u32 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}
