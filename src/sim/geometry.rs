//! Cut geometry for a sliding block against its support
//!
//! Pure functions on footprints; nothing here touches physics or the scene.
//! Only the motion axis is ever cut, the other extent is carried through.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Horizontal axis a layer slides along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    /// The axis the next layer moves on
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// Coordinate of `v` along this axis
    #[inline]
    pub fn of(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Z => v.z,
        }
    }

    /// Mutable coordinate of `v` along this axis
    #[inline]
    pub fn of_mut(self, v: &mut Vec3) -> &mut f32 {
        match self {
            Axis::X => &mut v.x,
            Axis::Z => &mut v.z,
        }
    }

    /// Unit vector along this axis
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Z => "z",
        }
    }
}

/// Where a box sits and how much floor it covers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Centre of the box
    pub position: Vec3,
    /// Extent along x
    pub width: f32,
    /// Extent along z
    pub depth: f32,
}

impl Footprint {
    pub fn new(position: Vec3, width: f32, depth: f32) -> Self {
        Self {
            position,
            width,
            depth,
        }
    }

    /// Extent along `axis`
    #[inline]
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Z => self.depth,
        }
    }

    fn extent_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.width,
            Axis::Z => &mut self.depth,
        }
    }

    /// Full box size for a given layer height
    pub fn size(&self, height: f32) -> Vec3 {
        Vec3::new(self.width, height, self.depth)
    }
}

/// How a sliding block lines up with the block beneath it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Motion axis of the sliding block
    pub axis: Axis,
    /// Signed offset of the sliding block from its support on `axis`
    pub delta: f32,
    /// Length hanging past the support (`|delta|`)
    pub overhang: f32,
    /// Extent of the sliding block on `axis` before the cut
    pub size: f32,
    /// Length resting on the support (`size - overhang`)
    pub overlap: f32,
}

impl Overlap {
    /// Positive overlap means the block lands; anything else is a miss
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.overlap > 0.0
    }

    /// Whether nothing hangs over (a perfect drop)
    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.overhang == 0.0
    }

    /// Offset from the cut block's centre to the overhang's centre
    pub fn overhang_shift(&self) -> f32 {
        (self.overlap / 2.0 + self.overhang / 2.0) * sign(self.delta)
    }
}

/// Sign with zero mapping to zero (`f32::signum` maps 0.0 to 1.0)
#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Measure how `top`, sliding along `axis`, lines up with `previous`
pub fn compute_overlap(top: &Footprint, previous: &Footprint, axis: Axis) -> Overlap {
    let delta = axis.of(top.position) - axis.of(previous.position);
    let overhang = delta.abs();
    let size = top.extent(axis);
    Overlap {
        axis,
        delta,
        overhang,
        size,
        overlap: size - overhang,
    }
}

/// The part of `top` that stays on the stack.
///
/// The extent on the motion axis becomes `overlap` and the centre moves back
/// by `delta / 2`, so the kept part sits exactly over the support.
pub fn cut_footprint(top: &Footprint, overlap: &Overlap) -> Footprint {
    let mut cut = *top;
    *cut.extent_mut(overlap.axis) = overlap.overlap;
    *overlap.axis.of_mut(&mut cut.position) -= overlap.delta / 2.0;
    cut
}

/// The part cut off, given the already-cut block it came from.
///
/// It sits flush against the cut block on the overhanging side, is
/// `overhang` long on the motion axis and keeps the full other extent.
pub fn overhang_footprint(cut: &Footprint, overlap: &Overlap) -> Footprint {
    let mut piece = *cut;
    *overlap.axis.of_mut(&mut piece.position) += overlap.overhang_shift();
    *piece.extent_mut(overlap.axis) = overlap.overhang;
    piece
}

/// Footprint and axis for the layer that follows a cut block.
///
/// Same size as the cut block, one `height` higher, aligned with it on the
/// old axis and starting at `spawn_offset` on the new one.
pub fn next_footprint(cut: &Footprint, axis: Axis, height: f32, spawn_offset: f32) -> (Footprint, Axis) {
    let next_axis = axis.other();
    let mut next = *cut;
    next.position.y += height;
    *next_axis.of_mut(&mut next.position) = spawn_offset;
    (next, next_axis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(x: f32, z: f32, size: f32) -> Footprint {
        Footprint::new(Vec3::new(x, 0.0, z), size, size)
    }

    #[test]
    fn test_partial_overlap_on_x() {
        let previous = square(0.0, 0.0, 3.0);
        let top = square(1.0, 0.0, 3.0);
        let overlap = compute_overlap(&top, &previous, Axis::X);
        assert_eq!(overlap.delta, 1.0);
        assert_eq!(overlap.overhang, 1.0);
        assert_eq!(overlap.overlap, 2.0);
        assert!(overlap.is_hit());

        let cut = cut_footprint(&top, &overlap);
        assert_eq!(cut.width, 2.0);
        assert_eq!(cut.depth, 3.0);
        assert_eq!(cut.position.x, 0.5);

        let piece = overhang_footprint(&cut, &overlap);
        assert_eq!(piece.width, 1.0);
        assert_eq!(piece.depth, 3.0);
        assert_eq!(piece.position.x, 2.0);
    }

    #[test]
    fn test_negative_delta_on_z() {
        let previous = square(0.0, 0.0, 3.0);
        let top = square(0.0, -0.5, 3.0);
        let overlap = compute_overlap(&top, &previous, Axis::Z);
        assert_eq!(overlap.overhang, 0.5);

        let cut = cut_footprint(&top, &overlap);
        assert_eq!(cut.depth, 2.5);
        assert_eq!(cut.width, 3.0);
        assert_eq!(cut.position.z, -0.25);

        let piece = overhang_footprint(&cut, &overlap);
        assert_eq!(piece.position.z, -1.75);
        assert_eq!(piece.position.x, 0.0);
    }

    #[test]
    fn test_perfect_drop() {
        let previous = square(0.0, 0.0, 3.0);
        let top = square(0.0, 0.0, 3.0);
        let overlap = compute_overlap(&top, &previous, Axis::X);
        assert!(overlap.is_perfect());
        assert_eq!(overlap.overlap, 3.0);
        assert_eq!(overlap.overhang_shift(), 0.0);
        assert_eq!(cut_footprint(&top, &overlap), top);
    }

    #[test]
    fn test_miss() {
        let previous = square(0.0, 0.0, 3.0);
        for x in [3.0, 4.5, -3.0] {
            let overlap = compute_overlap(&square(x, 0.0, 3.0), &previous, Axis::X);
            assert!(!overlap.is_hit(), "x = {} should miss", x);
        }
    }

    #[test]
    fn test_next_footprint_alternates() {
        let cut = Footprint::new(Vec3::new(0.5, 1.0, 0.0), 2.0, 3.0);
        let (next, axis) = next_footprint(&cut, Axis::X, 1.0, -10.0);
        assert_eq!(axis, Axis::Z);
        assert_eq!(next.position, Vec3::new(0.5, 2.0, -10.0));
        assert_eq!((next.width, next.depth), (2.0, 3.0));

        let (next, axis) = next_footprint(&next, axis, 1.0, -10.0);
        assert_eq!(axis, Axis::X);
        assert_eq!(next.position, Vec3::new(-10.0, 3.0, -10.0));
    }

    proptest! {
        #[test]
        fn prop_cut_conserves_extent(
            size in 0.1f32..10.0,
            prev_x in -5.0f32..5.0,
            frac in -0.99f32..0.99,
            axis_is_x in any::<bool>(),
        ) {
            let axis = if axis_is_x { Axis::X } else { Axis::Z };
            let previous = Footprint::new(axis.unit() * prev_x, size, size);
            let top = Footprint::new(axis.unit() * (prev_x + frac * size), size, size);
            let overlap = compute_overlap(&top, &previous, axis);
            prop_assume!(overlap.is_hit());

            let cut = cut_footprint(&top, &overlap);
            let piece = overhang_footprint(&cut, &overlap);

            // Extent shrinks by the overhang and the two parts add back up
            prop_assert!((cut.extent(axis) - (size - overlap.overhang)).abs() < 1e-4);
            prop_assert!((cut.extent(axis) + piece.extent(axis) - size).abs() < 1e-4);
            prop_assert_eq!(cut.extent(axis.other()), size);
            prop_assert_eq!(piece.extent(axis.other()), size);

            // The kept part sits over the support's near edge
            let support_lo = prev_x - size / 2.0;
            let support_hi = prev_x + size / 2.0;
            let cut_lo = axis.of(cut.position) - cut.extent(axis) / 2.0;
            let cut_hi = axis.of(cut.position) + cut.extent(axis) / 2.0;
            prop_assert!(cut_lo >= support_lo - 1e-3 && cut_hi <= support_hi + 1e-3);

            // Kept part and overhang together cover the uncut span
            let top_lo = axis.of(top.position) - size / 2.0;
            let top_hi = axis.of(top.position) + size / 2.0;
            let piece_lo = axis.of(piece.position) - piece.extent(axis) / 2.0;
            let piece_hi = axis.of(piece.position) + piece.extent(axis) / 2.0;
            prop_assert!((cut_lo.min(piece_lo) - top_lo).abs() < 1e-3);
            prop_assert!((cut_hi.max(piece_hi) - top_hi).abs() < 1e-3);
        }

        #[test]
        fn prop_overhang_at_least_size_misses(size in 0.1f32..10.0, extra in 0.0f32..10.0) {
            let previous = Footprint::new(Vec3::ZERO, size, size);
            let top = Footprint::new(Vec3::X * (size + extra), size, size);
            let overlap = compute_overlap(&top, &previous, Axis::X);
            prop_assert!(!overlap.is_hit());
        }
    }
}
