//! Automatic player for the attract-mode demo
//!
//! Lets the mover slide until it passes the support plus a random bias,
//! then drops. The bias makes it imperfect, so every demo eventually ends.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::Layer;

/// Seeded autopilot with a per-drop precision bias
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Bias is uniform in [-spread, +spread]
    spread: f32,
    /// Current bias, redrawn after every drop
    bias: f32,
}

impl Autopilot {
    pub fn new(seed: u64, spread: f32) -> Self {
        let mut autopilot = Self {
            rng: Pcg32::seed_from_u64(seed),
            spread: spread.abs(),
            bias: 0.0,
        };
        autopilot.redraw();
        autopilot
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Draw a new bias for the next layer
    pub fn redraw(&mut self) {
        self.bias = if self.spread > 0.0 {
            self.rng.random_range(-self.spread..=self.spread)
        } else {
            0.0
        };
    }

    /// Whether a mover at `coordinate` has reached its drop point above a
    /// support centred at `support`
    #[inline]
    pub fn should_drop_at(&self, coordinate: f32, support: f32) -> bool {
        coordinate >= support + self.bias
    }

    /// Whether `top` should be dropped onto `previous` this frame
    pub fn should_drop(&self, top: &Layer, previous: &Layer) -> bool {
        match top.axis {
            Some(axis) => self.should_drop_at(
                axis.of(top.footprint().position),
                axis.of(previous.footprint().position),
            ),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bias_within_spread() {
        let mut autopilot = Autopilot::new(7, 0.5);
        for _ in 0..1000 {
            let bias = autopilot.bias();
            assert!((-0.5..=0.5).contains(&bias), "bias {} out of range", bias);
            autopilot.redraw();
        }
    }

    #[test]
    fn test_same_seed_same_biases() {
        let mut a = Autopilot::new(42, 0.5);
        let mut b = Autopilot::new(42, 0.5);
        for _ in 0..20 {
            assert_eq!(a.bias(), b.bias());
            a.redraw();
            b.redraw();
        }
    }

    #[test]
    fn test_zero_spread_is_exact() {
        let autopilot = Autopilot::new(1, 0.0);
        assert_eq!(autopilot.bias(), 0.0);
        assert!(!autopilot.should_drop_at(-0.01, 0.0));
        assert!(autopilot.should_drop_at(0.0, 0.0));
    }

    #[test]
    fn test_drop_point_follows_bias() {
        let autopilot = Autopilot::new(3, 0.5);
        let bias = autopilot.bias();
        assert!(!autopilot.should_drop_at(1.0 + bias - 0.01, 1.0));
        assert!(autopilot.should_drop_at(1.0 + bias + 0.01, 1.0));
    }
}
