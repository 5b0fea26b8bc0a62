//! Range-mapped scalar noise fields and decorrelated sampling.

use glam::DVec3;
use noise::{NoiseFn, Simplex};

/// A deterministic scalar field over 3D space.
pub trait NoiseField: Send + Sync {
    /// Sample the field. The value lies in the field's configured range.
    fn sample(&self, point: DVec3) -> f64;

    /// Sample at `shift.apply(point)`.
    ///
    /// Used to derive several uncorrelated scalars from one field. The shift is
    /// a sampling coordinate only; `point` itself is never displaced.
    fn sample_shifted(&self, point: DVec3, shift: &AxisShift) -> f64 {
        self.sample(shift.apply(point))
    }
}

/// An axis permutation followed by a translation, applied to a sampling point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisShift {
    /// Source axis for each output axis: output `i` reads input axis `axes[i]`.
    pub axes: [usize; 3],
    /// Offset added after permuting.
    pub offset: DVec3,
}

impl AxisShift {
    /// The identity shift: no permutation, no offset.
    pub const IDENTITY: Self = Self {
        axes: [0, 1, 2],
        offset: DVec3::ZERO,
    };

    pub const fn new(axes: [usize; 3], offset: DVec3) -> Self {
        Self { axes, offset }
    }

    /// Permute `point`'s axes, then add the offset.
    pub fn apply(&self, point: DVec3) -> DVec3 {
        DVec3::new(
            point[self.axes[0]],
            point[self.axes[1]],
            point[self.axes[2]],
        ) + self.offset
    }
}

/// Simplex noise remapped from `[-1, 1]` into `[min, max]`.
pub struct ScatterNoise {
    noise: Simplex,
    min: f64,
    max: f64,
    scale: f64,
}

impl ScatterNoise {
    /// `scale` multiplies the sampling coordinates (higher = finer detail).
    pub fn new(seed: u32, min: f64, max: f64, scale: f64) -> Self {
        Self {
            noise: Simplex::new(seed),
            min,
            max,
            scale,
        }
    }

    /// A field symmetric around zero, in `[-amount / 2, amount / 2]`.
    pub fn symmetric(seed: u32, amount: f64, scale: f64) -> Self {
        Self::new(seed, -amount / 2.0, amount / 2.0, scale)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl NoiseField for ScatterNoise {
    fn sample(&self, point: DVec3) -> f64 {
        let p = point * self.scale;
        let n = self.noise.get([p.x, p.y, p.z]).clamp(-1.0, 1.0);
        self.min + (n + 1.0) * 0.5 * (self.max - self.min)
    }
}
