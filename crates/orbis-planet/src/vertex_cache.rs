//! Per-request memo of biome and noise samples, keyed by quantized position.
//!
//! Corners shared between faces of a non-indexed mesh are stored once per
//! face and can differ in their last bits. Quantizing the key makes every
//! copy of a corner read the same sample, so displaced faces stay watertight.

use glam::DVec3;
use hashbrown::HashMap;
use orbis_terrain::{AxisShift, Biome, NoiseField};

use crate::GenerationError;

/// Positions are rounded to `1 / KEY_SCALE` before hashing.
pub const KEY_SCALE: f64 = 1e5;

/// Sampling-coordinate multiplier of the scatter noise.
pub const SCATTER_NOISE_SCALE: f64 = 100.0;

/// Offset of the second sea-height sample used for the morph target.
pub const SEA_MORPH_OFFSET: f64 = 100.0;

/// The three decorrelated samples that make up one scatter vector.
///
/// x reads the position as is, y and z read permuted and translated
/// coordinates so the three components are independent.
pub fn scatter_shifts(scale: f64) -> [AxisShift; 3] {
    let a = scale * 100.0;
    let b = scale * 200.0;
    [
        AxisShift::IDENTITY,
        AxisShift::new([1, 2, 0], DVec3::new(a, -a, a)),
        AxisShift::new([2, 0, 1], DVec3::new(-b, b, -b)),
    ]
}

/// A position rounded to a fixed grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexKey([i64; 3]);

impl VertexKey {
    pub fn quantize(position: DVec3) -> Self {
        let q = (position * KEY_SCALE).round();
        // `as` maps -0.0 to 0, so both signs of zero share a key.
        Self([q.x as i64, q.y as i64, q.z as i64])
    }
}

/// Cached samples for one base-mesh corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexInfo {
    /// The first corner seen for this key. Every copy of the corner is
    /// displaced from this position, so copies stay bit-identical.
    pub position: DVec3,
    /// Radial land height (`1 + biome height`).
    pub height: f64,
    /// Tangent-ish jitter added to the corner before projection.
    pub scatter: DVec3,
    /// Radial sea height (`1 + biome sea height`).
    pub sea_height: f64,
    /// Radial sea height at an offset point, for the morph target.
    pub sea_morph_height: f64,
}

/// Memoizes [`VertexInfo`] per quantized position for one request.
pub struct VertexEvaluationCache<'a, B: ?Sized, N: ?Sized> {
    biome: &'a B,
    noise: &'a N,
    shifts: [AxisShift; 3],
    entries: HashMap<VertexKey, VertexInfo>,
    hits: u64,
}

impl<'a, B, N> VertexEvaluationCache<'a, B, N>
where
    B: Biome + ?Sized,
    N: NoiseField + ?Sized,
{
    pub fn new(biome: &'a B, noise: &'a N) -> Self {
        Self::with_shifts(biome, noise, scatter_shifts(SCATTER_NOISE_SCALE))
    }

    pub fn with_shifts(biome: &'a B, noise: &'a N, shifts: [AxisShift; 3]) -> Self {
        Self {
            biome,
            noise,
            shifts,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    /// Samples for `position`, computed on first sight of its key.
    ///
    /// Every later call with a position that quantizes to the same key returns
    /// a bit-identical value.
    pub fn get_or_compute(&mut self, position: DVec3) -> Result<VertexInfo, GenerationError> {
        let key = VertexKey::quantize(position);
        if let Some(info) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*info);
        }

        let info = self.evaluate(position)?;
        self.entries.insert(key, info);
        Ok(info)
    }

    fn evaluate(&self, position: DVec3) -> Result<VertexInfo, GenerationError> {
        let height = finite("height", position, self.biome.height(position))? + 1.0;

        let [sx, sy, sz] = self
            .shifts
            .map(|shift| self.noise.sample_shifted(position, &shift));
        let scatter = DVec3::new(sx, sy, sz);
        if !scatter.is_finite() {
            return Err(non_finite("scatter", position));
        }

        let sea_height = finite("sea height", position, self.biome.sea_height(position))? + 1.0;
        let morph_point = position + DVec3::splat(SEA_MORPH_OFFSET);
        let sea_morph_height =
            finite("sea morph height", position, self.biome.sea_height(morph_point))? + 1.0;

        Ok(VertexInfo {
            position,
            height,
            scatter,
            sea_height,
            sea_morph_height,
        })
    }

    /// Number of distinct keys evaluated.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups answered without evaluating.
    pub fn hits(&self) -> u64 {
        self.hits
    }
}

fn finite(quantity: &'static str, position: DVec3, value: f64) -> Result<f64, GenerationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(non_finite(quantity, position))
    }
}

fn non_finite(quantity: &'static str, position: DVec3) -> GenerationError {
    GenerationError::NonFiniteSample {
        quantity,
        position: position.to_array(),
    }
}
