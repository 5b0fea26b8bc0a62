//! The biome oracle: height, sea height, color classification and vegetation
//! rules for points on the unit sphere.

mod config;
mod noise_biome;

pub use config::{BiomeConfig, BiomeConfigError, ColorStop, SeaConfig, SteepRockConfig};
pub use noise_biome::NoiseBiome;

use glam::DVec3;

use crate::{Color, FaceBlend, VegetationField, VegetationItem};

/// Answers every per-point question the planet mesh generator asks.
///
/// Implementations are immutable; vegetation accumulation goes into a
/// [`VegetationField`] owned by the caller, so one biome can serve many
/// concurrent requests.
pub trait Biome: Send + Sync {
    /// Land height offset at a unit-sphere point. `0` is the unmodified sphere.
    fn height(&self, point: DVec3) -> f64;

    /// Sea surface height offset at a unit-sphere point.
    fn sea_height(&self, point: DVec3) -> f64;

    /// Land color for a face. `None` leaves the face uncolored.
    fn color(&self, point: DVec3, normalized_height: f64, steepness: f64) -> Option<Color>;

    /// Sea color for a face. `None` leaves the face uncolored.
    fn sea_color(&self, point: DVec3, normalized_height: f64) -> Option<Color>;

    /// Vegetation types, in priority order.
    fn vegetation_items(&self) -> &[VegetationItem];

    /// Lowest land height offset (negative); maps to normalized height `-1`.
    fn min_height(&self) -> f64;

    /// Highest land height offset (positive); maps to normalized height `1`.
    fn max_height(&self) -> f64;

    /// Record a placed plant so later blending can react to it.
    fn add_vegetation(
        &self,
        field: &mut VegetationField,
        item: &VegetationItem,
        point: DVec3,
        _normalized_height: f64,
        _steepness: f64,
    ) {
        if let Some(ground) = &item.ground {
            field.insert(point, ground);
        }
    }

    /// Per-corner height deltas and the face color after blending in the
    /// influence of placed vegetation. Corners are unit-sphere directions.
    fn vegetation_height_and_color_for_face(
        &self,
        field: &VegetationField,
        a: DVec3,
        b: DVec3,
        c: DVec3,
        base_color: Color,
        edge_length: f64,
    ) -> FaceBlend {
        field.blend_face([a, b, c], base_color, edge_length)
    }
}
