//! Noise-driven [`Biome`] built from a [`BiomeConfig`].

use glam::DVec3;
use noise::{NoiseFn, Simplex};

use super::config::sample_gradient;
use super::{Biome, BiomeConfig, BiomeConfigError};
use crate::{Color, HeightmapSampler, VegetationItem};

const COLOR_DETAIL_FREQUENCY: f64 = 40.0;

/// Biome whose land height is an fBm field, sea height a low swell, and whose
/// colors come from height-keyed gradients.
pub struct NoiseBiome {
    config: BiomeConfig,
    heightmap: HeightmapSampler,
    sea_noise: Simplex,
    detail_noise: Simplex,
    min: f64,
    max: f64,
}

impl NoiseBiome {
    /// Build a biome, validating the config and sorting its color stops.
    pub fn new(mut config: BiomeConfig) -> Result<Self, BiomeConfigError> {
        config.validate()?;
        config.colors.sort_by(|a, b| a.at.total_cmp(&b.at));
        config.sea.colors.sort_by(|a, b| a.at.total_cmp(&b.at));

        let heightmap = HeightmapSampler::new(config.terrain.clone());
        let amplitude = heightmap.max_amplitude().max(f64::EPSILON);
        let min = config.min.unwrap_or(-amplitude);
        let max = config.max.unwrap_or(amplitude);

        tracing::debug!(
            biome = %config.name,
            min,
            max,
            vegetation_items = config.vegetation.len(),
            "Built noise biome"
        );

        Ok(Self {
            sea_noise: Simplex::new(config.sea.seed),
            detail_noise: Simplex::new(config.terrain.seed.wrapping_add(0x5eed)),
            heightmap,
            config,
            min,
            max,
        })
    }

    pub fn config(&self) -> &BiomeConfig {
        &self.config
    }
}

impl Biome for NoiseBiome {
    fn height(&self, point: DVec3) -> f64 {
        self.heightmap.sample(point)
    }

    fn sea_height(&self, point: DVec3) -> f64 {
        let p = point * self.config.sea.wave_frequency;
        self.config.sea.level + self.sea_noise.get([p.x, p.y, p.z]) * self.config.sea.wave_amplitude
    }

    fn color(&self, point: DVec3, normalized_height: f64, steepness: f64) -> Option<Color> {
        let mut color = sample_gradient(&self.config.colors, normalized_height)?;

        if normalized_height >= 0.0
            && let Some(rock) = &self.config.steep_rock
        {
            let span = (rock.end - rock.start).max(f64::EPSILON);
            let t = ((steepness - rock.start) / span).clamp(0.0, 1.0);
            color = color.lerp(rock.color, (t * t * (3.0 - 2.0 * t)) as f32);
        }

        if self.config.color_variation > 0.0 {
            let p = point * COLOR_DETAIL_FREQUENCY;
            let jitter = self.detail_noise.get([p.x, p.y, p.z]) as f32;
            color = color.scale(1.0 + jitter * self.config.color_variation);
        }

        Some(color)
    }

    fn sea_color(&self, _point: DVec3, normalized_height: f64) -> Option<Color> {
        sample_gradient(&self.config.sea.colors, normalized_height)
    }

    fn vegetation_items(&self) -> &[VegetationItem] {
        &self.config.vegetation
    }

    fn min_height(&self) -> f64 {
        self.min
    }

    fn max_height(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorStop, GroundInfluence, VegetationField};

    fn biome() -> NoiseBiome {
        NoiseBiome::new(BiomeConfig::temperate()).unwrap()
    }

    #[test]
    fn test_extrema_bound_the_height_field() {
        let biome = biome();
        assert!(biome.min_height() < 0.0 && biome.max_height() > 0.0);
        for i in 0..500 {
            let t = i as f64 * 0.37;
            let p = DVec3::new(t.sin(), t.cos(), (t * 0.3).sin()).normalize();
            let h = biome.height(p);
            assert!(h >= biome.min_height() && h <= biome.max_height());
        }
    }

    #[test]
    fn test_explicit_extrema_override_defaults() {
        let biome = NoiseBiome::new(BiomeConfig {
            min: Some(-0.02),
            max: Some(0.08),
            ..BiomeConfig::temperate()
        })
        .unwrap();
        assert_eq!(biome.min_height(), -0.02);
        assert_eq!(biome.max_height(), 0.08);
    }

    #[test]
    fn test_sea_height_stays_near_level() {
        let biome = biome();
        let amp = biome.config().sea.wave_amplitude;
        for p in [DVec3::X, DVec3::Y, DVec3::NEG_Z] {
            assert!(biome.sea_height(p).abs() <= amp * 1.05);
        }
    }

    #[test]
    fn test_steep_faces_turn_to_rock() {
        let mut config = BiomeConfig::temperate();
        config.color_variation = 0.0;
        let biome = NoiseBiome::new(config).unwrap();
        let rock = biome.config().steep_rock.clone().unwrap().color;

        let flat = biome.color(DVec3::X, 0.2, 0.0).unwrap();
        let cliff = biome.color(DVec3::X, 0.2, std::f64::consts::FRAC_PI_2).unwrap();
        let close = |a: Color, b: Color| {
            (a.r - b.r).abs() < 1e-6 && (a.g - b.g).abs() < 1e-6 && (a.b - b.b).abs() < 1e-6
        };
        assert!(!close(flat, rock));
        assert!(close(cliff, rock));
    }

    #[test]
    fn test_missing_gradient_yields_no_color() {
        let mut config = BiomeConfig::temperate();
        config.colors.clear();
        config.sea.colors.clear();
        let biome = NoiseBiome::new(config).unwrap();
        assert!(biome.color(DVec3::X, 0.1, 0.1).is_none());
        assert!(biome.sea_color(DVec3::X, -0.1).is_none());
    }

    #[test]
    fn test_unsorted_stops_are_sorted() {
        let mut config = BiomeConfig::temperate();
        config.color_variation = 0.0;
        config.steep_rock = None;
        config.colors = vec![
            ColorStop::new(1.0, Color::new(1.0, 1.0, 1.0)),
            ColorStop::new(-1.0, Color::BLACK),
        ];
        let biome = NoiseBiome::new(config).unwrap();
        let c = biome.color(DVec3::X, 0.0, 0.0).unwrap();
        assert!((c.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_add_vegetation_records_ground_influence_only() {
        let biome = biome();
        let mut field = VegetationField::new();

        let bare = VegetationItem::new("Bush");
        biome.add_vegetation(&mut field, &bare, DVec3::X, 0.1, 0.1);
        assert!(field.is_empty());

        let rooted = VegetationItem {
            ground: Some(GroundInfluence::default()),
            ..VegetationItem::new("PineTree")
        };
        biome.add_vegetation(&mut field, &rooted, DVec3::X, 0.1, 0.1);
        assert_eq!(field.len(), 1);
    }
}
