//! Serializable biome description and its built-in presets.

use std::path::Path;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::{Color, GroundInfluence, HeightmapParams, MAX_GROUND_RADIUS, VegetationItem};

/// Errors that can occur when loading or validating a biome description.
#[derive(Debug, thiserror::Error)]
pub enum BiomeConfigError {
    /// Failed to read the biome file from disk.
    #[error("failed to read biome file: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse biome: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// Normalization extrema must straddle sea level.
    #[error("invalid height extrema: min {min} must be < 0 and max {max} must be > 0")]
    InvalidExtrema { min: f64, max: f64 },

    /// Two vegetation items share a name.
    #[error("duplicate vegetation name: {0}")]
    DuplicateVegetation(String),

    /// A ground influence radius is negative, non-finite or too large.
    #[error("vegetation '{name}' has invalid ground radius {radius}")]
    InvalidGroundRadius { name: String, radius: f64 },
}

/// A color keyed by normalized height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub at: f64,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(at: f64, color: Color) -> Self {
        Self { at, color }
    }
}

/// Steep faces fade toward a rock color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SteepRockConfig {
    pub color: Color,
    /// Steepness (radians) where the fade starts.
    pub start: f64,
    /// Steepness (radians) where the face is fully rock.
    pub end: f64,
}

/// Sea surface configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaConfig {
    pub seed: u32,
    /// Mean sea surface offset from the unit sphere.
    pub level: f64,
    /// Amplitude of the swell noise.
    pub wave_amplitude: f64,
    /// Frequency of the swell noise.
    pub wave_frequency: f64,
    /// Sea colors keyed by the normalized height of the land below.
    pub colors: Vec<ColorStop>,
}

impl Default for SeaConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            level: 0.0,
            wave_amplitude: 0.002,
            wave_frequency: 12.0,
            colors: vec![
                ColorStop::new(-1.0, Color::from_hex(0x0b2a5b)),
                ColorStop::new(-0.2, Color::from_hex(0x1565a8)),
                ColorStop::new(0.0, Color::from_hex(0x3fb6c9)),
            ],
        }
    }
}

/// Full description of a planet's biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    pub name: String,
    /// Land height field.
    pub terrain: HeightmapParams,
    /// Lowest land height; defaults to minus the height field's max amplitude.
    pub min: Option<f64>,
    /// Highest land height; defaults to the height field's max amplitude.
    pub max: Option<f64>,
    /// Land colors keyed by normalized height.
    pub colors: Vec<ColorStop>,
    pub steep_rock: Option<SteepRockConfig>,
    /// Relative brightness jitter applied to land colors.
    pub color_variation: f32,
    pub sea: SeaConfig,
    /// Vegetation types in priority order.
    pub vegetation: Vec<VegetationItem>,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self::temperate()
    }
}

impl BiomeConfig {
    /// Green continents, sandy coasts, snowy peaks.
    pub fn temperate() -> Self {
        let forest_floor = GroundInfluence {
            radius: 0.03,
            raise: 0.001,
            color: Some(Color::from_hex(0x2f5522)),
            color_strength: 0.6,
        };

        Self {
            name: "temperate".to_string(),
            terrain: HeightmapParams::default(),
            min: None,
            max: None,
            colors: vec![
                ColorStop::new(-1.0, Color::from_hex(0x1d2b3a)),
                ColorStop::new(-0.05, Color::from_hex(0xc2b280)),
                ColorStop::new(0.0, Color::from_hex(0xe0cc8f)),
                ColorStop::new(0.08, Color::from_hex(0x5f9c3c)),
                ColorStop::new(0.45, Color::from_hex(0x3d6e2a)),
                ColorStop::new(0.7, Color::from_hex(0x7a6f66)),
                ColorStop::new(0.9, Color::from_hex(0xf4f4f4)),
            ],
            steep_rock: Some(SteepRockConfig {
                color: Color::from_hex(0x6b625a),
                start: 0.5,
                end: 0.9,
            }),
            color_variation: 0.05,
            sea: SeaConfig::default(),
            vegetation: vec![
                VegetationItem {
                    density: Some(40.0),
                    minimum_height: Some(0.3),
                    maximum_height: Some(0.8),
                    maximum_slope: Some(0.6),
                    ground: Some(forest_floor.clone()),
                    ..VegetationItem::new("PineTree")
                },
                VegetationItem {
                    density: Some(60.0),
                    minimum_height: Some(0.05),
                    maximum_height: Some(0.45),
                    maximum_slope: Some(0.5),
                    ground: Some(forest_floor),
                    ..VegetationItem::new("CommonTree")
                },
                VegetationItem {
                    density: Some(30.0),
                    maximum_height: Some(0.5),
                    ..VegetationItem::new("Bush")
                },
                VegetationItem {
                    density: Some(10.0),
                    minimum_slope: Some(0.3),
                    ..VegetationItem::new("Rock")
                },
            ],
        }
    }

    /// Dunes and cacti, shallow lagoons.
    pub fn desert() -> Self {
        Self {
            name: "desert".to_string(),
            terrain: HeightmapParams {
                amplitude: 0.04,
                base_frequency: 2.0,
                ridged: true,
                ..HeightmapParams::default()
            },
            colors: vec![
                ColorStop::new(-1.0, Color::from_hex(0x6e5a3c)),
                ColorStop::new(0.0, Color::from_hex(0xe8c98a)),
                ColorStop::new(0.5, Color::from_hex(0xd9a35f)),
                ColorStop::new(1.0, Color::from_hex(0x9c5f3a)),
            ],
            vegetation: vec![
                VegetationItem {
                    density: Some(15.0),
                    minimum_height: Some(0.1),
                    maximum_slope: Some(0.4),
                    ..VegetationItem::new("Cactus")
                },
                VegetationItem {
                    density: Some(8.0),
                    minimum_slope: Some(0.2),
                    ..VegetationItem::new("Rock")
                },
            ],
            ..Self::temperate()
        }
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "temperate" => Some(Self::temperate()),
            "desert" => Some(Self::desert()),
            _ => None,
        }
    }

    /// Parse a biome from RON and validate it.
    pub fn from_ron_str(src: &str) -> Result<Self, BiomeConfigError> {
        let config: Self = ron::from_str(src).map_err(BiomeConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a biome file.
    pub fn load(path: &Path) -> Result<Self, BiomeConfigError> {
        let contents = std::fs::read_to_string(path).map_err(BiomeConfigError::Read)?;
        let config = Self::from_ron_str(&contents)?;
        tracing::info!(biome = %config.name, path = %path.display(), "Loaded biome");
        Ok(config)
    }

    /// Check the invariants [`crate::NoiseBiome`] relies on.
    pub fn validate(&self) -> Result<(), BiomeConfigError> {
        let min = self.min.unwrap_or(-1.0);
        let max = self.max.unwrap_or(1.0);
        if !(min < 0.0 && max > 0.0) {
            return Err(BiomeConfigError::InvalidExtrema { min, max });
        }

        let mut names = HashSet::new();
        for item in &self.vegetation {
            if !names.insert(item.name.as_str()) {
                return Err(BiomeConfigError::DuplicateVegetation(item.name.clone()));
            }
            if let Some(ground) = &item.ground
                && !(0.0..=MAX_GROUND_RADIUS).contains(&ground.radius)
            {
                return Err(BiomeConfigError::InvalidGroundRadius {
                    name: item.name.clone(),
                    radius: ground.radius,
                });
            }
        }
        Ok(())
    }
}

/// Piecewise-linear lookup into color stops sorted by `at`.
///
/// Values outside the stop range take the nearest end color.
pub(crate) fn sample_gradient(stops: &[ColorStop], t: f64) -> Option<Color> {
    let first = stops.first()?;
    if t <= first.at {
        return Some(first.color);
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.at {
            let span = hi.at - lo.at;
            let f = if span > 0.0 { (t - lo.at) / span } else { 1.0 };
            return Some(lo.color.lerp(hi.color, f as f32));
        }
    }
    stops.last().map(|s| s.color)
}
