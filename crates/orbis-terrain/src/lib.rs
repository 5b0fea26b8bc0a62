//! Planet surface oracles: height and color fields, scatter noise, vegetation
//! rules and accumulation, and the vegetation model catalog.

mod color;
mod heightmap;
mod noise_field;

pub mod biome;
pub mod catalog;
pub mod vegetation;

pub use biome::{
    Biome, BiomeConfig, BiomeConfigError, ColorStop, NoiseBiome, SeaConfig, SteepRockConfig,
};
pub use color::Color;
pub use heightmap::{HeightmapParams, HeightmapSampler};
pub use noise_field::{AxisShift, NoiseField, ScatterNoise};
pub use vegetation::{
    FaceBlend, GroundInfluence, MAX_GROUND_RADIUS, VEGETATION_BLEND_RADIUS, VegetationField,
    VegetationItem,
};
