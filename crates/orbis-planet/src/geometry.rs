//! Generation requests and the meshes they produce.

use glam::Vec3;
use hashbrown::HashMap;
use orbis_terrain::BiomeConfig;
use serde::{Deserialize, Serialize};

use crate::AttributeBuffer;

/// Subdivision level used when a request does not set one.
pub const DEFAULT_DETAIL: u32 = 50;

/// Scatter multiplier used when a request does not set one.
pub const DEFAULT_SCATTER: f64 = 1.2;

/// Parameters of one planet geometry request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Base mesh subdivision level. Defaults to [`DEFAULT_DETAIL`].
    #[serde(default)]
    pub detail: Option<u32>,
    /// Biome to build the planet from.
    #[serde(default)]
    pub biome: BiomeConfig,
    /// Scatter multiplier relative to the base edge length. Defaults to
    /// [`DEFAULT_SCATTER`].
    #[serde(default)]
    pub scatter: Option<f64>,
    /// Seed for the vegetation draw. Unseeded requests draw from OS entropy.
    #[serde(default)]
    pub vegetation_seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(biome: BiomeConfig) -> Self {
        Self {
            biome,
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, detail: u32) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_scatter(mut self, scatter: f64) -> Self {
        self.scatter = Some(scatter);
        self
    }

    pub fn with_vegetation_seed(mut self, seed: u64) -> Self {
        self.vegetation_seed = Some(seed);
        self
    }

    pub fn detail(&self) -> u32 {
        self.detail.unwrap_or(DEFAULT_DETAIL)
    }

    pub fn scatter(&self) -> f64 {
        self.scatter.unwrap_or(DEFAULT_SCATTER)
    }
}

/// Displaced land surface. All buffers are index-aligned with the base mesh.
#[derive(Clone, Debug, Default)]
pub struct LandMesh {
    pub positions: AttributeBuffer,
    pub normals: AttributeBuffer,
    pub colors: AttributeBuffer,
}

/// Alternate ocean positions and normals for tidal animation.
#[derive(Clone, Debug, Default)]
pub struct MorphTarget {
    pub positions: AttributeBuffer,
    pub normals: AttributeBuffer,
}

#[derive(Clone, Debug, Default)]
pub struct OceanMesh {
    pub positions: AttributeBuffer,
    pub normals: AttributeBuffer,
    pub colors: AttributeBuffer,
    pub morph: MorphTarget,
}

/// Placement points per vegetation name, in placement order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VegetationPlacementMap {
    placements: HashMap<String, Vec<Vec3>>,
}

impl VegetationPlacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, point: Vec3) {
        match self.placements.get_mut(name) {
            Some(points) => points.push(point),
            None => {
                self.placements.insert(name.to_string(), vec![point]);
            }
        }
    }

    /// Points placed for `name`; empty if none were.
    pub fn points(&self, name: &str) -> &[Vec3] {
        self.placements.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Vec3])> {
        self.placements
            .iter()
            .map(|(name, points)| (name.as_str(), points.as_slice()))
    }

    /// Number of vegetation names with at least one placement.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.placements.values().map(Vec::len).sum()
    }
}

/// Everything one request produces.
#[derive(Clone, Debug, Default)]
pub struct GeneratedMeshes {
    pub land: LandMesh,
    pub ocean: OceanMesh,
    pub vegetation: VegetationPlacementMap,
}

impl GeneratedMeshes {
    pub fn vertex_count(&self) -> usize {
        self.land.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.land.positions.face_count()
    }

    /// Total size of all vertex attribute buffers.
    pub fn byte_size(&self) -> usize {
        [
            &self.land.positions,
            &self.land.normals,
            &self.land.colors,
            &self.ocean.positions,
            &self.ocean.normals,
            &self.ocean.colors,
            &self.ocean.morph.positions,
            &self.ocean.morph.normals,
        ]
        .iter()
        .map(|b| b.byte_size())
        .sum()
    }
}
