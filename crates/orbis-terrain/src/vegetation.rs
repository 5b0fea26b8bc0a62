//! Vegetation rules and per-request accumulation of placed vegetation.
//!
//! A [`VegetationItem`] describes where one kind of plant may grow. Each placed
//! plant whose item carries a [`GroundInfluence`] is recorded in a
//! [`VegetationField`], which later answers how much the ground under a face
//! is raised and tinted by nearby plants.

use glam::DVec3;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::Color;

/// Cell size of the [`VegetationField`] spatial index, in unit-sphere units.
pub const VEGETATION_BLEND_RADIUS: f64 = 0.14;

/// Largest accepted [`GroundInfluence::radius`].
pub const MAX_GROUND_RADIUS: f64 = 0.25;

/// One configured vegetation type and its placement window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationItem {
    /// Model name; also the key in the placement map.
    pub name: String,
    /// Placement density per unit of face area. Default: 1.
    pub density: Option<f64>,
    /// Lowest normalized height. Default: 0 (sea level).
    pub minimum_height: Option<f64>,
    /// Highest normalized height. Default: unbounded.
    pub maximum_height: Option<f64>,
    /// Lowest steepness in radians. Default: 0.
    pub minimum_slope: Option<f64>,
    /// Highest steepness in radians. Default: unbounded.
    pub maximum_slope: Option<f64>,
    /// How this plant alters the ground around it. `None` leaves the ground alone.
    pub ground: Option<GroundInfluence>,
}

impl VegetationItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn density(&self) -> f64 {
        self.density.unwrap_or(1.0)
    }

    /// Returns `true` if a face with this classification lies inside the
    /// item's height and slope window (bounds inclusive).
    pub fn accepts(&self, normalized_height: f64, steepness: f64) -> bool {
        let min_height = self.minimum_height.unwrap_or(0.0);
        let max_height = self.maximum_height.unwrap_or(f64::INFINITY);
        let min_slope = self.minimum_slope.unwrap_or(0.0);
        let max_slope = self.maximum_slope.unwrap_or(f64::INFINITY);

        (min_height..=max_height).contains(&normalized_height)
            && (min_slope..=max_slope).contains(&steepness)
    }
}

/// Ground modification around a placed plant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundInfluence {
    /// Reach of the influence on the unit sphere (chord distance).
    pub radius: f64,
    /// Height added at the plant's position, fading to zero at `radius`.
    pub raise: f64,
    /// Tint applied to faces near the plant.
    pub color: Option<Color>,
    /// Maximum tint weight at the plant's position, in `[0, 1]`.
    pub color_strength: f32,
}

impl Default for GroundInfluence {
    fn default() -> Self {
        Self {
            radius: 0.02,
            raise: 0.0,
            color: None,
            color_strength: 0.5,
        }
    }
}

/// Result of blending vegetation influence into one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBlend {
    /// Height deltas for the three corners, added to the cached radial height.
    pub height_a: f64,
    pub height_b: f64,
    pub height_c: f64,
    /// Face color after tinting.
    pub color: Color,
}

impl FaceBlend {
    /// A blend that changes nothing.
    pub fn unchanged(color: Color) -> Self {
        Self {
            height_a: 0.0,
            height_b: 0.0,
            height_c: 0.0,
            color,
        }
    }
}

#[derive(Clone, Debug)]
struct Influence {
    point: DVec3,
    ground: GroundInfluence,
}

type CellKey = (i32, i32, i32);

/// Accumulated ground influence of the vegetation placed during one request.
///
/// Written by the scatter pass, read by the blend pass. Queries go through a
/// uniform grid so each lookup only touches nearby plants.
#[derive(Debug)]
pub struct VegetationField {
    cell_size: f64,
    entries: Vec<Influence>,
    cells: HashMap<CellKey, Vec<usize>>,
    max_radius: f64,
}

impl VegetationField {
    pub fn new() -> Self {
        Self::with_cell_size(VEGETATION_BLEND_RADIUS)
    }

    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            cell_size,
            entries: Vec::new(),
            cells: HashMap::new(),
            max_radius: 0.0,
        }
    }

    /// Record a plant at `point` (a unit-sphere direction).
    pub fn insert(&mut self, point: DVec3, ground: &GroundInfluence) {
        let index = self.entries.len();
        self.entries.push(Influence {
            point,
            ground: ground.clone(),
        });
        self.cells.entry(self.cell_of(point)).or_default().push(index);
        self.max_radius = self.max_radius.max(ground.radius);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total height raise at `point`.
    pub fn raise_at(&self, point: DVec3) -> f64 {
        let mut total = 0.0;
        self.for_each_near(point, 0.0, |influence, distance| {
            let weight = falloff(distance, influence.ground.radius);
            total += influence.ground.raise * weight;
        });
        total
    }

    /// Tint `base` with every colored influence reaching `point`.
    ///
    /// `extra_reach` widens every influence radius, so faces larger than a
    /// plant's footprint still pick up its tint.
    pub fn tint_at(&self, point: DVec3, base: Color, extra_reach: f64) -> Color {
        let mut color = base;
        self.for_each_near(point, extra_reach, |influence, distance| {
            if let Some(tint) = influence.ground.color {
                let weight = falloff(distance, influence.ground.radius + extra_reach);
                color = color.lerp(tint, weight as f32 * influence.ground.color_strength);
            }
        });
        color
    }

    /// Height deltas for the three corners and the tinted face color.
    pub fn blend_face(&self, corners: [DVec3; 3], base_color: Color, edge_length: f64) -> FaceBlend {
        if self.is_empty() {
            return FaceBlend::unchanged(base_color);
        }
        let mid = ((corners[0] + corners[1] + corners[2]) / 3.0).normalize_or_zero();
        FaceBlend {
            height_a: self.raise_at(corners[0]),
            height_b: self.raise_at(corners[1]),
            height_c: self.raise_at(corners[2]),
            color: self.tint_at(mid, base_color, edge_length * 0.5),
        }
    }

    fn cell_of(&self, point: DVec3) -> CellKey {
        let c = (point / self.cell_size).floor();
        (c.x as i32, c.y as i32, c.z as i32)
    }

    fn for_each_near(&self, point: DVec3, extra_reach: f64, mut f: impl FnMut(&Influence, f64)) {
        let mut visit = |influence: &Influence| {
            let distance = influence.point.distance(point);
            if distance < influence.ground.radius + extra_reach {
                f(influence, distance);
            }
        };

        // Chord distances on the unit sphere never exceed 2.
        let reach = (self.max_radius + extra_reach).min(2.0);
        let span = (reach / self.cell_size).ceil();
        let window = (2.0 * span + 1.0).powi(3);
        if window >= self.cells.len() as f64 {
            self.entries.iter().for_each(visit);
            return;
        }

        let span = span as i32;
        let (cx, cy, cz) = self.cell_of(point);
        for dx in -span..=span {
            for dy in -span..=span {
                for dz in -span..=span {
                    if let Some(indices) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        indices.iter().for_each(|&i| visit(&self.entries[i]));
                    }
                }
            }
        }
    }
}

impl Default for VegetationField {
    fn default() -> Self {
        Self::new()
    }
}

/// Smoothstep falloff: 1 at distance 0, 0 at `radius`.
fn falloff(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let t = (1.0 - distance / radius).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
