//! The scatter pass: displaces each base face into land, ocean and ocean morph
//! triangles, shades them flat, and scatters vegetation.

use std::time::Instant;

use glam::DVec3;
use orbis_terrain::{Biome, NoiseField, ScatterNoise, VegetationField};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::vertex_cache::{SCATTER_NOISE_SCALE, VertexEvaluationCache, VertexInfo};
use crate::{
    AttributeBuffer, BaseMesh, BaseMeshProvider, GeneratedMeshes, GenerationError,
    GenerationRequest, LandMesh, MorphTarget, OceanMesh, VegetationPlacementMap, VertexKey,
    blend_vegetation,
};

/// Radial clearance added to vegetation placement points.
pub const VEGETATION_CLEARANCE: f64 = 0.005;

/// Per-face values the biome classifies colors and vegetation by.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceClassification {
    /// Mean corner height mapped to `[-1, 1]`, `0` at sea level.
    pub normalized_height: f64,
    /// Angle in radians between the face normal and the outward direction.
    pub steepness: f64,
}

/// Size measurements of a base mesh, shared by every face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMetrics {
    pub face_count: usize,
    /// Unit-sphere area per face, `4π / face_count`.
    pub face_area: f64,
    /// Length of the first base edge.
    pub edge_length: f64,
}

impl SurfaceMetrics {
    /// Validate the base mesh topology and measure it.
    pub fn measure(base: &BaseMesh) -> Result<Self, GenerationError> {
        let land = base.land.len();
        let ocean = base.ocean.len();
        if land % 3 != 0 {
            return Err(GenerationError::MalformedTopology { vertex_count: land });
        }
        if ocean != land {
            return Err(GenerationError::MismatchedBuffers { land, ocean });
        }
        if land == 0 {
            return Err(GenerationError::EmptyMesh);
        }

        let face_count = land / 3;
        Ok(Self {
            face_count,
            face_area: 4.0 * std::f64::consts::PI / face_count as f64,
            edge_length: base.land.get(0).distance(base.land.get(1)),
        })
    }
}

/// Map a raw mean height offset into `[-1, 1]` using the biome extrema.
///
/// Negative offsets scale by `-min`, positive ones by `max`. Non-finite
/// results collapse to sea level.
pub fn normalize_height(raw: f64, min: f64, max: f64) -> f64 {
    let n = (-raw / min).min(0.0) + (raw / max).max(0.0);
    if n.is_nan() { 0.0 } else { n.clamp(-1.0, 1.0) }
}

/// Unit normal of triangle `abc` with counter-clockwise winding.
/// Degenerate triangles give a zero vector.
pub fn face_normal([a, b, c]: [DVec3; 3]) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Tilt of a face in `[0, π/2]`: `acos |normal · mid|`.
///
/// `mid` is the face's pre-displacement centroid, which lies just inside the
/// unit sphere, so flat faces read slightly above zero.
pub fn steepness(normal: DVec3, mid: DVec3) -> f64 {
    normal.dot(mid).abs().clamp(0.0, 1.0).acos()
}

/// Output of the scatter pass, input to the blend pass.
struct ScatterPass {
    land: LandMesh,
    ocean: OceanMesh,
    corner_info: Vec<VertexInfo>,
    classes: Vec<FaceClassification>,
    vegetation: VegetationPlacementMap,
    field: VegetationField,
}

/// Runs both generation passes over one base mesh.
pub struct FaceProcessor<'a, B: ?Sized, N: ?Sized> {
    biome: &'a B,
    cache: VertexEvaluationCache<'a, B, N>,
    metrics: SurfaceMetrics,
}

impl<'a, B, N> FaceProcessor<'a, B, N>
where
    B: Biome + ?Sized,
    N: NoiseField + ?Sized,
{
    pub fn new(biome: &'a B, noise: &'a N, metrics: SurfaceMetrics) -> Self {
        Self {
            biome,
            cache: VertexEvaluationCache::new(biome, noise),
            metrics,
        }
    }

    pub fn metrics(&self) -> SurfaceMetrics {
        self.metrics
    }

    /// Displace, shade and scatter every face, then blend vegetation into the
    /// land surface.
    pub fn run<R: Rng>(
        self,
        base: BaseMesh,
        rng: &mut R,
    ) -> Result<GeneratedMeshes, GenerationError> {
        self.run_classified(base, rng).map(|(meshes, _)| meshes)
    }

    /// Like [`run`](Self::run), also returning the classification of every
    /// face in buffer order.
    pub fn run_classified<R: Rng>(
        mut self,
        base: BaseMesh,
        rng: &mut R,
    ) -> Result<(GeneratedMeshes, Vec<FaceClassification>), GenerationError> {
        let mut pass = self.scatter(base, rng)?;

        tracing::debug!(
            cached_vertices = self.cache.len(),
            cache_hits = self.cache.hits(),
            ground_influences = pass.field.len(),
            "Scatter pass complete"
        );

        blend_vegetation(
            self.biome,
            &pass.field,
            &mut pass.land,
            &pass.corner_info,
            self.metrics.edge_length,
        );

        let meshes = GeneratedMeshes {
            land: pass.land,
            ocean: pass.ocean,
            vegetation: pass.vegetation,
        };
        Ok((meshes, pass.classes))
    }

    fn scatter<R: Rng>(
        &mut self,
        base: BaseMesh,
        rng: &mut R,
    ) -> Result<ScatterPass, GenerationError> {
        let vertex_count = base.land.len();
        let BaseMesh {
            land: mut land_positions,
            ocean: mut ocean_positions,
        } = base;

        let mut land = LandMesh {
            positions: AttributeBuffer::new(),
            normals: AttributeBuffer::zeroed(vertex_count),
            colors: AttributeBuffer::zeroed(vertex_count),
        };
        let mut ocean = OceanMesh {
            positions: AttributeBuffer::new(),
            normals: AttributeBuffer::zeroed(vertex_count),
            colors: AttributeBuffer::zeroed(vertex_count),
            morph: MorphTarget {
                positions: AttributeBuffer::zeroed(vertex_count),
                normals: AttributeBuffer::zeroed(vertex_count),
            },
        };
        let mut corner_info = Vec::with_capacity(vertex_count);
        let mut classes = Vec::with_capacity(self.metrics.face_count);
        let mut vegetation = VegetationPlacementMap::new();
        let mut field = VegetationField::new();

        let (min, max) = (self.biome.min_height(), self.biome.max_height());

        for face in 0..self.metrics.face_count {
            let corners = land_positions.face(face);
            let ocean_corners = ocean_positions.face(face);
            let mid = (corners[0] + corners[1] + corners[2]) / 3.0;

            let mut displaced = [DVec3::ZERO; 3];
            let mut sea = [DVec3::ZERO; 3];
            let mut morph = [DVec3::ZERO; 3];
            let mut raw_height = 0.0;

            for j in 0..3 {
                let info = self.cache.get_or_compute(corners[j])?;
                corner_info.push(info);
                raw_height += info.height - 1.0;

                displaced[j] = (info.position + info.scatter).normalize() * info.height;
                let ocean_corner =
                    if VertexKey::quantize(ocean_corners[j]) == VertexKey::quantize(corners[j]) {
                        info.position
                    } else {
                        ocean_corners[j]
                    };
                let sea_dir = (ocean_corner + info.scatter).normalize();
                morph[j] = sea_dir * info.sea_morph_height;
                sea[j] = sea_dir * info.sea_height;
            }

            land_positions.set_face(face, displaced);
            ocean_positions.set_face(face, sea);
            ocean.morph.positions.set_face(face, morph);

            let normal = face_normal(displaced);
            let class = FaceClassification {
                normalized_height: normalize_height(raw_height / 3.0, min, max),
                steepness: steepness(normal, mid),
            };

            land.normals.fill_face(face, normal.as_vec3().to_array());
            ocean
                .normals
                .fill_face(face, face_normal(sea).as_vec3().to_array());
            ocean
                .morph
                .normals
                .fill_face(face, face_normal(morph).as_vec3().to_array());

            if let Some(color) = self
                .biome
                .color(mid, class.normalized_height, class.steepness)
            {
                land.colors.fill_face(face, color.to_array());
            }
            if let Some(color) = self.biome.sea_color(mid, class.normalized_height) {
                ocean.colors.fill_face(face, color.to_array());
            }

            self.scatter_vegetation(class, displaced[0], rng, &mut vegetation, &mut field);
            classes.push(class);
        }

        land.positions = land_positions;
        ocean.positions = ocean_positions;

        Ok(ScatterPass {
            land,
            ocean,
            corner_info,
            classes,
            vegetation,
            field,
        })
    }

    /// Try each vegetation item in order; the first whose draw and gate both
    /// pass is placed at the face's first displaced corner.
    fn scatter_vegetation<R: Rng>(
        &self,
        class: FaceClassification,
        anchor: DVec3,
        rng: &mut R,
        placements: &mut VegetationPlacementMap,
        field: &mut VegetationField,
    ) {
        for item in self.biome.vegetation_items() {
            let draw: f64 = rng.random();
            if draw >= self.metrics.face_area * item.density() {
                continue;
            }
            if !item.accepts(class.normalized_height, class.steepness) {
                continue;
            }

            let dir = anchor.normalize();
            let point = dir * (anchor.length() + VEGETATION_CLEARANCE);
            placements.push(&item.name, point.as_vec3());
            self.biome.add_vegetation(
                field,
                item,
                dir,
                class.normalized_height,
                class.steepness,
            );
            return;
        }
    }
}

/// Generate a full planet for `request` with the default scatter noise.
pub fn generate_planet<B, P>(
    request: &GenerationRequest,
    biome: &B,
    provider: &P,
) -> Result<GeneratedMeshes, GenerationError>
where
    B: Biome + ?Sized,
    P: BaseMeshProvider + ?Sized,
{
    let start = Instant::now();
    let base = provider.generate(request.detail());
    let metrics = SurfaceMetrics::measure(&base)?;

    let amount = request.scatter() * metrics.edge_length;
    let noise = ScatterNoise::symmetric(0, amount, SCATTER_NOISE_SCALE);

    let mut rng = match request.vegetation_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };

    let meshes = FaceProcessor::new(biome, &noise, metrics).run(base, &mut rng)?;

    tracing::info!(
        detail = request.detail(),
        faces = metrics.face_count,
        vegetation = meshes.vegetation.total_points(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Generated planet geometry"
    );

    Ok(meshes)
}
