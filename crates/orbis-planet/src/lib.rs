//! Planet geometry synthesis: displaces a subdivided sphere into land and ocean
//! meshes with flat-shaded colors, tidal morph targets and vegetation placement,
//! and runs the work on background threads.

mod base_mesh;
mod buffer;
mod dispatch;
mod error;
mod face_processor;
mod geometry;
mod vegetation_blend;
mod vertex_cache;

pub use base_mesh::{BaseMesh, BaseMeshProvider, Icosphere, icosphere_positions};
pub use buffer::AttributeBuffer;
pub use dispatch::{DispatchError, GeometryWorker, RequestId, WorkerMessage, WorkerResponse};
pub use error::GenerationError;
pub use face_processor::{
    FaceClassification, FaceProcessor, SurfaceMetrics, VEGETATION_CLEARANCE, face_normal,
    generate_planet, normalize_height, steepness,
};
pub use geometry::{
    DEFAULT_DETAIL, DEFAULT_SCATTER, GeneratedMeshes, GenerationRequest, LandMesh, MorphTarget,
    OceanMesh, VegetationPlacementMap,
};
pub use vegetation_blend::blend_vegetation;
pub use vertex_cache::{
    KEY_SCALE, SCATTER_NOISE_SCALE, SEA_MORPH_OFFSET, VertexEvaluationCache, VertexInfo,
    VertexKey, scatter_shifts,
};
