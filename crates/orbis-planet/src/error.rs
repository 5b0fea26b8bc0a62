use orbis_terrain::BiomeConfigError;

/// Errors that abort a geometry generation request.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The base mesh is not a triangle soup.
    #[error("base mesh has {vertex_count} vertices, which is not a multiple of 3")]
    MalformedTopology { vertex_count: usize },

    /// Land and ocean base buffers must describe the same faces.
    #[error("land buffer has {land} vertices but ocean buffer has {ocean}")]
    MismatchedBuffers { land: usize, ocean: usize },

    #[error("base mesh has no faces")]
    EmptyMesh,

    /// A biome or noise query returned NaN or infinity.
    #[error("{quantity} is not finite at {position:?}")]
    NonFiniteSample {
        quantity: &'static str,
        position: [f64; 3],
    },

    /// The request carried a biome description that failed validation.
    #[error(transparent)]
    Biome(#[from] BiomeConfigError),
}
