//! `orbis`: generate one planet and report what came out.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orbis-app -- --detail 20 --preset desert`.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use orbis_config::{CliArgs, Config, default_config_dir};
use orbis_planet::{
    DispatchError, GeneratedMeshes, GenerationError, GenerationRequest, GeometryWorker,
    WorkerResponse,
};
use orbis_terrain::catalog::LOW_POLY_NATURE;
use orbis_terrain::{BiomeConfig, BiomeConfigError};
use tracing::{error, info};

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Biome(#[from] BiomeConfigError),

    #[error("unknown biome preset '{0}'")]
    UnknownPreset(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orbis_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("orbis: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    let biome = resolve_biome(config)?;
    let mut request = GenerationRequest::new(biome)
        .with_detail(config.generation.detail)
        .with_scatter(config.generation.scatter);
    request.vegetation_seed = config.generation.vegetation_seed;

    let mut worker = if config.worker.threads == 0 {
        GeometryWorker::with_defaults()?
    } else {
        GeometryWorker::new(config.worker.threads, config.worker.max_in_flight)?
    };

    info!(
        biome = %request.biome.name,
        detail = request.detail(),
        scatter = request.scatter(),
        "Submitting planet"
    );
    let id = worker.submit(request)?;

    let response = worker
        .recv_timeout(RESPONSE_TIMEOUT)
        .ok_or(AppError::Timeout(RESPONSE_TIMEOUT))?;
    worker.shutdown();

    match response {
        WorkerResponse::Geometry {
            request_id,
            data,
            generation_time_us,
        } => {
            debug_assert_eq!(request_id, id);
            report(&data, generation_time_us);
            Ok(())
        }
        WorkerResponse::Failed { error, .. } => Err(error.into()),
    }
}

/// The configured biome file, or the configured preset.
fn resolve_biome(config: &Config) -> Result<BiomeConfig, AppError> {
    match &config.generation.biome_file {
        Some(path) => Ok(BiomeConfig::load(path)?),
        None => {
            let name = &config.generation.biome_preset;
            BiomeConfig::preset(name).ok_or_else(|| AppError::UnknownPreset(name.clone()))
        }
    }
}

fn report(meshes: &GeneratedMeshes, generation_time_us: u64) {
    info!(
        faces = meshes.face_count(),
        vertices = meshes.vertex_count(),
        buffer_kib = meshes.byte_size() / 1024,
        generation_ms = generation_time_us as f64 / 1000.0,
        "Planet generated"
    );

    let mut names: Vec<(&str, usize)> = meshes
        .vegetation
        .iter()
        .map(|(name, points)| (name, points.len()))
        .collect();
    names.sort_unstable();

    for (name, count) in names {
        let variants = LOW_POLY_NATURE
            .model_files(name)
            .map_or(0, |files| files.file_paths.len());
        info!(vegetation = name, count, variants, "Vegetation placed");
    }
}
