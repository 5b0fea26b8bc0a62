use criterion::{Criterion, black_box, criterion_group, criterion_main};
use orbis_planet::*;
use orbis_terrain::{BiomeConfig, NoiseBiome, ScatterNoise};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_icosphere(c: &mut Criterion) {
    c.bench_function("icosphere_detail_20", |bencher| {
        bencher.iter(|| black_box(icosphere_positions(black_box(20))))
    });
}

fn bench_generate_planet(c: &mut Criterion) {
    let request = GenerationRequest::new(BiomeConfig::temperate())
        .with_detail(20)
        .with_vegetation_seed(7);
    let biome = NoiseBiome::new(request.biome.clone()).unwrap();
    c.bench_function("generate_planet_detail_20", |bencher| {
        bencher.iter(|| black_box(generate_planet(&request, &biome, &Icosphere).unwrap()))
    });
}

fn bench_scatter_pass_only(c: &mut Criterion) {
    let biome = NoiseBiome::new(BiomeConfig::desert()).unwrap();
    let base = Icosphere.generate(20);
    let metrics = SurfaceMetrics::measure(&base).unwrap();
    let noise = ScatterNoise::symmetric(0, metrics.edge_length, SCATTER_NOISE_SCALE);
    c.bench_function("face_processor_detail_20", |bencher| {
        bencher.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            black_box(
                FaceProcessor::new(&biome, &noise, metrics)
                    .run(base.clone(), &mut rng)
                    .unwrap(),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_icosphere,
    bench_generate_planet,
    bench_scatter_pass_only
);
criterion_main!(benches);
