//! Benchmarks for the CPU-side simulation and drawing.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use reverie::prelude::*;
use reverie::ShapeSampler;

fn warmed(name: &str, ticks: u32) -> Simulation {
    let mut config = EngineConfig::preset(name).unwrap();
    config.seed = Some(1);
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..ticks {
        sim.tick();
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for name in ["text_fireworks", "floating_hearts", "heart_3d"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, name| {
            let mut sim = warmed(name, 600);
            b.iter(|| {
                sim.tick();
                black_box(sim.pool().live_count())
            })
        });
    }

    group.finish();
}

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    let config = EngineConfig::text_fireworks("LOVE");

    for (w, h) in [(400, 300), (800, 600), (1920, 1080)] {
        group.bench_with_input(
            BenchmarkId::new("text", format!("{}x{}", w, h)),
            &CanvasSize::new(w, h),
            |b, &canvas| {
                let mut sampler = ShapeSampler::new();
                let mut rng = SmallRng::seed_from_u64(7);
                b.iter(|| {
                    black_box(sampler.sample(
                        &config.shape,
                        &config.text,
                        canvas,
                        config.thresholds.capture_radius,
                        &mut rng,
                    ))
                })
            },
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    group.bench_function("recording/text_fireworks", |b| {
        let mut sim = warmed("text_fireworks", 600);
        let mut surface = RecordingSurface::new(800, 600);
        b.iter(|| {
            surface.clear_log();
            black_box(sim.render(&mut surface))
        })
    });

    group.bench_function("raster/photo_sphere", |b| {
        let mut sim = warmed("photo_sphere", 120);
        let mut surface = RasterSurface::new(800, 600, Vec3::ZERO);
        b.iter(|| black_box(sim.render(&mut surface)))
    });

    group.finish();
}

criterion_group!(benches, bench_tick, bench_sampler, bench_render);
criterion_main!(benches);
