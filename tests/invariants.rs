//! Invariants checked over seeded random runs.
//!
//! Each run picks a preset, perturbs a few settings and throws random pointer
//! and resize events at the simulation, checking the particle invariants
//! after every tick.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use reverie::config::PRESET_NAMES;
use reverie::prelude::*;
use reverie::render::DrawOp;

const SEEDS: u64 = 8;
const TICKS: u32 = 240;

fn random_config(rng: &mut SmallRng) -> EngineConfig {
    let name = PRESET_NAMES[rng.gen_range(0..PRESET_NAMES.len())];
    let mut config = EngineConfig::preset(name).unwrap();
    config.seed = Some(rng.gen());
    config.canvas = CanvasSize::new(rng.gen_range(120..480), rng.gen_range(120..360));
    config.capacity = rng.gen_range(1..400);
    config.particle_count = rng.gen_range(0..500);
    config.visuals.trail_length = rng.gen_range(0..10);
    config.physics.gravity = rng.gen_range(-0.1..0.4);
    config.physics.explosion_force = rng.gen_range(0.0..10.0);
    config
}

fn random_event(rng: &mut SmallRng, canvas: CanvasSize) -> InputEvent {
    let x = rng.gen_range(-20.0..canvas.width as f32 + 20.0);
    let y = rng.gen_range(-20.0..canvas.height as f32 + 20.0);
    match rng.gen_range(0..10) {
        0..=3 => InputEvent::PointerDown { x, y },
        4..=6 => InputEvent::PointerMove { x, y },
        7 | 8 => InputEvent::PointerUp { x, y },
        _ => InputEvent::Resize {
            width: rng.gen_range(0..500),
            height: rng.gen_range(0..400),
        },
    }
}

fn check_particles(sim: &Simulation) {
    let pool = sim.pool();
    let capacity = sim.config().capacity as usize;
    let trail_max = sim.config().visuals.trail_length as usize;

    assert!(pool.live_count() <= capacity);
    assert!(pool.live_count() <= pool.active_limit());
    assert_eq!(pool.capacity(), capacity);

    for (_, p) in pool.iter_live() {
        assert!((0.0..=1.0).contains(&p.alpha), "alpha {}", p.alpha);
        assert!(p.size >= 0.0, "size {}", p.size);
        assert!(p.trail.len() <= trail_max);
        assert!(p.position.is_finite());
    }
}

#[test]
fn test_random_runs_hold_invariants() {
    for seed in 0..SEEDS {
        let mut rng = SmallRng::seed_from_u64(seed);
        let config = random_config(&mut rng);
        let name = config.name.clone();
        let mut sim = Simulation::new(config).unwrap();

        for _ in 0..TICKS {
            if rng.gen_bool(0.1) {
                let event = random_event(&mut rng, sim.config().canvas);
                sim.push_event(event);
            }
            sim.tick();
            check_particles(&sim);
        }

        let targets = sim.targets();
        let canvas = sim.config().canvas;
        if !sim.config().shape.is_volumetric() {
            assert!(
                targets.all_within(canvas.width as f32, canvas.height as f32),
                "seed {} ({}) has targets outside {}x{}",
                seed,
                name,
                canvas.width,
                canvas.height
            );
        }
    }
}

#[test]
fn test_renderer_draws_only_finite_geometry() {
    for seed in 0..SEEDS {
        let mut rng = SmallRng::seed_from_u64(100 + seed);
        let config = random_config(&mut rng);
        let canvas = config.canvas;
        let mut sim = Simulation::new(config).unwrap();
        let mut surface = RecordingSurface::new(canvas.width, canvas.height);

        for _ in 0..TICKS / 2 {
            sim.tick();
        }
        // Drag the camera around, then draw
        for k in 0..20 {
            let x = k as f32 * 15.0;
            sim.push_event(InputEvent::PointerDown { x, y: 10.0 });
            sim.push_event(InputEvent::PointerMove { x: x + 40.0, y: 90.0 });
        }
        sim.tick();

        let drawn = sim.render(&mut surface);
        assert!(surface.is_balanced());
        assert!(drawn <= sim.pool().live_count());

        for op in surface.ops() {
            match op {
                DrawOp::FillCircle { center, radius, .. } => {
                    assert!(center.is_finite() && radius.is_finite() && *radius > 0.0);
                }
                DrawOp::FillRadialGradient { center, radius, .. } => {
                    assert!(center.is_finite() && radius.is_finite());
                }
                DrawOp::FillPath { path, .. } | DrawOp::StrokePath { path, .. } => {
                    let (min, max) = path.bounds().unwrap();
                    assert!(min.is_finite() && max.is_finite());
                }
                DrawOp::SetGlobalAlpha(alpha) => assert!((0.0..=1.0).contains(alpha)),
                _ => {}
            }
        }
    }
}

#[test]
fn test_zero_force_explosion_settles() {
    let mut config = EngineConfig::heart_fireworks();
    config.physics.explosion_force = 0.0;
    config.scene.launch_interval = 0;
    config.seed = Some(77);
    let mut sim = Simulation::new(config).unwrap();
    sim.push_event(InputEvent::PointerDown { x: 400.0, y: 250.0 });

    let mut saw_explode = false;
    for _ in 0..400 {
        sim.tick();
        saw_explode |= sim.pool().count_phase(Phase::Explode) > 0;
    }
    assert!(saw_explode);
    assert_eq!(sim.pool().count_phase(Phase::Explode), 0);
}
