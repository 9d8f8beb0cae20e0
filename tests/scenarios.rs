//! End-to-end scenarios run through the public API.

use reverie::config::PhysicsConfig;
use reverie::lifecycle::{self, StepContext};
use reverie::prelude::*;
use reverie::{ParticlePool, TargetSet};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

fn love_config() -> EngineConfig {
    let mut config = EngineConfig::text_fireworks("LOVE");
    config.canvas = CanvasSize::new(800, 600);
    config.capacity = 2000;
    config.particle_count = 2000;
    config.seed = Some(2024);
    config
}

#[test]
fn test_text_assembly() {
    let mut sim = Simulation::new(love_config()).unwrap();
    assert!(sim.targets().len() > 500, "got {} targets", sim.targets().len());

    let band = sim.config().thresholds.target_band;
    let reach = sim.config().thresholds.capture_radius;

    // (slot, birth tick) identifies one particle life
    let mut reached_band: HashSet<(usize, u64)> = HashSet::new();
    let mut assembled: HashSet<(usize, u64)> = HashSet::new();
    let mut falling_in_band: HashMap<(usize, u64), u32> = HashMap::new();

    for tick in 0..900 {
        sim.tick();
        let targets = sim.targets();
        let mut still_falling = HashMap::new();
        for (i, p) in sim.pool().iter_live() {
            let id = (i, p.birth_tick);
            let pos = Vec2::new(p.position.x, p.position.y);
            match p.phase {
                Phase::Fall if tick < 880 && targets.band_contains(pos, band, reach) => {
                    reached_band.insert(id);
                    let streak = falling_in_band.get(&id).copied().unwrap_or(0) + 1;
                    assert!(streak <= 1, "particle {:?} stuck in Fall inside the band", id);
                    still_falling.insert(id, streak);
                }
                Phase::Assemble | Phase::Burn => {
                    assembled.insert(id);
                }
                _ => {}
            }
        }
        falling_in_band = still_falling;
    }

    assert!(!reached_band.is_empty());
    let captured = reached_band.intersection(&assembled).count();
    let ratio = captured as f32 / reached_band.len() as f32;
    assert!(ratio >= 0.9, "only {:.1}% assembled", ratio * 100.0);
    assert!(sim.pool().count_phase(Phase::Burn) > 0);
}

#[test]
fn test_capacity_drop() {
    let mut pool = ParticlePool::new(16, 16, 4);
    for i in 0..16 {
        assert!(pool.spawn(Phase::Drift, Vec3::ZERO, i, |_| {}).is_some());
    }
    assert_eq!(pool.spawn(Phase::Drift, Vec3::ZERO, 16, |_| {}), None);
    assert_eq!(pool.live_count(), 16);
    assert_eq!(pool.capacity(), 16);
}

#[test]
fn test_clicks_never_exceed_capacity() {
    let mut config = EngineConfig::floating_hearts();
    config.capacity = 5;
    config.particle_count = 5;
    config.seed = Some(9);
    let mut sim = Simulation::new(config).unwrap();
    for k in 0..3 {
        sim.push_event(InputEvent::PointerDown {
            x: 100.0 + k as f32,
            y: 300.0,
        });
        sim.push_event(InputEvent::PointerUp { x: 100.0, y: 300.0 });
    }
    sim.tick();
    assert_eq!(sim.pool().live_count(), 5);
    assert_eq!(sim.pool().capacity(), 5);
}

#[test]
fn test_resize_mid_animation() {
    let mut sim = Simulation::new(love_config()).unwrap();
    for _ in 0..300 {
        sim.tick();
    }
    let before = sim.targets().generation();

    sim.push_event(InputEvent::Resize {
        width: 400,
        height: 600,
    });
    sim.tick();

    let targets = sim.targets();
    assert!(targets.generation() > before);
    assert!(!targets.is_empty());
    assert!(targets.all_within(400.0, 600.0));

    for (_, p) in sim.pool().iter_live() {
        if let Some(i) = p.target {
            assert_eq!(p.target_generation, targets.generation());
            assert!(i < targets.len());
        }
    }
}

#[test]
fn test_resize_to_nothing_drops_targets() {
    let mut sim = Simulation::new(love_config()).unwrap();
    for _ in 0..300 {
        sim.tick();
    }
    sim.resize(0, 0);
    assert!(sim.targets().is_empty());
    sim.tick();
    assert_eq!(sim.pool().count_phase(Phase::Assemble), 0);
    assert_eq!(sim.pool().count_phase(Phase::Burn), 0);
}

#[test]
fn test_zero_gravity_fall() {
    let mut config = EngineConfig::default();
    config.physics = PhysicsConfig {
        gravity: 0.0,
        ..PhysicsConfig::default()
    };
    let targets = TargetSet::empty(1);
    let ctx = StepContext::new(&config, &targets, 1.0 / 60.0, 0.0);
    let mut rng = SmallRng::seed_from_u64(1);

    let mut pool = ParticlePool::new(1, 1, 0);
    let slot = pool
        .spawn(Phase::Fall, Vec3::new(100.0, 50.0, 0.0), 0, |p| {
            p.velocity = Vec3::new(0.0, 2.0, 0.0);
        })
        .unwrap();
    let p = pool.get_mut(slot).unwrap();

    for _ in 0..100 {
        lifecycle::step(p, &ctx, &mut rng);
        assert_eq!(p.phase, Phase::Fall);
        assert_eq!(p.velocity.y, 2.0);
    }
    assert!((p.position.y - 250.0).abs() < 1e-3);
}

#[test]
fn test_every_preset_renders() {
    for name in reverie::config::PRESET_NAMES {
        let mut config = EngineConfig::preset(name).unwrap();
        config.canvas = CanvasSize::new(160, 120);
        config.seed = Some(5);
        let mut sim = Simulation::new(config).unwrap();
        let mut surface = RecordingSurface::new(160, 120);
        for _ in 0..120 {
            assert!(sim.frame(&mut surface));
            assert!(surface.is_balanced(), "{}", name);
        }
    }
}

#[test]
fn test_raster_frame_is_not_blank() {
    let mut config = EngineConfig::photo_sphere();
    config.canvas = CanvasSize::new(120, 120);
    config.seed = Some(3);
    let background = config.visuals.background;
    let mut sim = Simulation::new(config).unwrap();
    let mut surface = RasterSurface::new(120, 120, background);
    for _ in 0..90 {
        sim.frame(&mut surface);
    }
    let lit = (0..120)
        .flat_map(|y| (0..120).map(move |x| (x, y)))
        .filter(|&(x, y)| surface.pixel(x, y).map_or(false, |p| p.w > 0.05))
        .count();
    assert!(lit > 50, "only {} lit pixels", lit);
}
