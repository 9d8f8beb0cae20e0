//! Scene spawning policies.
//!
//! The [`Director`] is the only thing that puts new particles into the pool.
//! It runs at three points in a tick:
//!
//! - [`Director::pointer`] for each queued pointer event,
//! - [`Director::update`] for ambient spawning (shell launches, rising
//!   hearts, ripples, bloom batches),
//! - [`Director::burst`] for each [`LifecycleEvent::Burst`] drained after the
//!   particle loop.
//!
//! Every spawn goes through [`ParticlePool::spawn`], so a full pool silently
//! drops requests instead of growing.
//!
//! [`LifecycleEvent::Burst`]: crate::lifecycle::LifecycleEvent::Burst

use crate::camera::Camera;
use crate::config::{EngineConfig, SceneKind};
use crate::emitter::{Emitter, RateClock};
use crate::input::Pointer;
use crate::lifecycle;
use crate::particle::{Particle, Phase};
use crate::physics;
use crate::pool::ParticlePool;
use crate::sampler::TargetSet;
use crate::spawn::SpawnContext;
use crate::visuals::Hsl;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;

/// Sideways speed jitter given to launching shells.
const SHELL_DRIFT: f32 = 0.4;
/// Initial speed of hearts in a click burst.
const HEART_BURST_SPEED: f32 = 2.5;
/// Fraction of the active pool a bloom spawns per tick.
const BLOOM_BATCH_FRACTION: usize = 40;

/// Everything a spawning policy may touch during one tick.
pub struct SceneEnv<'a> {
    pub config: &'a EngineConfig,
    pub pool: &'a mut ParticlePool,
    pub targets: &'a TargetSet,
    pub rng: &'a mut SmallRng,
    pub camera: &'a mut Camera,
    pub tick: u64,
    /// Seconds covered by this tick.
    pub dt: f32,
}

/// Spawning state for the configured [`SceneKind`].
#[derive(Debug, Clone)]
pub struct Director {
    kind: SceneKind,
    clock: RateClock,
}

impl Director {
    pub fn new(config: &EngineConfig) -> Self {
        let kind = effective_kind(config);
        if kind != config.scene.kind {
            log::info!(
                "{:?} scene with a volumetric shape runs as {:?}",
                config.scene.kind,
                kind
            );
        }
        Self {
            kind,
            clock: RateClock::new(config.scene.emit_rate),
        }
    }

    /// The policy actually running.
    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    /// Pick up a changed configuration, keeping the rate carry.
    pub fn reconfigure(&mut self, config: &EngineConfig) {
        self.kind = effective_kind(config);
        self.clock.rate = config.scene.emit_rate;
    }

    pub fn reset(&mut self) {
        self.clock.reset();
    }

    /// Ambient spawning for one tick.
    pub fn update(&mut self, env: &mut SceneEnv) {
        match self.kind {
            SceneKind::Fireworks => {
                let interval = env.config.scene.launch_interval as u64;
                if interval > 0 && env.tick % interval == 0 {
                    let (x, apex) = auto_launch_site(env);
                    launch_shell(env, x, apex);
                }
            }
            SceneKind::Bloom => bloom(env),
            SceneKind::FloatingHearts => {
                for _ in 0..self.clock.tick(env.dt) {
                    rising_heart(env);
                }
            }
            SceneKind::RipplePond => {
                for _ in 0..self.clock.tick(env.dt) {
                    let site = ripple_site(env);
                    spawn_ripple(env, site, 1.0);
                }
            }
        }
    }

    /// React to a resolved pointer event.
    pub fn pointer(&mut self, pointer: Pointer, env: &mut SceneEnv) {
        match pointer {
            Pointer::Down(at) => match self.kind {
                SceneKind::Fireworks => launch_shell(env, at.x, at.y),
                SceneKind::FloatingHearts => heart_burst(env, at),
                SceneKind::RipplePond => {
                    let n = env.config.scene.click_burst.max(1);
                    for k in 0..n {
                        spawn_ripple(env, at, 1.0 - 0.15 * k as f32);
                    }
                }
                SceneKind::Bloom => {}
            },
            Pointer::Move {
                delta, held: true, ..
            } if env.config.camera.perspective => {
                env.camera
                    .orbit(delta * env.config.camera.drag_sensitivity);
            }
            _ => {}
        }
    }

    /// Spawn the sparks of an exploded shell.
    ///
    /// The shell itself counts as one spark, so `sparks_per_shell - 1` new
    /// particles are spawned.
    pub fn burst(&mut self, origin: Vec3, color: Hsl, env: &mut SceneEnv) {
        let config = env.config;
        let sparks = config.scene.sparks_per_shell.saturating_sub(1);
        let mut ctx = SpawnContext::new(&mut *env.rng);
        for _ in 0..sparks {
            let spawned = env.pool.spawn(Phase::Explode, origin, env.tick, |p| {
                dress(p, &mut ctx, config);
                p.color = ctx.jitter_hue(color, config.appearance.hue_jitter);
                lifecycle::ignite(p, config.physics.explosion_force, &mut ctx);
            });
            if spawned.is_none() {
                break;
            }
        }
    }
}

/// Fireworks need a flat target space to fall into; volumetric shapes bloom.
fn effective_kind(config: &EngineConfig) -> SceneKind {
    match config.scene.kind {
        SceneKind::Fireworks if config.shape.is_volumetric() => SceneKind::Bloom,
        kind => kind,
    }
}

/// Common appearance for a freshly spawned particle.
fn dress(p: &mut Particle, ctx: &mut SpawnContext, config: &EngineConfig) {
    let a = &config.appearance;
    p.set_size(ctx.size(a.min_size, a.max_size));
    p.color = ctx.palette_color(config.visuals.palette, a.hue_jitter);
    p.hue_drift = a.hue_drift;
    p.noise_phase = ctx.noise_phase();
    p.shape = config.visuals.shape;
}

// =============================================================================
// FIREWORKS
// =============================================================================

/// Horizontal launch position and apex height for an automatic shell.
///
/// Shells burst above the capture band so their sparks fall through it.
fn auto_launch_site(env: &mut SceneEnv) -> (f32, f32) {
    let canvas = env.config.canvas;
    let (w, h) = (canvas.width as f32, canvas.height as f32);
    let mut ctx = SpawnContext::new(&mut *env.rng);

    match env.targets.bounds() {
        Some((min, max)) => {
            let x = ctx.random_range(min.x, max.x.max(min.x + 1.0));
            let band_top = min.y - env.config.thresholds.target_band;
            let apex = band_top - ctx.random_range(0.0, h * 0.15);
            (x, apex.max(h * 0.05))
        }
        None => (
            ctx.random_range(w * 0.15, w * 0.85),
            ctx.random_range(h * 0.1, h * 0.4),
        ),
    }
}

/// Launch a shell from the bottom edge at `x` so it peaks near `apex_y`.
fn launch_shell(env: &mut SceneEnv, x: f32, apex_y: f32) {
    let config = env.config;
    let phys = &config.physics;
    let origin = Vec3::new(x, config.canvas.height as f32, 0.0);

    let speed = if phys.launch_speed > 0.0 {
        phys.launch_speed
    } else {
        match physics::launch_speed(phys.gravity, origin.y - apex_y) {
            s if s > 0.0 => s,
            _ => phys.max_speed * 0.5,
        }
    };

    let mut ctx = SpawnContext::new(&mut *env.rng);
    let drift = ctx.random_range(-SHELL_DRIFT, SHELL_DRIFT);
    let slot = env.pool.spawn(Phase::Launch, origin, env.tick, |p| {
        dress(p, &mut ctx, config);
        p.velocity = Vec3::new(drift, -speed, 0.0);
    });
    if slot.is_some() {
        log::trace!("Shell launched at x={:.0}, speed {:.2}", x, speed);
    }
}

// =============================================================================
// BLOOM
// =============================================================================

/// Scatter a batch of particles that steer straight onto random targets.
fn bloom(env: &mut SceneEnv) {
    let targets = env.targets;
    if targets.is_empty() {
        return;
    }
    let config = env.config;
    let volumetric = config.shape.is_volumetric();
    let span = targets
        .bounds()
        .map(|(min, max)| min.abs().max(max.abs()).max_element())
        .filter(|s| *s > 0.0)
        .unwrap_or(1.0);
    let (w, h) = (config.canvas.width as f32, config.canvas.height as f32);
    let batch = (env.pool.active_limit() / BLOOM_BATCH_FRACTION).max(1);

    let mut ctx = SpawnContext::new(&mut *env.rng);
    for _ in 0..batch {
        let Some(index) = ctx.random_index(targets.len()) else {
            return;
        };
        let origin = if volumetric {
            ctx.random_in_sphere(span * 1.5)
        } else {
            Vec3::new(ctx.random_range(0.0, w), ctx.random_range(0.0, h), 0.0)
        };
        let spawned = env.pool.spawn(Phase::Assemble, origin, env.tick, |p| {
            dress(p, &mut ctx, config);
            p.alpha = 0.0;
            p.target = Some(index);
            p.target_generation = targets.generation();
        });
        if spawned.is_none() {
            return;
        }
    }
}

// =============================================================================
// FLOATING HEARTS
// =============================================================================

fn rising_heart(env: &mut SceneEnv) {
    let config = env.config;
    let (w, h) = (config.canvas.width as f32, config.canvas.height as f32);
    let y = h + config.thresholds.offscreen_margin * 0.5;
    let emitter = Emitter::Line {
        start: Vec3::new(0.0, y, 0.0),
        end: Vec3::new(w, y, 0.0),
        velocity: Vec3::new(0.0, -config.physics.rise_speed, 0.0),
    };
    spawn_drift(env, &emitter);
}

fn heart_burst(env: &mut SceneEnv, at: Vec2) {
    let emitter = Emitter::Burst {
        position: at.extend(0.0),
        count: env.config.scene.click_burst,
        speed: HEART_BURST_SPEED,
    };
    for _ in 0..emitter.count() {
        if !spawn_drift(env, &emitter) {
            break;
        }
    }
}

/// Spawn one drifting heart from `emitter`. Returns `false` when the pool is
/// full.
fn spawn_drift(env: &mut SceneEnv, emitter: &Emitter) -> bool {
    let config = env.config;
    let mut ctx = SpawnContext::new(&mut *env.rng);
    let (position, velocity) = emitter.sample(&mut ctx);
    let lifetime = config.appearance.lifetime * ctx.random_range(0.6, 1.0);
    env.pool
        .spawn(Phase::Drift, position, env.tick, |p| {
            dress(p, &mut ctx, config);
            p.velocity = velocity;
            p.lifetime = lifetime;
        })
        .is_some()
}

// =============================================================================
// RIPPLE POND
// =============================================================================

/// A random scatter site, or anywhere on the canvas without one.
fn ripple_site(env: &mut SceneEnv) -> Vec2 {
    let mut ctx = SpawnContext::new(&mut *env.rng);
    if let Some(point) = ctx
        .random_index(env.targets.len())
        .and_then(|i| env.targets.get(i))
    {
        return point.truncate();
    }
    let canvas = env.config.canvas;
    Vec2::new(
        ctx.random_range(0.0, canvas.width as f32),
        ctx.random_range(0.0, canvas.height as f32),
    )
}

/// Open a ripple at `at` living `life_scale` of the configured lifetime.
fn spawn_ripple(env: &mut SceneEnv, at: Vec2, life_scale: f32) {
    let config = env.config;
    let lifetime = config.appearance.lifetime * life_scale.max(0.1);
    let mut ctx = SpawnContext::new(&mut *env.rng);
    env.pool.spawn(Phase::Ripple, at.extend(0.0), env.tick, |p| {
        dress(p, &mut ctx, config);
        p.lifetime = lifetime;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    struct Fixture {
        config: EngineConfig,
        pool: ParticlePool,
        targets: TargetSet,
        rng: SmallRng,
        camera: Camera,
    }

    impl Fixture {
        fn new(config: EngineConfig) -> Self {
            let pool = ParticlePool::new(
                config.capacity as usize,
                config.active_count(),
                config.visuals.trail_length as usize,
            );
            Self {
                config,
                pool,
                targets: TargetSet::empty(1),
                rng: SmallRng::seed_from_u64(3),
                camera: Camera::new(),
            }
        }

        fn env(&mut self, tick: u64) -> SceneEnv<'_> {
            SceneEnv {
                config: &self.config,
                pool: &mut self.pool,
                targets: &self.targets,
                rng: &mut self.rng,
                camera: &mut self.camera,
                tick,
                dt: 1.0 / 60.0,
            }
        }
    }

    #[test]
    fn test_fireworks_launch_interval() {
        let mut config = EngineConfig::heart_fireworks();
        config.scene.launch_interval = 10;
        let mut fx = Fixture::new(config);
        let mut director = Director::new(&fx.config);
        for tick in 0..30 {
            director.update(&mut fx.env(tick));
        }
        assert_eq!(fx.pool.count_phase(Phase::Launch), 3);
        let shell = fx.pool.iter_live().next().unwrap().1;
        assert_eq!(shell.position.y, 600.0);
        assert!(shell.velocity.y < 0.0);
    }

    #[test]
    fn test_click_launches_toward_pointer() {
        let mut config = EngineConfig::heart_fireworks();
        config.scene.launch_interval = 0;
        let mut fx = Fixture::new(config);
        let mut director = Director::new(&fx.config);
        director.pointer(Pointer::Down(Vec2::new(123.0, 200.0)), &mut fx.env(0));
        let (_, shell) = fx.pool.iter_live().next().unwrap();
        assert_eq!(shell.position.x, 123.0);
        let expected = physics::launch_speed(fx.config.physics.gravity, 400.0);
        assert!((shell.velocity.y + expected).abs() < 1e-4);
    }

    #[test]
    fn test_burst_spawns_sparks() {
        let mut fx = Fixture::new(EngineConfig::heart_fireworks());
        fx.config.scene.sparks_per_shell = 25;
        let mut director = Director::new(&fx.config);
        let color = Hsl::new(10.0, 1.0, 0.5);
        director.burst(Vec3::new(400.0, 100.0, 0.0), color, &mut fx.env(5));
        assert_eq!(fx.pool.count_phase(Phase::Explode), 24);
        for (_, p) in fx.pool.iter_live() {
            assert!(p.velocity.length() <= fx.config.physics.explosion_force + 1e-4);
        }
    }

    #[test]
    fn test_burst_respects_capacity() {
        let mut fx = Fixture::new(EngineConfig::heart_fireworks());
        fx.pool.set_active_limit(10);
        let mut director = Director::new(&fx.config);
        director.burst(Vec3::ZERO, Hsl::default(), &mut fx.env(0));
        assert_eq!(fx.pool.live_count(), 10);
    }

    #[test]
    fn test_bloom_assigns_current_targets() {
        let mut fx = Fixture::new(EngineConfig::photo_sphere());
        fx.targets = TargetSet::new(vec![Vec3::X, Vec3::Y, Vec3::Z], 0.5, 7);
        let mut director = Director::new(&fx.config);
        director.update(&mut fx.env(0));
        assert!(fx.pool.live_count() > 0);
        for (_, p) in fx.pool.iter_live() {
            assert_eq!(p.phase, Phase::Assemble);
            assert_eq!(p.target_generation, 7);
            assert!(p.target.unwrap() < 3);
            assert_eq!(p.alpha, 0.0);
        }
    }

    #[test]
    fn test_volumetric_fireworks_bloom() {
        let mut config = EngineConfig::heart_3d();
        config.scene.kind = SceneKind::Fireworks;
        assert_eq!(Director::new(&config).kind(), SceneKind::Bloom);
    }

    #[test]
    fn test_floating_hearts_rate() {
        let mut fx = Fixture::new(EngineConfig::floating_hearts());
        fx.config.scene.emit_rate = 6.0;
        let mut director = Director::new(&fx.config);
        for tick in 0..61 {
            director.update(&mut fx.env(tick));
        }
        assert_eq!(fx.pool.count_phase(Phase::Drift), 6);
        for (_, p) in fx.pool.iter_live() {
            assert!(p.lifetime > 0.0);
            assert!(p.position.y > fx.config.canvas.height as f32);
        }
    }

    #[test]
    fn test_pond_click_spawns_ripples() {
        let mut fx = Fixture::new(EngineConfig::ripple_pond());
        fx.config.scene.click_burst = 3;
        let mut director = Director::new(&fx.config);
        director.pointer(Pointer::Down(Vec2::new(50.0, 60.0)), &mut fx.env(0));
        assert_eq!(fx.pool.count_phase(Phase::Ripple), 3);
        for (_, p) in fx.pool.iter_live() {
            assert_eq!(p.position, Vec3::new(50.0, 60.0, 0.0));
        }
    }

    #[test]
    fn test_drag_orbits_perspective_camera() {
        let mut fx = Fixture::new(EngineConfig::heart_3d());
        let mut director = Director::new(&fx.config);
        let yaw = fx.camera.yaw;
        let drag = Pointer::Move {
            position: Vec2::ZERO,
            delta: Vec2::new(20.0, 0.0),
            held: true,
        };
        director.pointer(drag, &mut fx.env(0));
        assert!((fx.camera.yaw - yaw - 0.2).abs() < 1e-5);

        let hover = Pointer::Move {
            position: Vec2::ZERO,
            delta: Vec2::new(20.0, 0.0),
            held: false,
        };
        director.pointer(hover, &mut fx.env(1));
        assert!((fx.camera.yaw - yaw - 0.2).abs() < 1e-5);
    }
}
