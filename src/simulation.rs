//! Simulation runner.
//!
//! [`Simulation`] owns every piece of per-frame state and runs the tick
//! sequence:
//!
//! 1. drain queued input (resizes apply immediately, pointer events go to the
//!    scene),
//! 2. ambient scene spawning,
//! 3. one lifecycle step per live particle,
//! 4. lifecycle events (shell bursts) spawn their sparks,
//! 5. camera auto-rotation.
//!
//! Rendering is separate so a host can tick at one rate and draw at another;
//! [`Simulation::frame`] does both and reports whether to schedule another.
//!
//! Everything runs on the caller's thread. Nothing here blocks or sleeps.

use crate::camera::Projector;
use crate::config::{CanvasSize, EngineConfig};
use crate::error::ConfigError;
use crate::input::{Input, InputEvent, Pointer};
use crate::lifecycle::{self, LifecycleEvent, StepContext};
use crate::pool::ParticlePool;
use crate::render::{instances, Renderer, SpriteInstance, Surface};
use crate::sampler::font::GlyphRasterizer;
use crate::sampler::{ShapeSampler, TargetSet};
use crate::scene::{Director, SceneEnv};
use crate::time::Time;
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// A running particle effect.
///
/// ```ignore
/// let mut sim = Simulation::new(EngineConfig::text_fireworks("LOVE"))?;
/// let mut surface = RasterSurface::new(800, 600, sim.config().visuals.background);
/// while sim.frame(&mut surface) {
///     present(&surface);
/// }
/// ```
pub struct Simulation {
    config: EngineConfig,
    pool: ParticlePool,
    sampler: ShapeSampler,
    targets: TargetSet,
    projector: Projector,
    renderer: Renderer,
    rng: SmallRng,
    time: Time,
    input: Input,
    director: Director,
    events: Vec<LifecycleEvent>,
    tick: u64,
    running: bool,
}

impl Simulation {
    /// Validate `config`, allocate the pool and sample the initial targets.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.particle_count > config.capacity {
            log::warn!(
                "particle_count {} exceeds capacity {}, clamping",
                config.particle_count,
                config.capacity
            );
        }

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let pool = ParticlePool::new(
            config.capacity as usize,
            config.active_count(),
            config.visuals.trail_length as usize,
        );
        let projector = Projector::from_config(&config.camera, config.canvas);
        let director = Director::new(&config);

        let mut sim = Self {
            pool,
            sampler: ShapeSampler::new(),
            targets: TargetSet::empty(0),
            projector,
            renderer: Renderer::new(),
            rng,
            time: Time::new(),
            input: Input::new(),
            director,
            events: Vec::new(),
            tick: 0,
            running: true,
            config,
        };
        sim.resample();

        log::info!(
            "Simulation '{}': {} of {} particles, {:?} scene, {} targets",
            sim.config.name,
            sim.pool.active_limit(),
            sim.pool.capacity(),
            sim.director.kind(),
            sim.targets.len()
        );
        Ok(sim)
    }

    /// Use a different glyph rasterizer for text shapes.
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        self.sampler.set_rasterizer(rasterizer);
        self.resample();
        self
    }

    /// Queue an input event for the next tick.
    pub fn push_event(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Apply a new canvas size now: re-sample targets, recalibrate the
    /// projector and re-seek every particle holding an old target.
    pub fn resize(&mut self, width: u32, height: u32) {
        let canvas = CanvasSize::new(width, height);
        if canvas == self.config.canvas {
            return;
        }
        self.config.canvas = canvas;
        self.projector.resize(canvas);
        self.resample();
        log::info!(
            "Resized to {}x{}, {} targets",
            width,
            height,
            self.targets.len()
        );
    }

    /// Replace the configuration.
    ///
    /// The pool capacity is fixed at construction; a different capacity is
    /// clamped back with a warning. Targets are re-sampled only when the
    /// shape, text or canvas changed.
    pub fn set_config(&mut self, mut config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let capacity = self.pool.capacity() as u32;
        if config.capacity != capacity {
            log::warn!(
                "capacity is fixed at {}, ignoring {}",
                capacity,
                config.capacity
            );
            config.capacity = capacity;
        }
        if config.particle_count > config.capacity {
            log::warn!(
                "particle_count {} exceeds capacity {}, clamping",
                config.particle_count,
                config.capacity
            );
        }

        let resample = config.shape != self.config.shape
            || config.text != self.config.text
            || config.canvas != self.config.canvas
            || config.thresholds.capture_radius != self.config.thresholds.capture_radius;
        let camera_changed = config.camera != self.config.camera;

        self.pool.set_active_limit(config.active_count());
        self.pool
            .set_trail_length(config.visuals.trail_length as usize);
        self.director.reconfigure(&config);
        if camera_changed {
            self.projector = Projector::from_config(&config.camera, config.canvas);
        } else if config.canvas != self.config.canvas {
            self.projector.resize(config.canvas);
        }

        self.config = config;
        if resample {
            self.resample();
        }
        log::debug!("Configuration '{}' applied", self.config.name);
        Ok(())
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        // Resizes apply even while paused so the next frame is laid out
        // for the new canvas.
        let pending = self.input.drain();
        let mut pointers = Vec::new();
        for event in pending {
            match event {
                InputEvent::Resize { width, height } => self.resize(width, height),
                other => pointers.extend(self.input.apply(&other)),
            }
        }

        let (elapsed, dt) = self.time.update();
        let paused = dt <= 0.0;
        let fps = self.time.fps();

        let Self {
            config,
            pool,
            targets,
            projector,
            rng,
            director,
            events,
            tick,
            ..
        } = self;

        let mut env = SceneEnv {
            config,
            pool: &mut *pool,
            targets,
            rng: &mut *rng,
            camera: &mut projector.camera,
            tick: *tick,
            dt,
        };
        for pointer in pointers {
            // Paused: the camera can still be dragged, clicks spawn nothing
            if paused && !matches!(pointer, Pointer::Move { .. }) {
                continue;
            }
            director.pointer(pointer, &mut env);
        }
        if paused {
            return;
        }

        director.update(&mut env);

        let ctx = StepContext::new(config, targets, dt, elapsed);
        for p in env.pool.active_mut() {
            if !p.is_alive() {
                continue;
            }
            if let Some(event) = lifecycle::step(p, &ctx, env.rng) {
                events.push(event);
            }
        }

        for event in events.drain(..) {
            match event {
                LifecycleEvent::Burst { origin, color } => director.burst(origin, color, &mut env),
            }
        }

        let spin = config.camera.auto_rotate;
        if projector.is_perspective() && spin != 0.0 {
            projector.camera.orbit(Vec2::new(spin * dt, 0.0));
        }

        *tick += 1;
        if *tick % 600 == 0 {
            log::debug!(
                "tick {}: {} live, {:.0} fps",
                tick,
                pool.live_count(),
                fps
            );
        }
    }

    /// Draw the current state. Returns the number of particles drawn.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) -> usize {
        self.renderer
            .draw(&self.pool, &self.projector, &self.config.visuals, surface)
    }

    /// Tick and render one frame.
    ///
    /// Returns `false` once [`stop`](Self::stop) has been called; the host
    /// should then stop scheduling frames.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        self.render(surface);
        true
    }

    /// Stop the animation. Later ticks and frames do nothing.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Simulation '{}' stopped at tick {}", self.config.name, self.tick);
        }
        self.running = false;
    }

    /// Kill every particle and rewind the clock, keeping configuration and
    /// targets.
    pub fn restart(&mut self) {
        self.pool.kill_all();
        self.events.clear();
        self.time.reset();
        self.director.reset();
        self.tick = 0;
        self.running = true;
    }

    /// Sprite instances for GPU hosts, in painter's order.
    pub fn instances(&self) -> Vec<SpriteInstance> {
        instances::build(&self.pool, &self.projector)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn projector_mut(&mut self) -> &mut Projector {
        &mut self.projector
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    /// Ticks run so far, not counting paused ones.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn resample(&mut self) {
        self.targets = self.sampler.sample(
            &self.config.shape,
            &self.config.text,
            self.config.canvas,
            self.config.thresholds.capture_radius,
            &mut self.rng,
        );
        let moved = self.pool.retarget(&self.targets);
        log::debug!(
            "Target set {} has {} points, {} particles re-seeked",
            self.targets.generation(),
            self.targets.len(),
            moved
        );
    }
}
