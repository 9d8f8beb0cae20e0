//! Engine configuration.
//!
//! [`EngineConfig`] is plain data: every number the simulation uses lives
//! here, including the lifecycle transition thresholds. Configurations
//! serialize to JSON so a host page (or the `reverie` binary) can load them
//! from a file:
//!
//! ```ignore
//! let config = EngineConfig::load("love.json")?;
//! let mut sim = Simulation::new(config)?;
//! ```
//!
//! Presets cover the built-in effects; see [`EngineConfig::preset`].
//!
//! Physics values are expressed per tick (one tick per displayed frame) in
//! pixels for 2D scenes and world units for 3D scenes.

use crate::error::ConfigError;
use crate::sampler::ShapeSource;
use crate::visuals::{BlendMode, Palette, ParticleShape, TrailMode, VisualConfig};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Names accepted by [`EngineConfig::preset`].
pub const PRESET_NAMES: [&str; 6] = [
    "text_fireworks",
    "heart_fireworks",
    "floating_hearts",
    "ripple_pond",
    "photo_sphere",
    "heart_3d",
];

/// Drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Which spawning policy drives the particles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Shells launch, explode, the sparks fall and assemble onto the target
    /// shape, then burn in place.
    #[default]
    Fireworks,
    /// Particles start scattered and assemble straight onto the target shape.
    Bloom,
    /// Hearts rise from the bottom edge, swaying and fading.
    FloatingHearts,
    /// Heart-outline ripples open at random sites on a pond.
    RipplePond,
}

/// Forces and integration limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration added to `velocity.y` each tick.
    pub gravity: f32,
    /// Fraction of velocity removed each tick while exploding.
    pub drag: f32,
    /// Upper bound on speed for every phase.
    pub max_speed: f32,
    /// Upper bound on downward speed while falling.
    pub terminal_velocity: f32,
    /// Initial launch speed. `0` derives it from gravity and the apex height.
    pub launch_speed: f32,
    /// Peak outward speed of explosion sparks.
    pub explosion_force: f32,
    /// Fraction of the remaining distance covered per tick while assembling.
    pub steer_factor: f32,
    /// Burn flicker amplitude.
    pub turbulence: f32,
    /// Flicker amplitude never exceeds this multiple of particle size.
    pub turbulence_size_multiple: f32,
    /// Horizontal sway acceleration for drifting particles.
    pub sway: f32,
    /// Upward speed of drifting particles.
    pub rise_speed: f32,
    /// Radius growth per tick for ripples.
    pub ripple_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.12,
            drag: 0.04,
            max_speed: 24.0,
            terminal_velocity: 5.0,
            launch_speed: 0.0,
            explosion_force: 6.0,
            steer_factor: 0.08,
            turbulence: 1.2,
            turbulence_size_multiple: 3.0,
            sway: 0.05,
            rise_speed: 1.2,
            ripple_speed: 0.9,
        }
    }
}

/// Lifecycle transition thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A shell explodes once its upward speed drops below this.
    pub apex_velocity: f32,
    /// Explosion sparks start falling once slower than this.
    pub settle_speed: f32,
    /// Hard cap on ticks spent exploding.
    pub explode_max_ticks: u32,
    /// Assembling particles start burning within this distance of the target.
    pub assemble_epsilon: f32,
    /// Vertical margin around the target bounding box that captures falling
    /// particles.
    pub target_band: f32,
    /// Horizontal reach when looking for a target near a falling particle.
    pub capture_radius: f32,
    /// Distance beyond the canvas edges at which particles are recycled.
    pub offscreen_margin: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            apex_velocity: 1.0,
            settle_speed: 1.5,
            explode_max_ticks: 90,
            assemble_epsilon: 1.0,
            target_band: 40.0,
            capture_radius: 60.0,
            offscreen_margin: 40.0,
        }
    }
}

/// Particle size, opacity and color behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub min_size: f32,
    pub max_size: f32,
    /// Multiplier applied to alpha each tick while exploding.
    pub explode_fade: f32,
    /// Alpha gained per tick while assembling.
    pub assemble_alpha_rate: f32,
    /// Lower bound of the burn flicker.
    pub burn_alpha_min: f32,
    /// Seconds a particle burns before decaying. `0` burns until reset.
    pub burn_hold: f32,
    /// Alpha lost per tick while decaying.
    pub decay_rate: f32,
    /// Hue rotation in degrees per second.
    pub hue_drift: f32,
    /// Random hue jitter (degrees) applied at spawn.
    pub hue_jitter: f32,
    /// Lifetime in seconds of drifting particles and ripples.
    pub lifetime: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            min_size: 1.2,
            max_size: 2.4,
            explode_fade: 0.992,
            assemble_alpha_rate: 0.05,
            burn_alpha_min: 0.55,
            burn_hold: 0.0,
            decay_rate: 0.02,
            hue_drift: 0.0,
            hue_jitter: 8.0,
            lifetime: 6.0,
        }
    }
}

/// Target text and how it is sampled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub text: String,
    /// Fraction of the canvas width the text may occupy.
    pub width_fraction: f32,
    /// Starting font size as a fraction of canvas height.
    pub max_height_fraction: f32,
    /// Desired number of sampled points.
    pub point_budget: u32,
    /// Budget used below `mobile_breakpoint`.
    pub mobile_point_budget: u32,
    /// Canvas widths below this count as a constrained viewport.
    pub mobile_breakpoint: u32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// Raster coverage (0-255) above which a pixel becomes a point.
    pub alpha_threshold: u8,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            text: "LOVE".into(),
            width_fraction: 0.8,
            max_height_fraction: 0.35,
            point_budget: 1500,
            mobile_point_budget: 700,
            mobile_breakpoint: 600,
            min_gap: 2.0,
            max_gap: 6.0,
            alpha_threshold: 128,
        }
    }
}

/// Orbit camera for 3D scenes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Whether to project through the perspective camera.
    pub perspective: bool,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    /// Focal length as a fraction of the smaller canvas dimension.
    pub focal_length: f32,
    /// Yaw rotation in radians per second.
    pub auto_rotate: f32,
    /// Radians of orbit per dragged pixel.
    pub drag_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            perspective: false,
            yaw: 0.0,
            pitch: 0.25,
            distance: 3.5,
            focal_length: 0.9,
            auto_rotate: 0.0,
            drag_sensitivity: 0.01,
        }
    }
}

/// Scene pacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub kind: SceneKind,
    /// Ticks between automatic shell launches (0 = only on click).
    pub launch_interval: u32,
    /// Sparks per exploding shell, including the shell itself.
    pub sparks_per_shell: u32,
    /// Ambient spawns per second for drifting hearts and ripples.
    pub emit_rate: f32,
    /// Particles spawned per pointer click.
    pub click_burst: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            kind: SceneKind::Fireworks,
            launch_interval: 8,
            sparks_per_shell: 80,
            emit_rate: 6.0,
            click_burst: 12,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    pub canvas: CanvasSize,
    /// Pre-allocated pool size; never exceeded.
    pub capacity: u32,
    /// Active subset of the pool.
    pub particle_count: u32,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub scene: SceneConfig,
    pub shape: ShapeSource,
    pub physics: PhysicsConfig,
    pub thresholds: Thresholds,
    pub appearance: Appearance,
    pub text: TextConfig,
    pub camera: CameraConfig,
    pub visuals: VisualConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".into(),
            canvas: CanvasSize::default(),
            capacity: 2000,
            particle_count: 2000,
            seed: None,
            scene: SceneConfig::default(),
            shape: ShapeSource::Text,
            physics: PhysicsConfig::default(),
            thresholds: Thresholds::default(),
            appearance: Appearance::default(),
            text: TextConfig::default(),
            camera: CameraConfig::default(),
            visuals: VisualConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of particles actually simulated.
    pub fn active_count(&self) -> usize {
        self.particle_count.min(self.capacity) as usize
    }

    /// Check that every value is usable.
    ///
    /// `particle_count` above `capacity` is not an error: the pool clamps it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        finite("physics.gravity", p.gravity)?;
        fraction("physics.drag", p.drag)?;
        positive("physics.max_speed", p.max_speed)?;
        positive("physics.terminal_velocity", p.terminal_velocity)?;
        non_negative("physics.launch_speed", p.launch_speed)?;
        non_negative("physics.explosion_force", p.explosion_force)?;
        if !(p.steer_factor > 0.0 && p.steer_factor <= 1.0) {
            return Err(ConfigError::invalid(
                "physics.steer_factor",
                format!("must be in (0, 1], got {}", p.steer_factor),
            ));
        }
        non_negative("physics.turbulence", p.turbulence)?;
        non_negative("physics.turbulence_size_multiple", p.turbulence_size_multiple)?;
        non_negative("physics.sway", p.sway)?;
        finite("physics.rise_speed", p.rise_speed)?;
        non_negative("physics.ripple_speed", p.ripple_speed)?;

        let t = &self.thresholds;
        non_negative("thresholds.apex_velocity", t.apex_velocity)?;
        positive("thresholds.settle_speed", t.settle_speed)?;
        positive("thresholds.assemble_epsilon", t.assemble_epsilon)?;
        non_negative("thresholds.target_band", t.target_band)?;
        positive("thresholds.capture_radius", t.capture_radius)?;
        non_negative("thresholds.offscreen_margin", t.offscreen_margin)?;

        let a = &self.appearance;
        non_negative("appearance.min_size", a.min_size)?;
        non_negative("appearance.max_size", a.max_size)?;
        if a.min_size > a.max_size {
            return Err(ConfigError::invalid(
                "appearance.min_size",
                format!("{} exceeds max_size {}", a.min_size, a.max_size),
            ));
        }
        unit("appearance.explode_fade", a.explode_fade)?;
        non_negative("appearance.assemble_alpha_rate", a.assemble_alpha_rate)?;
        unit("appearance.burn_alpha_min", a.burn_alpha_min)?;
        non_negative("appearance.burn_hold", a.burn_hold)?;
        positive("appearance.decay_rate", a.decay_rate)?;
        finite("appearance.hue_drift", a.hue_drift)?;
        non_negative("appearance.hue_jitter", a.hue_jitter)?;
        positive("appearance.lifetime", a.lifetime)?;

        let x = &self.text;
        if !(x.width_fraction > 0.0 && x.width_fraction <= 1.0) {
            return Err(ConfigError::invalid(
                "text.width_fraction",
                format!("must be in (0, 1], got {}", x.width_fraction),
            ));
        }
        positive("text.max_height_fraction", x.max_height_fraction)?;
        positive("text.min_gap", x.min_gap)?;
        positive("text.max_gap", x.max_gap)?;
        if x.min_gap > x.max_gap {
            return Err(ConfigError::invalid(
                "text.min_gap",
                format!("{} exceeds max_gap {}", x.min_gap, x.max_gap),
            ));
        }

        let c = &self.camera;
        finite("camera.yaw", c.yaw)?;
        finite("camera.pitch", c.pitch)?;
        positive("camera.distance", c.distance)?;
        positive("camera.focal_length", c.focal_length)?;
        finite("camera.auto_rotate", c.auto_rotate)?;
        finite("camera.drag_sensitivity", c.drag_sensitivity)?;

        let v = &self.visuals;
        if v.trail_mode == TrailMode::Accumulate && !(v.fade_alpha > 0.0 && v.fade_alpha <= 1.0) {
            return Err(ConfigError::invalid(
                "visuals.fade_alpha",
                format!("must be in (0, 1] so old frames fade out, got {}", v.fade_alpha),
            ));
        }
        non_negative("visuals.glow_intensity", v.glow_intensity)?;
        unit("visuals.glow_alpha", v.glow_alpha)?;
        non_negative("visuals.line_width", v.line_width)?;

        self.shape.validate()?;
        Ok(())
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Look up a preset by name. See [`PRESET_NAMES`].
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "text_fireworks" => Some(Self::text_fireworks("LOVE")),
            "heart_fireworks" => Some(Self::heart_fireworks()),
            "floating_hearts" => Some(Self::floating_hearts()),
            "ripple_pond" => Some(Self::ripple_pond()),
            "photo_sphere" => Some(Self::photo_sphere()),
            "heart_3d" => Some(Self::heart_3d()),
            _ => None,
        }
    }

    /// Fireworks whose sparks fall into the shape of `text` and burn there.
    pub fn text_fireworks(text: &str) -> Self {
        let mut config = Self {
            name: "Text Fireworks".into(),
            shape: ShapeSource::Text,
            ..Default::default()
        };
        config.text.text = text.into();
        config.visuals.palette = Palette::Fire;
        config.appearance.hue_drift = 6.0;
        config
    }

    /// Fireworks assembling into a parametric heart.
    pub fn heart_fireworks() -> Self {
        let mut config = Self {
            name: "Heart Fireworks".into(),
            shape: ShapeSource::Heart {
                samples: 900,
                scale: 0.6,
            },
            ..Default::default()
        };
        config.visuals.palette = Palette::Rose;
        config.visuals.shape = ParticleShape::Circle;
        config
    }

    /// Hearts floating up from the bottom of the screen.
    pub fn floating_hearts() -> Self {
        let mut config = Self {
            name: "Floating Hearts".into(),
            capacity: 300,
            particle_count: 120,
            shape: ShapeSource::None,
            ..Default::default()
        };
        config.scene.kind = SceneKind::FloatingHearts;
        config.scene.emit_rate = 4.0;
        config.appearance.min_size = 6.0;
        config.appearance.max_size = 16.0;
        config.appearance.lifetime = 9.0;
        config.visuals.shape = ParticleShape::Heart;
        config.visuals.palette = Palette::Blush;
        config.visuals.blend_mode = BlendMode::Alpha;
        config.visuals.trail_length = 0;
        config.visuals.glow_intensity = 1.6;
        config.visuals.background = Vec3::new(0.12, 0.03, 0.08);
        config
    }

    /// Heart-shaped ripples opening on dark water.
    pub fn ripple_pond() -> Self {
        let mut config = Self {
            name: "Ripple Pond".into(),
            capacity: 64,
            particle_count: 48,
            shape: ShapeSource::Scatter {
                count: 48,
                radius: 0.42,
            },
            ..Default::default()
        };
        config.scene.kind = SceneKind::RipplePond;
        config.scene.emit_rate = 1.5;
        config.scene.click_burst = 1;
        config.appearance.min_size = 4.0;
        config.appearance.max_size = 8.0;
        config.appearance.lifetime = 3.5;
        config.visuals.shape = ParticleShape::Ring;
        config.visuals.palette = Palette::Ocean;
        config.visuals.blend_mode = BlendMode::Alpha;
        config.visuals.trail_length = 0;
        config.visuals.glow_intensity = 0.0;
        config.visuals.background = Vec3::new(0.01, 0.05, 0.09);
        config
    }

    /// A slowly spinning sphere of glowing points.
    pub fn photo_sphere() -> Self {
        let mut config = Self::bloom_3d("Photo Sphere");
        config.shape = ShapeSource::Sphere {
            count: 1200,
            radius: 1.0,
        };
        config.visuals.palette = Palette::Lavender;
        config
    }

    /// A volumetric heart built from stacked heart-curve slices.
    pub fn heart_3d() -> Self {
        let mut config = Self::bloom_3d("3D Heart");
        config.shape = ShapeSource::Heart3d {
            layers: 24,
            samples: 64,
            radius: 1.0,
        };
        config.visuals.palette = Palette::Rose;
        config
    }

    fn bloom_3d(name: &str) -> Self {
        let mut config = Self {
            name: name.into(),
            capacity: 1600,
            particle_count: 1600,
            ..Default::default()
        };
        config.scene.kind = SceneKind::Bloom;
        config.camera.perspective = true;
        config.camera.auto_rotate = 0.35;
        config.physics.steer_factor = 0.04;
        config.physics.turbulence = 0.015;
        config.thresholds.assemble_epsilon = 0.01;
        config.appearance.min_size = 1.0;
        config.appearance.max_size = 2.2;
        config.visuals.trail_length = 0;
        config.visuals.trail_mode = TrailMode::Accumulate;
        config.visuals.fade_alpha = 0.35;
        config
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("must be >= 0, got {}", value)));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be > 0, got {}", value)));
    }
    Ok(())
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(field, format!("must be in [0, 1], got {}", value)));
    }
    Ok(())
}

fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..1.0).contains(&value) {
        return Err(ConfigError::invalid(field, format!("must be in [0, 1), got {}", value)));
    }
    Ok(())
}
