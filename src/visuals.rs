//! Visual configuration for particle rendering.
//!
//! These options control how particles look, separate from the physics and
//! lifecycle settings that control how they move.
//!
//! ```ignore
//! let mut visuals = VisualConfig::new();
//! visuals
//!     .blend_mode(BlendMode::Additive)
//!     .shape(ParticleShape::Heart)
//!     .palette(Palette::Rose)
//!     .trails(8);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pre-defined color themes.
///
/// Each theme is five color stops; particles pick a stop (with a little hue
/// jitter) when they spawn, and [`Palette::sample`] interpolates across them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Deep reds through pink to white (default).
    #[default]
    Rose,

    /// Soft pinks and peach.
    Blush,

    /// Warm golds, the classic firework shell.
    Gold,

    /// Dusk purples into orange.
    Sunset,

    /// Ember red through yellow-white, for burning text.
    Fire,

    /// Lilac and lavender.
    Lavender,

    /// Cool blues and teals, used by the pond.
    Ocean,

    /// Vibrant pink, cyan, purple.
    Neon,

    /// Full hue circle.
    Rainbow,
}

impl Palette {
    /// Get the color stops for this palette (5 colors, RGB 0.0-1.0).
    pub fn colors(&self) -> [Vec3; 5] {
        match self {
            Palette::Rose => [
                Vec3::new(0.55, 0.02, 0.10), // Wine
                Vec3::new(0.86, 0.08, 0.24), // Crimson
                Vec3::new(1.0, 0.25, 0.45),  // Rose
                Vec3::new(1.0, 0.55, 0.70),  // Pink
                Vec3::new(1.0, 0.88, 0.92),  // Petal white
            ],
            Palette::Blush => [
                Vec3::new(1.0, 0.71, 0.76),
                Vec3::new(1.0, 0.80, 0.82),
                Vec3::new(1.0, 0.85, 0.73), // Peach
                Vec3::new(0.98, 0.63, 0.70),
                Vec3::new(1.0, 0.94, 0.95),
            ],
            Palette::Gold => [
                Vec3::new(0.60, 0.35, 0.05),
                Vec3::new(0.85, 0.55, 0.10),
                Vec3::new(1.0, 0.75, 0.25),
                Vec3::new(1.0, 0.87, 0.50),
                Vec3::new(1.0, 0.97, 0.85),
            ],
            Palette::Sunset => [
                Vec3::new(0.1, 0.0, 0.2),  // Dark purple
                Vec3::new(0.5, 0.0, 0.5),  // Purple
                Vec3::new(1.0, 0.2, 0.4),  // Pink
                Vec3::new(1.0, 0.5, 0.2),  // Orange
                Vec3::new(1.0, 0.9, 0.4),  // Yellow
            ],
            Palette::Fire => [
                Vec3::new(0.5, 0.0, 0.0),  // Red
                Vec3::new(0.9, 0.15, 0.0),
                Vec3::new(1.0, 0.4, 0.0),  // Orange
                Vec3::new(1.0, 0.7, 0.1),  // Yellow-orange
                Vec3::new(1.0, 0.95, 0.7), // White-yellow
            ],
            Palette::Lavender => [
                Vec3::new(0.45, 0.30, 0.70),
                Vec3::new(0.60, 0.45, 0.85),
                Vec3::new(0.75, 0.60, 0.95),
                Vec3::new(0.85, 0.75, 1.0),
                Vec3::new(0.95, 0.90, 1.0),
            ],
            Palette::Ocean => [
                Vec3::new(0.0, 0.05, 0.15), // Deep blue
                Vec3::new(0.0, 0.2, 0.4),   // Dark blue
                Vec3::new(0.0, 0.4, 0.6),   // Blue
                Vec3::new(0.2, 0.6, 0.8),   // Light blue
                Vec3::new(0.6, 0.9, 1.0),   // Cyan
            ],
            Palette::Neon => [
                Vec3::new(1.0, 0.0, 0.5), // Pink
                Vec3::new(0.5, 0.0, 1.0), // Purple
                Vec3::new(0.0, 0.5, 1.0), // Blue
                Vec3::new(0.0, 1.0, 1.0), // Cyan
                Vec3::new(1.0, 0.3, 0.8),
            ],
            Palette::Rainbow => [
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.5, 0.0, 1.0),
            ],
        }
    }

    /// Interpolate the palette at `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let stops = self.colors();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f32;
        stops[i].lerp(stops[i + 1], frac)
    }
}

/// A color in hue/saturation/lightness form.
///
/// Particles store HSL so that hue drift over their life is a single add.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in degrees, kept in `[0, 360)`.
    pub h: f32,
    /// Saturation `[0, 1]`.
    pub s: f32,
    /// Lightness `[0, 1]`.
    pub l: f32,
}

impl Default for Hsl {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 1.0),
            l: l.clamp(0.0, 1.0),
        }
    }

    /// Rotate the hue by `degrees`, wrapping around the circle.
    pub fn shifted(self, degrees: f32) -> Self {
        Self::new(self.h + degrees, self.s, self.l)
    }

    /// Convert an RGB triple (0.0-1.0) to HSL.
    pub fn from_rgb(rgb: Vec3) -> Self {
        let (r, g, b) = (rgb.x, rgb.y, rgb.z);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;

        if d <= f32::EPSILON {
            return Self::new(0.0, 0.0, l);
        }

        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self::new(h * 60.0, s, l)
    }

    /// Convert to an RGB triple (0.0-1.0).
    pub fn to_rgb(&self) -> Vec3 {
        let c = (1.0 - (2.0 * self.l - 1.0).abs()) * self.s;
        let hp = self.h / 60.0;
        let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
        let m = self.l - c / 2.0;

        let (r, g, b) = match hp as u32 % 6 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Vec3::new(r + m, g + m, b + m)
    }
}

/// How a draw combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard source-over alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending. Overlapping particles become brighter, which is
    /// what makes glows and sparks read as light.
    Additive,

    /// Multiplicative blending, darkens the destination.
    Multiply,

    /// Erase the destination by the source alpha. Used to fade the
    /// accumulation buffer a little every frame.
    DestinationOut,
}

/// Shape drawn for a particle body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleShape {
    /// Filled circle (default).
    #[default]
    Circle,

    /// Filled heart built from bezier curves.
    Heart,

    /// Filled five-pointed star.
    Star,

    /// Stroked heart outline, used by ripples.
    Ring,
}

/// How motion trails are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailMode {
    /// Clear every frame and stroke each particle's position history.
    #[default]
    History,

    /// Keep the previous frame and erase a fraction of it with a
    /// destination-out rectangle, so older positions fade out.
    Accumulate,
}

/// Configuration for particle visuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Blend mode for particle bodies and trails.
    pub blend_mode: BlendMode,
    /// Default particle shape for the scene.
    pub shape: ParticleShape,
    /// Color theme.
    pub palette: Palette,
    /// Trail strategy.
    pub trail_mode: TrailMode,
    /// Number of historical positions kept per particle (0 = no trails).
    pub trail_length: u32,
    /// Opacity of the per-frame fade rectangle in [`TrailMode::Accumulate`].
    pub fade_alpha: f32,
    /// Glow radius as a multiple of particle size (0 = no glow).
    pub glow_intensity: f32,
    /// Opacity of the glow at its center.
    pub glow_alpha: f32,
    /// Background clear color (RGB, 0.0-1.0).
    pub background: Vec3,
    /// Stroke width for outlines and trails, in pixels.
    pub line_width: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Additive,
            shape: ParticleShape::Circle,
            palette: Palette::Rose,
            trail_mode: TrailMode::History,
            trail_length: 6,
            fade_alpha: 0.25,
            glow_intensity: 3.0,
            glow_alpha: 0.35,
            background: Vec3::new(0.02, 0.01, 0.04),
            line_width: 1.5,
        }
    }
}

impl VisualConfig {
    /// Create a new visual config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blend_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.blend_mode = mode;
        self
    }

    pub fn shape(&mut self, shape: ParticleShape) -> &mut Self {
        self.shape = shape;
        self
    }

    pub fn palette(&mut self, palette: Palette) -> &mut Self {
        self.palette = palette;
        self
    }

    /// Enable history trails of `length` positions (0 disables them).
    pub fn trails(&mut self, length: u32) -> &mut Self {
        self.trail_mode = TrailMode::History;
        self.trail_length = length;
        self
    }

    /// Switch to the accumulation buffer, erasing `fade_alpha` of the
    /// previous frame each tick.
    pub fn accumulate(&mut self, fade_alpha: f32) -> &mut Self {
        self.trail_mode = TrailMode::Accumulate;
        self.fade_alpha = fade_alpha;
        self
    }

    pub fn glow(&mut self, intensity: f32) -> &mut Self {
        self.glow_intensity = intensity;
        self
    }

    pub fn background(&mut self, color: Vec3) -> &mut Self {
        self.background = color;
        self
    }
}
