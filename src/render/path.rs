//! Vector paths for particle silhouettes.
//!
//! Heart and star outlines are built from explicit line and cubic bezier
//! segments so they stay sharp at any radius. Backends that cannot draw
//! curves natively use [`Path::flatten`].

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Segments per cubic when flattening.
const CUBIC_STEPS: usize = 16;

/// One path instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Two control points, then the end point.
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// A polyline produced by [`Path::flatten`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

/// A sequence of subpaths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, end: Vec2) -> &mut Self {
        self.commands.push(PathCommand::CubicTo(c1, c2, end));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Convert to polylines, approximating each cubic with straight segments.
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut out = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        out.push(Polyline {
                            points: std::mem::take(&mut current),
                            closed: false,
                        });
                    }
                    current.clear();
                    current.push(p);
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::CubicTo(c1, c2, end) => {
                    let Some(&start) = current.last() else {
                        current.push(end);
                        continue;
                    };
                    for i in 1..=CUBIC_STEPS {
                        let t = i as f32 / CUBIC_STEPS as f32;
                        current.push(cubic_point(start, c1, c2, end, t));
                    }
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        let first = current[0];
                        out.push(Polyline {
                            points: std::mem::take(&mut current),
                            closed: true,
                        });
                        current.push(first);
                    }
                }
            }
        }

        if current.len() > 1 {
            out.push(Polyline {
                points: current,
                closed: false,
            });
        }
        out
    }

    /// Bounding box of the flattened path.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let mut points = self.flatten().into_iter().flat_map(|l| l.points);
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

fn cubic_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Heart silhouette centred on `center`, `2 * radius` wide and tall.
///
/// Four cubics: notch to left lobe, left lobe to tip, tip to right lobe,
/// right lobe back to the notch.
pub fn heart(center: Vec2, radius: f32) -> Path {
    let s = radius * 2.0;
    let top = center.y - radius;
    let x = center.x;
    let notch = Vec2::new(x, top + s * 0.25);
    let tip = Vec2::new(x, top + s);

    let mut path = Path::new();
    path.move_to(notch)
        .cubic_to(
            Vec2::new(x, top),
            Vec2::new(x - s * 0.5, top),
            Vec2::new(x - s * 0.5, top + s * 0.25),
        )
        .cubic_to(
            Vec2::new(x - s * 0.5, top + s * 0.55),
            Vec2::new(x, top + s * 0.75),
            tip,
        )
        .cubic_to(
            Vec2::new(x, top + s * 0.75),
            Vec2::new(x + s * 0.5, top + s * 0.55),
            Vec2::new(x + s * 0.5, top + s * 0.25),
        )
        .cubic_to(Vec2::new(x + s * 0.5, top), Vec2::new(x, top), notch)
        .close();
    path
}

/// Star with `points` tips alternating between `outer` and `inner` radius,
/// first tip pointing up.
pub fn star(center: Vec2, outer: f32, inner: f32, points: u32) -> Path {
    let mut path = Path::new();
    let points = points.max(2);
    let vertices = points * 2;
    for i in 0..vertices {
        let r = if i % 2 == 0 { outer } else { inner };
        let angle = -PI / 2.0 + TAU * i as f32 / vertices as f32;
        let p = center + Vec2::new(angle.cos(), angle.sin()) * r;
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close();
    path
}
