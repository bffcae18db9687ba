//! Precomputed flight paths and the grid-wave block.
//!
//! Curve followers never evaluate the bezier at runtime: they walk a table
//! of per-step deltas and pick their facing from a parallel table of
//! quantised directions.

use std::f32::consts::{PI, TAU};

/// Rotation frames in every directional sprite sheet.
pub const ROTATION_FRAMES: usize = 32;

// ── Direction helpers ─────────────────────────────────────────────────────────

/// Nearest of the 32 rotation frames for a heading in radians.
pub fn direction_frame(angle: f32) -> usize {
    let step = TAU / ROTATION_FRAMES as f32;
    let a = angle.rem_euclid(TAU);
    ((a / step).round() as usize) % ROTATION_FRAMES
}

/// Turn `current` toward `target` by at most `agility` radians, the short
/// way round. Result is normalised to `[0, 2π)`.
pub fn turn_toward(current: f32, target: f32, agility: f32) -> f32 {
    let mut diff = (target - current).rem_euclid(TAU);
    if diff > PI {
        diff -= TAU;
    }
    (current + diff.clamp(-agility, agility)).rem_euclid(TAU)
}

pub fn angle_between(from: (f32, f32), to: (f32, f32)) -> f32 {
    (to.1 - from.1).atan2(to.0 - from.0)
}

// ── Curves ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    start: (f32, f32),
    deltas: Vec<(f32, f32)>,
    facings: Vec<usize>,
}

impl Curve {
    /// Sample a cubic bezier into `steps` deltas.
    pub fn from_bezier(p: [(f32, f32); 4], steps: usize) -> Self {
        let point = |t: f32| {
            let u = 1.0 - t;
            let b0 = u * u * u;
            let b1 = 3.0 * u * u * t;
            let b2 = 3.0 * u * t * t;
            let b3 = t * t * t;
            (
                b0 * p[0].0 + b1 * p[1].0 + b2 * p[2].0 + b3 * p[3].0,
                b0 * p[0].1 + b1 * p[1].1 + b2 * p[2].1 + b3 * p[3].1,
            )
        };

        let steps = steps.max(1);
        let mut deltas = Vec::with_capacity(steps);
        let mut facings = Vec::with_capacity(steps);
        let mut prev = point(0.0);
        for i in 1..=steps {
            let next = point(i as f32 / steps as f32);
            let d = (next.0 - prev.0, next.1 - prev.1);
            deltas.push(d);
            facings.push(direction_frame(d.1.atan2(d.0)));
            prev = next;
        }

        Self {
            start: p[0],
            deltas,
            facings,
        }
    }

    pub fn start(&self) -> (f32, f32) {
        self.start
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn delta(&self, step: usize) -> Option<(f32, f32)> {
        self.deltas.get(step).copied()
    }

    pub fn facing(&self, step: usize) -> Option<usize> {
        self.facings.get(step).copied()
    }
}

/// Indices into [`CurveBank::builtin`].
pub mod paths {
    pub const SWOOP_LEFT: usize = 0;
    pub const SWOOP_RIGHT: usize = 1;
    pub const DIVE: usize = 2;
    pub const S_BEND: usize = 3;
    pub const SHOT_ARC_LEFT: usize = 4;
    pub const SHOT_ARC_RIGHT: usize = 5;

    pub const WAVE_PATHS: [usize; 4] = [SWOOP_LEFT, SWOOP_RIGHT, DIVE, S_BEND];
}

#[derive(Clone, Debug, Default)]
pub struct CurveBank {
    curves: Vec<Curve>,
}

impl CurveBank {
    pub fn new(curves: Vec<Curve>) -> Self {
        Self { curves }
    }

    /// Wave paths sized to the screen, plus the two arcs friend curve shots
    /// follow (relative paths, only their deltas matter).
    pub fn builtin(width: f32, height: f32) -> Self {
        let w = width;
        let h = height;
        Self::new(vec![
            Curve::from_bezier(
                [(-32.0, h * 0.1), (w * 0.6, -h * 0.2), (w * 0.9, h * 0.9), (w * 0.2, h + 32.0)],
                240,
            ),
            Curve::from_bezier(
                [(w + 16.0, h * 0.1), (w * 0.4, -h * 0.2), (w * 0.1, h * 0.9), (w * 0.8, h + 32.0)],
                240,
            ),
            Curve::from_bezier(
                [(w * 0.5, -32.0), (w * 0.5, h * 0.5), (w * 0.1, h * 0.6), (w * 0.1, h + 32.0)],
                180,
            ),
            Curve::from_bezier(
                [(w * 0.2, -32.0), (w * 1.2, h * 0.3), (-w * 0.2, h * 0.6), (w * 0.8, h + 32.0)],
                300,
            ),
            Curve::from_bezier([(0.0, 0.0), (-24.0, -40.0), (-40.0, -120.0), (-20.0, -260.0)], 120),
            Curve::from_bezier([(0.0, 0.0), (24.0, -40.0), (40.0, -120.0), (20.0, -260.0)], 120),
        ])
    }

    pub fn get(&self, index: usize) -> Option<&Curve> {
        self.curves.get(index)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

// ── Grid wave ─────────────────────────────────────────────────────────────────

/// Shared origin of a grid wave. Members derive their position from it plus
/// their cell, so the whole block moves rigidly.
#[derive(Clone, Debug, PartialEq)]
pub struct GridWave {
    pub origin_x: f32,
    pub origin_y: f32,
    pub vx: f32,
    /// Downward creep per frame.
    pub drift: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub cell_w: f32,
    pub cell_h: f32,
}

impl GridWave {
    pub fn new(origin: (f32, f32), min_x: f32, max_x: f32, cell: (f32, f32)) -> Self {
        Self {
            origin_x: origin.0,
            origin_y: origin.1,
            vx: 0.5,
            drift: 0.05,
            min_x,
            max_x,
            cell_w: cell.0,
            cell_h: cell.1,
        }
    }

    /// Move the block one frame, bouncing between `min_x` and `max_x`.
    pub fn step(&mut self) {
        self.origin_x += self.vx;
        if self.origin_x < self.min_x {
            self.origin_x = self.min_x;
            self.vx = self.vx.abs();
        } else if self.origin_x > self.max_x {
            self.origin_x = self.max_x;
            self.vx = -self.vx.abs();
        }
        self.origin_y += self.drift;
    }

    pub fn cell_position(&self, col: i32, row: i32) -> (f32, f32) {
        (
            self.origin_x + col as f32 * self.cell_w,
            self.origin_y + row as f32 * self.cell_h,
        )
    }
}
