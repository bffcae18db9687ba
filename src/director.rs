//! Content director: decides what spawns each frame.
//!
//! Play cycles through curve waves, one grid wave and a guardian, with a
//! short breather between cycles. Random meteors and the penalty foes owed
//! by the bonus subsystem are layered on top of whatever phase is running.

use rand::Rng;
use tracing::debug;

use crate::context::SimulationContext;
use crate::curves::{paths, GridWave};
use crate::enemies::stats_for;
use crate::entities::{EnemyKind, LonelyMotion, MeteorSize};
use crate::guardians;
use crate::sprites::GUARDIAN_COUNT;

// ── Pacing tables ─────────────────────────────────────────────────────────────

/// Curve waves flown before the grid wave.
pub const CURVE_WAVES: u32 = 4;
/// Swoopers per curve wave.
pub const WAVE_SIZE: u32 = 6;
/// Frames between two swoopers of the same wave.
const WAVE_GAP: u32 = 12;
/// Frames between the end of one wave's launch and the next wave.
const WAVE_INTERVAL: u32 = 150;
const GRID_COLUMNS: i32 = 8;
const GRID_ROWS: i32 = 3;
const GRID_CELL: (f32, f32) = (20.0, 16.0);
/// Frames of calm after a guardian falls.
const INTERMISSION: u32 = 180;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    CurveWaves {
        waves_left: u32,
        /// Swoopers still to launch in the current wave.
        pending: u32,
        path: usize,
        countdown: u32,
    },
    GridWave,
    Guardian { started: bool },
    Intermission { countdown: u32 },
}

impl Phase {
    fn opening() -> Self {
        Self::CurveWaves {
            waves_left: CURVE_WAVES,
            pending: 0,
            path: 0,
            countdown: WAVE_INTERVAL / 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Director {
    pub phase: Phase,
    pub meteor_countdown: u32,
    /// Curve waves launched so far; picks the next path.
    pub waves_flown: u32,
}

impl Director {
    pub fn new(meteor_interval: u32) -> Self {
        Self {
            phase: Phase::opening(),
            meteor_countdown: meteor_interval,
            waves_flown: 0,
        }
    }
}

/// Run the director for one frame.
pub fn update(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    let mut director = ctx.director;

    spawn_penalties(ctx, rng);
    spawn_meteor(ctx, &mut director, rng);

    director.phase = match director.phase {
        Phase::CurveWaves {
            waves_left,
            pending,
            path,
            countdown,
        } => curve_waves(ctx, &mut director, waves_left, pending, path, countdown),
        Phase::GridWave => grid_wave(ctx),
        Phase::Guardian { started } => guardian(ctx, started),
        Phase::Intermission { countdown } => {
            if countdown == 0 {
                Phase::opening()
            } else {
                Phase::Intermission {
                    countdown: countdown - 1,
                }
            }
        }
    };

    if std::mem::discriminant(&director.phase) != std::mem::discriminant(&ctx.director.phase) {
        debug!(phase = ?director.phase, "director phase changed");
    }
    ctx.director = director;
}

fn curve_waves(
    ctx: &mut SimulationContext,
    director: &mut Director,
    waves_left: u32,
    pending: u32,
    path: usize,
    countdown: u32,
) -> Phase {
    if countdown > 0 {
        return Phase::CurveWaves {
            waves_left,
            pending,
            path,
            countdown: countdown - 1,
        };
    }

    if pending > 0 {
        let rate = ctx.scaled_fire_rate(stats_for(EnemyKind::Swooper).fire_rate);
        ctx.enemies
            .spawn_curve(&ctx.sprites, &ctx.curves, path, rate);
        let pending = pending - 1;
        let countdown = if pending > 0 { WAVE_GAP } else { WAVE_INTERVAL };
        return Phase::CurveWaves {
            waves_left,
            pending,
            path,
            countdown,
        };
    }

    if waves_left == 0 {
        return Phase::GridWave;
    }

    let wave = director.waves_flown as usize;
    director.waves_flown += 1;
    Phase::CurveWaves {
        waves_left: waves_left - 1,
        pending: WAVE_SIZE,
        path: paths::WAVE_PATHS[wave % paths::WAVE_PATHS.len()],
        countdown: 0,
    }
}

fn grid_wave(ctx: &mut SimulationContext) -> Phase {
    match ctx.grid {
        None => {
            let block_w = GRID_COLUMNS as f32 * GRID_CELL.0;
            let origin = ((ctx.field.width - block_w) / 2.0, -(GRID_ROWS as f32) * GRID_CELL.1);
            let grid = GridWave::new(origin, 4.0, ctx.field.width - block_w - 4.0, GRID_CELL);
            let rate = ctx.scaled_fire_rate(stats_for(EnemyKind::Grunt).fire_rate);
            for row in 0..GRID_ROWS {
                for col in 0..GRID_COLUMNS {
                    ctx.enemies.spawn_grid(&ctx.sprites, &grid, col, row, rate);
                }
            }
            ctx.grid = Some(grid);
            Phase::GridWave
        }
        Some(_) if ctx.enemies.grid_members() == 0 => {
            ctx.grid = None;
            Phase::Guardian { started: false }
        }
        Some(_) => Phase::GridWave,
    }
}

fn guardian(ctx: &mut SimulationContext, started: bool) -> Phase {
    if started {
        return if ctx.guardian.is_none() {
            Phase::Intermission {
                countdown: INTERMISSION,
            }
        } else {
            Phase::Guardian { started }
        };
    }
    let number = (ctx.stage as usize % GUARDIAN_COUNT) as u8 + 1;
    let started = guardians::start(ctx, number);
    if !started {
        debug!(number, enemies = ctx.enemies.len(), "guardian waiting for room");
    }
    Phase::Guardian { started }
}

fn spawn_meteor(ctx: &mut SimulationContext, director: &mut Director, rng: &mut impl Rng) {
    let interval = ctx.config.meteor_interval;
    if interval == 0 {
        return;
    }
    if director.meteor_countdown > 0 {
        director.meteor_countdown -= 1;
        return;
    }
    director.meteor_countdown = interval;

    let size = match rng.gen_range(0..10) {
        0..=4 => MeteorSize::Small,
        5..=7 => MeteorSize::Medium,
        _ => MeteorSize::Large,
    };
    let x = rng.gen_range(0.0..ctx.field.width);
    let motion = LonelyMotion::Drift {
        vx: rng.gen_range(-0.6..0.6),
        vy: rng.gen_range(0.6..1.4),
    };
    ctx.enemies
        .spawn_lonely(&ctx.sprites, EnemyKind::Meteor(size), motion, x, -32.0, 0);
}

/// Penalty wanderers owed for unlucky kills enter from the top.
fn spawn_penalties(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    let owed = ctx.gems.take_penalties();
    if owed == 0 {
        return;
    }
    debug!(owed, "penalty foes released");
    let rate = ctx.scaled_fire_rate(stats_for(EnemyKind::Wanderer).fire_rate);
    for _ in 0..owed {
        let base_x = rng.gen_range(32.0..(ctx.field.width - 32.0).max(33.0));
        let motion = LonelyMotion::Sweep {
            base_x,
            amplitude: rng.gen_range(16.0..48.0),
            phase: 0.0,
            vy: 0.8,
        };
        ctx.enemies
            .spawn_lonely(&ctx.sprites, EnemyKind::Wanderer, motion, base_x, -16.0, rate);
    }
}
