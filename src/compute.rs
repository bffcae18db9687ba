//! Frame stepping for the simulation.
//!
//! `tick` advances the whole world by one frame in a fixed order. All
//! randomness comes through the injected RNG so callers control
//! determinism (tests use a seeded `StdRng`).

use rand::Rng;
use tracing::{info, trace};

use crate::config::SimConfig;
use crate::context::{Playfield, SimulationContext};
use crate::curves::CurveBank;
use crate::director::{self, Director};
use crate::dispatch;
use crate::enemies::{self, Enemies};
use crate::entities::{GameStatus, Level, SimulationGate};
use crate::error::SimError;
use crate::extra_guns::{self, ExtraGuns};
use crate::gems::{self, Gems};
use crate::guardians;
use crate::satellites::{self, Satellites};
use crate::ship;
use crate::shots::{self, Shots};
use crate::sprites::SpriteBank;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial simulation for a difficulty level. Fails when the
/// config is out of range or a sprite table is empty; both are fatal.
pub fn init_state(
    level: Level,
    config: SimConfig,
    sprites: SpriteBank,
    high_score: u32,
) -> Result<SimulationContext, SimError> {
    config.validate()?;
    sprites.validate()?;

    let field = Playfield::from_config(&config);
    let ship = ship::new_ship(&config, &sprites, field);
    info!(
        ?level,
        width = field.width,
        height = field.height,
        "simulation initialised"
    );

    Ok(SimulationContext {
        field,
        curves: CurveBank::builtin(field.width, field.height),
        grid: None,
        ship,
        enemies: Enemies::new(config.max_enemies),
        shots: Shots::new(config.max_shots),
        gems: Gems::new(config.max_gems),
        guns: ExtraGuns::new(config.max_extra_guns),
        satellites: Satellites::new(config.max_satellites),
        guardian: None,
        director: Director::new(config.meteor_interval),
        events: Vec::new(),
        score: 0,
        high_score,
        multiplier: 0,
        level,
        status: GameStatus::Playing,
        frame: 0,
        stage: 0,
        sprites,
        config,
    })
}

// ── Input-driven transitions ─────────────────────────────────────────────────

/// Steer the ship; ignored while the gate is closed.
pub fn steer_ship(ctx: &mut SimulationContext, gate: SimulationGate, dx: f32, dy: f32) {
    if gate.is_frozen() {
        return;
    }
    ship::steer(ctx, dx, dy);
}

/// Fire the ship's guns; ignored while the gate is closed.
pub fn player_fire(ctx: &mut SimulationContext, gate: SimulationGate) -> bool {
    if gate.is_frozen() {
        return false;
    }
    ship::fire(ctx)
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame. Nothing moves while the gate is
/// closed; the caller keeps drawing the frozen state.
pub fn tick(ctx: &mut SimulationContext, gate: SimulationGate, rng: &mut impl Rng) {
    if gate.is_frozen() {
        return;
    }
    ctx.frame += 1;
    ctx.events.clear();

    // ── 1. Ship countdowns and movement ──────────────────────────────────────
    ship::update(ctx);

    // ── 2. New content ───────────────────────────────────────────────────────
    if !ctx.is_game_over() {
        director::update(ctx, rng);
    }

    // ── 3. Enemies: grid block, guardian script, then every enemy ────────────
    if let Some(grid) = ctx.grid.as_mut() {
        grid.step();
    }
    guardians::update(ctx);
    enemies::update(ctx);
    guardians::finish_if_done(ctx);

    // ── 4. Ship attachments ──────────────────────────────────────────────────
    satellites::update(ctx);
    extra_guns::update(ctx);

    // ── 5. Bonus gems ────────────────────────────────────────────────────────
    gems::update(ctx);

    // ── 6. Shots ─────────────────────────────────────────────────────────────
    shots::update(ctx);

    // ── 7. Collisions (none once the game is over) ──────────────────────────
    dispatch::resolve_all(ctx, rng);

    ctx.debug_validate();
    trace!(
        frame = ctx.frame,
        enemies = ctx.enemies.len(),
        shots = ctx.shots.len(),
        gems = ctx.gems.len(),
        score = ctx.score,
        "tick"
    );
}
