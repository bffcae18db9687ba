//! Bonus subsystem: gem drops on kills, gem drift and pickup effects.

use rand::Rng;
use tracing::{debug, trace};

use crate::context::SimulationContext;
use crate::entities::{Gem, GemKind, Sprite};
use crate::events::{FrameEvent, SoundEffect};
use crate::pool::{Pool, SlotId};
use crate::sprites::SpriteBank;

/// Kills between guaranteed drops from the standard table.
pub const DROP_EVERY: u32 = 5;
/// One standard-table kill in this many yields a penalty foe instead of
/// nothing.
pub const PENALTY_ODDS: u32 = 12;
/// Score credited for picking up any gem, before the multiplier.
pub const GEM_SCORE: u32 = 250;

const GEM_SPEED: f32 = 0.75;
const GEM_ENERGY_REFILL_PERCENT: i32 = 50;

const STANDARD_TABLE: [(GemKind, u32); 5] = [
    (GemKind::LevelUp1, 40),
    (GemKind::LevelUp2, 12),
    (GemKind::AddSatellite, 15),
    (GemKind::RestoreEnergy, 23),
    (GemKind::ScoreMultiplier, 10),
];

const METEOR_TABLE: [(GemKind, u32); 4] = [
    (GemKind::RestoreEnergy, 40),
    (GemKind::AddSatellite, 30),
    (GemKind::LevelUp1, 20),
    (GemKind::ScoreMultiplier, 10),
];

fn roll(rng: &mut impl Rng, table: &[(GemKind, u32)]) -> GemKind {
    let total: u32 = table.iter().map(|(_, w)| w).sum();
    let mut pick = rng.gen_range(0..total);
    for &(kind, weight) in table {
        if pick < weight {
            return kind;
        }
        pick -= weight;
    }
    table[0].0
}

pub struct Gems {
    pool: Pool<Gem>,
    kills_since_drop: u32,
    /// Penalty foes owed to the director for the next frame.
    penalties: u32,
}

impl Gems {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity("gems", capacity),
            kills_since_drop: 0,
            penalties: 0,
        }
    }

    pub fn pool(&self) -> &Pool<Gem> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool<Gem> {
        &mut self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Drop a gem centred on `(x, y)`.
    pub fn spawn_gem(&mut self, bank: &SpriteBank, kind: GemKind, x: f32, y: f32) -> Option<SlotId> {
        let mut sprite = Sprite::new(bank.gem(kind), x, y)
            .with_combat(0, 1)
            .with_anim_delay(3);
        let (cog_x, cog_y) = {
            let img = sprite.image();
            (img.cog_x as f32, img.cog_y as f32)
        };
        sprite.x -= cog_x;
        sprite.y -= cog_y;
        let id = self.pool.acquire(Gem {
            sprite,
            kind,
            vy: GEM_SPEED,
        });
        if id.is_none() {
            debug!(?kind, "gem spawn skipped");
        }
        id
    }

    /// Standard drop after a kill: a gem every few kills, otherwise a
    /// chance of owing a penalty foe.
    pub fn spawn_bonus(
        &mut self,
        bank: &SpriteBank,
        rng: &mut impl Rng,
        x: f32,
        y: f32,
        events: &mut Vec<FrameEvent>,
    ) -> Option<SlotId> {
        events.push(FrameEvent::BonusRequested { x, y });
        self.kills_since_drop += 1;
        if self.kills_since_drop >= DROP_EVERY {
            self.kills_since_drop = 0;
            let kind = roll(rng, &STANDARD_TABLE);
            return self.spawn_gem(bank, kind, x, y);
        }
        if rng.gen_ratio(1, PENALTY_ODDS) {
            self.penalties += 1;
            debug!(penalties = self.penalties, "penalty foe owed");
        }
        None
    }

    /// Meteor drop: even odds of a gem from the meteor table.
    pub fn spawn_meteor_bonus(
        &mut self,
        bank: &SpriteBank,
        rng: &mut impl Rng,
        x: f32,
        y: f32,
        events: &mut Vec<FrameEvent>,
    ) -> Option<SlotId> {
        events.push(FrameEvent::MeteorBonusRequested { x, y });
        if rng.gen_bool(0.5) {
            let kind = roll(rng, &METEOR_TABLE);
            self.spawn_gem(bank, kind, x, y)
        } else {
            None
        }
    }

    /// Hand over the owed penalty foes, resetting the tally.
    pub fn take_penalties(&mut self) -> u32 {
        std::mem::take(&mut self.penalties)
    }
}

// ── Per-frame update ──────────────────────────────────────────────────────────

pub fn update(ctx: &mut SimulationContext) {
    let field = ctx.field;
    let pool = &mut ctx.gems.pool;
    let mut cursor = pool.first();
    while let Some(id) = cursor {
        cursor = pool.next_of(id);
        let Some(gem) = pool.get_mut(id) else {
            continue;
        };
        gem.sprite.y += gem.vy;
        gem.sprite.advance_animation();
        if gem.sprite.y > field.height {
            pool.release(id);
            continue;
        }
        gem.sprite.visible = field.on_screen(&gem.sprite);
    }
    trace!(active = pool.len(), "gems updated");
}

// ── Pickup ────────────────────────────────────────────────────────────────────

/// Credit the pickup score and apply the gem's effect to the player.
pub fn apply_pickup(ctx: &mut SimulationContext, kind: GemKind) {
    ctx.add_score(GEM_SCORE);
    ctx.events.push(FrameEvent::GemCollected { kind });
    ctx.events.push(FrameEvent::Sound(SoundEffect::GemPickup));

    match kind {
        GemKind::LevelUp1 => raise_gun_level(ctx, 1),
        GemKind::LevelUp2 => raise_gun_level(ctx, 2),
        GemKind::AddSatellite => {
            ctx.satellites.add(&ctx.sprites);
        }
        GemKind::RestoreEnergy => {
            let ship = &mut ctx.ship.sprite;
            let refill = ship.max_energy * GEM_ENERGY_REFILL_PERCENT / 100;
            ship.energy = (ship.energy + refill).min(ship.max_energy);
        }
        GemKind::ScoreMultiplier => {
            ctx.multiplier = (ctx.multiplier + 1).min(ctx.config.max_score_multiplier);
        }
    }
}

/// Levels past the cap turn into extra guns, left side first.
fn raise_gun_level(ctx: &mut SimulationContext, by: u32) {
    let max = ctx.config.max_gun_level;
    let wanted = ctx.ship.gun_level + by;
    ctx.ship.gun_level = wanted.min(max);
    for _ in max..wanted {
        if ctx.guns.add(&ctx.sprites).is_none() {
            break;
        }
    }
}
