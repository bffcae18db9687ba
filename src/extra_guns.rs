//! Extra guns: at most one per side of the ship, locked to it each frame.

use std::f32::consts::FRAC_PI_2;

use tracing::debug;

use crate::context::SimulationContext;
use crate::entities::{ExtraGun, ShotOwner, Side, Sprite};
use crate::pool::{Pool, SlotId};
use crate::shots::Launch;
use crate::sprites::SpriteBank;

const GUN_ENERGY: i32 = 12;
const GUN_POWER: i32 = 4;
const GUN_SHOT_POWER: i32 = 2;
const GUN_SHOT_SPEED: f32 = 5.0;
/// Gap between the ship's edge and the gun.
const GUN_GAP: f32 = 2.0;

pub struct ExtraGuns {
    pool: Pool<ExtraGun>,
}

impl ExtraGuns {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity("extra_guns", capacity),
        }
    }

    pub fn pool(&self) -> &Pool<ExtraGun> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool<ExtraGun> {
        &mut self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn has_side(&self, side: Side) -> bool {
        self.pool.iter().any(|(_, g)| g.side == side)
    }

    /// Attach a gun to the first free side, left before right.
    pub fn add(&mut self, bank: &SpriteBank) -> Option<SlotId> {
        let side = [Side::Left, Side::Right]
            .into_iter()
            .find(|s| !self.has_side(*s))?;
        let sprite = Sprite::new(bank.extra_gun.clone(), 0.0, 0.0)
            .with_combat(GUN_POWER, GUN_ENERGY)
            .with_anim_delay(2);
        let id = self.pool.acquire(ExtraGun {
            sprite,
            side,
            fire_counter: 0,
        });
        if id.is_none() {
            debug!(?side, "extra gun spawn skipped");
        }
        id
    }

    /// Detach a destroyed gun; its side becomes free again.
    pub fn remove(&mut self, id: SlotId) -> bool {
        self.pool.release(id)
    }
}

/// Lock every gun to its side of the ship.
pub fn update(ctx: &mut SimulationContext) {
    let ship = &ctx.ship.sprite;
    let (sx, sy, sw, sh) = (ship.x, ship.y, ship.width(), ship.height());
    let field = ctx.field;

    let pool = &mut ctx.guns.pool;
    let mut cursor = pool.first();
    while let Some(id) = cursor {
        cursor = pool.next_of(id);
        let Some(gun) = pool.get_mut(id) else {
            continue;
        };
        gun.sprite.flash = false;
        let gw = gun.sprite.width();
        let gh = gun.sprite.height();
        gun.sprite.x = match gun.side {
            Side::Left => sx - gw - GUN_GAP,
            Side::Right => sx + sw + GUN_GAP,
        };
        gun.sprite.y = sy + (sh - gh) / 2.0;
        gun.sprite.advance_animation();
        gun.sprite.visible = field.on_screen(&gun.sprite);
        gun.fire_counter = gun.fire_counter.saturating_sub(1);
    }
}

/// Fire straight up from every gun that has reloaded. Called from the
/// ship's fire routine.
pub fn fire(ctx: &mut SimulationContext, rate: u32) -> bool {
    let frames = ctx.sprites.friend_shot.clone();
    let mut fired = false;
    let pool = &mut ctx.guns.pool;
    let shots = &mut ctx.shots;
    let mut cursor = pool.first();
    while let Some(id) = cursor {
        cursor = pool.next_of(id);
        let Some(gun) = pool.get_mut(id) else {
            continue;
        };
        if gun.fire_counter > 0 {
            continue;
        }
        let (cx, _) = gun.sprite.center();
        let launch = Launch {
            owner: ShotOwner::Friend,
            x: cx,
            y: gun.sprite.y,
            angle: -FRAC_PI_2,
            speed: GUN_SHOT_SPEED,
            power: GUN_SHOT_POWER,
        };
        if shots.spawn_linear(frames.clone(), launch).is_some() {
            fired = true;
        }
        gun.fire_counter = rate;
    }
    fired
}
