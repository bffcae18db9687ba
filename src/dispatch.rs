//! Collision dispatch between every pair of entity kinds that can touch.
//!
//! Each routine walks the attackers, finds the first eligible defender with
//! an overlapping point/zone pair and resolves exactly that one hit. Damage
//! is always `defender.energy -= attacker.power`; nothing else changes
//! energy here.

use rand::Rng;
use tracing::{debug, trace};

use crate::collision::sprites_collide;
use crate::context::SimulationContext;
use crate::entities::{Enemy, EnemyKind, ExplosionScale, Fade, ShotOwner, Sprite};
use crate::events::{FrameEvent, SoundEffect};
use crate::gems;
use crate::guardians::{self, GuardianSession};
use crate::pool::{Pool, SlotId};
use crate::ship;

/// Frames the fragment burst trails the main explosion.
const FRAGMENT_DELAY: u32 = 4;

/// Run every routine once, in a fixed order. Protectors are tested before
/// the ship so a satellite or gun in the way takes the shot.
pub fn resolve_all(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    if ctx.is_game_over() {
        return;
    }
    shots_vs_enemies(ctx, rng);
    shots_vs_satellites(ctx);
    shots_vs_extra_guns(ctx);
    shots_vs_ship(ctx);
    enemies_vs_satellites(ctx, rng);
    enemies_vs_extra_guns(ctx, rng);
    enemies_vs_ship(ctx, rng);
    ship_vs_gems(ctx);
}

// ── Eligibility ───────────────────────────────────────────────────────────────

fn enemy_eligible(guardian: Option<&GuardianSession>, id: SlotId, enemy: &Enemy) -> bool {
    enemy.sprite.visible
        && !enemy.is_dead()
        && !enemy.sprite.is_destroyed()
        && !guardian.is_some_and(|g| g.is_appearing_part(id))
}

fn ship_eligible(ctx: &SimulationContext) -> bool {
    ctx.ship.sprite.visible && !ctx.ship.sprite.is_destroyed()
}

/// First live member of `pool` that `attacker` touches.
fn first_hit<T>(
    pool: &Pool<T>,
    attacker: &Sprite,
    sprite: impl Fn(&T) -> &Sprite,
) -> Option<SlotId> {
    pool.iter()
        .find(|(_, item)| {
            let defender = sprite(item);
            defender.visible && !defender.is_destroyed() && sprites_collide(attacker, defender)
        })
        .map(|(id, _)| id)
}

// ── Shots as attackers ────────────────────────────────────────────────────────

pub fn shots_vs_enemies(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    let mut cursor = ctx.shots.pool().first();
    while let Some(shot_id) = cursor {
        cursor = ctx.shots.pool().next_of(shot_id);
        let Some(shot) = ctx.shots.get(shot_id) else {
            continue;
        };
        if shot.owner != ShotOwner::Friend || !shot.sprite.visible {
            continue;
        }

        let guardian = ctx.guardian.as_ref();
        let target = ctx
            .enemies
            .pool()
            .iter()
            .find(|(id, enemy)| {
                enemy_eligible(guardian, *id, enemy)
                    && sprites_collide(&shot.sprite, &enemy.sprite)
            })
            .map(|(id, _)| id);
        let Some(enemy_id) = target else {
            continue;
        };

        let power = shot.sprite.power;
        ctx.shots.pool_mut().release(shot_id);
        hit_enemy(ctx, enemy_id, power, rng);
    }
}

pub fn shots_vs_satellites(ctx: &mut SimulationContext) {
    let mut cursor = ctx.shots.pool().first();
    while let Some(shot_id) = cursor {
        cursor = ctx.shots.pool().next_of(shot_id);
        let Some(shot) = ctx.shots.get(shot_id) else {
            continue;
        };
        if shot.owner != ShotOwner::Enemy || !shot.sprite.visible {
            continue;
        }
        let Some(sat_id) = first_hit(ctx.satellites.pool(), &shot.sprite, |s| &s.sprite) else {
            continue;
        };
        let power = shot.sprite.power;
        ctx.shots.pool_mut().release(shot_id);
        hit_satellite(ctx, sat_id, power);
    }
}

pub fn shots_vs_extra_guns(ctx: &mut SimulationContext) {
    let mut cursor = ctx.shots.pool().first();
    while let Some(shot_id) = cursor {
        cursor = ctx.shots.pool().next_of(shot_id);
        let Some(shot) = ctx.shots.get(shot_id) else {
            continue;
        };
        if shot.owner != ShotOwner::Enemy || !shot.sprite.visible {
            continue;
        }
        let Some(gun_id) = first_hit(ctx.guns.pool(), &shot.sprite, |g| &g.sprite) else {
            continue;
        };
        let power = shot.sprite.power;
        ctx.shots.pool_mut().release(shot_id);
        hit_extra_gun(ctx, gun_id, power);
    }
}

/// Enemy shots against the ship. The shot is spent even while the ship is
/// invincible; only the damage is skipped.
pub fn shots_vs_ship(ctx: &mut SimulationContext) {
    let mut cursor = ctx.shots.pool().first();
    while let Some(shot_id) = cursor {
        cursor = ctx.shots.pool().next_of(shot_id);
        if !ship_eligible(ctx) {
            return;
        }
        let Some(shot) = ctx.shots.get(shot_id) else {
            continue;
        };
        if shot.owner != ShotOwner::Enemy
            || !shot.sprite.visible
            || !sprites_collide(&shot.sprite, &ctx.ship.sprite)
        {
            continue;
        }
        let power = shot.sprite.power;
        ctx.shots.pool_mut().release(shot_id);
        ship::damage(ctx, power);
    }
}

// ── Enemies as attackers ──────────────────────────────────────────────────────

/// Body contact: the satellite loses the enemy's power and the enemy loses
/// the satellite's.
pub fn enemies_vs_satellites(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    let mut cursor = ctx.enemies.pool().first();
    while let Some(enemy_id) = cursor {
        cursor = ctx.enemies.pool().next_of(enemy_id);
        let Some(enemy) = ctx.enemies.get(enemy_id) else {
            continue;
        };
        if !enemy_eligible(ctx.guardian.as_ref(), enemy_id, enemy) {
            continue;
        }
        let Some(sat_id) = first_hit(ctx.satellites.pool(), &enemy.sprite, |s| &s.sprite) else {
            continue;
        };
        let power = enemy.sprite.power;
        let recoil = ctx.satellites.pool().get(sat_id).map_or(0, |s| s.sprite.power);
        hit_satellite(ctx, sat_id, power);
        hit_enemy(ctx, enemy_id, recoil, rng);
    }
}

pub fn enemies_vs_extra_guns(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    let mut cursor = ctx.enemies.pool().first();
    while let Some(enemy_id) = cursor {
        cursor = ctx.enemies.pool().next_of(enemy_id);
        let Some(enemy) = ctx.enemies.get(enemy_id) else {
            continue;
        };
        if !enemy_eligible(ctx.guardian.as_ref(), enemy_id, enemy) {
            continue;
        }
        let Some(gun_id) = first_hit(ctx.guns.pool(), &enemy.sprite, |g| &g.sprite) else {
            continue;
        };
        let power = enemy.sprite.power;
        let recoil = ctx.guns.pool().get(gun_id).map_or(0, |g| g.sprite.power);
        hit_extra_gun(ctx, gun_id, power);
        hit_enemy(ctx, enemy_id, recoil, rng);
    }
}

/// Ship contact. The enemy always takes `ship.power << 1` and always nudges
/// the ship; the ship's energy is spared while it is invincible.
pub fn enemies_vs_ship(ctx: &mut SimulationContext, rng: &mut impl Rng) {
    let mut cursor = ctx.enemies.pool().first();
    while let Some(enemy_id) = cursor {
        cursor = ctx.enemies.pool().next_of(enemy_id);
        if !ship_eligible(ctx) {
            return;
        }
        let Some(enemy) = ctx.enemies.get(enemy_id) else {
            continue;
        };
        if !enemy_eligible(ctx.guardian.as_ref(), enemy_id, enemy)
            || !sprites_collide(&enemy.sprite, &ctx.ship.sprite)
        {
            continue;
        }

        let (power, vx, vy) = (enemy.sprite.power, enemy.vx, enemy.vy);
        ctx.ship.vx += vx;
        ctx.ship.vy += vy;
        ship::damage(ctx, power);
        let recoil = ctx.ship.sprite.power << 1;
        hit_enemy(ctx, enemy_id, recoil, rng);
    }
}

// ── Ship as attacker ──────────────────────────────────────────────────────────

pub fn ship_vs_gems(ctx: &mut SimulationContext) {
    if !ship_eligible(ctx) {
        return;
    }
    let mut cursor = ctx.gems.pool().first();
    while let Some(gem_id) = cursor {
        cursor = ctx.gems.pool().next_of(gem_id);
        let Some(gem) = ctx.gems.pool().get(gem_id) else {
            continue;
        };
        if !gem.sprite.visible || !sprites_collide(&ctx.ship.sprite, &gem.sprite) {
            continue;
        }
        let kind = gem.kind;
        ctx.gems.pool_mut().release(gem_id);
        gems::apply_pickup(ctx, kind);
    }
}

// ── Hit resolution ────────────────────────────────────────────────────────────

/// Apply `power` to an enemy. Returns `true` when this hit destroyed it.
pub fn hit_enemy(ctx: &mut SimulationContext, id: SlotId, power: i32, rng: &mut impl Rng) -> bool {
    let Some(enemy) = ctx.enemies.get_mut(id) else {
        return false;
    };

    if enemy.is_guardian() {
        enemy.sprite.flash = true;
        if guardians::damage(ctx, power) {
            destroy_guardian(ctx, id, power, rng);
            return true;
        }
        if let Some(session) = ctx.guardian.as_mut() {
            session.fire_counter /= 2;
        }
        ctx.events.push(FrameEvent::Sound(SoundEffect::EnemyHit));
        return false;
    }

    enemy.sprite.energy -= power;
    if enemy.sprite.is_destroyed() {
        destroy_enemy(ctx, id, power, rng);
        return true;
    }
    enemy.sprite.flash = true;
    if enemy.enrages_on_hit() {
        enemy.fire_counter /= 2;
    }
    ctx.events.push(FrameEvent::Sound(SoundEffect::EnemyHit));
    false
}

fn kill_score(power: i32) -> u32 {
    u32::try_from(power).unwrap_or(0) << 2
}

/// Start the fade and queue the visuals for one enemy sprite.
fn explode(ctx: &mut SimulationContext, id: SlotId, delay: u32) -> Option<(EnemyKind, f32, f32)> {
    let enemy = ctx.enemies.get_mut(id)?;
    enemy.fade = Some(Fade::start());
    enemy.sprite.flash = false;
    let (x, y) = enemy.sprite.center();
    let (kind, scale) = (enemy.kind, enemy.scale);

    ctx.events.push(FrameEvent::Explosion { x, y, scale, delay });
    ctx.events.push(FrameEvent::Fragments {
        x,
        y,
        scale,
        count: scale.fragment_count(),
        delay: delay + FRAGMENT_DELAY,
        variant: (id.index() % 4) as u8,
    });
    let sound = match scale {
        ExplosionScale::Small | ExplosionScale::Medium => SoundEffect::Explosion,
        ExplosionScale::Large | ExplosionScale::Huge => SoundEffect::BigExplosion,
    };
    ctx.events.push(FrameEvent::Sound(sound));
    ctx.events.push(FrameEvent::EnemyKilled { kind, x, y });
    Some((kind, x, y))
}

fn destroy_enemy(ctx: &mut SimulationContext, id: SlotId, power: i32, rng: &mut impl Rng) {
    let Some((kind, x, y)) = explode(ctx, id, 0) else {
        return;
    };
    ctx.add_score(kill_score(power));

    let bank = &ctx.sprites;
    let events = &mut ctx.events;
    match kind {
        EnemyKind::Meteor(_) => ctx.gems.spawn_meteor_bonus(bank, rng, x, y, events),
        _ => ctx.gems.spawn_bonus(bank, rng, x, y, events),
    };
    trace!(?kind, x, y, score = ctx.score, "enemy destroyed");
}

/// Every part explodes at once; the score and the bonus are paid once.
fn destroy_guardian(ctx: &mut SimulationContext, hit: SlotId, power: i32, rng: &mut impl Rng) {
    let parts = ctx
        .guardian
        .as_ref()
        .map(|g| g.parts.clone())
        .unwrap_or_else(|| vec![hit]);
    let mut drop_at = None;
    for (i, id) in parts.into_iter().enumerate() {
        if let Some((_, x, y)) = explode(ctx, id, i as u32 * FRAGMENT_DELAY) {
            drop_at.get_or_insert((x, y));
        }
    }
    ctx.add_score(kill_score(power));
    if let Some((x, y)) = drop_at {
        ctx.gems.spawn_bonus(&ctx.sprites, rng, x, y, &mut ctx.events);
    }
    debug!(score = ctx.score, "guardian destroyed");
}

fn hit_satellite(ctx: &mut SimulationContext, id: SlotId, power: i32) {
    let Some(sat) = ctx.satellites.pool_mut().get_mut(id) else {
        return;
    };
    sat.sprite.energy -= power;
    if !sat.sprite.is_destroyed() {
        sat.sprite.flash = true;
        return;
    }
    let (x, y) = sat.sprite.center();
    ctx.satellites.remove(id);
    ctx.events.push(FrameEvent::Explosion {
        x,
        y,
        scale: ExplosionScale::Small,
        delay: 0,
    });
    ctx.events.push(FrameEvent::Sound(SoundEffect::SatelliteLost));
    ctx.events.push(FrameEvent::SatelliteDestroyed);
    debug!(left = ctx.satellites.len(), "satellite destroyed");
}

fn hit_extra_gun(ctx: &mut SimulationContext, id: SlotId, power: i32) {
    let Some(gun) = ctx.guns.pool_mut().get_mut(id) else {
        return;
    };
    gun.sprite.energy -= power;
    if !gun.sprite.is_destroyed() {
        gun.sprite.flash = true;
        return;
    }
    let (x, y) = gun.sprite.center();
    let side = gun.side;
    ctx.guns.remove(id);
    ctx.events.push(FrameEvent::Explosion {
        x,
        y,
        scale: ExplosionScale::Small,
        delay: 0,
    });
    ctx.events.push(FrameEvent::Sound(SoundEffect::Explosion));
    ctx.events.push(FrameEvent::ExtraGunDestroyed);
    debug!(?side, "extra gun destroyed");
}
