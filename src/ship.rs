//! The player ship: steering, the per-frame countdowns and the gun table.

use std::f32::consts::FRAC_PI_2;

use tracing::info;

use crate::config::SimConfig;
use crate::context::{Playfield, SimulationContext};
use crate::curves::paths;
use crate::entities::{ExplosionScale, GameStatus, Ship, ShotOwner, Sprite};
use crate::events::{FrameEvent, SoundEffect};
use crate::extra_guns;
use crate::pool::SlotId;
use crate::shots::Launch;
use crate::sprites::SpriteBank;

const UP: f32 = -FRAC_PI_2;
/// Velocity kept from one frame to the next once input stops.
const FRICTION: f32 = 0.75;
const SHOT_SPEED: f32 = 6.0;
const SHOT_POWER: i32 = 2;
const HOMING_SPEED: f32 = 4.0;
const HOMING_AGILITY: f32 = 0.12;
/// Half-angle of the angled pair, radians.
const SPREAD: f32 = 0.15;

/// A fresh ship near the bottom centre of the field.
pub fn new_ship(config: &SimConfig, bank: &SpriteBank, field: Playfield) -> Ship {
    let sprite = Sprite::new(bank.ship.clone(), 0.0, 0.0)
        .with_combat(config.ship_power, config.ship_energy)
        .with_anim_delay(4);
    let (w, h) = (sprite.width(), sprite.height());
    Ship {
        sprite: Sprite {
            x: (field.width - w) / 2.0,
            y: field.height - h - 8.0,
            ..sprite
        },
        vx: 0.0,
        vy: 0.0,
        invincibility: config.ship_spawn_invincibility,
        gun_level: 0,
        fire_counter: 0,
    }
}

// ── Input-driven transitions ─────────────────────────────────────────────────

/// Push the ship along `(dx, dy)`, each in `-1.0..=1.0`.
pub fn steer(ctx: &mut SimulationContext, dx: f32, dy: f32) {
    if ctx.is_game_over() {
        return;
    }
    let speed = ctx.config.ship_speed;
    let ship = &mut ctx.ship;
    ship.vx = (ship.vx + dx.clamp(-1.0, 1.0) * speed).clamp(-speed, speed);
    ship.vy = (ship.vy + dy.clamp(-1.0, 1.0) * speed).clamp(-speed, speed);
}

/// Fire the ship's guns and the extra guns if they have reloaded. Returns
/// whether anything left the barrel.
pub fn fire(ctx: &mut SimulationContext) -> bool {
    if ctx.is_game_over() {
        return false;
    }
    let rate = ctx.config.ship_fire_rate;
    let mut fired = false;

    if ctx.ship.fire_counter == 0 {
        ctx.ship.fire_counter = rate;
        fired |= fire_guns(ctx);
    }
    fired |= extra_guns::fire(ctx, rate);

    if fired {
        ctx.events.push(FrameEvent::Sound(SoundEffect::PlayerShot));
    }
    fired
}

/// The gun table: every level keeps the previous level's pattern and adds
/// to it.
fn fire_guns(ctx: &mut SimulationContext) -> bool {
    let (cx, _) = ctx.ship.sprite.center();
    let top = ctx.ship.sprite.y;
    let level = ctx.ship.gun_level;
    let launch = |x: f32, angle: f32, speed: f32| Launch {
        owner: ShotOwner::Friend,
        x,
        y: top,
        angle,
        speed,
        power: SHOT_POWER,
    };

    let bank = &ctx.sprites;
    let shots = &mut ctx.shots;
    let mut fired = 0;
    let mut count = |id: Option<SlotId>| fired += usize::from(id.is_some());

    if level == 0 || level == 2 {
        count(shots.spawn_linear(bank.friend_shot.clone(), launch(cx, UP, SHOT_SPEED)));
    }
    if level >= 1 {
        for dx in [-4.0, 4.0] {
            count(shots.spawn_linear(bank.friend_shot.clone(), launch(cx + dx, UP, SHOT_SPEED)));
        }
    }
    if level >= 2 {
        for angle in [UP - SPREAD, UP + SPREAD] {
            count(shots.spawn_linear(bank.friend_shot.clone(), launch(cx, angle, SHOT_SPEED)));
        }
    }
    if level >= 3 {
        for angle in [UP - 0.6, UP + 0.6] {
            count(shots.spawn_homing(
                bank.friend_homing.clone(),
                launch(cx, angle, HOMING_SPEED),
                HOMING_AGILITY,
            ));
        }
    }
    if level >= 4 {
        for curve in [paths::SHOT_ARC_LEFT, paths::SHOT_ARC_RIGHT] {
            count(shots.spawn_curve(bank.friend_shot.clone(), launch(cx, UP, SHOT_SPEED), curve));
        }
    }
    if level >= 5 {
        for angle in [UP - 3.0 * SPREAD, UP + 3.0 * SPREAD] {
            count(shots.spawn_linear(bank.friend_shot.clone(), launch(cx, angle, SHOT_SPEED)));
        }
    }
    fired > 0
}

// ── Per-frame update ──────────────────────────────────────────────────────────

pub fn update(ctx: &mut SimulationContext) {
    let field = ctx.field;
    let ship = &mut ctx.ship;
    ship.sprite.flash = false;
    ship.invincibility = ship.invincibility.saturating_sub(1);
    ship.fire_counter = ship.fire_counter.saturating_sub(1);
    if ctx.status == GameStatus::GameOver {
        return;
    }

    // A field smaller than the ship pins it to the top-left corner.
    let x_max = (field.width - ship.sprite.width()).max(0.0);
    let y_max = (field.height - ship.sprite.height()).max(0.0);
    ship.sprite.x = (ship.sprite.x + ship.vx).clamp(0.0, x_max);
    ship.sprite.y = (ship.sprite.y + ship.vy).clamp(0.0, y_max);
    ship.vx *= FRICTION;
    ship.vy *= FRICTION;
    ship.sprite.advance_animation();
}

/// Take `amount` off the ship unless it is invincible. Ends the game when
/// the energy runs out.
pub fn damage(ctx: &mut SimulationContext, amount: i32) {
    if ctx.ship.is_invincible() || ctx.is_game_over() {
        return;
    }
    let ship = &mut ctx.ship.sprite;
    ship.energy -= amount;
    ctx.events.push(FrameEvent::ShipDamaged { damage: amount });
    ctx.events.push(FrameEvent::Sound(SoundEffect::ShipHit));
    if !ship.is_destroyed() {
        ship.flash = true;
        return;
    }

    let (x, y) = ship.center();
    ship.visible = false;
    ctx.status = GameStatus::GameOver;
    ctx.events.push(FrameEvent::Explosion {
        x,
        y,
        scale: ExplosionScale::Large,
        delay: 0,
    });
    ctx.events.push(FrameEvent::Sound(SoundEffect::BigExplosion));
    ctx.events.push(FrameEvent::ShipDestroyed);
    info!(score = ctx.score, frame = ctx.frame, "ship destroyed");
}
