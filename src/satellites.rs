//! Satellites: protective orbiters on a rotating circle around the ship.

use std::f32::consts::{FRAC_PI_2, TAU};

use tracing::debug;

use crate::context::SimulationContext;
use crate::entities::{Satellite, ShotOwner, Sprite};
use crate::pool::{Pool, SlotId};
use crate::shots::Launch;
use crate::sprites::SpriteBank;

/// Points on the precomputed orbit circle.
pub const ORBIT_POINTS: usize = 64;
pub const ORBIT_RADIUS: f32 = 28.0;

const SATELLITE_ENERGY: i32 = 6;
const SATELLITE_POWER: i32 = 3;
const SATELLITE_FIRE_RATE: u32 = 40;
const SATELLITE_SHOT_POWER: i32 = 1;
const SATELLITE_SHOT_SPEED: f32 = 4.0;

pub struct Satellites {
    pool: Pool<Satellite>,
    circle: Vec<(f32, f32)>,
    /// Ring rotation, added to every member's offset.
    rotation: usize,
}

impl Satellites {
    pub fn new(capacity: usize) -> Self {
        let circle = (0..ORBIT_POINTS)
            .map(|i| {
                let a = i as f32 * TAU / ORBIT_POINTS as f32;
                (a.cos() * ORBIT_RADIUS, a.sin() * ORBIT_RADIUS)
            })
            .collect();
        Self {
            pool: Pool::with_capacity("satellites", capacity),
            circle,
            rotation: 0,
        }
    }

    pub fn pool(&self) -> &Pool<Satellite> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool<Satellite> {
        &mut self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Add one satellite and re-space the ring.
    pub fn add(&mut self, bank: &SpriteBank) -> Option<SlotId> {
        let sprite = Sprite::new(bank.satellite.clone(), 0.0, 0.0)
            .with_combat(SATELLITE_POWER, SATELLITE_ENERGY)
            .with_anim_delay(2);
        let Some(id) = self.pool.acquire(Satellite {
            sprite,
            offset: 0,
            fire_counter: SATELLITE_FIRE_RATE,
        }) else {
            debug!("satellite ring full");
            return None;
        };
        self.respace();
        Some(id)
    }

    /// Drop one satellite and re-space the survivors.
    pub fn remove(&mut self, id: SlotId) -> bool {
        let removed = self.pool.release(id);
        if removed {
            self.respace();
        }
        removed
    }

    /// Spread the members evenly around the circle, in list order.
    pub fn respace(&mut self) {
        let n = self.pool.len();
        if n == 0 {
            return;
        }
        for (i, id) in self.pool.ids().into_iter().enumerate() {
            if let Some(sat) = self.pool.get_mut(id) {
                sat.offset = i * ORBIT_POINTS / n;
            }
        }
    }

    /// Circle point of a member relative to the ship's centre.
    pub fn orbit_point(&self, offset: usize) -> (f32, f32) {
        self.circle[(offset + self.rotation) % ORBIT_POINTS]
    }
}

/// Rotate the ring, place each satellite on it and fire the reloaded ones.
pub fn update(ctx: &mut SimulationContext) {
    let (cx, cy) = ctx.ship.sprite.center();
    let field = ctx.field;
    let frames = ctx.sprites.friend_shot.clone();

    let ring = &mut ctx.satellites;
    ring.rotation = (ring.rotation + 1) % ORBIT_POINTS;

    let ids = ring.pool.ids();
    for id in ids {
        let offset = match ring.pool.get(id) {
            Some(sat) => sat.offset,
            None => continue,
        };
        let (ox, oy) = ring.orbit_point(offset);
        let Some(sat) = ring.pool.get_mut(id) else {
            continue;
        };
        sat.sprite.flash = false;
        let img = sat.sprite.image();
        let (cog_x, cog_y) = (img.cog_x as f32, img.cog_y as f32);
        sat.sprite.x = cx + ox - cog_x;
        sat.sprite.y = cy + oy - cog_y;
        sat.sprite.advance_animation();
        sat.sprite.visible = field.on_screen(&sat.sprite);

        if sat.fire_counter > 0 {
            sat.fire_counter -= 1;
            continue;
        }
        sat.fire_counter = SATELLITE_FIRE_RATE;
        if sat.sprite.visible {
            let (sx, sy) = sat.sprite.center();
            ctx.shots.spawn_linear(
                frames.clone(),
                Launch {
                    owner: ShotOwner::Friend,
                    x: sx,
                    y: sy,
                    angle: -FRAC_PI_2,
                    speed: SATELLITE_SHOT_SPEED,
                    power: SATELLITE_SHOT_POWER,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respace_spreads_members_evenly() {
        let bank = SpriteBank::builtin();
        let mut ring = Satellites::new(5);
        for _ in 0..4 {
            ring.add(&bank).unwrap();
        }
        let offsets: Vec<usize> = ring.pool().iter().map(|(_, s)| s.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48]);
    }

    #[test]
    fn full_ring_refuses_more() {
        let bank = SpriteBank::builtin();
        let mut ring = Satellites::new(5);
        for _ in 0..5 {
            assert!(ring.add(&bank).is_some());
        }
        assert!(ring.add(&bank).is_none());
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn orbit_points_lie_on_the_circle() {
        let ring = Satellites::new(1);
        for offset in [0, 7, 31, 63] {
            let (x, y) = ring.orbit_point(offset);
            assert!(((x * x + y * y).sqrt() - ORBIT_RADIUS).abs() < 1e-3);
        }
    }
}
