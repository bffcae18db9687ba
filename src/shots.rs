//! Projectile pool: player and enemy shots with linear, homing and
//! curve-following trajectories.

use tracing::trace;

use crate::context::SimulationContext;
use crate::curves::{angle_between, direction_frame, turn_toward};
use crate::entities::{Frames, Shot, ShotOwner, Sprite, Trajectory};
use crate::pool::{Pool, SlotId};

/// Default lifetime, long enough to cross the screen at the slowest speed.
pub const SHOT_TTL: u32 = 240;

/// Where a new shot starts and what it carries.
#[derive(Clone, Copy, Debug)]
pub struct Launch {
    pub owner: ShotOwner,
    /// Centre of the shot at spawn time.
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub speed: f32,
    pub power: i32,
}

pub struct Shots {
    pool: Pool<Shot>,
}

impl Shots {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity("shots", capacity),
        }
    }

    pub fn pool(&self) -> &Pool<Shot> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool<Shot> {
        &mut self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn get(&self, id: SlotId) -> Option<&Shot> {
        self.pool.get(id)
    }

    pub fn spawn(&mut self, shot: Shot) -> Option<SlotId> {
        self.pool.acquire(shot)
    }

    pub fn count_owned(&self, owner: ShotOwner) -> usize {
        self.pool.iter().filter(|(_, s)| s.owner == owner).count()
    }

    fn build(frames: Frames, launch: &Launch, trajectory: Trajectory) -> Shot {
        let mut sprite = Sprite::new(frames, 0.0, 0.0).with_combat(launch.power, 1);
        let (cog_x, cog_y) = {
            let img = sprite.image();
            (img.cog_x as f32, img.cog_y as f32)
        };
        sprite.x = launch.x - cog_x;
        sprite.y = launch.y - cog_y;
        if sprite.frames.len() > 1 && !matches!(trajectory, Trajectory::Linear { .. }) {
            sprite.frame = direction_frame(launch.angle) % sprite.frames.len();
        }
        Shot {
            sprite,
            owner: launch.owner,
            trajectory,
            ttl: SHOT_TTL,
            angle: launch.angle,
            speed: launch.speed,
        }
    }

    /// Straight line along `launch.angle`.
    pub fn spawn_linear(&mut self, frames: Frames, launch: Launch) -> Option<SlotId> {
        let trajectory = Trajectory::Linear {
            vx: launch.angle.cos() * launch.speed,
            vy: launch.angle.sin() * launch.speed,
        };
        self.spawn(Self::build(frames, &launch, trajectory))
    }

    pub fn spawn_homing(&mut self, frames: Frames, launch: Launch, agility: f32) -> Option<SlotId> {
        self.spawn(Self::build(frames, &launch, Trajectory::Homing { agility }))
    }

    pub fn spawn_curve(&mut self, frames: Frames, launch: Launch, curve: usize) -> Option<SlotId> {
        self.spawn(Self::build(
            frames,
            &launch,
            Trajectory::Curve { curve, step: 0 },
        ))
    }
}

// ── Per-frame update ──────────────────────────────────────────────────────────

/// Move every shot one frame and drop the expired or escaped ones.
pub fn update(ctx: &mut SimulationContext) {
    let field = ctx.field;
    let ship_center = ctx.ship.sprite.center();
    let guardian = ctx.guardian.as_ref();

    // Friend homing shots pick the nearest live enemy each frame.
    let targets: Vec<(f32, f32)> = ctx
        .enemies
        .pool()
        .iter()
        .filter(|(id, e)| {
            e.sprite.visible && !e.is_dead() && !guardian.is_some_and(|g| g.is_appearing_part(*id))
        })
        .map(|(_, e)| e.sprite.center())
        .collect();

    let pool = ctx.shots.pool_mut();
    let mut cursor = pool.first();
    while let Some(id) = cursor {
        cursor = pool.next_of(id);
        let Some(shot) = pool.get_mut(id) else {
            continue;
        };

        if shot.ttl == 0 {
            pool.release(id);
            continue;
        }
        shot.ttl -= 1;

        let keep = match shot.trajectory {
            Trajectory::Linear { vx, vy } => {
                shot.sprite.x += vx;
                shot.sprite.y += vy;
                shot.sprite.advance_animation();
                field.on_screen(&shot.sprite)
            }
            Trajectory::Homing { agility } => {
                let here = shot.sprite.center();
                let target = match shot.owner {
                    ShotOwner::Enemy => Some(ship_center),
                    ShotOwner::Friend => nearest(here, &targets),
                };
                if let Some(target) = target {
                    shot.angle = turn_toward(shot.angle, angle_between(here, target), agility);
                }
                shot.sprite.x += shot.angle.cos() * shot.speed;
                shot.sprite.y += shot.angle.sin() * shot.speed;
                shot.sprite.frame = direction_frame(shot.angle) % shot.sprite.frames.len();
                field.within_clip(&shot.sprite)
            }
            Trajectory::Curve { curve, step } => match ctx.curves.get(curve) {
                Some(path) => match path.delta(step) {
                    Some((dx, dy)) => {
                        // Two table steps per frame.
                        let (dx2, dy2) = path.delta(step + 1).unwrap_or((0.0, 0.0));
                        shot.sprite.x += dx + dx2;
                        shot.sprite.y += dy + dy2;
                        if let Some(facing) = path.facing(step) {
                            shot.sprite.frame = facing % shot.sprite.frames.len();
                        }
                        shot.trajectory = Trajectory::Curve {
                            curve,
                            step: step + 2,
                        };
                        field.within_clip(&shot.sprite)
                    }
                    None => false,
                },
                None => false,
            },
        };

        if keep {
            shot.sprite.visible = field.on_screen(&shot.sprite);
        } else {
            pool.release(id);
        }
    }
    trace!(active = pool.len(), "shots updated");
}

fn nearest(from: (f32, f32), targets: &[(f32, f32)]) -> Option<(f32, f32)> {
    targets.iter().copied().min_by(|a, b| {
        let da = (a.0 - from.0).powi(2) + (a.1 - from.1).powi(2);
        let db = (b.0 - from.0).powi(2) + (b.1 - from.1).powi(2);
        da.total_cmp(&db)
    })
}
