//! Enemy pool, spawn templates and the per-frame movement, fade and fire
//! step.

use tracing::{debug, trace};

use crate::context::{Playfield, SimulationContext};
use crate::curves::{angle_between, direction_frame, turn_toward, CurveBank, GridWave};
use crate::entities::{
    Enemy, EnemyBehavior, EnemyKind, ExplosionScale, Frames, LonelyMotion, MeteorSize, ShotOwner,
    Sprite,
};
use crate::events::{FrameEvent, SoundEffect};
use crate::pool::{Pool, SlotId};
use crate::shots::{Launch, Shots};
use crate::sprites::SpriteBank;

const ENEMY_SHOT_SPEED: f32 = 2.0;

// ── Templates ─────────────────────────────────────────────────────────────────

/// Base numbers for a kind of enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub power: i32,
    pub energy: i32,
    /// Frames between volleys before difficulty scaling; 0 never fires.
    pub fire_rate: u32,
    pub shot_power: i32,
    pub anim_delay: u32,
    pub scale: ExplosionScale,
}

pub fn stats_for(kind: EnemyKind) -> EnemyStats {
    let s = |power, energy, fire_rate, shot_power, anim_delay, scale| EnemyStats {
        power,
        energy,
        fire_rate,
        shot_power,
        anim_delay,
        scale,
    };
    match kind {
        EnemyKind::Swooper => s(2, 4, 90, 1, 0, ExplosionScale::Small),
        EnemyKind::Grunt => s(2, 6, 140, 1, 4, ExplosionScale::Small),
        EnemyKind::Meteor(MeteorSize::Small) => s(2, 3, 0, 0, 3, ExplosionScale::Small),
        EnemyKind::Meteor(MeteorSize::Medium) => s(4, 8, 0, 0, 4, ExplosionScale::Medium),
        EnemyKind::Meteor(MeteorSize::Large) => s(8, 16, 0, 0, 5, ExplosionScale::Large),
        EnemyKind::Decoy => s(2, 10, 70, 1, 3, ExplosionScale::Medium),
        EnemyKind::Wanderer => s(3, 8, 80, 2, 3, ExplosionScale::Small),
        EnemyKind::Missile => s(4, 2, 0, 0, 0, ExplosionScale::Small),
        EnemyKind::Guardian(_) => s(10, 200, 0, 2, 2, ExplosionScale::Huge),
    }
}

fn frames_for(bank: &SpriteBank, kind: EnemyKind) -> Frames {
    match kind {
        EnemyKind::Swooper => bank.swooper.clone(),
        EnemyKind::Grunt => bank.grunt.clone(),
        EnemyKind::Meteor(size) => bank.meteor(size),
        EnemyKind::Decoy => bank.decoy.clone(),
        EnemyKind::Wanderer => bank.wanderer.clone(),
        EnemyKind::Missile => bank.missile.clone(),
        EnemyKind::Guardian(n) => bank
            .guardian(n)
            .and_then(|parts| parts.first())
            .map(|p| p.idle.clone())
            .unwrap_or_else(|| bank.decoy.clone()),
    }
}

// ── Pool ──────────────────────────────────────────────────────────────────────

pub struct Enemies {
    pool: Pool<Enemy>,
}

impl Enemies {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: Pool::with_capacity("enemies", capacity),
        }
    }

    pub fn pool(&self) -> &Pool<Enemy> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool<Enemy> {
        &mut self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn get(&self, id: SlotId) -> Option<&Enemy> {
        self.pool.get(id)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Enemy> {
        self.pool.get_mut(id)
    }

    pub fn spawn(&mut self, enemy: Enemy) -> Option<SlotId> {
        let kind = enemy.kind;
        let id = self.pool.acquire(enemy);
        if id.is_none() {
            debug!(?kind, "enemy spawn skipped");
        }
        id
    }

    /// Build an enemy of `kind` from its template. `fire_rate` is already
    /// scaled for difficulty by the caller.
    pub fn from_template(
        bank: &SpriteBank,
        kind: EnemyKind,
        behavior: EnemyBehavior,
        x: f32,
        y: f32,
        fire_rate: u32,
    ) -> Enemy {
        let stats = stats_for(kind);
        let sprite = Sprite::new(frames_for(bank, kind), x, y)
            .with_combat(stats.power, stats.energy)
            .with_anim_delay(stats.anim_delay);
        Enemy {
            sprite,
            kind,
            behavior,
            fade: None,
            fire_rate,
            fire_counter: fire_rate,
            shot_power: stats.shot_power,
            vx: 0.0,
            vy: 0.0,
            scale: stats.scale,
        }
    }

    pub fn spawn_curve(
        &mut self,
        bank: &SpriteBank,
        curves: &CurveBank,
        curve: usize,
        fire_rate: u32,
    ) -> Option<SlotId> {
        let (x, y) = curves.get(curve)?.start();
        self.spawn(Self::from_template(
            bank,
            EnemyKind::Swooper,
            EnemyBehavior::Curve { curve, step: 0 },
            x,
            y,
            fire_rate,
        ))
    }

    pub fn spawn_grid(
        &mut self,
        bank: &SpriteBank,
        grid: &GridWave,
        col: i32,
        row: i32,
        fire_rate: u32,
    ) -> Option<SlotId> {
        let (x, y) = grid.cell_position(col, row);
        self.spawn(Self::from_template(
            bank,
            EnemyKind::Grunt,
            EnemyBehavior::Grid { col, row },
            x,
            y,
            fire_rate,
        ))
    }

    pub fn spawn_lonely(
        &mut self,
        bank: &SpriteBank,
        kind: EnemyKind,
        motion: LonelyMotion,
        x: f32,
        y: f32,
        fire_rate: u32,
    ) -> Option<SlotId> {
        self.spawn(Self::from_template(
            bank,
            kind,
            EnemyBehavior::Lonely(motion),
            x,
            y,
            fire_rate,
        ))
    }

    /// One constituent sprite of guardian `number`, using that part's idle
    /// image set. Guardians never fire on their own counter; the session
    /// fires for them.
    pub fn spawn_guardian_part(
        &mut self,
        bank: &SpriteBank,
        number: u8,
        part: usize,
        x: f32,
        y: f32,
    ) -> Option<SlotId> {
        let mut enemy = Self::from_template(
            bank,
            EnemyKind::Guardian(number),
            EnemyBehavior::Guardian { part },
            x,
            y,
            0,
        );
        if let Some(images) = bank.guardian(number).and_then(|parts| parts.get(part)) {
            enemy.sprite.set_frames(images.idle.clone());
        }
        self.spawn(enemy)
    }

    /// Live grid members still on the board.
    pub fn grid_members(&self) -> usize {
        self.pool
            .iter()
            .filter(|(_, e)| matches!(e.behavior, EnemyBehavior::Grid { .. }))
            .count()
    }
}

// ── Behaviour step ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Remove,
}

/// Read-only inputs a behaviour step may consult.
pub struct StepEnv<'a> {
    pub curves: &'a CurveBank,
    pub grid: Option<&'a GridWave>,
    pub ship_center: (f32, f32),
    pub field: Playfield,
}

impl EnemyBehavior {
    /// Move `sprite` one frame. Guardian parts are driven by their session
    /// and are left alone here.
    pub fn step(&mut self, sprite: &mut Sprite, env: &StepEnv<'_>) -> StepOutcome {
        match self {
            Self::Curve { curve, step } => {
                let Some(path) = env.curves.get(*curve) else {
                    return StepOutcome::Remove;
                };
                let Some((dx, dy)) = path.delta(*step) else {
                    return StepOutcome::Remove;
                };
                sprite.x += dx;
                sprite.y += dy;
                if let Some(facing) = path.facing(*step) {
                    sprite.frame = facing % sprite.frames.len();
                }
                *step += 1;
                StepOutcome::Continue
            }
            Self::Grid { col, row } => {
                let Some(grid) = env.grid else {
                    return StepOutcome::Remove;
                };
                let (x, y) = grid.cell_position(*col, *row);
                sprite.x = x;
                sprite.y = y;
                sprite.advance_animation();
                if y > env.field.height {
                    StepOutcome::Remove
                } else {
                    StepOutcome::Continue
                }
            }
            Self::Lonely(motion) => {
                match motion {
                    LonelyMotion::Drift { vx, vy } => {
                        sprite.x += *vx;
                        sprite.y += *vy;
                        sprite.advance_animation();
                    }
                    LonelyMotion::Sweep {
                        base_x,
                        amplitude,
                        phase,
                        vy,
                    } => {
                        *phase += 0.04;
                        sprite.x = *base_x + *amplitude * phase.sin();
                        sprite.y += *vy;
                        sprite.advance_animation();
                    }
                    LonelyMotion::Homing {
                        angle,
                        speed,
                        agility,
                    } => {
                        let here = sprite.center();
                        *angle = turn_toward(*angle, angle_between(here, env.ship_center), *agility);
                        sprite.x += angle.cos() * *speed;
                        sprite.y += angle.sin() * *speed;
                        sprite.frame = direction_frame(*angle) % sprite.frames.len();
                    }
                }
                if env.field.within_clip(sprite) {
                    StepOutcome::Continue
                } else {
                    StepOutcome::Remove
                }
            }
            Self::Guardian { .. } => StepOutcome::Continue,
        }
    }
}

// ── Per-frame update ──────────────────────────────────────────────────────────

/// Advance fades, movement, animation and fire for every enemy.
pub fn update(ctx: &mut SimulationContext) {
    let env = StepEnv {
        curves: &ctx.curves,
        grid: ctx.grid.as_ref(),
        ship_center: ctx.ship.sprite.center(),
        field: ctx.field,
    };
    let pool = &mut ctx.enemies.pool;
    let shots = &mut ctx.shots;
    let events = &mut ctx.events;
    let bank = &ctx.sprites;
    let mut guardian = ctx.guardian.as_mut();

    let mut cursor = pool.first();
    while let Some(id) = cursor {
        cursor = pool.next_of(id);
        let Some(enemy) = pool.get_mut(id) else {
            continue;
        };
        enemy.sprite.flash = false;

        if let Some(fade) = enemy.fade.as_mut() {
            fade.remaining = fade.remaining.saturating_sub(1);
            if fade.remaining == 0 {
                let was_guardian = enemy.is_guardian();
                pool.release(id);
                if was_guardian {
                    if let Some(session) = guardian.as_deref_mut() {
                        session.part_released(id);
                    }
                }
            }
            continue;
        }

        if enemy.is_guardian() {
            continue;
        }

        let (old_x, old_y) = (enemy.sprite.x, enemy.sprite.y);
        if enemy.behavior.step(&mut enemy.sprite, &env) == StepOutcome::Remove {
            pool.release(id);
            continue;
        }
        enemy.vx = enemy.sprite.x - old_x;
        enemy.vy = enemy.sprite.y - old_y;
        enemy.sprite.visible = env.field.on_screen(&enemy.sprite);

        if enemy.sprite.visible && enemy.fire_rate > 0 {
            if enemy.fire_counter == 0 {
                fire_volley(enemy, shots, bank, env.ship_center, events);
                enemy.fire_counter = enemy.fire_rate;
            } else {
                enemy.fire_counter -= 1;
            }
        }
    }
    trace!(active = pool.len(), "enemies updated");
}

/// One shot from every cannon of the enemy's current frame. Wanderers aim
/// at the ship, everything else fires along the cannon angle.
pub fn fire_volley(
    enemy: &Enemy,
    shots: &mut Shots,
    bank: &SpriteBank,
    ship_center: (f32, f32),
    events: &mut Vec<FrameEvent>,
) {
    let mut fired = false;
    for cannon in &enemy.sprite.image().cannons {
        let x = enemy.sprite.x + cannon.x as f32;
        let y = enemy.sprite.y + cannon.y as f32;
        let angle = if enemy.kind == EnemyKind::Wanderer {
            angle_between((x, y), ship_center)
        } else {
            cannon.angle
        };
        let launch = Launch {
            owner: ShotOwner::Enemy,
            x,
            y,
            angle,
            speed: ENEMY_SHOT_SPEED,
            power: enemy.shot_power,
        };
        fired |= shots.spawn_linear(bank.enemy_shot.clone(), launch).is_some();
    }
    if fired {
        events.push(FrameEvent::Sound(SoundEffect::EnemyShot));
    }
}
