//! Guardian bosses: scripted leg-based movement, cannon volleys and minion
//! timers layered on one or two enemy-pool sprites.
//!
//! Phases run `Appearing → Active → Dying`. While appearing the boss slides
//! down to its docking line, blinks, and cannot be hit. Once active it walks
//! its legs round-robin. Damage to any part drains the session's shared
//! energy; at zero every part fades at once and the session ends when the
//! last part's slot is released.

use std::f32::consts::FRAC_PI_2;

use tracing::{debug, info};

use crate::context::SimulationContext;
use crate::enemies::{fire_volley, stats_for};
use crate::entities::{EnemyKind, Fade, LonelyMotion};
use crate::events::{FrameEvent, SoundEffect};
use crate::pool::SlotId;

/// Pixels per frame while sliding in.
pub const APPEAR_SPEED: f32 = 1.0;

// ── Scripts ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Immobile,
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Heading {
    pub fn vector(self) -> (f32, f32) {
        const D: f32 = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            Self::Immobile => (0.0, 0.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::UpLeft => (-D, -D),
            Self::UpRight => (D, -D),
            Self::DownLeft => (-D, D),
            Self::DownRight => (D, D),
        }
    }
}

/// One movement leg: travel `heading` at `speed` for `frames` frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub heading: Heading,
    pub frames: u32,
    pub speed: f32,
}

const fn leg(heading: Heading, frames: u32, speed: f32) -> Leg {
    Leg {
        heading,
        frames,
        speed,
    }
}

/// Box the anchor (first part's top-left) is clamped to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Minion {
    Missile,
    Decoy,
    Wanderer,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardianScript {
    pub number: u8,
    pub energy: i32,
    pub power: i32,
    pub fire_rate: u32,
    pub legs: &'static [Leg],
    pub bounds: Bounds,
    /// Anchor y at which the slide-in ends.
    pub dock_y: f32,
    /// Offsets of each part from the anchor; the first is always (0, 0).
    pub parts: &'static [(f32, f32)],
    /// Minion kind and its spawn interval in frames.
    pub minions: &'static [(Minion, u32)],
}

use Heading::*;

const LEGS_1: [Leg; 5] = [
    leg(Immobile, 60, 0.0),
    leg(Left, 90, 1.0),
    leg(Right, 180, 1.0),
    leg(Immobile, 40, 0.0),
    leg(Left, 90, 1.0),
];
const LEGS_2: [Leg; 6] = [
    leg(Immobile, 50, 0.0),
    leg(DownRight, 60, 1.2),
    leg(UpRight, 60, 1.2),
    leg(Left, 120, 1.5),
    leg(Down, 30, 1.0),
    leg(Up, 30, 1.0),
];
const LEGS_3: [Leg; 5] = [
    leg(Immobile, 80, 0.0),
    leg(Right, 100, 0.8),
    leg(DownLeft, 50, 1.0),
    leg(UpLeft, 50, 1.0),
    leg(Right, 40, 0.8),
];
const LEGS_4: [Leg; 7] = [
    leg(Immobile, 40, 0.0),
    leg(Left, 60, 2.0),
    leg(Right, 120, 2.0),
    leg(Left, 60, 2.0),
    leg(Down, 40, 1.0),
    leg(Immobile, 30, 0.0),
    leg(Up, 40, 1.0),
];

/// Script for guardian `number` (1-based) on a screen `width` pixels wide.
pub fn script(number: u8, width: f32) -> Option<GuardianScript> {
    let bounds = |part_w: f32, y_max: f32| Bounds {
        x_min: 8.0,
        x_max: (width - 8.0 - part_w).max(8.0),
        y_min: 8.0,
        y_max,
    };
    let s = match number {
        1 => GuardianScript {
            number,
            energy: 180,
            power: 10,
            fire_rate: 50,
            legs: &LEGS_1,
            bounds: bounds(64.0, 40.0),
            dock_y: 16.0,
            parts: &[(0.0, 0.0)],
            minions: &[(Minion::Missile, 240)],
        },
        2 => GuardianScript {
            number,
            energy: 260,
            power: 10,
            fire_rate: 40,
            legs: &LEGS_2,
            bounds: bounds(104.0, 56.0),
            dock_y: 12.0,
            parts: &[(0.0, 0.0), (56.0, 0.0)],
            minions: &[(Minion::Decoy, 300)],
        },
        3 => GuardianScript {
            number,
            energy: 340,
            power: 12,
            fire_rate: 36,
            legs: &LEGS_3,
            bounds: bounds(80.0, 48.0),
            dock_y: 14.0,
            parts: &[(0.0, 0.0)],
            minions: &[(Minion::Missile, 200), (Minion::Wanderer, 360)],
        },
        4 => GuardianScript {
            number,
            energy: 420,
            power: 14,
            fire_rate: 30,
            legs: &LEGS_4,
            bounds: bounds(56.0, 48.0),
            dock_y: 10.0,
            parts: &[(0.0, 0.0), (12.0, 52.0)],
            minions: &[(Minion::Missile, 180), (Minion::Decoy, 420), (Minion::Wanderer, 300)],
        },
        _ => return None,
    };
    Some(s)
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardianPhase {
    Appearing,
    Active,
    Dying,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinionTimer {
    pub minion: Minion,
    pub interval: u32,
    pub countdown: u32,
}

#[derive(Clone, Debug)]
pub struct GuardianSession {
    pub number: u8,
    pub phase: GuardianPhase,
    pub parts: Vec<SlotId>,
    /// Parts whose slot has not been released yet.
    live_parts: usize,
    /// Top-left of the first part; the others follow at their offsets.
    pub x: f32,
    pub y: f32,
    pub energy: i32,
    pub max_energy: i32,
    pub leg_index: usize,
    pub leg_countdown: u32,
    pub fire_rate: u32,
    pub fire_counter: u32,
    pub minions: Vec<MinionTimer>,
    /// Frames since the session began; drives the appearing blink.
    pub frames: u32,
    script: GuardianScript,
}

impl GuardianSession {
    pub fn is_appearing(&self) -> bool {
        self.phase == GuardianPhase::Appearing
    }

    pub fn owns(&self, id: SlotId) -> bool {
        self.parts.contains(&id)
    }

    /// True for parts that are still sliding in and must not collide.
    pub fn is_appearing_part(&self, id: SlotId) -> bool {
        self.is_appearing() && self.owns(id)
    }

    pub fn current_leg(&self) -> Leg {
        self.script.legs[self.leg_index]
    }

    pub fn script(&self) -> &GuardianScript {
        &self.script
    }

    pub fn live_parts(&self) -> usize {
        self.live_parts
    }

    pub(crate) fn part_released(&mut self, id: SlotId) {
        if self.owns(id) {
            self.live_parts = self.live_parts.saturating_sub(1);
        }
    }

    fn part_position(&self, part: usize) -> (f32, f32) {
        let (ox, oy) = self.script.parts.get(part).copied().unwrap_or((0.0, 0.0));
        (self.x + ox, self.y + oy)
    }
}

/// Spawn guardian `number` above the screen. Fails without side effects if
/// the script is unknown, a session is already running, or the enemy pool
/// cannot take every part.
pub fn start(ctx: &mut SimulationContext, number: u8) -> bool {
    if ctx.guardian.is_some() {
        return false;
    }
    let Some(script) = script(number, ctx.field.width) else {
        return false;
    };
    let Some(frames) = ctx.sprites.guardian(number) else {
        return false;
    };
    let free = ctx.enemies.pool().capacity() - ctx.enemies.len();
    if free < script.parts.len() {
        debug!(number, free, "no room for guardian parts");
        return false;
    }

    let fire_rate = ctx.scaled_fire_rate(script.fire_rate);
    let height = frames
        .iter()
        .map(|p| p.idle[0].height as f32)
        .fold(0.0, f32::max);
    let (x, y) = ((ctx.field.width - frames[0].idle[0].width as f32) / 2.0, -height - 8.0);

    let mut parts = Vec::with_capacity(script.parts.len());
    for (index, (ox, oy)) in script.parts.iter().enumerate() {
        let Some(id) = ctx
            .enemies
            .spawn_guardian_part(&ctx.sprites, number, index, x + ox, y + oy)
        else {
            continue;
        };
        if let Some(part) = ctx.enemies.get_mut(id) {
            part.sprite.power = script.power;
            part.sprite.energy = script.energy;
            part.sprite.max_energy = script.energy;
            part.sprite.visible = false;
        }
        parts.push(id);
    }

    let live_parts = parts.len();
    ctx.guardian = Some(GuardianSession {
        number,
        phase: GuardianPhase::Appearing,
        parts,
        live_parts,
        x,
        y,
        energy: script.energy,
        max_energy: script.energy,
        leg_index: 0,
        leg_countdown: script.legs[0].frames,
        fire_rate,
        fire_counter: fire_rate,
        minions: script
            .minions
            .iter()
            .map(|&(minion, interval)| MinionTimer {
                minion,
                interval,
                countdown: interval,
            })
            .collect(),
        frames: 0,
        script,
    });
    ctx.events.push(FrameEvent::GuardianSpawned { number });
    ctx.events.push(FrameEvent::Sound(SoundEffect::GuardianAlarm));
    info!(number, "guardian spawned");
    true
}

// ── Per-frame update ──────────────────────────────────────────────────────────

/// Run the session's current phase for one frame.
pub fn update(ctx: &mut SimulationContext) {
    let Some(phase) = ctx.guardian.as_ref().map(|g| g.phase) else {
        return;
    };
    if let Some(session) = ctx.guardian.as_mut() {
        session.frames = session.frames.wrapping_add(1);
    }
    match phase {
        GuardianPhase::Appearing => appear(ctx),
        GuardianPhase::Active => {
            walk_legs(ctx);
            fire(ctx);
            spawn_minions(ctx);
        }
        GuardianPhase::Dying => {}
    }
    animate_parts(ctx);
}

/// End the session once every faded part has been released. Runs after the
/// enemy update that releases them.
pub fn finish_if_done(ctx: &mut SimulationContext) {
    let done = ctx
        .guardian
        .as_ref()
        .is_some_and(|g| g.phase == GuardianPhase::Dying && g.live_parts == 0);
    if !done {
        return;
    }
    if let Some(session) = ctx.guardian.take() {
        ctx.stage += 1;
        ctx.events.push(FrameEvent::GuardianDefeated {
            number: session.number,
        });
        info!(number = session.number, stage = ctx.stage, "guardian defeated");
    }
}

/// Apply `amount` of damage to the shared energy. Returns `true` when this
/// hit destroyed the guardian; every part then starts fading.
pub fn damage(ctx: &mut SimulationContext, amount: i32) -> bool {
    let Some(session) = ctx.guardian.as_mut() else {
        return false;
    };
    if session.phase != GuardianPhase::Active {
        return false;
    }
    session.energy -= amount;
    let energy = session.energy;
    let destroyed = energy <= 0;
    if destroyed {
        session.phase = GuardianPhase::Dying;
    }
    for &id in &session.parts {
        if let Some(part) = ctx.enemies.get_mut(id) {
            part.sprite.energy = energy;
            if destroyed {
                part.fade = Some(Fade::start());
                part.sprite.visible = true;
            }
        }
    }
    destroyed
}

fn appear(ctx: &mut SimulationContext) {
    let Some(session) = ctx.guardian.as_mut() else {
        return;
    };
    session.y += APPEAR_SPEED;
    let docked = session.y >= session.script.dock_y;
    if docked {
        session.y = session.script.dock_y;
        session.phase = GuardianPhase::Active;
        session.leg_index = 0;
        session.leg_countdown = session.script.legs[0].frames;
    }
    let blink_on = docked || session.frames % 2 == 0;

    for (index, &id) in session.parts.iter().enumerate() {
        let (x, y) = session.part_position(index);
        if let Some(part) = ctx.enemies.get_mut(id) {
            part.sprite.x = x;
            part.sprite.y = y;
            part.vx = 0.0;
            part.vy = APPEAR_SPEED;
            part.sprite.visible = blink_on;
        }
    }
}

fn walk_legs(ctx: &mut SimulationContext) {
    let Some(session) = ctx.guardian.as_mut() else {
        return;
    };
    let before = session.current_leg().heading;

    if session.leg_countdown == 0 {
        advance_leg(session);
    } else {
        session.leg_countdown -= 1;
    }

    let leg = session.current_leg();
    let (mut dx, mut dy) = (0.0, 0.0);
    if leg.heading != Heading::Immobile {
        let (ux, uy) = leg.heading.vector();
        let b = session.script.bounds;
        let nx = session.x + ux * leg.speed;
        let ny = session.y + uy * leg.speed;
        let cx = nx.clamp(b.x_min, b.x_max);
        let cy = ny.clamp(b.y_min, b.y_max);
        dx = cx - session.x;
        dy = cy - session.y;
        session.x = cx;
        session.y = cy;
        if cx != nx || cy != ny {
            advance_leg(session);
        }
    }
    let after = session.current_leg().heading;

    let swap = (before == Heading::Immobile) != (after == Heading::Immobile);
    let number = session.number;
    for (index, &id) in session.parts.iter().enumerate() {
        let (x, y) = session.part_position(index);
        let Some(part) = ctx.enemies.get_mut(id) else {
            continue;
        };
        part.sprite.x = x;
        part.sprite.y = y;
        part.vx = dx;
        part.vy = dy;
        part.sprite.visible = true;
        if swap {
            if let Some(images) = ctx.sprites.guardian(number).and_then(|p| p.get(index)) {
                let set = if after == Heading::Immobile {
                    images.idle.clone()
                } else {
                    images.moving.clone()
                };
                part.sprite.set_frames(set);
            }
        }
    }
}

fn advance_leg(session: &mut GuardianSession) {
    session.leg_index = (session.leg_index + 1) % session.script.legs.len();
    session.leg_countdown = session.script.legs[session.leg_index].frames;
}

fn fire(ctx: &mut SimulationContext) {
    let Some(session) = ctx.guardian.as_mut() else {
        return;
    };
    if session.fire_counter > 0 {
        session.fire_counter -= 1;
        return;
    }
    session.fire_counter = session.fire_rate;
    let ship_center = ctx.ship.sprite.center();
    for &id in &session.parts {
        if let Some(part) = ctx.enemies.get(id) {
            fire_volley(part, &mut ctx.shots, &ctx.sprites, ship_center, &mut ctx.events);
        }
    }
}

fn spawn_minions(ctx: &mut SimulationContext) {
    let Some(session) = ctx.guardian.as_mut() else {
        return;
    };
    let mut due = Vec::new();
    for timer in &mut session.minions {
        if timer.countdown == 0 {
            timer.countdown = timer.interval;
            due.push(timer.minion);
        } else {
            timer.countdown -= 1;
        }
    }
    if due.is_empty() {
        return;
    }

    let first = session.parts.first().and_then(|&id| ctx.enemies.get(id));
    let Some((cx, bottom)) = first.map(|p| (p.sprite.center().0, p.sprite.y + p.sprite.height()))
    else {
        return;
    };

    for minion in due {
        let (kind, motion) = match minion {
            Minion::Missile => (
                EnemyKind::Missile,
                LonelyMotion::Homing {
                    angle: FRAC_PI_2,
                    speed: 1.8,
                    agility: 0.04,
                },
            ),
            Minion::Decoy => (EnemyKind::Decoy, LonelyMotion::Drift { vx: 0.0, vy: 0.6 }),
            Minion::Wanderer => (
                EnemyKind::Wanderer,
                LonelyMotion::Sweep {
                    base_x: cx,
                    amplitude: 48.0,
                    phase: 0.0,
                    vy: 0.7,
                },
            ),
        };
        let rate = ctx.scaled_fire_rate(stats_for(kind).fire_rate);
        ctx.enemies
            .spawn_lonely(&ctx.sprites, kind, motion, cx - 8.0, bottom, rate);
    }
}

fn animate_parts(ctx: &mut SimulationContext) {
    let Some(session) = ctx.guardian.as_ref() else {
        return;
    };
    if session.phase == GuardianPhase::Dying {
        return;
    }
    for &id in &session.parts {
        if let Some(part) = ctx.enemies.get_mut(id) {
            part.sprite.advance_animation();
        }
    }
}
