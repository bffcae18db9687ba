//! Sprite tables consumed by the simulation.
//!
//! Loading sheets from disk belongs to the front-end; the core only needs
//! each frame's size, centre of gravity, collision points/zones and cannons.
//! [`SpriteBank::builtin`] builds a complete procedural set so the
//! simulation and the terminal front-end run without any asset files.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::rc::Rc;

use crate::curves::ROTATION_FRAMES;
use crate::entities::{
    Cannon, CollisionPoint, CollisionZone, Frames, GemKind, ImageFrame, MeteorSize,
};
use crate::error::SimError;

/// Guardians shipped in the built-in bank.
pub const GUARDIAN_COUNT: usize = 4;

/// Idle and moving image sets of one guardian part.
#[derive(Clone, Debug)]
pub struct GuardianFrames {
    pub idle: Frames,
    pub moving: Frames,
}

#[derive(Clone, Debug)]
pub struct SpriteBank {
    pub ship: Frames,
    pub swooper: Frames,
    pub grunt: Frames,
    pub meteor_small: Frames,
    pub meteor_medium: Frames,
    pub meteor_large: Frames,
    pub decoy: Frames,
    pub wanderer: Frames,
    pub missile: Frames,
    /// Per guardian, one entry per constituent part.
    pub guardians: Vec<Vec<GuardianFrames>>,
    pub friend_shot: Frames,
    pub friend_homing: Frames,
    pub enemy_shot: Frames,
    pub enemy_homing: Frames,
    pub gem_level_up1: Frames,
    pub gem_level_up2: Frames,
    pub gem_satellite: Frames,
    pub gem_energy: Frames,
    pub gem_multiplier: Frames,
    pub extra_gun: Frames,
    pub satellite: Frames,
}

// ── Frame builders ────────────────────────────────────────────────────────────

/// A body frame: one inset hit zone, a centre point plus four inner points
/// to hit with, and the given cannons.
pub fn body_frame(width: i32, height: i32, cannons: Vec<Cannon>) -> ImageFrame {
    let (cx, cy) = (width / 2, height / 2);
    let (ix, iy) = (width / 8, height / 8);
    let (qx, qy) = (width / 4, height / 4);
    ImageFrame {
        width,
        height,
        cog_x: cx,
        cog_y: cy,
        points: vec![
            CollisionPoint { x: cx, y: cy },
            CollisionPoint { x: cx, y: qy },
            CollisionPoint { x: qx, y: cy },
            CollisionPoint { x: width - qx, y: cy },
            CollisionPoint { x: cx, y: height - qy },
        ],
        zones: vec![CollisionZone {
            x: ix,
            y: iy,
            w: width - 2 * ix,
            h: height - 2 * iy,
        }],
        cannons,
    }
}

/// A projectile frame: a single centre point, no zone.
pub fn bullet_frame(width: i32, height: i32) -> ImageFrame {
    ImageFrame {
        width,
        height,
        cog_x: width / 2,
        cog_y: height / 2,
        points: vec![CollisionPoint {
            x: width / 2,
            y: height / 2,
        }],
        zones: Vec::new(),
        cannons: Vec::new(),
    }
}

/// A pickup or attachment frame: zone only.
pub fn pickup_frame(width: i32, height: i32) -> ImageFrame {
    ImageFrame {
        width,
        height,
        cog_x: width / 2,
        cog_y: height / 2,
        points: Vec::new(),
        zones: vec![CollisionZone {
            x: 0,
            y: 0,
            w: width,
            h: height,
        }],
        cannons: Vec::new(),
    }
}

fn repeat(frame: ImageFrame, count: usize) -> Frames {
    Rc::from(vec![frame; count])
}

/// 32 frames, frame `i` facing `i * 2π / 32`, each with one nose cannon.
fn rotations(make: impl Fn(f32) -> ImageFrame) -> Frames {
    (0..ROTATION_FRAMES)
        .map(|i| make(i as f32 * TAU / ROTATION_FRAMES as f32))
        .collect::<Vec<_>>()
        .into()
}

fn down_cannon(x: i32, y: i32) -> Cannon {
    Cannon {
        x,
        y,
        angle: FRAC_PI_2,
    }
}

fn guardian_part(width: i32, height: i32, cannons: Vec<Cannon>) -> GuardianFrames {
    GuardianFrames {
        idle: repeat(body_frame(width, height, cannons.clone()), 2),
        moving: repeat(body_frame(width, height, cannons), 4),
    }
}

impl SpriteBank {
    pub fn builtin() -> Self {
        let spread = |w: i32, h: i32| {
            vec![
                down_cannon(w / 4, h),
                down_cannon(w / 2, h),
                down_cannon(w - w / 4, h),
            ]
        };

        let guardians = vec![
            vec![guardian_part(64, 40, spread(64, 40))],
            vec![
                guardian_part(48, 40, vec![down_cannon(24, 40)]),
                guardian_part(48, 40, vec![down_cannon(24, 40)]),
            ],
            vec![guardian_part(
                80,
                48,
                vec![
                    down_cannon(10, 48),
                    Cannon {
                        x: 40,
                        y: 48,
                        angle: FRAC_PI_2 - 0.4,
                    },
                    Cannon {
                        x: 40,
                        y: 48,
                        angle: FRAC_PI_2 + 0.4,
                    },
                    down_cannon(70, 48),
                ],
            )],
            vec![
                guardian_part(56, 56, spread(56, 56)),
                guardian_part(32, 24, vec![down_cannon(16, 24)]),
            ],
        ];

        Self {
            ship: repeat(body_frame(16, 16, Vec::new()), 1),
            swooper: rotations(|a| {
                body_frame(
                    16,
                    16,
                    vec![Cannon {
                        x: 8,
                        y: 8,
                        angle: a,
                    }],
                )
            }),
            grunt: repeat(body_frame(16, 12, vec![down_cannon(8, 12)]), 4),
            meteor_small: repeat(body_frame(12, 12, Vec::new()), 8),
            meteor_medium: repeat(body_frame(20, 20, Vec::new()), 8),
            meteor_large: repeat(body_frame(32, 32, Vec::new()), 8),
            decoy: repeat(body_frame(16, 16, vec![down_cannon(8, 16)]), 4),
            wanderer: repeat(body_frame(16, 16, vec![down_cannon(8, 16)]), 6),
            missile: rotations(|_| body_frame(8, 8, Vec::new())),
            guardians,
            friend_shot: repeat(bullet_frame(2, 6), 1),
            friend_homing: rotations(|_| bullet_frame(4, 4)),
            enemy_shot: repeat(bullet_frame(4, 4), 2),
            enemy_homing: rotations(|_| bullet_frame(6, 6)),
            gem_level_up1: repeat(pickup_frame(10, 10), 6),
            gem_level_up2: repeat(pickup_frame(10, 10), 6),
            gem_satellite: repeat(pickup_frame(10, 10), 6),
            gem_energy: repeat(pickup_frame(10, 10), 6),
            gem_multiplier: repeat(pickup_frame(10, 10), 6),
            extra_gun: repeat(pickup_frame(8, 12), 4),
            satellite: repeat(pickup_frame(8, 8), 8),
        }
    }

    pub fn meteor(&self, size: MeteorSize) -> Frames {
        match size {
            MeteorSize::Small => self.meteor_small.clone(),
            MeteorSize::Medium => self.meteor_medium.clone(),
            MeteorSize::Large => self.meteor_large.clone(),
        }
    }

    pub fn gem(&self, kind: GemKind) -> Frames {
        match kind {
            GemKind::LevelUp1 => self.gem_level_up1.clone(),
            GemKind::LevelUp2 => self.gem_level_up2.clone(),
            GemKind::AddSatellite => self.gem_satellite.clone(),
            GemKind::RestoreEnergy => self.gem_energy.clone(),
            GemKind::ScoreMultiplier => self.gem_multiplier.clone(),
        }
    }

    /// Part frames of guardian `number` (1-based).
    pub fn guardian(&self, number: u8) -> Option<&[GuardianFrames]> {
        let index = usize::from(number).checked_sub(1)?;
        self.guardians.get(index).map(Vec::as_slice)
    }

    /// Every table must hold at least one frame before the first tick; the
    /// hot path indexes frames without checking.
    pub fn validate(&self) -> Result<(), SimError> {
        let tables: [(&'static str, &Frames); 20] = [
            ("ship", &self.ship),
            ("swooper", &self.swooper),
            ("grunt", &self.grunt),
            ("meteor_small", &self.meteor_small),
            ("meteor_medium", &self.meteor_medium),
            ("meteor_large", &self.meteor_large),
            ("decoy", &self.decoy),
            ("wanderer", &self.wanderer),
            ("missile", &self.missile),
            ("friend_shot", &self.friend_shot),
            ("friend_homing", &self.friend_homing),
            ("enemy_shot", &self.enemy_shot),
            ("enemy_homing", &self.enemy_homing),
            ("gem_level_up1", &self.gem_level_up1),
            ("gem_level_up2", &self.gem_level_up2),
            ("gem_satellite", &self.gem_satellite),
            ("gem_energy", &self.gem_energy),
            ("gem_multiplier", &self.gem_multiplier),
            ("extra_gun", &self.extra_gun),
            ("satellite", &self.satellite),
        ];
        for (name, frames) in tables {
            if frames.is_empty() {
                return Err(SimError::MissingSprite { name });
            }
        }

        if self.guardians.is_empty() {
            return Err(SimError::MissingSprite { name: "guardians" });
        }
        for parts in &self.guardians {
            if parts.is_empty()
                || parts
                    .iter()
                    .any(|p| p.idle.is_empty() || p.moving.is_empty())
            {
                return Err(SimError::MissingSprite { name: "guardian" });
            }
        }
        Ok(())
    }
}
