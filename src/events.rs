//! Things that happened during a frame, for the collaborators the core does
//! not own: audio, explosions and fragments, and the HUD.
//!
//! The list is cleared at the start of every tick.

use crate::entities::{EnemyKind, ExplosionScale, GemKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    PlayerShot,
    EnemyShot,
    EnemyHit,
    Explosion,
    BigExplosion,
    GemPickup,
    ShipHit,
    SatelliteLost,
    GuardianAlarm,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    Sound(SoundEffect),
    Explosion {
        x: f32,
        y: f32,
        scale: ExplosionScale,
        delay: u32,
    },
    Fragments {
        x: f32,
        y: f32,
        scale: ExplosionScale,
        count: u32,
        delay: u32,
        variant: u8,
    },
    /// The standard bonus table was consulted for a kill at this position.
    BonusRequested { x: f32, y: f32 },
    MeteorBonusRequested { x: f32, y: f32 },
    EnemyKilled { kind: EnemyKind, x: f32, y: f32 },
    GemCollected { kind: GemKind },
    ShipDamaged { damage: i32 },
    ShipDestroyed,
    SatelliteDestroyed,
    ExtraGunDestroyed,
    GuardianSpawned { number: u8 },
    GuardianDefeated { number: u8 },
}
