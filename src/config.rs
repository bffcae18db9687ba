//! Simulation tuning: pool capacities, screen geometry and ship numbers.
//!
//! Defaults match the shipped game. A JSON document or `SHMUP_*`
//! environment variables can override individual fields.

use std::env;

use serde::Deserialize;
use tracing::warn;

use crate::error::SimError;

pub const MAX_ENEMIES: usize = 180;
pub const MAX_SHOTS: usize = 400;
pub const MAX_GEMS: usize = 20;
pub const MAX_EXTRA_GUNS: usize = 2;
pub const MAX_SATELLITES: usize = 5;
/// Largest accepted `max_score_multiplier`.
pub const MAX_SCORE_SHIFT: u32 = 16;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub max_enemies: usize,
    pub max_shots: usize,
    pub max_gems: usize,
    pub max_extra_guns: usize,
    pub max_satellites: usize,
    /// Visible playfield, world pixels. The origin is the top-left corner.
    pub screen_width: f32,
    pub screen_height: f32,
    /// How far homing and curve followers may stray off screen before they
    /// are removed.
    pub clip_margin: f32,
    pub ship_energy: i32,
    pub ship_power: i32,
    pub ship_speed: f32,
    /// Frames of invincibility granted when a game starts.
    pub ship_spawn_invincibility: u32,
    pub ship_fire_rate: u32,
    pub max_gun_level: u32,
    pub max_score_multiplier: u32,
    /// Frames between random meteor spawns; 0 disables them.
    pub meteor_interval: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_enemies: MAX_ENEMIES,
            max_shots: MAX_SHOTS,
            max_gems: MAX_GEMS,
            max_extra_guns: MAX_EXTRA_GUNS,
            max_satellites: MAX_SATELLITES,
            screen_width: 256.0,
            screen_height: 184.0,
            clip_margin: 64.0,
            ship_energy: 100,
            ship_power: 2,
            ship_speed: 2.5,
            ship_spawn_invincibility: 150,
            ship_fire_rate: 6,
            max_gun_level: 5,
            max_score_multiplier: 3,
            meteor_interval: 400,
        }
    }
}

impl SimConfig {
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with `SHMUP_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        override_from_env("SHMUP_MAX_ENEMIES", &mut config.max_enemies);
        override_from_env("SHMUP_MAX_SHOTS", &mut config.max_shots);
        override_from_env("SHMUP_MAX_GEMS", &mut config.max_gems);
        override_from_env("SHMUP_SCREEN_WIDTH", &mut config.screen_width);
        override_from_env("SHMUP_SCREEN_HEIGHT", &mut config.screen_height);
        override_from_env("SHMUP_SHIP_ENERGY", &mut config.ship_energy);
        override_from_env("SHMUP_METEOR_INTERVAL", &mut config.meteor_interval);
        config
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let capacities = [
            ("max_enemies", self.max_enemies),
            ("max_shots", self.max_shots),
            ("max_gems", self.max_gems),
            ("max_extra_guns", self.max_extra_guns),
            ("max_satellites", self.max_satellites),
        ];
        for (field, value) in capacities {
            if value == 0 {
                return Err(SimError::InvalidConfig {
                    field,
                    reason: "capacity must be at least 1".to_string(),
                });
            }
        }
        if self.max_extra_guns > 2 {
            return Err(SimError::InvalidConfig {
                field: "max_extra_guns",
                reason: format!("{} requested, the ship has two sides", self.max_extra_guns),
            });
        }
        if self.screen_width <= 0.0 || self.screen_height <= 0.0 {
            return Err(SimError::InvalidConfig {
                field: "screen_width",
                reason: format!("{}x{} is empty", self.screen_width, self.screen_height),
            });
        }
        if self.max_score_multiplier > MAX_SCORE_SHIFT {
            return Err(SimError::InvalidConfig {
                field: "max_score_multiplier",
                reason: format!(
                    "{} exceeds the largest score shift of {MAX_SCORE_SHIFT}",
                    self.max_score_multiplier
                ),
            });
        }
        if self.ship_energy <= 0 {
            return Err(SimError::InvalidConfig {
                field: "ship_energy",
                reason: "ship must start alive".to_string(),
            });
        }
        Ok(())
    }
}

fn override_from_env<T: std::str::FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = env::var(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!(key, value = %raw, "ignoring unparsable override"),
    }
}
