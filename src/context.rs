//! The simulation context: every pool, the ship, the score and the session
//! flags, owned in one place and passed by reference into each system.

use crate::config::SimConfig;
use crate::curves::{CurveBank, GridWave};
use crate::director::Director;
use crate::enemies::Enemies;
use crate::entities::{GameStatus, Level, Ship, Sprite};
use crate::events::FrameEvent;
use crate::extra_guns::ExtraGuns;
use crate::gems::Gems;
use crate::guardians::GuardianSession;
use crate::satellites::Satellites;
use crate::shots::Shots;
use crate::sprites::SpriteBank;

/// Visible screen plus the wider clip rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    pub clip: f32,
}

impl Playfield {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            width: config.screen_width,
            height: config.screen_height,
            clip: config.clip_margin,
        }
    }

    /// Any part of the sprite overlaps the screen.
    pub fn on_screen(&self, sprite: &Sprite) -> bool {
        self.overlaps(sprite, 0.0)
    }

    /// Any part of the sprite is inside the screen grown by the clip margin.
    pub fn within_clip(&self, sprite: &Sprite) -> bool {
        self.overlaps(sprite, self.clip)
    }

    fn overlaps(&self, sprite: &Sprite, margin: f32) -> bool {
        sprite.x + sprite.width() > -margin
            && sprite.x < self.width + margin
            && sprite.y + sprite.height() > -margin
            && sprite.y < self.height + margin
    }
}

pub struct SimulationContext {
    pub config: SimConfig,
    pub field: Playfield,
    pub sprites: SpriteBank,
    pub curves: CurveBank,
    /// Present while a grid wave is on screen.
    pub grid: Option<GridWave>,
    pub ship: Ship,
    pub enemies: Enemies,
    pub shots: Shots,
    pub gems: Gems,
    pub guns: ExtraGuns,
    pub satellites: Satellites,
    /// Present from the moment a guardian spawns until its fade completes.
    pub guardian: Option<GuardianSession>,
    pub director: Director,
    pub events: Vec<FrameEvent>,
    pub score: u32,
    pub high_score: u32,
    /// Score awards are left-shifted by this.
    pub multiplier: u32,
    pub level: Level,
    pub status: GameStatus,
    pub frame: u64,
    /// Guardians defeated so far.
    pub stage: u32,
}

impl SimulationContext {
    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Award `base << multiplier`, keeping the high score in step.
    pub fn add_score(&mut self, base: u32) {
        let award = base.checked_shl(self.multiplier).unwrap_or(u32::MAX);
        self.score = self.score.saturating_add(award);
        self.high_score = self.high_score.max(self.score);
    }

    /// Enemy fire rate scaled by difficulty; 0 stays 0 (never fires).
    pub fn scaled_fire_rate(&self, base: u32) -> u32 {
        if base == 0 {
            return 0;
        }
        (base * self.level.fire_rate_percent() / 100).max(1)
    }

    /// Run the O(n) list walk on every pool. Debug builds only.
    pub fn debug_validate(&self) {
        self.enemies.pool().debug_validate();
        self.shots.pool().debug_validate();
        self.gems.pool().debug_validate();
        self.guns.pool().debug_validate();
        self.satellites.pool().debug_validate();
    }
}
