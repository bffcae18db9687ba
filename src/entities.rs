//! All game entity types. Pure data plus small accessors, no frame logic.

use std::rc::Rc;

// ── Sprite metadata ───────────────────────────────────────────────────────────

/// Single pixel origin an attacking frame hits with, in frame-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionPoint {
    pub x: i32,
    pub y: i32,
}

/// Rectangle a defending frame can be hit in, in frame-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionZone {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Firing origin on a frame; `angle` is in radians, 0 = right, π/2 = down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cannon {
    pub x: i32,
    pub y: i32,
    pub angle: f32,
}

/// One animation frame of a sprite sheet with its collision metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageFrame {
    pub width: i32,
    pub height: i32,
    /// Centre of gravity, frame-local.
    pub cog_x: i32,
    pub cog_y: i32,
    pub points: Vec<CollisionPoint>,
    pub zones: Vec<CollisionZone>,
    pub cannons: Vec<Cannon>,
}

/// Shared, immutable frame list. Populated once at startup.
pub type Frames = Rc<[ImageFrame]>;

// ── Generic entity ────────────────────────────────────────────────────────────

/// The shape every pooled entity shares: position, animation and combat.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub frames: Frames,
    pub frame: usize,
    /// Frames to hold each animation image.
    pub anim_delay: u32,
    pub anim_counter: u32,
    /// Damage dealt on contact.
    pub power: i32,
    /// Remaining hit points; `<= 0` means destroyed.
    pub energy: i32,
    pub max_energy: i32,
    /// On screen; gates both drawing and collision.
    pub visible: bool,
    /// Draw with the white mask for one frame after a survived hit.
    pub flash: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            frames: Rc::from(Vec::new()),
            frame: 0,
            anim_delay: 0,
            anim_counter: 0,
            power: 0,
            energy: 0,
            max_energy: 0,
            visible: false,
            flash: false,
        }
    }
}

impl Sprite {
    pub fn new(frames: Frames, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            frames,
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_combat(mut self, power: i32, energy: i32) -> Self {
        self.power = power;
        self.energy = energy;
        self.max_energy = energy;
        self
    }

    pub fn with_anim_delay(mut self, delay: u32) -> Self {
        self.anim_delay = delay;
        self
    }

    /// Current image. Frame tables are validated non-empty at startup.
    pub fn image(&self) -> &ImageFrame {
        &self.frames[self.frame % self.frames.len()]
    }

    pub fn width(&self) -> f32 {
        self.image().width as f32
    }

    pub fn height(&self) -> f32 {
        self.image().height as f32
    }

    pub fn center(&self) -> (f32, f32) {
        let img = self.image();
        (self.x + img.cog_x as f32, self.y + img.cog_y as f32)
    }

    pub fn is_destroyed(&self) -> bool {
        self.energy <= 0
    }

    /// Step the looping animation by one frame.
    pub fn advance_animation(&mut self) {
        if self.frames.len() < 2 {
            return;
        }
        if self.anim_counter > 0 {
            self.anim_counter -= 1;
            return;
        }
        self.anim_counter = self.anim_delay;
        self.frame = (self.frame + 1) % self.frames.len();
    }

    /// Swap the image set and restart the animation.
    pub fn set_frames(&mut self, frames: Frames) {
        self.frames = frames;
        self.frame = 0;
        self.anim_counter = self.anim_delay;
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeteorSize {
    Small,
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Curve-wave flyer.
    #[default]
    Swooper,
    /// Grid-wave block member.
    Grunt,
    Meteor(MeteorSize),
    /// Never enraged by damage.
    Decoy,
    Wanderer,
    /// Homing missile launched by guardians.
    Missile,
    /// Constituent sprite of guardian `n`.
    Guardian(u8),
}

/// Size class used for explosions and fragment bursts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExplosionScale {
    #[default]
    Small,
    Medium,
    Large,
    Huge,
}

impl ExplosionScale {
    pub fn fragment_count(self) -> u32 {
        match self {
            Self::Small => 4,
            Self::Medium => 8,
            Self::Large => 14,
            Self::Huge => 24,
        }
    }
}

/// Per-instance motion state of a lonely foe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LonelyMotion {
    /// Straight line at a fixed velocity.
    Drift { vx: f32, vy: f32 },
    /// Horizontal sine sweep while descending.
    Sweep {
        base_x: f32,
        amplitude: f32,
        phase: f32,
        vy: f32,
    },
    /// Chases the ship, turning by at most `agility` radians per frame.
    Homing { angle: f32, speed: f32, agility: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyBehavior {
    Curve { curve: usize, step: usize },
    Grid { col: i32, row: i32 },
    Lonely(LonelyMotion),
    Guardian { part: usize },
}

impl Default for EnemyBehavior {
    fn default() -> Self {
        Self::Lonely(LonelyMotion::Drift { vx: 0.0, vy: 0.0 })
    }
}

/// Frames an entity spends fading out after its energy runs out.
pub const FADE_FRAMES: u32 = 20;
/// Length of the darkening palette used while fading.
pub const FADE_PALETTE_STEPS: u32 = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fade {
    pub remaining: u32,
}

impl Fade {
    pub fn start() -> Self {
        Self {
            remaining: FADE_FRAMES,
        }
    }

    /// Fading entities are drawn on even countdown values only.
    pub fn is_drawn(self) -> bool {
        self.remaining % 2 == 0
    }

    /// Palette step for the current countdown. The first drawn frame uses
    /// step 0 and the last drawn frame (countdown 2) the darkest step.
    pub fn color_index(self) -> u32 {
        let elapsed = FADE_FRAMES - self.remaining.min(FADE_FRAMES);
        let last_drawn = FADE_FRAMES - 2;
        (elapsed * (FADE_PALETTE_STEPS - 1) / last_drawn).min(FADE_PALETTE_STEPS - 1)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Enemy {
    pub sprite: Sprite,
    pub kind: EnemyKind,
    pub behavior: EnemyBehavior,
    /// Set once energy hits zero; the entity then only fades.
    pub fade: Option<Fade>,
    /// Frames between volleys.
    pub fire_rate: u32,
    pub fire_counter: u32,
    /// Power of destruction given to the shots it fires.
    pub shot_power: i32,
    /// Displacement applied during the last update.
    pub vx: f32,
    pub vy: f32,
    pub scale: ExplosionScale,
}

impl Enemy {
    pub fn new(sprite: Sprite, kind: EnemyKind, behavior: EnemyBehavior) -> Self {
        Self {
            sprite,
            kind,
            behavior,
            ..Self::default()
        }
    }

    pub fn is_dead(&self) -> bool {
        self.fade.is_some()
    }

    pub fn is_guardian(&self) -> bool {
        matches!(self.behavior, EnemyBehavior::Guardian { .. })
    }

    pub fn enrages_on_hit(&self) -> bool {
        self.kind != EnemyKind::Decoy
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShotOwner {
    #[default]
    Friend,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trajectory {
    Linear { vx: f32, vy: f32 },
    Homing { agility: f32 },
    Curve { curve: usize, step: usize },
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::Linear { vx: 0.0, vy: 0.0 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Shot {
    pub sprite: Sprite,
    pub owner: ShotOwner,
    pub trajectory: Trajectory,
    /// Frames left before the shot expires.
    pub ttl: u32,
    /// Heading in radians.
    pub angle: f32,
    pub speed: f32,
}

// ── Bonus gems ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GemKind {
    #[default]
    LevelUp1,
    LevelUp2,
    AddSatellite,
    RestoreEnergy,
    ScoreMultiplier,
}

#[derive(Clone, Debug, Default)]
pub struct Gem {
    pub sprite: Sprite,
    pub kind: GemKind,
    pub vy: f32,
}

// ── Ship attachments ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Debug, Default)]
pub struct ExtraGun {
    pub sprite: Sprite,
    pub side: Side,
    pub fire_counter: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Satellite {
    pub sprite: Sprite,
    /// Index into the orbit circle, before the ring rotation is added.
    pub offset: usize,
    pub fire_counter: u32,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Ship {
    pub sprite: Sprite,
    pub vx: f32,
    pub vy: f32,
    /// While non-zero the ship takes no damage.
    pub invincibility: u32,
    pub gun_level: u32,
    pub fire_counter: u32,
}

impl Ship {
    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Level {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Level {
    /// Multiplier applied to enemy fire rates, in percent.
    pub fn fire_rate_percent(self) -> u32 {
        match self {
            Self::Easy => 150,
            Self::Medium => 100,
            Self::Hard => 60,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    Playing,
    GameOver,
}

/// Pause/menu gate passed into every frame step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationGate {
    pub paused: bool,
    pub input_locked: bool,
}

impl SimulationGate {
    pub fn running() -> Self {
        Self::default()
    }

    pub fn is_frozen(self) -> bool {
        self.paused || self.input_locked
    }
}
