use std::rc::Rc;

use shmup_core::compute::*;
use shmup_core::config::SimConfig;
use shmup_core::context::SimulationContext;
use shmup_core::director::Phase;
use shmup_core::dispatch;
use shmup_core::entities::*;
use shmup_core::error::SimError;
use shmup_core::events::{FrameEvent, SoundEffect};
use shmup_core::render::{draw_world, Canvas, Layer, Mask};
use shmup_core::ship;
use shmup_core::sprites::SpriteBank;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_state() -> SimulationContext {
    init_state(Level::Easy, SimConfig::default(), SpriteBank::builtin(), 0).unwrap()
}

/// No scripted content and no spawn protection.
fn quiet_state() -> SimulationContext {
    let config = SimConfig {
        meteor_interval: 0,
        ship_spawn_invincibility: 0,
        ..SimConfig::default()
    };
    let mut ctx = init_state(Level::Easy, config, SpriteBank::builtin(), 0).unwrap();
    ctx.director.phase = Phase::Intermission { countdown: u32::MAX };
    ctx
}

fn still_enemy(ctx: &mut SimulationContext, x: f32, y: f32, energy: i32) -> shmup_core::pool::SlotId {
    let frames: Frames = Rc::from(vec![ImageFrame {
        width: 8,
        height: 8,
        cog_x: 4,
        cog_y: 4,
        zones: vec![CollisionZone { x: 0, y: 0, w: 8, h: 8 }],
        ..ImageFrame::default()
    }]);
    let sprite = Sprite::new(frames, x, y).with_combat(2, energy);
    ctx.enemies
        .spawn(Enemy::new(sprite, EnemyKind::Grunt, EnemyBehavior::default()))
        .unwrap()
}

#[derive(Default)]
struct Recorder {
    plain: Vec<Layer>,
    masked: Vec<(Layer, Mask)>,
}

impl Canvas for Recorder {
    fn draw_sprite(&mut self, layer: Layer, _image: &ImageFrame, _x: f32, _y: f32) {
        self.plain.push(layer);
    }

    fn draw_sprite_masked(&mut self, layer: Layer, mask: Mask, _image: &ImageFrame, _x: f32, _y: f32) {
        self.masked.push((layer, mask));
    }
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_ship_position() {
    let s = make_state();
    let ship = &s.ship;
    assert_eq!(ship.sprite.x, (256.0 - ship.sprite.width()) / 2.0);
    assert!(ship.sprite.y + ship.sprite.height() < 184.0);
    assert_eq!(ship.sprite.energy, 100);
    assert_eq!(ship.invincibility, 150);
    assert_eq!(ship.gun_level, 0);
}

#[test]
fn init_state_empty_pools() {
    let s = make_state();
    assert!(s.enemies.is_empty());
    assert!(s.shots.is_empty());
    assert!(s.gems.is_empty());
    assert!(s.guns.is_empty());
    assert!(s.satellites.is_empty());
    assert!(s.guardian.is_none());
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn init_state_keeps_level_and_high_score() {
    let s = init_state(Level::Hard, SimConfig::default(), SpriteBank::builtin(), 777).unwrap();
    assert_eq!(s.level, Level::Hard);
    assert_eq!(s.high_score, 777);
}

#[test]
fn init_state_rejects_zero_capacity() {
    let config = SimConfig {
        max_shots: 0,
        ..SimConfig::default()
    };
    let err = init_state(Level::Easy, config, SpriteBank::builtin(), 0).err();
    assert!(matches!(
        err,
        Some(SimError::InvalidConfig { field: "max_shots", .. })
    ));
}

#[test]
fn init_state_rejects_empty_sprite_table() {
    let mut bank = SpriteBank::builtin();
    bank.enemy_shot = Rc::from(Vec::new());
    let err = init_state(Level::Easy, SimConfig::default(), bank, 0).err();
    assert_eq!(err, Some(SimError::MissingSprite { name: "enemy_shot" }));
}

// ── Gate ──────────────────────────────────────────────────────────────────────

#[test]
fn paused_tick_changes_nothing() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    let gate = SimulationGate {
        paused: true,
        input_locked: false,
    };
    let (x, y) = (s.ship.sprite.x, s.ship.sprite.y);
    for _ in 0..50 {
        tick(&mut s, gate, &mut rng);
    }
    assert_eq!(s.frame, 0);
    assert_eq!((s.ship.sprite.x, s.ship.sprite.y), (x, y));
    assert_eq!(s.ship.invincibility, 150);
    assert!(s.enemies.is_empty());
}

#[test]
fn locked_input_ignores_steering_and_fire() {
    let mut s = make_state();
    let gate = SimulationGate {
        paused: false,
        input_locked: true,
    };
    steer_ship(&mut s, gate, 1.0, 0.0);
    assert!(!player_fire(&mut s, gate));
    assert_eq!(s.ship.vx, 0.0);
    assert!(s.shots.is_empty());
}

// ── Ship ──────────────────────────────────────────────────────────────────────

#[test]
fn steering_is_clamped_to_the_screen() {
    let mut s = quiet_state();
    let mut rng = seeded_rng();
    let gate = SimulationGate::running();
    for _ in 0..300 {
        steer_ship(&mut s, gate, -1.0, -1.0);
        tick(&mut s, gate, &mut rng);
    }
    assert_eq!((s.ship.sprite.x, s.ship.sprite.y), (0.0, 0.0));

    for _ in 0..300 {
        steer_ship(&mut s, gate, 1.0, 1.0);
        tick(&mut s, gate, &mut rng);
    }
    assert_eq!(s.ship.sprite.x, 256.0 - s.ship.sprite.width());
    assert_eq!(s.ship.sprite.y, 184.0 - s.ship.sprite.height());
}

#[test]
fn steering_speed_is_capped() {
    let mut s = quiet_state();
    let gate = SimulationGate::running();
    for _ in 0..10 {
        steer_ship(&mut s, gate, 1.0, 0.0);
    }
    assert_eq!(s.ship.vx, s.config.ship_speed);
}

#[test]
fn fire_respects_the_reload_counter() {
    let mut s = quiet_state();
    let gate = SimulationGate::running();

    assert!(player_fire(&mut s, gate));
    assert_eq!(s.shots.count_owned(ShotOwner::Friend), 1);
    assert!(s.events.contains(&FrameEvent::Sound(SoundEffect::PlayerShot)));

    assert!(!player_fire(&mut s, gate));
    assert_eq!(s.shots.len(), 1);
}

#[test]
fn higher_gun_levels_fire_more_shots() {
    let mut counts = Vec::new();
    for level in 0..=5 {
        let mut s = quiet_state();
        s.ship.gun_level = level;
        player_fire(&mut s, SimulationGate::running());
        counts.push(s.shots.len());
    }
    assert_eq!(counts, vec![1, 2, 5, 6, 8, 10]);
}

#[test]
fn extra_guns_fire_with_the_ship() {
    let mut s = quiet_state();
    s.guns.add(&s.sprites).unwrap();
    s.guns.add(&s.sprites).unwrap();
    let mut rng = seeded_rng();
    tick(&mut s, SimulationGate::running(), &mut rng);

    player_fire(&mut s, SimulationGate::running());

    assert_eq!(s.shots.len(), 3);
}

// ── Tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_advances_the_frame_and_clears_events() {
    let mut s = quiet_state();
    let mut rng = seeded_rng();
    s.events.push(FrameEvent::ShipDestroyed);
    tick(&mut s, SimulationGate::running(), &mut rng);
    assert_eq!(s.frame, 1);
    assert!(!s.events.contains(&FrameEvent::ShipDestroyed));
}

#[test]
fn director_launches_the_first_wave() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    for _ in 0..120 {
        tick(&mut s, SimulationGate::running(), &mut rng);
    }
    assert!(s
        .enemies
        .pool()
        .iter()
        .any(|(_, e)| e.kind == EnemyKind::Swooper));
}

#[test]
fn same_seed_same_game() {
    let run = || {
        let mut s = make_state();
        let mut rng = seeded_rng();
        let gate = SimulationGate::running();
        for i in 0..600 {
            if i % 3 == 0 {
                player_fire(&mut s, gate);
            }
            tick(&mut s, gate, &mut rng);
        }
        let positions: Vec<(f32, f32)> = s
            .enemies
            .pool()
            .iter()
            .map(|(_, e)| (e.sprite.x, e.sprite.y))
            .collect();
        (s.score, s.shots.len(), positions)
    };
    assert_eq!(run(), run());
}

#[test]
fn killed_enemy_fades_for_twenty_frames() {
    let mut s = quiet_state();
    let mut rng = seeded_rng();
    let gate = SimulationGate::running();
    let id = still_enemy(&mut s, 100.0, 50.0, 1);
    tick(&mut s, gate, &mut rng);

    assert!(dispatch::hit_enemy(&mut s, id, 1, &mut rng));
    // Keep the pool to the one fading enemy.
    s.gems.take_penalties();

    let mut drawn = Vec::new();
    for _ in 0..FADE_FRAMES - 1 {
        tick(&mut s, gate, &mut rng);
        assert!(s.enemies.pool().is_enabled(id));
        let mut canvas = Recorder::default();
        draw_world(&s, &mut canvas);
        drawn.push(canvas.masked.iter().any(|(l, _)| *l == Layer::Enemy));
        assert!(!canvas.plain.contains(&Layer::Enemy));
    }
    // Countdown 19, 18, ... 1: drawn on the even values only.
    let expected: Vec<bool> = (1..FADE_FRAMES).rev().map(|r| r % 2 == 0).collect();
    assert_eq!(drawn, expected);

    tick(&mut s, gate, &mut rng);
    assert!(!s.enemies.pool().is_enabled(id));
    assert!(s.enemies.is_empty());
}

#[test]
fn game_over_freezes_the_ship_but_not_the_clock() {
    let mut s = quiet_state();
    let mut rng = seeded_rng();
    let gate = SimulationGate::running();
    ship::damage(&mut s, 1000);
    assert!(s.is_game_over());
    assert!(s.events.contains(&FrameEvent::ShipDestroyed));

    let x = s.ship.sprite.x;
    steer_ship(&mut s, gate, 1.0, 0.0);
    assert!(!player_fire(&mut s, gate));
    tick(&mut s, gate, &mut rng);

    assert_eq!(s.frame, 1);
    assert_eq!(s.ship.sprite.x, x);
    assert!(s.shots.is_empty());
}

#[test]
fn spawn_invincibility_blinks_and_wears_off() {
    let mut s = make_state();
    s.director.phase = Phase::Intermission { countdown: u32::MAX };
    let mut rng = seeded_rng();
    let gate = SimulationGate::running();

    let mut hidden = 0;
    for _ in 0..150 {
        tick(&mut s, gate, &mut rng);
        let mut canvas = Recorder::default();
        draw_world(&s, &mut canvas);
        if !canvas.plain.contains(&Layer::Ship) {
            hidden += 1;
        }
    }
    assert!(hidden > 0);
    assert!(!s.ship.is_invincible());

    let mut canvas = Recorder::default();
    draw_world(&s, &mut canvas);
    assert!(canvas.plain.contains(&Layer::Ship));
}

#[test]
fn score_is_shifted_by_the_multiplier() {
    let mut s = make_state();
    s.add_score(250);
    s.multiplier = 3;
    s.add_score(250);
    assert_eq!(s.score, 250 + (250 << 3));
    assert_eq!(s.high_score, s.score);
}

#[test]
fn score_saturates_at_any_multiplier() {
    let mut s = make_state();
    s.multiplier = 32;
    s.add_score(250);
    assert_eq!(s.score, u32::MAX);

    s.add_score(1);
    assert_eq!(s.score, u32::MAX);
    assert_eq!(s.high_score, u32::MAX);
}

#[test]
fn ship_on_a_field_narrower_than_itself_is_pinned() {
    let config = SimConfig {
        meteor_interval: 0,
        screen_width: 10.0,
        screen_height: 12.0,
        ..SimConfig::default()
    };
    let mut s = init_state(Level::Easy, config, SpriteBank::builtin(), 0).unwrap();
    s.director.phase = Phase::Intermission { countdown: u32::MAX };
    let mut rng = seeded_rng();
    let gate = SimulationGate::running();

    for _ in 0..20 {
        steer_ship(&mut s, gate, 1.0, 1.0);
        tick(&mut s, gate, &mut rng);
    }

    assert_eq!((s.ship.sprite.x, s.ship.sprite.y), (0.0, 0.0));
}
