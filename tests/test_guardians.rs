use std::rc::Rc;

use shmup_core::compute::{init_state, tick};
use shmup_core::config::SimConfig;
use shmup_core::context::SimulationContext;
use shmup_core::director::{self, Phase};
use shmup_core::dispatch;
use shmup_core::entities::*;
use shmup_core::events::FrameEvent;
use shmup_core::guardians::{self, GuardianPhase};
use shmup_core::pool::SlotId;
use shmup_core::sprites::SpriteBank;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn quiet_ctx() -> SimulationContext {
    let config = SimConfig {
        meteor_interval: 0,
        ..SimConfig::default()
    };
    let mut ctx = init_state(Level::Easy, config, SpriteBank::builtin(), 0).unwrap();
    ctx.director.phase = Phase::Intermission { countdown: u32::MAX };
    ctx
}

fn parts(ctx: &SimulationContext) -> Vec<SlotId> {
    ctx.guardian.as_ref().map(|g| g.parts.clone()).unwrap_or_default()
}

/// Slide the guardian in until it docks.
fn dock(ctx: &mut SimulationContext) {
    for _ in 0..200 {
        if !ctx.guardian.as_ref().is_some_and(|g| g.is_appearing()) {
            return;
        }
        guardians::update(ctx);
    }
    panic!("guardian never docked");
}

fn dart_at(ctx: &mut SimulationContext, x: f32, y: f32) {
    let frames: Frames = Rc::from(vec![ImageFrame {
        width: 1,
        height: 1,
        points: vec![CollisionPoint { x: 0, y: 0 }],
        ..ImageFrame::default()
    }]);
    ctx.shots
        .spawn(Shot {
            sprite: Sprite::new(frames, x, y).with_combat(5, 1),
            owner: ShotOwner::Friend,
            trajectory: Trajectory::default(),
            ttl: 100,
            angle: 0.0,
            speed: 0.0,
        })
        .unwrap();
}

#[test]
fn start_spawns_parts_above_the_screen() {
    let mut ctx = quiet_ctx();

    assert!(guardians::start(&mut ctx, 1));

    let session = ctx.guardian.as_ref().unwrap();
    assert_eq!(session.phase, GuardianPhase::Appearing);
    assert_eq!(session.parts.len(), 1);
    assert_eq!(session.live_parts(), 1);
    assert_eq!(session.energy, 180);
    let part = ctx.enemies.get(session.parts[0]).unwrap();
    assert!(part.sprite.y + part.sprite.height() <= 0.0);
    assert_eq!(part.kind, EnemyKind::Guardian(1));
    assert!(ctx.events.contains(&FrameEvent::GuardianSpawned { number: 1 }));
}

#[test]
fn only_one_guardian_at_a_time() {
    let mut ctx = quiet_ctx();
    assert!(guardians::start(&mut ctx, 1));
    assert!(!guardians::start(&mut ctx, 2));
    assert_eq!(ctx.enemies.len(), 1);
}

#[test]
fn unknown_guardian_is_refused() {
    let mut ctx = quiet_ctx();
    assert!(!guardians::start(&mut ctx, 0));
    assert!(!guardians::start(&mut ctx, 9));
    assert!(ctx.guardian.is_none());
    assert!(ctx.enemies.is_empty());
}

#[test]
fn start_without_room_for_every_part_leaves_no_trace() {
    let mut ctx = quiet_ctx();
    let free = ctx.enemies.pool().capacity() - 1;
    for _ in 0..free {
        let sprite = Sprite::new(ctx.sprites.grunt.clone(), 0.0, 0.0).with_combat(1, 1);
        ctx.enemies
            .spawn(Enemy::new(sprite, EnemyKind::Grunt, EnemyBehavior::default()))
            .unwrap();
    }

    assert!(!guardians::start(&mut ctx, 2));
    assert!(ctx.guardian.is_none());
    assert_eq!(ctx.enemies.len(), free);
}

#[test]
fn appearing_guardian_cannot_be_hit() {
    let mut ctx = quiet_ctx();
    let mut rng = seeded_rng();
    guardians::start(&mut ctx, 1);
    for _ in 0..10 {
        guardians::update(&mut ctx);
    }
    let id = parts(&ctx)[0];
    let (x, y) = {
        let part = ctx.enemies.get_mut(id).unwrap();
        part.sprite.y = 20.0;
        part.sprite.visible = true;
        part.sprite.center()
    };
    dart_at(&mut ctx, x, y);

    dispatch::shots_vs_enemies(&mut ctx, &mut rng);

    assert_eq!(ctx.shots.len(), 1);
    assert_eq!(ctx.guardian.as_ref().unwrap().energy, 180);
}

#[test]
fn guardian_docks_and_becomes_active() {
    let mut ctx = quiet_ctx();
    guardians::start(&mut ctx, 1);

    dock(&mut ctx);

    let session = ctx.guardian.as_ref().unwrap();
    assert_eq!(session.phase, GuardianPhase::Active);
    assert_eq!(session.y, session.script().dock_y);
    let part = ctx.enemies.get(session.parts[0]).unwrap();
    assert!(part.sprite.visible);
    assert_eq!(part.sprite.y, session.script().dock_y);
}

#[test]
fn hits_drain_the_shared_energy_of_every_part() {
    let mut ctx = quiet_ctx();
    let mut rng = seeded_rng();
    guardians::start(&mut ctx, 2);
    dock(&mut ctx);
    let ids = parts(&ctx);
    assert_eq!(ids.len(), 2);
    let first = ctx.enemies.get(ids[0]).unwrap().sprite.x;
    let second = ctx.enemies.get(ids[1]).unwrap().sprite.x;
    assert_eq!(second - first, 56.0);

    assert!(!dispatch::hit_enemy(&mut ctx, ids[1], 60, &mut rng));

    assert_eq!(ctx.guardian.as_ref().unwrap().energy, 200);
    for id in &ids {
        assert_eq!(ctx.enemies.get(*id).unwrap().sprite.energy, 200);
    }
    assert!(ctx.enemies.get(ids[1]).unwrap().sprite.flash);
    assert_eq!(ctx.score, 0);
}

#[test]
fn defeated_guardian_fades_out_and_ends_the_session() {
    let mut ctx = quiet_ctx();
    let mut rng = seeded_rng();
    guardians::start(&mut ctx, 2);
    dock(&mut ctx);
    let ids = parts(&ctx);

    assert!(dispatch::hit_enemy(&mut ctx, ids[0], 1000, &mut rng));

    assert_eq!(ctx.guardian.as_ref().unwrap().phase, GuardianPhase::Dying);
    for id in &ids {
        assert_eq!(ctx.enemies.get(*id).unwrap().fade, Some(Fade::start()));
    }
    assert_eq!(ctx.score, 1000 << 2);

    let gate = SimulationGate::running();
    for _ in 0..FADE_FRAMES - 1 {
        tick(&mut ctx, gate, &mut rng);
    }
    assert!(ids.iter().all(|id| ctx.enemies.pool().is_enabled(*id)));
    assert_eq!(ctx.guardian.as_ref().map(|g| g.live_parts()), Some(2));

    tick(&mut ctx, gate, &mut rng);

    assert!(ids.iter().all(|id| !ctx.enemies.pool().is_enabled(*id)));
    assert!(ctx.guardian.is_none());
    assert_eq!(ctx.stage, 1);
    assert!(ctx.events.contains(&FrameEvent::GuardianDefeated { number: 2 }));
}

#[test]
fn dying_guardian_takes_no_more_damage() {
    let mut ctx = quiet_ctx();
    let mut rng = seeded_rng();
    guardians::start(&mut ctx, 1);
    dock(&mut ctx);
    let id = parts(&ctx)[0];
    dispatch::hit_enemy(&mut ctx, id, 1000, &mut rng);
    let score = ctx.score;

    assert!(!guardians::damage(&mut ctx, 50));
    assert_eq!(ctx.score, score);
}

#[test]
fn active_guardian_walks_its_legs_inside_bounds() {
    let mut ctx = quiet_ctx();
    guardians::start(&mut ctx, 4);
    dock(&mut ctx);

    for _ in 0..600 {
        guardians::update(&mut ctx);
        let session = ctx.guardian.as_ref().unwrap();
        let b = session.script().bounds;
        assert!(session.x >= b.x_min && session.x <= b.x_max);
        assert!(session.y >= b.y_min && session.y <= b.y_max);
    }
    // Minion timers have fired by now.
    assert!(ctx.enemies.len() > 2);
}

#[test]
fn guardian_on_a_narrow_screen_stays_put_horizontally() {
    let config = SimConfig {
        meteor_interval: 0,
        screen_width: 100.0,
        ..SimConfig::default()
    };
    assert!(config.validate().is_ok());
    let mut ctx = init_state(Level::Easy, config, SpriteBank::builtin(), 0).unwrap();
    ctx.director.phase = Phase::Intermission { countdown: u32::MAX };

    assert!(guardians::start(&mut ctx, 2));
    dock(&mut ctx);
    for _ in 0..400 {
        guardians::update(&mut ctx);
    }

    let session = ctx.guardian.as_ref().unwrap();
    let b = session.script().bounds;
    assert!(b.x_min <= b.x_max);
    assert!(session.x >= b.x_min && session.x <= b.x_max);
}

#[test]
fn director_keeps_asking_until_the_guardian_fits() {
    let mut ctx = quiet_ctx();
    let mut rng = seeded_rng();
    let mut grunts = Vec::new();
    for _ in 0..ctx.enemies.pool().capacity() {
        let sprite = Sprite::new(ctx.sprites.grunt.clone(), 0.0, 0.0).with_combat(1, 1);
        grunts.push(
            ctx.enemies
                .spawn(Enemy::new(sprite, EnemyKind::Grunt, EnemyBehavior::default()))
                .unwrap(),
        );
    }
    ctx.director.phase = Phase::Guardian { started: false };

    for _ in 0..3 {
        director::update(&mut ctx, &mut rng);
        assert_eq!(ctx.director.phase, Phase::Guardian { started: false });
        assert!(ctx.guardian.is_none());
    }

    ctx.enemies.pool_mut().release(grunts[0]);
    director::update(&mut ctx, &mut rng);

    assert_eq!(ctx.director.phase, Phase::Guardian { started: true });
    assert_eq!(ctx.guardian.as_ref().map(|g| g.number), Some(1));
}
