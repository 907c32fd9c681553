use descent_shooter::compute::*;
use descent_shooter::config::{BounceCoupling, GameConfig, Variant};
use descent_shooter::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// One 60 Hz reference frame.
const FRAME_MS: f64 = 1000.0 / 60.0;

fn sine_scene() -> Scene {
    init_scene(GameConfig::for_variant(Variant::Sine))
}

fn bounce_scene() -> Scene {
    init_scene(GameConfig::for_variant(Variant::Bounce))
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn enemy_at(x: f32, y: f32) -> Enemy {
    Enemy {
        x,
        y,
        vy: 0.0,
        size: (32.0, 32.0),
        drift: Drift::Sine { amplitude: 0.0, speed: 0.0 },
    }
}

fn bullet_at(x: f32, y: f32) -> Bullet {
    Bullet { x, y, vy: -500.0, size: (6.0, 12.0) }
}

fn count(scene: &Scene, pred: impl Fn(&GameEvent) -> bool) -> usize {
    scene.events.iter().filter(|e| pred(*e)).count()
}

// ── init_scene ────────────────────────────────────────────────────────────────

#[test]
fn init_scene_starts_playing_with_three_lives() {
    let s = sine_scene();
    assert_eq!(s.state.score, 0);
    assert_eq!(s.state.lives, 3);
    assert_eq!(s.state.status, GameStatus::Playing);
    assert_eq!((s.player.x, s.player.y), (400.0, 520.0));
    assert!(s.player.alive);
}

#[test]
fn init_scene_pools_are_empty_at_capacity() {
    let s = bounce_scene();
    assert_eq!(s.bullets.capacity(), 10);
    assert_eq!(s.enemies.capacity(), 10);
    assert_eq!(s.bullets.active_count(), 0);
    assert_eq!(s.enemies.active_count(), 0);
}

#[test]
fn init_scene_hud_shows_starting_values() {
    let s = sine_scene();
    assert_eq!(s.hud.score_text, "Score: 0");
    assert_eq!(s.hud.lives_text, "Lives: 3");
    assert!(s.hud.message.is_none());
}

// ── fire_bullet ───────────────────────────────────────────────────────────────

#[test]
fn fire_places_bullet_above_player() {
    let s = sine_scene();
    let s2 = fire_bullet(&s);
    let bullets: Vec<_> = s2.bullets.iter_active().map(|(_, b)| b.clone()).collect();
    assert_eq!(bullets.len(), 1);
    assert_eq!(bullets[0].x, 400.0);
    assert_eq!(bullets[0].y, 520.0 - 54.0);
    assert_eq!(bullets[0].vy, -500.0);
    assert_eq!(count(&s2, |e| matches!(e, GameEvent::BulletFired { .. })), 1);
}

#[test]
fn fire_when_pool_full_is_silent_noop() {
    let mut s = bounce_scene();
    for _ in 0..10 {
        s = fire_bullet(&s);
    }
    let s2 = fire_bullet(&s);
    assert_eq!(s2.bullets.active_count(), 10);
    assert_eq!(s2.events.len(), s.events.len());
}

#[test]
fn fire_does_not_mutate_original() {
    let s = sine_scene();
    let _ = fire_bullet(&s);
    assert_eq!(s.bullets.active_count(), 0);
}

// ── spawn_enemy ───────────────────────────────────────────────────────────────

#[test]
fn spawn_places_enemy_above_top_edge_within_inset() {
    let mut rng = seeded_rng();
    let mut s = sine_scene();
    for _ in 0..20 {
        s = spawn_enemy(&s, &mut rng);
    }
    for (_, e) in s.enemies.iter_active() {
        assert!((50.0..=750.0).contains(&e.x));
        assert_eq!(e.y, -30.0);
        assert!((100.0..=150.0).contains(&e.vy));
        match e.drift {
            Drift::Sine { amplitude, speed } => {
                assert!((1.0..=3.0).contains(&amplitude));
                assert_eq!(amplitude.fract(), 0.0);
                assert!((0.005..0.007).contains(&speed));
            }
            other => panic!("sine variant spawned {:?}", other),
        }
    }
}

#[test]
fn bounce_spawn_uses_fixed_descent() {
    let mut rng = seeded_rng();
    let s = spawn_enemy(&bounce_scene(), &mut rng);
    let (_, e) = s.enemies.iter_active().next().unwrap();
    assert!((100.0..=700.0).contains(&e.x));
    assert_eq!(e.y, -50.0);
    assert_eq!(e.vy, 120.0);
    assert_eq!(e.drift, Drift::Bounce { direction: 1.0 });
}

#[test]
fn eleventh_spawn_at_capacity_ten_is_noop() {
    let mut rng = seeded_rng();
    let mut s = bounce_scene();
    for _ in 0..11 {
        s = spawn_enemy(&s, &mut rng);
    }
    assert_eq!(s.enemies.active_count(), 10);
    assert_eq!(count(&s, |e| matches!(e, GameEvent::EnemySpawned { .. })), 10);
}

#[test]
fn spawn_after_game_over_is_noop() {
    let s = game_over(&sine_scene());
    let s2 = spawn_enemy(&s, &mut seeded_rng());
    assert_eq!(s2.enemies.active_count(), 0);
}

// ── update_movement ───────────────────────────────────────────────────────────

#[test]
fn player_moves_left_while_held() {
    let s = sine_scene();
    let input = TickInput { left: true, ..Default::default() };
    let s2 = update_movement(&s, &input, 100.0);
    assert_eq!(s2.player.vx, -250.0);
    assert!((s2.player.x - 375.0).abs() < 1e-3);
}

#[test]
fn left_wins_when_both_directions_held() {
    let s = sine_scene();
    let input = TickInput { left: true, right: true, ..Default::default() };
    let s2 = update_movement(&s, &input, 100.0);
    assert_eq!(s2.player.vx, -250.0);
}

#[test]
fn player_stops_without_input() {
    let mut s = sine_scene();
    s.player.vx = 250.0;
    let s2 = update_movement(&s, &TickInput::default(), 100.0);
    assert_eq!(s2.player.vx, 0.0);
    assert_eq!(s2.player.x, 400.0);
}

#[test]
fn player_is_clamped_to_playfield() {
    let mut s = sine_scene();
    s.player.x = 40.0;
    let left = TickInput { left: true, ..Default::default() };
    let s2 = update_movement(&s, &left, 1000.0);
    assert_eq!(s2.player.x, 32.0); // half of the 64 px width

    s.player.x = 760.0;
    let right = TickInput { right: true, ..Default::default() };
    let s3 = update_movement(&s, &right, 1000.0);
    assert_eq!(s3.player.x, 768.0);
}

#[test]
fn bullet_moves_up_and_is_released_past_top() {
    let mut s = sine_scene();
    let kept = s.bullets.acquire(bullet_at(100.0, 200.0)).unwrap();
    let gone = s.bullets.acquire(bullet_at(300.0, -10.0)).unwrap();
    let s2 = update_movement(&s, &TickInput::default(), 100.0);

    assert!((s2.bullets.get(kept).unwrap().y - 150.0).abs() < 1e-3);
    assert!(!s2.bullets.is_active(gone));
    assert_eq!(s2.bullets.free_count(), s.bullets.capacity() - 1);
}

#[test]
fn enemy_descends_and_is_released_past_bottom() {
    let mut s = sine_scene();
    let mut falling = enemy_at(100.0, 300.0);
    falling.vy = 100.0;
    let mut leaving = enemy_at(700.0, 615.0);
    leaving.vy = 100.0;
    let a = s.enemies.acquire(falling).unwrap();
    let b = s.enemies.acquire(leaving).unwrap();

    let s2 = update_movement(&s, &TickInput::default(), 100.0);
    assert!((s2.enemies.get(a).unwrap().y - 310.0).abs() < 1e-3);
    assert!(!s2.enemies.is_active(b));
}

#[test]
fn sine_drift_follows_scene_time() {
    let mut s = sine_scene();
    s.elapsed_ms = 100.0;
    let mut e = enemy_at(300.0, 100.0);
    e.drift = Drift::Sine { amplitude: 2.0, speed: 0.005 };
    let h = s.enemies.acquire(e).unwrap();

    let s2 = update_movement(&s, &TickInput::default(), FRAME_MS);
    let expected = 300.0 + (0.5f32).sin() * 2.0;
    assert!((s2.enemies.get(h).unwrap().x - expected).abs() < 1e-3);
}

#[test]
fn bounce_per_enemy_flips_only_the_enemy_at_the_wall() {
    let mut s = bounce_scene();
    let mut at_wall = enemy_at(790.0, 100.0);
    at_wall.drift = Drift::Bounce { direction: 1.0 };
    let mut middle = enemy_at(400.0, 100.0);
    middle.drift = Drift::Bounce { direction: 1.0 };
    let a = s.enemies.acquire(at_wall).unwrap();
    let b = s.enemies.acquire(middle).unwrap();

    let s2 = update_movement(&s, &TickInput::default(), FRAME_MS);
    let a2 = s2.enemies.get(a).unwrap();
    let b2 = s2.enemies.get(b).unwrap();
    assert!((a2.x - 840.0).abs() < 1e-2);
    assert!((b2.x - 450.0).abs() < 1e-2);
    assert_eq!(a2.drift, Drift::Bounce { direction: -1.0 });
    assert_eq!(b2.drift, Drift::Bounce { direction: 1.0 });

    let s3 = update_movement(&s2, &TickInput::default(), FRAME_MS);
    assert!((s3.enemies.get(a).unwrap().x - 790.0).abs() < 1e-2);
    assert!((s3.enemies.get(b).unwrap().x - 500.0).abs() < 1e-2);
}

#[test]
fn bounce_shared_flip_moves_every_enemy() {
    let mut cfg = GameConfig::for_variant(Variant::Bounce);
    cfg.bounce_coupling = BounceCoupling::Shared;
    let mut s = init_scene(cfg);
    let a = s.enemies.acquire(Enemy { drift: Drift::default(), ..enemy_at(790.0, 100.0) }).unwrap();
    let b = s.enemies.acquire(Enemy { drift: Drift::default(), ..enemy_at(400.0, 100.0) }).unwrap();

    let s2 = update_movement(&s, &TickInput::default(), FRAME_MS);
    // slot 0 hits the wall first and flips the direction for slot 1
    assert!((s2.enemies.get(a).unwrap().x - 840.0).abs() < 1e-2);
    assert!((s2.enemies.get(b).unwrap().x - 350.0).abs() < 1e-2);
    assert_eq!(s2.shared_direction, -1.0);
}

#[test]
fn flicker_counts_down() {
    let mut s = sine_scene();
    s.player.flicker_ms = 1200.0;
    let s2 = update_movement(&s, &TickInput::default(), 100.0);
    assert_eq!(s2.player.flicker_ms, 1100.0);
    let s3 = update_movement(&s2, &TickInput::default(), 5000.0);
    assert_eq!(s3.player.flicker_ms, 0.0);
}

// ── resolve_collisions ────────────────────────────────────────────────────────

#[test]
fn bullet_hit_scores_one_and_frees_both_slots() {
    let mut s = sine_scene();
    let e = s.enemies.acquire(enemy_at(200.0, 200.0)).unwrap();
    let b = s.bullets.acquire(bullet_at(200.0, 205.0)).unwrap();
    let bullets_free = s.bullets.free_count();
    let enemies_free = s.enemies.free_count();

    let s2 = resolve_collisions(&s);
    assert_eq!(s2.state.score, 1);
    assert!(!s2.enemies.is_active(e));
    assert!(!s2.bullets.is_active(b));
    assert_eq!(s2.bullets.free_count(), bullets_free + 1);
    assert_eq!(s2.enemies.free_count(), enemies_free + 1);
    assert_eq!(s2.hud.score_text, "Score: 1");
    assert_eq!(s2.events, vec![GameEvent::EnemyDestroyed { score: 1 }]);
}

#[test]
fn bullet_miss_changes_nothing() {
    let mut s = sine_scene();
    s.enemies.acquire(enemy_at(200.0, 200.0)).unwrap();
    s.bullets.acquire(bullet_at(260.0, 200.0)).unwrap();
    let s2 = resolve_collisions(&s);
    assert_eq!(s2.state.score, 0);
    assert_eq!(s2.enemies.active_count(), 1);
    assert_eq!(s2.bullets.active_count(), 1);
}

#[test]
fn one_bullet_takes_out_one_enemy() {
    let mut s = sine_scene();
    let first = s.enemies.acquire(enemy_at(200.0, 200.0)).unwrap();
    let second = s.enemies.acquire(enemy_at(205.0, 200.0)).unwrap();
    s.bullets.acquire(bullet_at(202.0, 200.0)).unwrap();

    let s2 = resolve_collisions(&s);
    assert_eq!(s2.state.score, 1);
    assert!(!s2.enemies.is_active(first)); // lowest slot wins
    assert!(s2.enemies.is_active(second));
}

#[test]
fn released_enemy_is_not_hit() {
    let mut s = sine_scene();
    let e = s.enemies.acquire(enemy_at(200.0, 200.0)).unwrap();
    s.enemies.release(e);
    s.bullets.acquire(bullet_at(200.0, 200.0)).unwrap();
    let s2 = resolve_collisions(&s);
    assert_eq!(s2.state.score, 0);
    assert_eq!(s2.bullets.active_count(), 1);
}

#[test]
fn enemy_reaching_player_costs_a_life() {
    let mut s = sine_scene();
    let e = s.enemies.acquire(enemy_at(400.0, 500.0)).unwrap();
    let s2 = resolve_collisions(&s);
    assert_eq!(s2.state.lives, 2);
    assert!(!s2.enemies.is_active(e));
    assert_eq!(s2.hud.lives_text, "Lives: 2");
    assert_eq!(s2.player.flicker_ms, 1200.0);
    assert_eq!(s2.state.status, GameStatus::Playing);
    assert_eq!(s2.events, vec![GameEvent::PlayerHit { lives: 2 }]);
}

#[test]
fn three_player_hits_end_the_game() {
    let mut s = sine_scene();
    s.bullets.acquire(bullet_at(100.0, 100.0)).unwrap();
    s.enemies.acquire(enemy_at(700.0, 100.0)).unwrap();

    for _ in 0..3 {
        s.enemies.acquire(enemy_at(400.0, 500.0)).unwrap();
        s = resolve_collisions(&s);
    }

    assert_eq!(s.state.lives, 0);
    assert_eq!(s.state.status, GameStatus::GameOver);
    assert_eq!(s.bullets.active_count(), 0);
    assert_eq!(s.enemies.active_count(), 0);
    assert_eq!(s.player.vx, 0.0);
    assert_eq!(count(&s, |e| matches!(e, GameEvent::PlayerHit { .. })), 3);
    assert_eq!(count(&s, |e| matches!(e, GameEvent::GameOver { .. })), 1);
    assert_eq!(s.hud.message.as_ref().map(|m| m.title.as_str()), Some("GAME OVER"));
}

#[test]
fn last_life_lost_stops_processing_remaining_enemies() {
    let mut s = sine_scene();
    s.state.lives = 1;
    s.enemies.acquire(enemy_at(400.0, 500.0)).unwrap();
    s.enemies.acquire(enemy_at(410.0, 500.0)).unwrap();
    let s2 = resolve_collisions(&s);
    assert_eq!(s2.state.lives, 0);
    assert_eq!(count(&s2, |e| matches!(e, GameEvent::PlayerHit { .. })), 1);
    assert_eq!(count(&s2, |e| matches!(e, GameEvent::GameOver { .. })), 1);
}

// ── game_over ─────────────────────────────────────────────────────────────────

#[test]
fn game_over_hides_player_in_bounce_variant() {
    let s = game_over(&bounce_scene());
    assert!(!s.player.alive);
    let s = game_over(&sine_scene());
    assert!(s.player.alive);
}

#[test]
fn game_over_is_entered_once() {
    let s = game_over(&sine_scene());
    let s2 = game_over(&s);
    assert_eq!(count(&s2, |e| matches!(e, GameEvent::GameOver { .. })), 1);
    assert_eq!(s2.state.status, GameStatus::GameOver);
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_advances_time_and_frame() {
    let s = sine_scene();
    let s2 = tick(&s, &TickInput::default(), 16.0, &mut seeded_rng());
    assert_eq!(s2.frame, 1);
    assert_eq!(s2.elapsed_ms, 16.0);
}

#[test]
fn tick_clears_previous_events() {
    let s = fire_bullet(&sine_scene());
    assert!(!s.events.is_empty());
    let s2 = tick(&s, &TickInput::default(), 16.0, &mut seeded_rng());
    assert!(s2.events.is_empty());
}

#[test]
fn tick_spawns_every_two_seconds() {
    let mut rng = seeded_rng();
    let s = tick(&sine_scene(), &TickInput::default(), 1999.0, &mut rng);
    assert_eq!(s.enemies.active_count(), 0);
    let s = tick(&s, &TickInput::default(), 1.0, &mut rng);
    assert_eq!(s.enemies.active_count(), 1);
    assert_eq!(s.spawn_timer_ms, 0.0);
}

#[test]
fn tick_long_frame_spawns_once_per_interval() {
    let s = tick(&bounce_scene(), &TickInput::default(), 4500.0, &mut seeded_rng());
    assert_eq!(count(&s, |e| matches!(e, GameEvent::EnemySpawned { .. })), 2);
    assert_eq!(s.spawn_timer_ms, 500.0);
}

#[test]
fn tick_held_fire_respects_cooldown() {
    let mut rng = seeded_rng();
    let fire = TickInput { fire_held: true, ..Default::default() };
    let mut s = sine_scene();
    // shots at t=50 and t=300; t=250 is not past the 200 ms cooldown
    for _ in 0..6 {
        s = tick(&s, &fire, 50.0, &mut rng);
    }
    assert_eq!(s.bullets.active_count(), 2);
    assert_eq!(s.next_fire_ms, 500.0);
}

#[test]
fn tick_press_fire_needs_a_fresh_press() {
    let mut rng = seeded_rng();
    let s = bounce_scene();
    let held = TickInput { fire_held: true, ..Default::default() };
    let s2 = tick(&s, &held, 16.0, &mut rng);
    assert_eq!(s2.bullets.active_count(), 0);

    let pressed = TickInput { fire_held: true, fire_pressed: true, ..Default::default() };
    let s3 = tick(&s2, &pressed, 16.0, &mut rng);
    let s4 = tick(&s3, &pressed, 16.0, &mut rng);
    assert_eq!(s4.bullets.active_count(), 2);
}

#[test]
fn tick_moves_then_collides() {
    // 40 px apart before moving, 15 px after the bullet climbs 25 px
    let mut s = sine_scene();
    s.enemies.acquire(enemy_at(200.0, 170.0)).unwrap();
    s.bullets.acquire(bullet_at(200.0, 210.0)).unwrap();
    let s2 = tick(&s, &TickInput::default(), 50.0, &mut seeded_rng());
    assert_eq!(s2.state.score, 1);
    assert_eq!(s2.bullets.active_count(), 0);
    assert_eq!(s2.enemies.active_count(), 0);
}

#[test]
fn tick_after_game_over_changes_nothing() {
    let mut s = sine_scene();
    s.state.score = 7;
    let over = game_over(&s);
    let input = TickInput { left: true, fire_held: true, fire_pressed: true, ..Default::default() };
    let mut rng = seeded_rng();
    let mut t = over.clone();
    for _ in 0..10 {
        t = tick(&t, &input, 1000.0, &mut rng);
    }
    assert_eq!(t.state.score, 7);
    assert_eq!(t.state.lives, over.state.lives);
    assert_eq!(t.frame, over.frame);
    assert_eq!(t.player.x, over.player.x);
    assert_eq!(t.bullets.active_count(), 0);
    assert_eq!(t.enemies.active_count(), 0);
}

#[test]
fn game_over_is_reported_by_exactly_one_tick() {
    let mut s = sine_scene();
    s.state.lives = 1;
    s.enemies.acquire(enemy_at(400.0, 500.0)).unwrap();
    let mut rng = seeded_rng();
    let input = TickInput::default();

    let ending = tick(&s, &input, FRAME_MS, &mut rng);
    assert_eq!(ending.state.status, GameStatus::GameOver);
    assert_eq!(count(&ending, |e| matches!(e, GameEvent::GameOver { .. })), 1);

    let after = tick(&ending, &input, FRAME_MS, &mut rng);
    assert!(after.events.is_empty());
    let later = tick(&after, &input, FRAME_MS, &mut rng);
    assert!(later.events.is_empty());
}

#[test]
fn tick_after_standalone_game_over_drops_its_event() {
    let over = game_over(&sine_scene());
    assert_eq!(over.events.len(), 1);
    let t = tick(&over, &TickInput::default(), FRAME_MS, &mut seeded_rng());
    assert!(t.events.is_empty());
    assert_eq!(t.state.status, GameStatus::GameOver);
}

#[test]
fn tick_is_deterministic_for_a_seed() {
    let input = TickInput { right: true, fire_held: true, ..Default::default() };
    let run = || {
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = sine_scene();
        for _ in 0..300 {
            s = tick(&s, &input, 33.0, &mut rng);
        }
        s
    };
    let a = run();
    let b = run();
    assert_eq!(a.state.score, b.state.score);
    assert_eq!(a.state.lives, b.state.lives);
    let xs = |s: &Scene| s.enemies.iter_active().map(|(_, e)| e.x).collect::<Vec<_>>();
    assert_eq!(xs(&a), xs(&b));
}
