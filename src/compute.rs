/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `Scene` (and, where needed, an RNG handle) and returns a brand-new
/// `Scene`.  Side effects are limited to the injected RNG.  Internally the
/// copy is updated in place by the `*_in` helpers, which `tick` chains.

use rand::Rng;

use crate::config::{BounceCoupling, FireMode, GameConfig, Variant, REFERENCE_FPS};
use crate::entities::{
    Bullet, Drift, Enemy, GameOverMessage, GameState, GameStatus, Hud, Player, Scene,
};
use crate::pool::Pool;

pub use crate::entities::GameEvent;

/// Keys seen by the host this frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Fire key is currently down.
    pub fire_held: bool,
    /// Fire key went down since the last tick.
    pub fire_pressed: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh scene: player at its start position, empty pools.
pub fn init_scene(config: GameConfig) -> Scene {
    let (x, y) = config.player_start;
    let state = GameState {
        score: 0,
        lives: config.starting_lives,
        status: GameStatus::Playing,
    };
    let hud = Hud {
        score_text: label(&config.score_label, state.score),
        lives_text: label(&config.lives_label, state.lives),
        message: None,
    };
    Scene {
        player: Player {
            x,
            y,
            vx: 0.0,
            size: config.player_size,
            alive: true,
            flicker_ms: 0.0,
        },
        bullets: Pool::new(config.bullet_capacity),
        enemies: Pool::new(config.enemy_capacity),
        state,
        hud,
        elapsed_ms: 0.0,
        spawn_timer_ms: 0.0,
        next_fire_ms: 0.0,
        shared_direction: 1.0,
        frame: 0,
        events: Vec::new(),
        config,
    }
}

fn label(name: &str, value: u32) -> String {
    format!("{}: {}", name, value)
}

// ── Fire & spawn ─────────────────────────────────────────────────────────────

/// Fire one bullet from the player's muzzle.  No-op when the pool is full
/// or the game is over.
pub fn fire_bullet(scene: &Scene) -> Scene {
    let mut next = scene.clone();
    fire_bullet_in(&mut next);
    next
}

fn fire_bullet_in(scene: &mut Scene) {
    if scene.state.status == GameStatus::GameOver {
        return;
    }
    let bullet = Bullet {
        x: scene.player.x,
        y: scene.player.y - scene.config.muzzle_offset,
        vy: scene.config.bullet_velocity,
        size: scene.config.bullet_size,
    };
    let (x, y) = (bullet.x, bullet.y);
    match scene.bullets.acquire(bullet) {
        Some(_) => scene.events.push(GameEvent::BulletFired { x, y }),
        None => log::trace!("bullet pool exhausted, shot skipped"),
    }
}

/// Spawn one enemy just above the top edge at a random column.  No-op when
/// the pool is full or the game is over.
pub fn spawn_enemy(scene: &Scene, rng: &mut impl Rng) -> Scene {
    let mut next = scene.clone();
    spawn_enemy_in(&mut next, rng);
    next
}

fn spawn_enemy_in(scene: &mut Scene, rng: &mut impl Rng) {
    if scene.state.status == GameStatus::GameOver {
        return;
    }
    let cfg = &scene.config;
    let x = rng.gen_range(cfg.spawn_x_min..=cfg.spawn_x_max);
    let vy = rng.gen_range(cfg.descent_speed_min..=cfg.descent_speed_max);
    let drift = match cfg.variant {
        Variant::Sine => Drift::Sine {
            amplitude: rng.gen_range(cfg.zigzag_amplitude_min..=cfg.zigzag_amplitude_max) as f32,
            speed: cfg.zigzag_speed_base + rng.gen::<f32>() * cfg.zigzag_speed_jitter,
        },
        Variant::Bounce => Drift::Bounce { direction: 1.0 },
    };
    let enemy = Enemy {
        x,
        y: cfg.spawn_y,
        vy,
        size: cfg.enemy_size,
        drift,
    };
    match scene.enemies.acquire(enemy) {
        Some(_) => scene.events.push(GameEvent::EnemySpawned { x, vy }),
        None => log::trace!("enemy pool exhausted, spawn skipped"),
    }
}

// ── Movement ─────────────────────────────────────────────────────────────────

/// Apply held direction keys and integrate every active entity by `dt_ms`.
/// Bullets past the top and enemies past the bottom go back to their pools.
pub fn update_movement(scene: &Scene, input: &TickInput, dt_ms: f64) -> Scene {
    let mut next = scene.clone();
    if next.state.status == GameStatus::Playing {
        steer_player_in(&mut next, input);
        move_entities_in(&mut next, dt_ms);
    }
    next
}

fn steer_player_in(scene: &mut Scene, input: &TickInput) {
    let speed = scene.config.player_speed;
    scene.player.vx = if input.left {
        -speed
    } else if input.right {
        speed
    } else {
        0.0
    };
}

fn move_entities_in(scene: &mut Scene, dt_ms: f64) {
    let dt = (dt_ms / 1000.0) as f32;
    // Drift constants are per reference frame
    let frames = dt * REFERENCE_FPS;
    let width = scene.config.width;

    // Player
    let half_w = scene.player.size.0 / 2.0;
    let max_x = (width - half_w).max(half_w);
    scene.player.x = (scene.player.x + scene.player.vx * dt).clamp(half_w, max_x);
    scene.player.flicker_ms = (scene.player.flicker_ms - dt_ms).max(0.0);

    // Bullets
    let despawn_y = scene.config.bullet_despawn_y;
    let mut spent = Vec::new();
    for (handle, bullet) in scene.bullets.iter_active_mut() {
        bullet.y += bullet.vy * dt;
        if bullet.y < despawn_y {
            spent.push(handle);
        }
    }
    for handle in spent {
        scene.bullets.release(handle);
    }

    // Enemies
    let despawn_y = scene.config.enemy_despawn_y;
    let step = scene.config.bounce_step * frames;
    let coupling = scene.config.bounce_coupling;
    let elapsed_ms = scene.elapsed_ms;
    let mut shared = scene.shared_direction;
    let mut escaped = Vec::new();

    for (handle, enemy) in scene.enemies.iter_active_mut() {
        enemy.y += enemy.vy * dt;
        match &mut enemy.drift {
            Drift::Sine { amplitude, speed } => {
                enemy.x += (elapsed_ms * *speed as f64).sin() as f32 * *amplitude * frames;
            }
            Drift::Bounce { direction } => match coupling {
                BounceCoupling::PerEnemy => {
                    enemy.x += *direction * step;
                    if enemy.x <= 0.0 {
                        *direction = 1.0;
                    } else if enemy.x >= width {
                        *direction = -1.0;
                    }
                }
                BounceCoupling::Shared => {
                    enemy.x += shared * step;
                    if enemy.x <= 0.0 || enemy.x >= width {
                        shared = -shared;
                    }
                }
            },
        }
        if enemy.y > despawn_y {
            escaped.push(handle);
        }
    }
    scene.shared_direction = shared;
    for handle in escaped {
        scene.enemies.release(handle);
    }
}

// ── Collisions ───────────────────────────────────────────────────────────────

/// Resolve bullet↔enemy and player↔enemy overlaps among active entities.
pub fn resolve_collisions(scene: &Scene) -> Scene {
    let mut next = scene.clone();
    resolve_collisions_in(&mut next);
    next
}

fn resolve_collisions_in(scene: &mut Scene) {
    if scene.state.status == GameStatus::GameOver {
        return;
    }

    // Bullets against enemies, slot order.  A bullet takes out one enemy.
    for bullet_handle in scene.bullets.active_handles() {
        let Some(bounds) = scene.bullets.get(bullet_handle).map(Bullet::bounds) else {
            continue;
        };
        let hit = scene
            .enemies
            .iter_active()
            .find(|(_, enemy)| bounds.overlaps(&enemy.bounds()))
            .map(|(h, _)| h);
        if let Some(enemy_handle) = hit {
            scene.bullets.release(bullet_handle);
            scene.enemies.release(enemy_handle);
            scene.state.score += 1;
            scene.hud.score_text = label(&scene.config.score_label, scene.state.score);
            scene.events.push(GameEvent::EnemyDestroyed {
                score: scene.state.score,
            });
        }
    }

    // Enemies reaching the player
    let player_bounds = scene.player.bounds();
    for enemy_handle in scene.enemies.active_handles() {
        let touching = scene
            .enemies
            .get(enemy_handle)
            .map(|enemy| player_bounds.overlaps(&enemy.bounds()))
            .unwrap_or(false);
        if !touching {
            continue;
        }
        scene.enemies.release(enemy_handle);
        scene.state.lives = scene.state.lives.saturating_sub(1);
        scene.hud.lives_text = label(&scene.config.lives_label, scene.state.lives);
        scene.player.flicker_ms = scene.config.flicker_ms;
        scene.events.push(GameEvent::PlayerHit {
            lives: scene.state.lives,
        });

        if scene.state.lives == 0 {
            game_over_in(scene);
            return;
        }
    }
}

// ── Game over ────────────────────────────────────────────────────────────────

/// Enter the terminal state: clear both pools, freeze the player and show
/// the game-over message.  Calling it again changes nothing.
pub fn game_over(scene: &Scene) -> Scene {
    let mut next = scene.clone();
    game_over_in(&mut next);
    next
}

fn game_over_in(scene: &mut Scene) {
    if scene.state.status == GameStatus::GameOver {
        return;
    }
    scene.state.status = GameStatus::GameOver;
    scene.bullets.release_all();
    scene.enemies.release_all();
    scene.player.vx = 0.0;
    scene.player.flicker_ms = 0.0;
    if scene.config.hide_player_on_game_over {
        scene.player.alive = false;
    }
    scene.hud.message = Some(GameOverMessage {
        title: "GAME OVER".to_string(),
        hint: "Press R to restart".to_string(),
    });
    scene.events.push(GameEvent::GameOver {
        score: scene.state.score,
    });
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the scene by one frame of `dt_ms` milliseconds.  All randomness
/// comes through `rng` so callers control determinism.
///
/// Order: input and fire, spawn timer, movement, collisions.  A finished
/// game is returned unchanged apart from an empty event list.
pub fn tick(scene: &Scene, input: &TickInput, dt_ms: f64, rng: &mut impl Rng) -> Scene {
    let mut next = scene.clone();
    next.events.clear();
    if next.state.status == GameStatus::GameOver {
        return next;
    }
    next.frame += 1;
    next.elapsed_ms += dt_ms;

    // ── 1. Input ─────────────────────────────────────────────────────────────
    steer_player_in(&mut next, input);
    let fire_mode = next.config.fire_mode;
    match fire_mode {
        FireMode::Held { cooldown_ms } => {
            if input.fire_held && next.elapsed_ms > next.next_fire_ms {
                fire_bullet_in(&mut next);
                next.next_fire_ms = next.elapsed_ms + cooldown_ms;
            }
        }
        FireMode::Press => {
            if input.fire_pressed {
                fire_bullet_in(&mut next);
            }
        }
    }

    // ── 2. Spawner ───────────────────────────────────────────────────────────
    next.spawn_timer_ms += dt_ms;
    while next.spawn_timer_ms >= next.config.spawn_interval_ms {
        next.spawn_timer_ms -= next.config.spawn_interval_ms;
        spawn_enemy_in(&mut next, rng);
    }

    // ── 3. Movement ──────────────────────────────────────────────────────────
    move_entities_in(&mut next, dt_ms);

    // ── 4. Collisions ────────────────────────────────────────────────────────
    resolve_collisions_in(&mut next);

    next
}
