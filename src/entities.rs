/// All game entity types — pure data, no game logic.

use crate::config::GameConfig;
use crate::pool::Pool;

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned box, `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Box of size `(w, h)` centred on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, (w, h): (f32, f32)) -> Self {
        Self {
            x: cx - w / 2.0,
            y: cy - h / 2.0,
            w,
            h,
        }
    }

    /// Strict overlap; boxes that only touch edges do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    /// Vertical velocity in px/s, negative is upward.
    pub vy: f32,
    pub size: (f32, f32),
}

impl Bullet {
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.x, self.y, self.size)
    }
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    /// Horizontal velocity in px/s.
    pub vx: f32,
    pub size: (f32, f32),
    /// False once the player has been hidden at game over.
    pub alive: bool,
    /// Remaining time of the hit flicker.
    pub flicker_ms: f64,
}

impl Player {
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.x, self.y, self.size)
    }
}

/// Lateral movement pattern of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Drift {
    /// `x += sin(elapsed_ms * speed) * amplitude` every reference frame.
    Sine { amplitude: f32, speed: f32 },
    /// Fixed step sideways, `direction` is +1.0 or -1.0.
    Bounce { direction: f32 },
}

impl Default for Drift {
    fn default() -> Self {
        Drift::Bounce { direction: 1.0 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    /// Descent velocity in px/s.
    pub vy: f32,
    pub size: (f32, f32),
    pub drift: Drift,
}

impl Enemy {
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.x, self.y, self.size)
    }
}

// ── Score, lives, HUD ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub status: GameStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameOverMessage {
    pub title: String,
    pub hint: String,
}

/// Text shown on screen.  Rewritten whenever the value behind it changes.
#[derive(Clone, Debug)]
pub struct Hud {
    pub score_text: String,
    pub lives_text: String,
    pub message: Option<GameOverMessage>,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Something that happened during the last update, for logging and tests.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    BulletFired { x: f32, y: f32 },
    EnemySpawned { x: f32, vy: f32 },
    EnemyDestroyed { score: u32 },
    PlayerHit { lives: u32 },
    GameOver { score: u32 },
}

// ── Master scene ──────────────────────────────────────────────────────────────

/// Everything one running game needs.  Handlers receive it by reference
/// instead of reaching for globals.
#[derive(Clone, Debug)]
pub struct Scene {
    pub config: GameConfig,
    pub player: Player,
    pub bullets: Pool<Bullet>,
    pub enemies: Pool<Enemy>,
    pub state: GameState,
    pub hud: Hud,
    /// Scene time since start.
    pub elapsed_ms: f64,
    /// Time accumulated toward the next enemy spawn.
    pub spawn_timer_ms: f64,
    /// Earliest scene time at which a held fire key shoots again.
    pub next_fire_ms: f64,
    /// Direction used by every bouncing enemy in shared-coupling mode.
    pub shared_direction: f32,
    pub frame: u64,
    /// Events from the current tick; cleared when the next one starts.
    pub events: Vec<GameEvent>,
}
