/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// scene.  No game logic is performed; this module only projects world
/// coordinates onto terminal cells and translates state into commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use descent_shooter::entities::{Bullet, Enemy, GameStatus, Scene};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Green;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Red;
const C_BULLET: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Length of one flicker pulse.
const FLICKER_PULSE_MS: f64 = 100.0;

// ── World → terminal projection ──────────────────────────────────────────────

/// Maps the world playfield onto the terminal area inside the border.
///
/// Layout: row 0 HUD, row 1 top border, rows 2..h-2 play area,
/// row h-2 bottom border, row h-1 controls hint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    world_w: f32,
    world_h: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, world_w: f32, world_h: f32) -> Self {
        Self {
            cols,
            rows,
            world_w,
            world_h,
        }
    }

    fn inner_cols(&self) -> u16 {
        self.cols.saturating_sub(2)
    }

    fn inner_rows(&self) -> u16 {
        self.rows.saturating_sub(4)
    }

    /// Terminal cell for a world point, or `None` when it is off the
    /// visible playfield.
    pub fn project(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..self.world_w).contains(&x) || !(0.0..self.world_h).contains(&y) {
            return None;
        }
        let col = (x / self.world_w * self.inner_cols() as f32) as u16;
        let row = (y / self.world_h * self.inner_rows() as f32) as u16;
        if col >= self.inner_cols() || row >= self.inner_rows() {
            return None;
        }
        Some((col + 1, row + 2))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, scene: &Scene, view: &Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, scene, view)?;

    for (_, enemy) in scene.enemies.iter_active() {
        draw_enemy(out, enemy, view)?;
    }
    for (_, bullet) in scene.bullets.iter_active() {
        draw_bullet(out, bullet, view)?;
    }

    if player_visible(scene) {
        draw_player(out, scene, view)?;
    }
    draw_controls_hint(out, view)?;

    if scene.state.status == GameStatus::GameOver {
        draw_game_over(out, scene, view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Hidden players stay hidden; a flickering one blinks every pulse.
fn player_visible(scene: &Scene) -> bool {
    let p = &scene.player;
    if !p.alive {
        return false;
    }
    if p.flicker_ms <= 0.0 {
        return true;
    }
    (p.flicker_ms / FLICKER_PULSE_MS) as u64 % 2 == 0
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, scene: &Scene, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(&scene.hud.score_text))?;

    let variant = format!("[ {} ]", scene.config.variant.as_str().to_uppercase());
    let vx = (view.cols / 2).saturating_sub(variant.len() as u16 / 2);
    out.queue(cursor::MoveTo(vx, 0))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(&variant))?;

    let lives = format!(
        "{} {}",
        scene.hud.lives_text,
        "♥".repeat(scene.state.lives as usize)
    );
    let lx = view.cols.saturating_sub(lives.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, scene: &Scene, view: &Viewport) -> std::io::Result<()> {
    //   ▲       ← tip
    //  /█\      ← fuselage + wings
    let p = &scene.player;
    let Some((col, row)) = view.project(p.x, p.y) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;

    let wing_row = row + 1;
    if wing_row < view.rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), wing_row))?;
        out.queue(Print("/█\\"))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, view: &Viewport) -> std::io::Result<()> {
    // Still above the top edge: nothing to draw yet
    let Some((col, row)) = view.project(enemy.x, enemy.y) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_ENEMY))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print("«▼»"))?;
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, bullet: &Bullet, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.project(bullet.x, bullet.y) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_BULLET))?;
    out.queue(Print("║"))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, scene: &Scene, view: &Viewport) -> std::io::Result<()> {
    let Some(message) = &scene.hud.message else {
        return Ok(());
    };
    let title = format!("║    {:^10}    ║", message.title);
    let lines: Vec<(String, Color)> = vec![
        ("╔══════════════════╗".to_string(), Color::Red),
        (title, Color::Red),
        ("╚══════════════════╝".to_string(), Color::Red),
        (format!("Final Score: {:>6}", scene.state.score), Color::Yellow),
        (message.hint.clone(), Color::White),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (text, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(text))?;
    }

    Ok(())
}
