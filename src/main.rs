mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use descent_shooter::compute::{init_scene, tick, GameEvent, TickInput};
use descent_shooter::config::{self, BounceCoupling, GameConfig, Variant};
use descent_shooter::entities::{GameStatus, Scene};

use display::Viewport;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest frame fed to the simulation, so a stalled terminal does not
/// teleport everything.
const MAX_FRAME_MS: f64 = 100.0;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

#[derive(Parser)]
#[command(name = "descent-shooter")]
#[command(about = "Shoot the descending enemies before they reach you")]
struct Args {
    /// Game variant
    #[arg(short, long, value_enum, default_value_t = CliVariant::Sine)]
    variant: CliVariant,

    /// JSON file overriding the variant's tuning
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Bouncing enemies share one direction (any wall hit flips them all)
    #[arg(long)]
    shared_bounce: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliVariant {
    Sine,
    Bounce,
}

impl From<CliVariant> for Variant {
    fn from(value: CliVariant) -> Self {
        match value {
            CliVariant::Sine => Variant::Sine,
            CliVariant::Bounce => Variant::Bounce,
        }
    }
}

fn build_config(args: &Args) -> Result<GameConfig> {
    let variant = Variant::from(args.variant);
    let mut config = match &args.config {
        Some(path) => config::load(path, variant)?,
        None => GameConfig::for_variant(variant),
    };
    if args.shared_bounce {
        config.bounce_coupling = BounceCoupling::Shared;
    }
    config.validate()?;
    Ok(config)
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Space fires on a press and on every auto-repeat, the way a browser
/// `keydown` does.  Classic terminals report repeats as presses; enhanced
/// ones report them as `Repeat`.
fn is_fire_event(code: KeyCode, kind: KeyEventKind) -> bool {
    code == KeyCode::Char(' ') && matches!(kind, KeyEventKind::Press | KeyEventKind::Repeat)
}

fn log_events(scene: &Scene) {
    for event in &scene.events {
        match event {
            GameEvent::BulletFired { x, y } => log::trace!("bullet fired at ({:.0}, {:.0})", x, y),
            GameEvent::EnemySpawned { x, vy } => {
                log::debug!("enemy spawned at x={:.0} descending {:.0} px/s", x, vy)
            }
            GameEvent::EnemyDestroyed { score } => log::debug!("enemy destroyed, score {}", score),
            GameEvent::PlayerHit { lives } => log::debug!("player hit, {} lives left", lives),
            GameEvent::GameOver { score } => log::info!("game over with score {}", score),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → restart.
///
/// Input model: a `key_frame` map records the frame of the last press or
/// repeat event for every key, and each frame the still-fresh keys become
/// the `TickInput`.  Space + A/D can be held together this way.  Terminals
/// with keyboard enhancement send releases and drop keys immediately;
/// classic terminals let keys expire after `HOLD_WINDOW` silent frames.
fn game_loop<W: Write>(
    out: &mut W,
    scene: &mut Scene,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut fire_pressed = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            if is_fire_event(code, kind) {
                fire_pressed = true;
            }
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if scene.state.status == GameStatus::GameOver =>
                        {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let input = TickInput {
            left: is_held(&key_frame, &KeyCode::Left, frame)
                || is_held(&key_frame, &KeyCode::Char('a'), frame)
                || is_held(&key_frame, &KeyCode::Char('A'), frame),
            right: is_held(&key_frame, &KeyCode::Right, frame)
                || is_held(&key_frame, &KeyCode::Char('d'), frame)
                || is_held(&key_frame, &KeyCode::Char('D'), frame),
            fire_held: is_held(&key_frame, &KeyCode::Char(' '), frame),
            fire_pressed,
        };

        let now = Instant::now();
        let dt_ms = (now - last).as_secs_f64() * 1000.0;
        last = now;

        *scene = tick(scene, &input, dt_ms.min(MAX_FRAME_MS), rng);
        log_events(scene);

        let (cols, rows) = terminal::size()?;
        let view = Viewport::new(cols, rows, scene.config.width, scene.config.height);
        display::render(out, scene, &view)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Logs go to stderr; redirect it while playing (2>game.log)
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args).context("could not set up the game")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!(
        "Descent Shooter starting: variant={} seed={} coupling={:?}",
        config.variant.as_str(),
        seed,
        config.bounce_coupling
    );

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, config, seed);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    seed: u64,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);

    loop {
        let mut scene = init_scene(config.clone());
        let quit = game_loop(out, &mut scene, rx, &mut rng).context("terminal I/O failed")?;
        log::info!(
            "round finished: score={} lives={}",
            scene.state.score,
            scene.state.lives
        );
        if quit {
            break;
        }
        log::info!("restarting");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_press_and_repeat_both_fire() {
        assert!(is_fire_event(KeyCode::Char(' '), KeyEventKind::Press));
        assert!(is_fire_event(KeyCode::Char(' '), KeyEventKind::Repeat));
    }

    #[test]
    fn space_release_and_other_keys_do_not_fire() {
        assert!(!is_fire_event(KeyCode::Char(' '), KeyEventKind::Release));
        assert!(!is_fire_event(KeyCode::Left, KeyEventKind::Press));
        assert!(!is_fire_event(KeyCode::Char('a'), KeyEventKind::Repeat));
    }
}
