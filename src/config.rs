//! Game tuning
//!
//! Each variant ships a preset; a JSON file may override any subset of
//! fields on top of it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Frame rate the per-frame drift constants were tuned at.
pub const REFERENCE_FPS: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Held fire, sinusoidal zigzag, randomized descent.
    #[default]
    Sine,
    /// Press-to-fire, enemies bounce between the side walls.
    Bounce,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Sine => "sine",
            Variant::Bounce => "bounce",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    /// Fire while the key is held, at most once per `cooldown_ms`.
    Held { cooldown_ms: f64 },
    /// Fire once per key press.
    Press,
}

/// How bouncing enemies share their lateral direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceCoupling {
    /// Each enemy flips only itself at a side wall.
    #[default]
    PerEnemy,
    /// One direction for every enemy; any enemy at a wall flips it for all.
    Shared,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,

    // === Playfield ===
    pub width: f32,
    pub height: f32,

    // === Player ===
    pub player_start: (f32, f32),
    pub player_size: (f32, f32),
    /// Horizontal speed while a direction key is held (px/s)
    pub player_speed: f32,
    pub starting_lives: u32,
    /// Total length of the hit flicker (100 ms pulse, yoyo, 5 repeats)
    pub flicker_ms: f64,
    pub hide_player_on_game_over: bool,

    // === Bullets ===
    pub bullet_capacity: usize,
    pub bullet_size: (f32, f32),
    /// Negative is upward (px/s)
    pub bullet_velocity: f32,
    /// Distance above the player's centre where bullets appear
    pub muzzle_offset: f32,
    pub bullet_despawn_y: f32,
    pub fire_mode: FireMode,

    // === Enemies ===
    pub enemy_capacity: usize,
    pub enemy_size: (f32, f32),
    pub spawn_interval_ms: f64,
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    pub spawn_y: f32,
    pub descent_speed_min: f32,
    pub descent_speed_max: f32,
    pub enemy_despawn_y: f32,
    pub zigzag_amplitude_min: u32,
    pub zigzag_amplitude_max: u32,
    pub zigzag_speed_base: f32,
    pub zigzag_speed_jitter: f32,
    /// Lateral step per reference frame for bouncing enemies
    pub bounce_step: f32,
    pub bounce_coupling: BounceCoupling,

    // === HUD ===
    pub score_label: String,
    pub lives_label: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Sine)
    }
}

impl GameConfig {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Sine => Self {
                variant,
                width: 800.0,
                height: 600.0,
                player_start: (400.0, 520.0),
                player_size: (64.0, 96.0),
                player_speed: 250.0,
                starting_lives: 3,
                flicker_ms: 1200.0,
                hide_player_on_game_over: false,
                bullet_capacity: 30,
                bullet_size: (6.0, 12.0),
                bullet_velocity: -500.0,
                muzzle_offset: 54.0,
                bullet_despawn_y: -20.0,
                fire_mode: FireMode::Held { cooldown_ms: 200.0 },
                enemy_capacity: 20,
                enemy_size: (32.0, 32.0),
                spawn_interval_ms: 2000.0,
                spawn_x_min: 50.0,
                spawn_x_max: 750.0,
                spawn_y: -30.0,
                descent_speed_min: 100.0,
                descent_speed_max: 150.0,
                enemy_despawn_y: 620.0,
                zigzag_amplitude_min: 1,
                zigzag_amplitude_max: 3,
                zigzag_speed_base: 0.005,
                zigzag_speed_jitter: 0.002,
                bounce_step: 0.0,
                bounce_coupling: BounceCoupling::PerEnemy,
                score_label: "Score".to_string(),
                lives_label: "Lives".to_string(),
            },
            Variant::Bounce => Self {
                variant,
                width: 800.0,
                height: 600.0,
                player_start: (400.0, 500.0),
                player_size: (48.0, 48.0),
                player_speed: 160.0,
                starting_lives: 3,
                flicker_ms: 0.0,
                hide_player_on_game_over: true,
                bullet_capacity: 10,
                bullet_size: (6.0, 12.0),
                bullet_velocity: -300.0,
                muzzle_offset: 20.0,
                bullet_despawn_y: -20.0,
                fire_mode: FireMode::Press,
                enemy_capacity: 10,
                enemy_size: (32.0, 32.0),
                spawn_interval_ms: 2000.0,
                spawn_x_min: 100.0,
                spawn_x_max: 700.0,
                spawn_y: -50.0,
                // 2 px per reference frame
                descent_speed_min: 120.0,
                descent_speed_max: 120.0,
                enemy_despawn_y: 600.0,
                zigzag_amplitude_min: 0,
                zigzag_amplitude_max: 0,
                zigzag_speed_base: 0.0,
                zigzag_speed_jitter: 0.0,
                bounce_step: 50.0,
                bounce_coupling: BounceCoupling::PerEnemy,
                score_label: "Score".to_string(),
                lives_label: "Lives".to_string(),
            },
        }
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::Invalid(reason.to_string()));

        if !(self.width > 0.0 && self.height > 0.0) {
            return invalid("playfield must have positive width and height");
        }
        if self.bullet_capacity == 0 {
            return invalid("bullet_capacity must be at least 1");
        }
        if self.enemy_capacity == 0 {
            return invalid("enemy_capacity must be at least 1");
        }
        if self.starting_lives == 0 {
            return invalid("starting_lives must be at least 1");
        }
        if !(self.spawn_interval_ms > 0.0) {
            return invalid("spawn_interval_ms must be positive");
        }
        if !(self.bullet_velocity < 0.0) {
            return invalid("bullet_velocity must be negative (bullets travel up)");
        }
        if !(self.descent_speed_min > 0.0) {
            return invalid("descent_speed_min must be positive (enemies travel down)");
        }
        if self.spawn_x_min > self.spawn_x_max {
            return invalid("spawn_x_min is greater than spawn_x_max");
        }
        if self.descent_speed_min > self.descent_speed_max {
            return invalid("descent_speed_min is greater than descent_speed_max");
        }
        if self.zigzag_amplitude_min > self.zigzag_amplitude_max {
            return invalid("zigzag_amplitude_min is greater than zigzag_amplitude_max");
        }
        if self.zigzag_speed_jitter < 0.0 {
            return invalid("zigzag_speed_jitter must not be negative");
        }
        if let FireMode::Held { cooldown_ms } = self.fire_mode {
            if cooldown_ms < 0.0 {
                return invalid("fire cooldown must not be negative");
            }
        }
        Ok(())
    }
}

/// Read a JSON config file.  Fields the file leaves out fall back to the
/// `variant` preset.
pub fn load(path: &Path, variant: Variant) -> Result<GameConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_json(&text, variant)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse a JSON override on top of a variant preset.  A `"variant"` key in
/// the file picks the preset; otherwise `variant` does.  Keys that name no
/// setting are rejected.
pub fn from_json(text: &str, variant: Variant) -> Result<GameConfig, ConfigError> {
    let overrides: serde_json::Value = serde_json::from_str(text).map_err(ConfigError::Parse)?;
    let variant = match overrides.get("variant") {
        Some(v) => serde_json::from_value(v.clone()).map_err(ConfigError::Parse)?,
        None => variant,
    };
    let mut merged =
        serde_json::to_value(GameConfig::for_variant(variant)).map_err(ConfigError::Parse)?;

    if let (Some(base), serde_json::Value::Object(fields)) = (merged.as_object_mut(), overrides) {
        for (key, value) in fields {
            if !base.contains_key(&key) {
                return Err(ConfigError::Invalid(format!("unknown config key `{}`", key)));
            }
            base.insert(key, value);
        }
    } else {
        return Err(ConfigError::Invalid("config must be a JSON object".to_string()));
    }

    let config: GameConfig = serde_json::from_value(merged).map_err(ConfigError::Parse)?;
    config.validate()?;
    Ok(config)
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            Self::Parse(err) => write!(f, "malformed config: {}", err),
            Self::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}
