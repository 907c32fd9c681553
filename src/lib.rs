//! Descent Shooter - shoot the enemies before they reach you.
//!
//! Core modules:
//! - `entities`: pure data (player, bullets, enemies, game state)
//! - `pool`: fixed-capacity slot arenas for bullets and enemies
//! - `config`: per-variant tuning, loadable from JSON
//! - `compute`: spawning, movement, collisions and the per-frame tick

pub mod compute;
pub mod config;
pub mod entities;
pub mod pool;

pub use compute::{init_scene, tick, GameEvent, TickInput};
pub use config::{ConfigError, GameConfig, Variant};
pub use entities::{GameStatus, Scene};
