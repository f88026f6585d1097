//! Rope Clock - a circular party game about jumping a sweeping rope
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rope motion, behaviors, players, crossings)
//! - `driver`: Frame driver (dt clamping, pause gate, jump queue, round end)
//! - `view`: Read-only render model for the drawing layer
//! - `settings`: Round configuration and difficulty presets
//! - `highscores`: Ranked single-player leaderboard
//! - `persistence`: Key/value storage backends (LocalStorage, JSON files)

pub mod driver;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod view;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::RoundDriver;
pub use error::{ConfigError, StorageError};
pub use highscores::HighScores;
pub use settings::{Difficulty, DifficultyPreset, GameMode, GameSettings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Reference frame length the per-frame rope speeds are tuned against (60 Hz)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest dt a single tick will integrate (backgrounded tab, long GC pause)
    pub const MAX_FRAME_DT_MS: f32 = 100.0;

    /// Pre-round countdown
    pub const COUNTDOWN_MS: f32 = 3000.0;
    pub const COUNTDOWN_STEPS: u32 = 3;
    /// How long "GO" stays up once the rope is live
    pub const GO_BANNER_MS: f32 = 500.0;

    /// Jump timing
    pub const JUMP_DURATION_MS: f32 = 550.0;
    pub const JUMP_COOLDOWN_MS: f32 = 100.0;
    /// Post-hit cooldown in LIVES mode; the player cannot be hit again during it
    pub const HIT_COOLDOWN_MS: f32 = 1200.0;

    /// Crossing window for the oscillating (SWAY) rope, radians
    pub const PROXIMITY_THRESHOLD: f32 = 0.25;
    /// Rope start angle when nobody is alive to avoid
    pub const DEFAULT_SAFE_ANGLE: f32 = PI;

    /// Behavior scheduling
    pub const INITIAL_BEHAVIOR_COOLDOWN_MS: f32 = 3000.0;
    pub const BEHAVIOR_COOLDOWN_MIN_MS: f32 = 4000.0;
    pub const BEHAVIOR_COOLDOWN_SPREAD_MS: f32 = 3000.0;
    pub const BEHAVIOR_DURATION_MIN_MS: f32 = 1500.0;
    pub const BEHAVIOR_DURATION_SPREAD_MS: f32 = 2000.0;
    pub const REVERSE_DURATION_MS: f32 = 250.0;

    /// Behavior transforms
    pub const SPRINT_FACTOR: f32 = 1.35;
    pub const BRAKE_FACTOR: f32 = 0.15;
    pub const STUTTER_HIGH: f32 = 1.8;
    pub const STUTTER_LOW: f32 = 0.05;
    pub const STUTTER_PERIOD_FRAMES: u64 = 25;
    pub const ZIGZAG_DEPTH: f32 = 0.8;
    pub const ZIGZAG_RATE: f32 = 0.12;
    pub const GRAVITY_FALL: f32 = 1.6;
    pub const GRAVITY_CLIMB: f32 = 0.6;
    pub const SWAY_AMPLITUDE: f32 = 1.2;
    pub const SWAY_RATE: f32 = 0.05;

    /// Round size limits (enforced by settings validation, not by the sim)
    pub const MAX_PLAYERS: usize = 8;
    pub const MAX_LIVES: u8 = 10;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
