//! Round configuration
//!
//! Chosen on the setup screen and persisted so the next session starts with
//! the same table.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LIVES, MAX_PLAYERS};
use crate::error::{ConfigError, StorageError};
use crate::persistence::{KeyValueStore, load_json, save_json};

/// How a hit is punished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// First hit is out
    #[default]
    Elimination,
    /// Each player has a number of lives
    Lives,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Elimination => "Elimination",
            GameMode::Lives => "Lives",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "elimination" | "elim" => Some(GameMode::Elimination),
            "lives" => Some(GameMode::Lives),
            _ => None,
        }
    }
}

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Numbers a difficulty level stands for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    /// Rope speed at round start (radians per reference frame)
    pub base_speed: f32,
    /// Speed added per reference frame
    pub acceleration: f32,
    /// Scales how often REVERSE is drawn relative to the other behaviors
    pub reverse_probability: f32,
    /// Warning time before a drawn behavior takes effect
    pub telegraph_ms: f32,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn preset(&self) -> DifficultyPreset {
        match self {
            Difficulty::Easy => DifficultyPreset {
                base_speed: 0.015,
                acceleration: 0.000005,
                reverse_probability: 0.002,
                telegraph_ms: 1000.0,
            },
            Difficulty::Normal => DifficultyPreset {
                base_speed: 0.025,
                acceleration: 0.000015,
                reverse_probability: 0.005,
                telegraph_ms: 750.0,
            },
            Difficulty::Hard => DifficultyPreset {
                base_speed: 0.04,
                acceleration: 0.000025,
                reverse_probability: 0.01,
                telegraph_ms: 500.0,
            },
        }
    }
}

/// Settings for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// 1..=8 players around the dial
    pub player_count: usize,
    pub mode: GameMode,
    /// Starting lives in LIVES mode (1..=10); ignored in ELIMINATION
    pub lives: u8,
    pub difficulty: Difficulty,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_count: 1,
            mode: GameMode::Elimination,
            lives: 3,
            difficulty: Difficulty::Normal,
        }
    }
}

impl GameSettings {
    /// Storage key
    const STORAGE_KEY: &'static str = "rope_clock_settings";

    /// Check the ranges the simulation assumes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                found: self.player_count,
                max: MAX_PLAYERS,
            });
        }
        if self.mode == GameMode::Lives && !(1..=MAX_LIVES).contains(&self.lives) {
            return Err(ConfigError::Lives {
                found: self.lives,
                max: MAX_LIVES,
            });
        }
        Ok(())
    }

    /// Build settings from loose text fields (command line, form values)
    pub fn parse(
        player_count: usize,
        mode: &str,
        lives: u8,
        difficulty: &str,
    ) -> Result<Self, ConfigError> {
        let settings = Self {
            player_count,
            mode: GameMode::from_str(mode).ok_or_else(|| ConfigError::UnknownMode(mode.into()))?,
            lives,
            difficulty: Difficulty::from_str(difficulty)
                .ok_or_else(|| ConfigError::UnknownDifficulty(difficulty.into()))?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load saved settings, falling back to defaults on missing or bad data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<GameSettings>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) if settings.validate().is_ok() => {
                log::info!("Loaded settings");
                settings
            }
            Ok(Some(_)) => {
                log::warn!("Saved settings out of range, using defaults");
                Self::default()
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not load settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
