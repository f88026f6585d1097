//! Players and their jump state machine
//!
//! Each player stands at a fixed angle on the dial. The jump cycle is
//! Ready → Airborne (fixed duration) → Cooldown → Ready; elimination is
//! tracked separately and is terminal.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::consts::*;

/// Jump cycle of a single player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JumpState {
    /// On the ground, may jump
    Ready,
    /// In the air since `started_at_ms` (round clock)
    Airborne { started_at_ms: f32 },
    /// On the ground, not allowed to jump yet
    Cooldown {
        remaining_ms: f32,
        /// Set after a hit in LIVES mode; the player cannot be hit again meanwhile
        punitive: bool,
    },
}

/// Timer-driven change reported by [`Player::update_timers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTransition {
    Landed,
    Recovered,
}

/// A participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: usize,
    /// Fixed position on the dial; private so nothing can move a player mid-round
    angle: f32,
    pub jump: JumpState,
    pub alive: bool,
    pub lives: u8,
    pub score: u32,
    /// Latched while the oscillating rope hovers over this player
    #[serde(default)]
    pub rope_contact: bool,
}

impl Player {
    /// Player `id` of `player_count`, evenly spaced around the dial
    pub fn new(id: usize, player_count: usize, lives: u8) -> Self {
        Self {
            id,
            angle: id as f32 / player_count.max(1) as f32 * TAU,
            jump: JumpState::Ready,
            alive: true,
            lives,
            score: 0,
            rope_contact: false,
        }
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.jump, JumpState::Airborne { .. })
    }

    pub fn jump_start_time(&self) -> Option<f32> {
        match self.jump {
            JumpState::Airborne { started_at_ms } => Some(started_at_ms),
            _ => None,
        }
    }

    /// Remaining time before another jump is allowed (0 when ready or airborne)
    pub fn jump_cooldown(&self) -> f32 {
        match self.jump {
            JumpState::Cooldown { remaining_ms, .. } => remaining_ms,
            _ => 0.0,
        }
    }

    /// In the post-hit window where crossings are ignored
    pub fn is_immune(&self) -> bool {
        matches!(self.jump, JumpState::Cooldown { punitive: true, .. })
    }

    pub fn can_jump(&self) -> bool {
        self.alive && self.jump == JumpState::Ready
    }

    /// Start a jump at `now_ms`; returns false (and changes nothing) if not allowed
    pub fn try_jump(&mut self, now_ms: f32) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.jump = JumpState::Airborne {
            started_at_ms: now_ms,
        };
        true
    }

    /// Fraction of the jump completed at `now_ms`, for the jump arc drawing
    pub fn airborne_progress(&self, now_ms: f32) -> f32 {
        match self.jump {
            JumpState::Airborne { started_at_ms } => {
                ((now_ms - started_at_ms) / JUMP_DURATION_MS).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Land finished jumps and run down cooldowns
    pub fn update_timers(&mut self, now_ms: f32, dt_ms: f32) -> Option<TimerTransition> {
        match self.jump {
            JumpState::Ready => None,
            JumpState::Airborne { started_at_ms } => {
                if now_ms - started_at_ms > JUMP_DURATION_MS {
                    self.jump = JumpState::Cooldown {
                        remaining_ms: JUMP_COOLDOWN_MS,
                        punitive: false,
                    };
                    Some(TimerTransition::Landed)
                } else {
                    None
                }
            }
            JumpState::Cooldown {
                remaining_ms,
                punitive,
            } => {
                let remaining_ms = (remaining_ms - dt_ms).max(0.0);
                if remaining_ms <= 0.0 {
                    self.jump = JumpState::Ready;
                    Some(TimerTransition::Recovered)
                } else {
                    self.jump = JumpState::Cooldown {
                        remaining_ms,
                        punitive,
                    };
                    None
                }
            }
        }
    }

    /// Lose a life; returns true if this eliminated the player
    pub fn take_hit(&mut self, punitive_cooldown: bool) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.alive = false;
            self.jump = JumpState::Ready;
            return true;
        }
        if punitive_cooldown {
            self.jump = JumpState::Cooldown {
                remaining_ms: HIT_COOLDOWN_MS,
                punitive: true,
            };
        }
        false
    }

    /// Remove the player from play regardless of lives left
    pub fn eliminate(&mut self) {
        self.alive = false;
        self.lives = 0;
        self.jump = JumpState::Ready;
    }
}
