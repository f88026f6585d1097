//! Round state and core simulation types
//!
//! Everything one round needs lives in [`RoundState`]; it is built fresh at
//! round start and nothing carries over to the next round.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::behavior::Behavior;
use super::player::Player;
use super::rope::Rope;
use crate::consts::*;
use crate::settings::{DifficultyPreset, GameMode, GameSettings};

/// Current phase of the round (one-way: Countdown → Active → Ended)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Pre-round countdown; jumps are not accepted
    Countdown { remaining_ms: f32 },
    /// Rope is live
    Active,
    /// Nobody left alive
    Ended,
}

/// Things that happened during a tick, for sound, haptics and effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Displayed countdown number changed
    CountdownStep { value: u32 },
    /// Countdown finished, rope is moving
    RoundStarted,
    Jumped { player: usize },
    Landed { player: usize },
    Scored { player: usize, score: u32 },
    Hit { player: usize, lives_left: u8 },
    Eliminated { player: usize },
    BehaviorTelegraphed { behavior: Behavior },
    BehaviorStarted { behavior: Behavior },
    BehaviorEnded { behavior: Behavior },
    DirectionFlipped { direction: f32 },
    RoundEnded,
}

/// One line of the end-of-round report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub player_id: usize,
    pub score: u32,
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Seed the behavior RNG was built from
    pub seed: u64,
    pub mode: GameMode,
    pub preset: DifficultyPreset,
    pub phase: RoundPhase,
    /// Ticks since the round went Active; gates behavior unlocks
    pub frame_count: u64,
    /// Round clock in ms since the round went Active (jump timestamps use it)
    pub elapsed_ms: f32,
    pub rope: Rope,
    /// Sorted by id
    pub players: Vec<Player>,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    final_scores: Option<Vec<FinalScore>>,
}

impl RoundState {
    /// Fresh round for the given settings; the seed fixes every random draw
    pub fn new(settings: &GameSettings, seed: u64) -> Self {
        let lives = match settings.mode {
            GameMode::Lives => settings.lives,
            GameMode::Elimination => 1,
        };
        let players: Vec<Player> = (0..settings.player_count)
            .map(|id| Player::new(id, settings.player_count, lives))
            .collect();
        let angles: Vec<f32> = players.iter().map(Player::angle).collect();
        let preset = settings.difficulty.preset();

        Self {
            seed,
            mode: settings.mode,
            rope: Rope::new(&angles, &preset),
            preset,
            phase: RoundPhase::Countdown {
                remaining_ms: COUNTDOWN_MS,
            },
            frame_count: 0,
            elapsed_ms: 0.0,
            players,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            final_scores: None,
        }
    }

    /// Skip the countdown (tests, instant restarts)
    pub fn start_immediately(mut self) -> Self {
        self.phase = RoundPhase::Active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub fn is_ended(&self) -> bool {
        self.phase == RoundPhase::Ended
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn alive_angles(&self) -> Vec<f32> {
        self.players
            .iter()
            .filter(|p| p.alive)
            .map(Player::angle)
            .collect()
    }

    pub fn player(&self, id: usize) -> Option<&Player> {
        self.players.get(id)
    }

    /// Number shown during the countdown (3, 2, 1), then 0 for "GO" briefly
    /// after the rope starts
    pub fn countdown_value(&self) -> Option<u32> {
        match self.phase {
            RoundPhase::Countdown { remaining_ms } => Some(countdown_display(remaining_ms)),
            RoundPhase::Active if self.elapsed_ms < GO_BANNER_MS => Some(0),
            _ => None,
        }
    }

    /// Every player's score right now, dead or alive
    pub fn scores(&self) -> Vec<FinalScore> {
        self.players
            .iter()
            .map(|p| FinalScore {
                player_id: p.id,
                score: p.score,
            })
            .collect()
    }

    /// Scores frozen at the instant the round ended
    pub fn final_scores(&self) -> Option<&[FinalScore]> {
        self.final_scores.as_deref()
    }

    /// Enter Ended and freeze scores; returns them only on the first call
    pub(crate) fn finish(&mut self) -> Option<Vec<FinalScore>> {
        if self.final_scores.is_some() {
            return None;
        }
        let scores = self.scores();
        self.phase = RoundPhase::Ended;
        self.final_scores = Some(scores.clone());
        Some(scores)
    }
}

/// Countdown digit for the time left
pub fn countdown_display(remaining_ms: f32) -> u32 {
    (remaining_ms / 1000.0).ceil().clamp(0.0, COUNTDOWN_STEPS as f32) as u32
}
