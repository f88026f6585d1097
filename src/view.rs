//! Render model
//!
//! A read-only snapshot of the round in dial space for whatever draws it
//! (canvas, terminal, tests). Built fresh each frame; nothing here feeds
//! back into the simulation.

use glam::Vec2;
use serde::Serialize;

use crate::polar_to_cartesian;
use crate::sim::{Behavior, Player, RoundPhase, RoundState};

/// One player marker on the dial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: usize,
    pub angle: f32,
    /// Marker center relative to the dial center
    pub position: Vec2,
    pub alive: bool,
    pub jumping: bool,
    /// 0..1 through the current jump, for the hop arc
    pub airborne_progress: f32,
    pub score: u32,
    pub lives: u8,
    /// Remaining cooldown (ms); drawn as a fading ring
    pub cooldown_ms: f32,
    /// Post-hit immunity window
    pub immune: bool,
}

impl PlayerView {
    fn capture(player: &Player, now_ms: f32, dial_radius: f32) -> Self {
        Self {
            id: player.id,
            angle: player.angle(),
            position: polar_to_cartesian(dial_radius, player.angle()),
            alive: player.alive,
            jumping: player.is_jumping(),
            airborne_progress: player.airborne_progress(now_ms),
            score: player.score,
            lives: player.lives,
            cooldown_ms: player.jump_cooldown(),
            immune: player.is_immune(),
        }
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundView {
    pub rope_angle: f32,
    /// Rope tip on the dial rim
    pub rope_tip: Vec2,
    pub direction: f32,
    pub behavior: Behavior,
    /// Banner text ("SPRINT INCOMING", "GHOST", "REVERSE!")
    pub warning: Option<String>,
    /// Countdown banner ("3", "2", "1", "GO")
    pub countdown: Option<String>,
    pub ended: bool,
    pub players: Vec<PlayerView>,
}

impl RoundView {
    pub fn capture(state: &RoundState, dial_radius: f32) -> Self {
        let now = state.elapsed_ms;
        Self {
            rope_angle: state.rope.angle,
            rope_tip: polar_to_cartesian(dial_radius, state.rope.angle),
            direction: state.rope.direction,
            behavior: state.rope.current_behavior(),
            warning: state.rope.warning().map(|w| w.to_string()),
            countdown: state.countdown_value().map(|v| match v {
                0 => "GO".to_string(),
                n => n.to_string(),
            }),
            ended: state.phase == RoundPhase::Ended,
            players: state
                .players
                .iter()
                .map(|p| PlayerView::capture(p, now, dial_radius))
                .collect(),
        }
    }
}
