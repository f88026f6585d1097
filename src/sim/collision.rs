//! Crossing detection and outcome resolution
//!
//! The tricky part of the game: deciding whether the rope passed a player
//! this tick. A sweeping rope is tested against the arc it covered; an
//! oscillating rope has no sweep, so it is tested by proximity instead.

use super::arc::{crossed, within_reach};
use super::behavior::Behavior;
use super::player::Player;
use super::rope::RopeStep;
use crate::consts::PROXIMITY_THRESHOLD;
use crate::settings::GameMode;

/// What a crossing did to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingOutcome {
    /// Airborne as the rope passed: one point
    Scored,
    /// Grounded; lost a life and is still in play
    Hit { lives_left: u8 },
    /// Grounded; out of the round
    Eliminated,
    /// Crossing had no effect (harmless rope, or post-hit immunity)
    Ignored,
}

/// Did the rope pass over `player` during `step`?
///
/// For the oscillating rope this is edge-triggered through the player's
/// contact latch: true only on the tick the rope comes within reach.
pub fn check_crossing(step: &RopeStep, player: &mut Player) -> bool {
    if step.is_oscillating() {
        let near = within_reach(step.angle, player.angle(), PROXIMITY_THRESHOLD);
        let entered = near && !player.rope_contact;
        player.rope_contact = near;
        entered
    } else {
        player.rope_contact = false;
        crossed(step.prev_angle, step.angle, player.angle(), step.direction)
    }
}

/// Apply the consequence of a crossing; exactly one outcome per call
pub fn resolve_crossing(player: &mut Player, behavior: Behavior, mode: GameMode) -> CrossingOutcome {
    if player.is_jumping() {
        player.score += 1;
        return CrossingOutcome::Scored;
    }
    if behavior.is_harmless() || player.is_immune() {
        return CrossingOutcome::Ignored;
    }
    match mode {
        GameMode::Elimination => {
            player.eliminate();
            CrossingOutcome::Eliminated
        }
        GameMode::Lives => {
            if player.take_hit(true) {
                CrossingOutcome::Eliminated
            } else {
                CrossingOutcome::Hit {
                    lives_left: player.lives,
                }
            }
        }
    }
}
