//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick(dt)`
//! - Seeded RNG only
//! - Stable iteration order (by player ID)
//! - No rendering, audio or platform dependencies

pub mod arc;
pub mod behavior;
pub mod collision;
pub mod player;
pub mod rope;
pub mod state;
pub mod tick;

pub use arc::{SweptArc, angular_distance, crossed, find_safest_angle, within_reach};
pub use behavior::{Behavior, pick_behavior};
pub use collision::{CrossingOutcome, check_crossing, resolve_crossing};
pub use player::{JumpState, Player};
pub use rope::{BehaviorSchedule, BehaviorWarning, Rope, RopeStep};
pub use state::{FinalScore, GameEvent, RoundPhase, RoundState};
pub use tick::{TickInput, TickOutcome, tick};
