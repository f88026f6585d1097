//! Angular geometry on the dial
//!
//! The rope is a radius sweeping around the dial center. Each tick it covers
//! an arc from its previous angle to its current one; a player is crossed
//! when their fixed angle lies on that arc.
//!
//! All angles are radians in [0, 2π).

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::consts::DEFAULT_SAFE_ANGLE;
use crate::normalize_angle;

/// The arc covered by the rope during one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweptArc {
    /// Angle at the start of the tick (normalized)
    pub theta_start: f32,
    /// Angle at the end of the tick (normalized)
    pub theta_end: f32,
    /// Sweep sense: +1 counts angles upward from `theta_start`, -1 downward
    pub direction: f32,
}

impl SweptArc {
    pub fn new(theta_start: f32, theta_end: f32, direction: f32) -> Self {
        Self {
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
        }
    }

    /// Angular length of the sweep, measured in its own sense (handles wraparound)
    pub fn angular_span(&self) -> f32 {
        normalize_angle((self.theta_end - self.theta_start) * self.direction)
    }

    /// How far along the sweep `theta` sits, in [0, 2π)
    fn offset_of(&self, theta: f32) -> f32 {
        normalize_angle((theta - self.theta_start) * self.direction)
    }

    /// Check if the sweep passed over `theta`
    ///
    /// The arc is half-open: the start angle is excluded and the end angle
    /// included, so a rope resting exactly on a player is counted on one tick
    /// only. A zero-length sweep contains nothing.
    pub fn contains_angle(&self, theta: f32) -> bool {
        let offset = self.offset_of(theta);
        offset > 0.0 && offset <= self.angular_span()
    }
}

/// True iff the rope moving from `prev` to `curr` in `direction`'s sense swept over `target`
#[inline]
pub fn crossed(prev: f32, curr: f32, target: f32, direction: f32) -> bool {
    SweptArc::new(prev, curr, direction).contains_angle(target)
}

/// Shortest angular distance between two angles, in [0, π]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (normalize_angle(a) - normalize_angle(b)).abs();
    d.min(TAU - d)
}

/// Proximity test used while the rope oscillates instead of sweeping
#[inline]
pub fn within_reach(rope: f32, target: f32, threshold: f32) -> bool {
    angular_distance(rope, target) < threshold
}

/// Midpoint of the largest empty gap between the given angles
///
/// Used to place the rope (or the SWAY center) where it is not already on top
/// of a player. With one angle the antipode is returned; with none, a fixed
/// default. Ties between equal gaps go to the first one counting up from 0.
pub fn find_safest_angle(angles: &[f32]) -> f32 {
    match angles {
        [] => DEFAULT_SAFE_ANGLE,
        [only] => normalize_angle(only + PI),
        _ => {
            let mut sorted: Vec<f32> = angles.iter().map(|a| normalize_angle(*a)).collect();
            sorted.sort_by(|a, b| a.total_cmp(b));

            // Gaps this close are the same gap as far as fairness goes
            const TIE: f32 = 1e-5;
            let mut best_start = sorted[0];
            let mut best_gap = f32::MIN;
            for pair in sorted.windows(2) {
                let gap = pair[1] - pair[0];
                if gap > best_gap + TIE {
                    best_gap = gap;
                    best_start = pair[0];
                }
            }
            let last = sorted[sorted.len() - 1];
            let wrap_gap = sorted[0] + TAU - last;
            if wrap_gap > best_gap + TIE {
                best_gap = wrap_gap;
                best_start = last;
            }

            normalize_angle(best_start + best_gap / 2.0)
        }
    }
}
