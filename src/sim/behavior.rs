//! Rope behaviors
//!
//! A behavior is a temporary modifier on how the rope moves. The catalog is a
//! closed set; each variant carries its own speed transform, unlock frame and
//! label so that adding one means touching this file and nothing else.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Rope motion modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// Base speed, current direction
    #[default]
    Normal,
    /// Faster sweep
    Sprint,
    /// Crawl
    Brake,
    /// Alternates a lunge with a near stop every few frames
    Stutter,
    /// Swings back and forth around a safe center instead of sweeping
    Sway,
    /// Speed pulses around base while still sweeping forward
    Zigzag,
    /// Falls through the lower half of the dial, drags through the upper half
    Gravity,
    /// Brief; flips the sweep direction when it expires
    Reverse,
    /// Crossings only score, they never hurt
    Ghost,
}

/// What the rope needs to know about itself to transform its speed this tick
#[derive(Debug, Clone, Copy)]
pub struct MotionContext {
    /// Accumulated base speed (radians per reference frame)
    pub base_speed: f32,
    /// Frames since the round went live
    pub frame_count: u64,
    /// Frames since the current behavior started (fractional under variable dt)
    pub phase_frames: f32,
    /// Rope angle at the start of the tick
    pub angle: f32,
}

impl Behavior {
    /// Every behavior, in catalog order
    pub const ALL: [Behavior; 9] = [
        Behavior::Normal,
        Behavior::Sprint,
        Behavior::Brake,
        Behavior::Stutter,
        Behavior::Sway,
        Behavior::Zigzag,
        Behavior::Gravity,
        Behavior::Reverse,
        Behavior::Ghost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Normal => "NORMAL",
            Behavior::Sprint => "SPRINT",
            Behavior::Brake => "BRAKE",
            Behavior::Stutter => "STUTTER",
            Behavior::Sway => "SWAY",
            Behavior::Zigzag => "ZIGZAG",
            Behavior::Gravity => "GRAVITY",
            Behavior::Reverse => "REVERSE",
            Behavior::Ghost => "GHOST",
        }
    }

    /// Frame count from which the behavior can be drawn; `None` for the resting state
    pub fn unlock_frame(&self) -> Option<u64> {
        match self {
            Behavior::Normal => None,
            Behavior::Brake | Behavior::Stutter => Some(0),
            Behavior::Sprint => Some(1000),
            Behavior::Zigzag => Some(1500),
            Behavior::Sway | Behavior::Reverse => Some(2000),
            Behavior::Gravity => Some(2500),
            Behavior::Ghost => Some(3000),
        }
    }

    /// Is the behavior in the draw pool at this point of the round?
    pub fn is_unlocked(&self, frame_count: u64) -> bool {
        self.unlock_frame().is_some_and(|at| frame_count >= at)
    }

    /// Rope follows an oscillation instead of a monotonic sweep
    pub fn is_oscillating(&self) -> bool {
        matches!(self, Behavior::Sway)
    }

    /// Crossings under this behavior never cost a life
    pub fn is_harmless(&self) -> bool {
        matches!(self, Behavior::Ghost)
    }

    /// Active time for this behavior given a uniform roll in [0, 1)
    pub fn duration_ms(&self, roll: f32) -> f32 {
        match self {
            Behavior::Reverse => REVERSE_DURATION_MS,
            _ => BEHAVIOR_DURATION_MIN_MS + roll * BEHAVIOR_DURATION_SPREAD_MS,
        }
    }

    /// Speed multiplier applied on top of the accumulated base speed
    ///
    /// SWAY does not sweep; its multiplier is meaningless and reported as 0.
    pub fn speed_factor(&self, ctx: &MotionContext) -> f32 {
        match self {
            Behavior::Normal | Behavior::Reverse | Behavior::Ghost => 1.0,
            Behavior::Sprint => SPRINT_FACTOR,
            Behavior::Brake => BRAKE_FACTOR,
            Behavior::Stutter => {
                if (ctx.frame_count / STUTTER_PERIOD_FRAMES) % 2 == 0 {
                    STUTTER_HIGH
                } else {
                    STUTTER_LOW
                }
            }
            Behavior::Zigzag => 1.0 + ZIGZAG_DEPTH * (ctx.phase_frames * ZIGZAG_RATE).sin(),
            Behavior::Gravity => {
                // y grows downward on the dial, so sin > 0 is the lower half
                if ctx.angle.sin() > 0.0 {
                    GRAVITY_FALL
                } else {
                    GRAVITY_CLIMB
                }
            }
            Behavior::Sway => 0.0,
        }
    }

    /// Effective (unsigned) rope speed for this tick, radians per reference frame
    pub fn effective_speed(&self, ctx: &MotionContext) -> f32 {
        ctx.base_speed * self.speed_factor(ctx)
    }

    /// Offset from the sway center after `phase_frames` frames of swaying
    pub fn sway_offset(phase_frames: f32) -> f32 {
        SWAY_AMPLITUDE * (phase_frames * SWAY_RATE).sin()
    }
}

impl std::fmt::Display for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draw weight REVERSE gets relative to the other behaviors (1.0 on HARD)
pub fn reverse_weight(reverse_probability: f32) -> f32 {
    (reverse_probability * 100.0).clamp(0.0, 1.0)
}

/// Behaviors eligible for the next draw
pub fn eligible_behaviors(frame_count: u64) -> impl Iterator<Item = Behavior> {
    Behavior::ALL
        .into_iter()
        .filter(move |b| b.is_unlocked(frame_count))
}

/// Choose the next behavior from the eligible pool
///
/// Pure: the same `(frame_count, reverse_weight, draw)` always yields the same
/// behavior. `draw` is a uniform roll in [0, 1). Every eligible behavior has
/// weight 1 except REVERSE, which has `reverse_weight`.
pub fn pick_behavior(frame_count: u64, reverse_weight: f32, draw: f32) -> Behavior {
    let weight_of = |b: &Behavior| {
        if *b == Behavior::Reverse {
            reverse_weight
        } else {
            1.0
        }
    };

    let total: f32 = eligible_behaviors(frame_count).map(|b| weight_of(&b)).sum();
    if total <= 0.0 {
        return Behavior::Brake;
    }

    let mut target = draw.clamp(0.0, 1.0) * total;
    let mut last = Behavior::Brake;
    for behavior in eligible_behaviors(frame_count) {
        let w = weight_of(&behavior);
        if w <= 0.0 {
            continue;
        }
        if target < w {
            return behavior;
        }
        target -= w;
        last = behavior;
    }
    // draw == 1.0 or float drift lands past the end
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ctx(base_speed: f32, frame_count: u64) -> MotionContext {
        MotionContext {
            base_speed,
            frame_count,
            phase_frames: 0.0,
            angle: 0.0,
        }
    }

    #[test]
    fn test_progressive_unlock() {
        let early: HashSet<_> = eligible_behaviors(0).collect();
        assert_eq!(early, HashSet::from([Behavior::Brake, Behavior::Stutter]));

        let mid: HashSet<_> = eligible_behaviors(1500).collect();
        assert!(mid.contains(&Behavior::Sprint));
        assert!(mid.contains(&Behavior::Zigzag));
        assert!(!mid.contains(&Behavior::Sway));

        let late: HashSet<_> = eligible_behaviors(10_000).collect();
        assert_eq!(late.len(), Behavior::ALL.len() - 1);
        assert!(!late.contains(&Behavior::Normal));
    }

    #[test]
    fn test_pick_behavior_is_pure_and_uniform_at_full_weight() {
        // Two behaviors eligible at frame 0: halves of the draw range
        assert_eq!(pick_behavior(0, 1.0, 0.0), Behavior::Brake);
        assert_eq!(pick_behavior(0, 1.0, 0.49), Behavior::Brake);
        assert_eq!(pick_behavior(0, 1.0, 0.51), Behavior::Stutter);
        assert_eq!(pick_behavior(0, 1.0, 0.999), Behavior::Stutter);
        assert_eq!(pick_behavior(0, 1.0, 1.0), Behavior::Stutter);
        assert_eq!(pick_behavior(0, 1.0, 0.3), pick_behavior(0, 1.0, 0.3));
    }

    #[test]
    fn test_pick_behavior_never_returns_locked() {
        for i in 0..100 {
            let draw = i as f32 / 100.0;
            let b = pick_behavior(1200, 1.0, draw);
            assert!(b.is_unlocked(1200), "{b} drawn before unlock");
        }
    }

    #[test]
    fn test_reverse_weight_thins_reverse() {
        let count = |weight: f32| {
            (0..1000)
                .filter(|i| pick_behavior(5000, weight, *i as f32 / 1000.0) == Behavior::Reverse)
                .count()
        };
        assert_eq!(count(0.0), 0);
        assert!(count(0.2) < count(1.0));
        assert!((reverse_weight(0.002) - 0.2).abs() < 1e-6);
        assert_eq!(reverse_weight(0.05), 1.0);
    }

    #[test]
    fn test_speed_factors() {
        let c = ctx(0.02, 0);
        assert_eq!(Behavior::Normal.effective_speed(&c), 0.02);
        assert!(Behavior::Sprint.effective_speed(&c) > 0.02);
        assert!(Behavior::Brake.effective_speed(&c) < 0.02);
        assert_eq!(Behavior::Ghost.effective_speed(&c), 0.02);
        assert_eq!(Behavior::Reverse.effective_speed(&c), 0.02);
    }

    #[test]
    fn test_stutter_cadence() {
        assert_eq!(Behavior::Stutter.speed_factor(&ctx(1.0, 0)), STUTTER_HIGH);
        assert_eq!(Behavior::Stutter.speed_factor(&ctx(1.0, 24)), STUTTER_HIGH);
        assert_eq!(Behavior::Stutter.speed_factor(&ctx(1.0, 25)), STUTTER_LOW);
        assert_eq!(Behavior::Stutter.speed_factor(&ctx(1.0, 50)), STUTTER_HIGH);
    }

    #[test]
    fn test_gravity_depends_on_half() {
        let mut c = ctx(1.0, 0);
        c.angle = std::f32::consts::FRAC_PI_2;
        assert_eq!(Behavior::Gravity.speed_factor(&c), GRAVITY_FALL);
        c.angle = 1.5 * std::f32::consts::PI;
        assert_eq!(Behavior::Gravity.speed_factor(&c), GRAVITY_CLIMB);
    }

    #[test]
    fn test_zigzag_stays_forward() {
        let mut c = ctx(1.0, 0);
        for frame in 0..500 {
            c.phase_frames = frame as f32;
            assert!(Behavior::Zigzag.speed_factor(&c) > 0.0);
        }
    }

    #[test]
    fn test_reverse_is_short() {
        assert_eq!(Behavior::Reverse.duration_ms(0.9), REVERSE_DURATION_MS);
        assert!(Behavior::Sprint.duration_ms(0.0) >= BEHAVIOR_DURATION_MIN_MS);
        assert!(Behavior::Reverse.duration_ms(0.0) < Behavior::Sprint.duration_ms(0.0));
    }
}
