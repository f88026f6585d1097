//! Rope motion and behavior scheduling
//!
//! The schedule cycles Resting (cooldown) → Telegraph (warning shown, rope
//! still normal) → Active (behavior applied) → Resting. The rope's base speed
//! keeps accelerating underneath regardless of what the schedule is doing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arc::find_safest_angle;
use super::behavior::{Behavior, MotionContext, pick_behavior, reverse_weight};
use super::state::GameEvent;
use crate::consts::*;
use crate::normalize_angle;
use crate::settings::DifficultyPreset;

/// How long "REVERSE!" stays up after the direction flips
pub const FLIP_NOTICE_MS: f32 = 1200.0;

/// Where the rope is in its behavior cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BehaviorSchedule {
    /// Normal motion; a new behavior is telegraphed once the cooldown runs out
    Resting { cooldown_ms: f32 },
    /// Behavior chosen and announced, not yet applied
    Telegraph { pending: Behavior, remaining_ms: f32 },
    /// Behavior applied to the rope
    Active {
        behavior: Behavior,
        remaining_ms: f32,
        /// Frames since activation, drives SWAY and ZIGZAG phase
        phase_frames: f32,
    },
}

impl Default for BehaviorSchedule {
    fn default() -> Self {
        Self::Resting {
            cooldown_ms: INITIAL_BEHAVIOR_COOLDOWN_MS,
        }
    }
}

/// Text surfaced to players while a behavior is pending or running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorWarning {
    Incoming(Behavior),
    Active(Behavior),
    Reversed,
}

impl std::fmt::Display for BehaviorWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BehaviorWarning::Incoming(b) => write!(f, "{b} INCOMING"),
            BehaviorWarning::Active(b) => write!(f, "{b}"),
            BehaviorWarning::Reversed => f.write_str("REVERSE!"),
        }
    }
}

/// Motion produced by one rope step, consumed by the crossing resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeStep {
    pub prev_angle: f32,
    pub angle: f32,
    pub direction: f32,
    /// Behavior that shaped this tick's motion
    pub behavior: Behavior,
}

impl RopeStep {
    /// True when the rope oscillated this tick and crossings use proximity
    pub fn is_oscillating(&self) -> bool {
        self.behavior.is_oscillating()
    }
}

/// The rotating rope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rope {
    /// Current angle (radians, [0, 2π))
    pub angle: f32,
    /// Accumulated base speed (radians per reference frame)
    pub speed: f32,
    /// +1 or -1
    pub direction: f32,
    pub schedule: BehaviorSchedule,
    /// Center of oscillation, captured when SWAY activates
    pub sway_center: f32,
    /// Remaining display time of the direction-flip notice
    pub flip_notice_ms: f32,
}

impl Rope {
    /// Rope at rest for a fresh round, parked in the widest gap between players
    pub fn new(player_angles: &[f32], preset: &DifficultyPreset) -> Self {
        let angle = find_safest_angle(player_angles);
        Self {
            angle,
            speed: preset.base_speed,
            direction: 1.0,
            schedule: BehaviorSchedule::default(),
            sway_center: angle,
            flip_notice_ms: 0.0,
        }
    }

    /// Behavior currently applied to the motion
    pub fn current_behavior(&self) -> Behavior {
        match self.schedule {
            BehaviorSchedule::Active { behavior, .. } => behavior,
            _ => Behavior::Normal,
        }
    }

    /// Behavior that has been drawn and announced but is not active yet
    pub fn pending_behavior(&self) -> Option<Behavior> {
        match self.schedule {
            BehaviorSchedule::Telegraph { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<BehaviorWarning> {
        match self.schedule {
            BehaviorSchedule::Telegraph { pending, .. } => Some(BehaviorWarning::Incoming(pending)),
            BehaviorSchedule::Active { behavior, .. } => Some(BehaviorWarning::Active(behavior)),
            BehaviorSchedule::Resting { .. } if self.flip_notice_ms > 0.0 => {
                Some(BehaviorWarning::Reversed)
            }
            BehaviorSchedule::Resting { .. } => None,
        }
    }

    /// Advance the behavior cycle by `dt_ms`; at most one transition per call
    pub fn advance_schedule<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        frame_count: u64,
        alive_angles: &[f32],
        preset: &DifficultyPreset,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) {
        self.flip_notice_ms = (self.flip_notice_ms - dt_ms).max(0.0);

        self.schedule = match self.schedule {
            BehaviorSchedule::Resting { cooldown_ms } => {
                let cooldown_ms = cooldown_ms - dt_ms;
                if cooldown_ms > 0.0 {
                    BehaviorSchedule::Resting { cooldown_ms }
                } else {
                    let draw: f32 = rng.random();
                    let pending = pick_behavior(
                        frame_count,
                        reverse_weight(preset.reverse_probability),
                        draw,
                    );
                    log::debug!("Telegraphing {pending} at frame {frame_count}");
                    events.push(GameEvent::BehaviorTelegraphed { behavior: pending });
                    BehaviorSchedule::Telegraph {
                        pending,
                        remaining_ms: preset.telegraph_ms,
                    }
                }
            }
            BehaviorSchedule::Telegraph {
                pending,
                remaining_ms,
            } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms > 0.0 {
                    BehaviorSchedule::Telegraph {
                        pending,
                        remaining_ms,
                    }
                } else {
                    if pending == Behavior::Sway {
                        self.sway_center = find_safest_angle(alive_angles);
                    }
                    let roll: f32 = rng.random();
                    log::debug!("{pending} active");
                    events.push(GameEvent::BehaviorStarted { behavior: pending });
                    BehaviorSchedule::Active {
                        behavior: pending,
                        remaining_ms: pending.duration_ms(roll),
                        phase_frames: 0.0,
                    }
                }
            }
            BehaviorSchedule::Active {
                behavior,
                remaining_ms,
                phase_frames,
            } => {
                let remaining_ms = remaining_ms - dt_ms;
                if remaining_ms > 0.0 {
                    BehaviorSchedule::Active {
                        behavior,
                        remaining_ms,
                        phase_frames: phase_frames + dt_ms / FRAME_MS,
                    }
                } else {
                    if behavior == Behavior::Reverse {
                        self.direction = -self.direction;
                        self.flip_notice_ms = FLIP_NOTICE_MS;
                        events.push(GameEvent::DirectionFlipped {
                            direction: self.direction,
                        });
                    }
                    let roll: f32 = rng.random();
                    log::debug!("{behavior} ended");
                    events.push(GameEvent::BehaviorEnded { behavior });
                    BehaviorSchedule::Resting {
                        cooldown_ms: BEHAVIOR_COOLDOWN_MIN_MS + roll * BEHAVIOR_COOLDOWN_SPREAD_MS,
                    }
                }
            }
        };
    }

    /// Accelerate and move the rope for a tick of `dt_ms`
    pub fn advance_motion(&mut self, dt_ms: f32, frame_count: u64, preset: &DifficultyPreset) -> RopeStep {
        let frames = dt_ms / FRAME_MS;
        self.speed += preset.acceleration * frames;

        let behavior = self.current_behavior();
        let phase_frames = match self.schedule {
            BehaviorSchedule::Active { phase_frames, .. } => phase_frames,
            _ => 0.0,
        };
        let prev_angle = self.angle;

        if behavior.is_oscillating() {
            self.angle = normalize_angle(self.sway_center + Behavior::sway_offset(phase_frames));
        } else {
            let ctx = MotionContext {
                base_speed: self.speed,
                frame_count,
                phase_frames,
                angle: self.angle,
            };
            let effective = behavior.effective_speed(&ctx);
            self.angle = normalize_angle(self.angle + effective * self.direction * frames);
        }

        RopeStep {
            prev_angle,
            angle: self.angle,
            direction: self.direction,
            behavior,
        }
    }

    /// Full rope tick: schedule, then acceleration and motion
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        frame_count: u64,
        alive_angles: &[f32],
        preset: &DifficultyPreset,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> RopeStep {
        self.advance_schedule(dt_ms, frame_count, alive_angles, preset, rng, events);
        self.advance_motion(dt_ms, frame_count, preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    fn preset() -> DifficultyPreset {
        Difficulty::Normal.preset()
    }

    fn rope_with(schedule: BehaviorSchedule) -> Rope {
        let mut rope = Rope::new(&[0.0], &preset());
        rope.schedule = schedule;
        rope
    }

    #[test]
    fn test_new_rope_starts_opposite_single_player() {
        let rope = Rope::new(&[0.0], &preset());
        assert!((rope.angle - PI).abs() < 1e-5);
        assert_eq!(rope.direction, 1.0);
        assert_eq!(rope.current_behavior(), Behavior::Normal);
        assert!(rope.warning().is_none());
    }

    #[test]
    fn test_speed_accelerates_every_tick() {
        let mut rope = Rope::new(&[0.0], &preset());
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let before = rope.speed;
        rope.step(FRAME_MS, 0, &[0.0], &preset(), &mut rng, &mut events);
        assert!((rope.speed - before - preset().acceleration).abs() < 1e-8);
    }

    #[test]
    fn test_normal_motion_advances_by_speed() {
        let mut rope = Rope::new(&[0.0], &preset());
        let step = rope.advance_motion(FRAME_MS, 0, &preset());
        let expected = normalize_angle(step.prev_angle + rope.speed);
        assert!((step.angle - expected).abs() < 1e-5);
        assert!(!step.is_oscillating());
    }

    #[test]
    fn test_cycle_resting_telegraph_active_resting() {
        let mut rope = rope_with(BehaviorSchedule::Resting { cooldown_ms: 50.0 });
        let mut rng = Pcg32::seed_from_u64(7);
        let mut events = Vec::new();
        let p = preset();

        rope.advance_schedule(60.0, 0, &[0.0], &p, &mut rng, &mut events);
        let pending = rope.pending_behavior().expect("telegraph after cooldown");
        assert!(pending.is_unlocked(0));
        // Still normal while telegraphing
        assert_eq!(rope.current_behavior(), Behavior::Normal);
        assert_eq!(rope.warning(), Some(BehaviorWarning::Incoming(pending)));

        let mut guard = 0;
        while rope.pending_behavior().is_some() {
            rope.advance_schedule(100.0, 0, &[0.0], &p, &mut rng, &mut events);
            guard += 1;
            assert!(guard < 100);
        }
        assert_eq!(rope.current_behavior(), pending);

        while rope.current_behavior() != Behavior::Normal {
            rope.advance_schedule(100.0, 0, &[0.0], &p, &mut rng, &mut events);
            guard += 1;
            assert!(guard < 200);
        }
        match rope.schedule {
            BehaviorSchedule::Resting { cooldown_ms } => {
                assert!(cooldown_ms >= BEHAVIOR_COOLDOWN_MIN_MS);
                assert!(cooldown_ms < BEHAVIOR_COOLDOWN_MIN_MS + BEHAVIOR_COOLDOWN_SPREAD_MS);
            }
            other => panic!("expected resting, got {other:?}"),
        }
        assert!(matches!(events[0], GameEvent::BehaviorTelegraphed { .. }));
        assert!(events.contains(&GameEvent::BehaviorStarted { behavior: pending }));
        assert!(events.contains(&GameEvent::BehaviorEnded { behavior: pending }));
    }

    #[test]
    fn test_reverse_expiry_flips_direction_only() {
        let mut rope = rope_with(BehaviorSchedule::Active {
            behavior: Behavior::Reverse,
            remaining_ms: REVERSE_DURATION_MS,
            phase_frames: 0.0,
        });
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        let p = preset();
        let speed_before = rope.speed;

        rope.advance_schedule(100.0, 0, &[0.0], &p, &mut rng, &mut events);
        rope.advance_schedule(100.0, 0, &[0.0], &p, &mut rng, &mut events);
        assert_eq!(rope.direction, 1.0);
        rope.advance_schedule(100.0, 0, &[0.0], &p, &mut rng, &mut events);

        assert_eq!(rope.direction, -1.0);
        assert_eq!(rope.current_behavior(), Behavior::Normal);
        assert_eq!(rope.speed, speed_before);
        assert_eq!(rope.warning(), Some(BehaviorWarning::Reversed));
        assert!(events.contains(&GameEvent::DirectionFlipped { direction: -1.0 }));
    }

    #[test]
    fn test_reversed_rope_moves_backwards() {
        let mut rope = Rope::new(&[0.0], &preset());
        rope.direction = -1.0;
        let step = rope.advance_motion(FRAME_MS, 0, &preset());
        let expected = normalize_angle(step.prev_angle - rope.speed);
        assert!((step.angle - expected).abs() < 1e-5);
    }

    #[test]
    fn test_sway_oscillates_around_safe_center() {
        let mut rope = rope_with(BehaviorSchedule::Telegraph {
            pending: Behavior::Sway,
            remaining_ms: 10.0,
        });
        let mut rng = Pcg32::seed_from_u64(11);
        let mut events = Vec::new();
        let p = preset();
        let players = [0.0, PI];

        let first = rope.step(FRAME_MS, 3000, &players, &p, &mut rng, &mut events);
        assert!(first.is_oscillating());
        assert!((rope.sway_center - PI / 2.0).abs() < 1e-4);
        assert!((first.angle - rope.sway_center).abs() < 1e-4);

        for _ in 0..60 {
            let step = rope.step(FRAME_MS, 3000, &players, &p, &mut rng, &mut events);
            if !step.is_oscillating() {
                break;
            }
            let off = crate::sim::arc::angular_distance(step.angle, rope.sway_center);
            assert!(off <= SWAY_AMPLITUDE + 1e-4);
        }
    }

    #[test]
    fn test_brake_slows_sweep() {
        let p = preset();
        let mut normal = Rope::new(&[0.0], &p);
        let mut braked = rope_with(BehaviorSchedule::Active {
            behavior: Behavior::Brake,
            remaining_ms: 1000.0,
            phase_frames: 0.0,
        });
        braked.angle = normal.angle;
        let a = normal.advance_motion(FRAME_MS, 0, &p);
        let b = braked.advance_motion(FRAME_MS, 0, &p);
        let da = normalize_angle(a.angle - a.prev_angle);
        let db = normalize_angle(b.angle - b.prev_angle);
        assert!(db < da);
        // Base speed accumulates the same under any behavior
        assert_eq!(normal.speed, braked.speed);
    }
}
