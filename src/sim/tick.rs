//! Variable timestep simulation tick
//!
//! Core round loop: countdown, then rope → crossings → player timers →
//! termination, once per display frame.

use super::collision::{CrossingOutcome, check_crossing, resolve_crossing};
use super::player::TimerTransition;
use super::state::{FinalScore, GameEvent, RoundPhase, RoundState, countdown_display};
use crate::consts::*;

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Players who pressed jump, in arrival order
    pub jumps: Vec<usize>,
}

impl TickInput {
    pub fn jump(player: usize) -> Self {
        Self {
            jumps: vec![player],
        }
    }
}

/// What the orchestrator should do after a tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Still counting down; value is the digit on screen (0 = "GO")
    Countdown { value: u32 },
    /// Round in progress
    Running,
    /// The last player just went down; reported exactly once
    Ended(Vec<FinalScore>),
    /// Round was already over; nothing changed
    Finished,
}

/// Advance the round by `dt_ms` (clamped to [`MAX_FRAME_DT_MS`])
pub fn tick(state: &mut RoundState, input: &TickInput, dt_ms: f32) -> TickOutcome {
    if state.is_ended() {
        return TickOutcome::Finished;
    }

    let dt = dt_ms.clamp(0.0, MAX_FRAME_DT_MS);
    state.events.clear();

    if let RoundPhase::Countdown { remaining_ms } = state.phase {
        return countdown(state, remaining_ms, dt);
    }

    state.frame_count += 1;

    // Jumps are stamped with the clock at the start of the tick
    for &id in &input.jumps {
        if let Some(player) = state.players.get_mut(id) {
            if player.try_jump(state.elapsed_ms) {
                state.events.push(GameEvent::Jumped { player: id });
            }
        }
    }

    state.elapsed_ms += dt;

    let alive_angles = state.alive_angles();
    let step = state.rope.step(
        dt,
        state.frame_count,
        &alive_angles,
        &state.preset,
        &mut state.rng,
        &mut state.events,
    );

    for player in state.players.iter_mut().filter(|p| p.alive) {
        if !check_crossing(&step, player) {
            continue;
        }
        match resolve_crossing(player, step.behavior, state.mode) {
            CrossingOutcome::Scored => state.events.push(GameEvent::Scored {
                player: player.id,
                score: player.score,
            }),
            CrossingOutcome::Hit { lives_left } => state.events.push(GameEvent::Hit {
                player: player.id,
                lives_left,
            }),
            CrossingOutcome::Eliminated => {
                log::info!("Player {} eliminated with {} points", player.id, player.score);
                state.events.push(GameEvent::Hit {
                    player: player.id,
                    lives_left: 0,
                });
                state.events.push(GameEvent::Eliminated { player: player.id });
            }
            CrossingOutcome::Ignored => {}
        }
    }

    let now = state.elapsed_ms;
    for player in state.players.iter_mut().filter(|p| p.alive) {
        if player.update_timers(now, dt) == Some(TimerTransition::Landed) {
            state.events.push(GameEvent::Landed { player: player.id });
        }
    }

    if state.alive_count() == 0 {
        if let Some(scores) = state.finish() {
            log::info!(
                "Round over after {} frames: {:?}",
                state.frame_count,
                scores
            );
            state.events.push(GameEvent::RoundEnded);
            return TickOutcome::Ended(scores);
        }
        return TickOutcome::Finished;
    }

    TickOutcome::Running
}

fn countdown(state: &mut RoundState, remaining_ms: f32, dt: f32) -> TickOutcome {
    let before = countdown_display(remaining_ms);
    let remaining_ms = remaining_ms - dt;
    let value = countdown_display(remaining_ms);

    if remaining_ms <= 0.0 {
        state.phase = RoundPhase::Active;
        state.events.push(GameEvent::RoundStarted);
        log::debug!("Countdown finished, round live");
        return TickOutcome::Running;
    }

    state.phase = RoundPhase::Countdown { remaining_ms };
    if value != before {
        state.events.push(GameEvent::CountdownStep { value });
    }
    TickOutcome::Countdown { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, GameMode, GameSettings};
    use crate::sim::rope::BehaviorSchedule;

    fn round(player_count: usize, mode: GameMode, lives: u8) -> RoundState {
        let settings = GameSettings {
            player_count,
            mode,
            lives,
            difficulty: Difficulty::Normal,
        };
        RoundState::new(&settings, 12345)
    }

    /// Pin the rope to plain sweeping so a test controls every crossing
    fn calm(mut state: RoundState) -> RoundState {
        state.rope.schedule = BehaviorSchedule::Resting {
            cooldown_ms: f32::MAX,
        };
        state
    }

    #[test]
    fn test_countdown_to_active() {
        let mut state = round(2, GameMode::Elimination, 1);
        let mut steps = Vec::new();
        let mut outcome = tick(&mut state, &TickInput::default(), 100.0);
        let mut guard = 0;
        while matches!(outcome, TickOutcome::Countdown { .. }) {
            steps.extend(state.events.iter().copied());
            outcome = tick(&mut state, &TickInput::default(), 100.0);
            guard += 1;
            assert!(guard < 100);
        }
        assert_eq!(outcome, TickOutcome::Running);
        assert!(state.is_active());
        assert!(state.events.contains(&GameEvent::RoundStarted));
        assert!(steps.contains(&GameEvent::CountdownStep { value: 2 }));
        assert!(steps.contains(&GameEvent::CountdownStep { value: 1 }));
        // The rope has not moved during the countdown
        assert_eq!(state.frame_count, 0);
    }

    #[test]
    fn test_jump_ignored_during_countdown() {
        let mut state = round(1, GameMode::Elimination, 1);
        tick(&mut state, &TickInput::jump(0), 16.0);
        assert!(!state.players[0].is_jumping());
    }

    #[test]
    fn test_unknown_player_jump_is_noop() {
        let mut state = round(1, GameMode::Elimination, 1).start_immediately();
        assert_eq!(tick(&mut state, &TickInput::jump(7), 16.0), TickOutcome::Running);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = calm(round(1, GameMode::Elimination, 1).start_immediately());
        state.rope.angle = 2.0;
        state.preset.acceleration = 0.0;
        let before = state.rope.angle;
        tick(&mut state, &TickInput::default(), 10_000.0);
        assert_eq!(state.elapsed_ms, MAX_FRAME_DT_MS);
        let moved = crate::normalize_angle(state.rope.angle - before);
        let max = state.rope.speed * MAX_FRAME_DT_MS / FRAME_MS;
        assert!((moved - max).abs() < 1e-4);
    }

    #[test]
    fn test_player_angles_never_change() {
        let mut state = round(5, GameMode::Lives, 3).start_immediately();
        let angles: Vec<f32> = state.players.iter().map(|p| p.angle()).collect();
        for i in 0..3000 {
            let input = TickInput {
                jumps: vec![i % 5],
            };
            if tick(&mut state, &input, FRAME_MS) != TickOutcome::Running {
                break;
            }
            let now: Vec<f32> = state.players.iter().map(|p| p.angle()).collect();
            assert_eq!(now, angles);
        }
    }

    #[test]
    fn test_at_most_one_outcome_per_player_per_tick() {
        let mut state = round(8, GameMode::Lives, 10).start_immediately();
        for i in 0..5000u64 {
            let input = TickInput {
                jumps: if i % 3 == 0 { vec![(i % 8) as usize] } else { vec![] },
            };
            let outcome = tick(&mut state, &input, FRAME_MS);
            for id in 0..8 {
                let scored = state
                    .events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::Scored { player, .. } if *player == id))
                    .count();
                let hit = state
                    .events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::Hit { player, .. } if *player == id))
                    .count();
                assert!(scored + hit <= 1, "player {id} had {scored} scores and {hit} hits");
            }
            if outcome != TickOutcome::Running {
                break;
            }
        }
    }

    #[test]
    fn test_round_ends_exactly_once() {
        let mut state = calm(round(2, GameMode::Elimination, 1).start_immediately());
        let mut ended = 0;
        let mut final_scores = None;
        for _ in 0..10_000 {
            match tick(&mut state, &TickInput::default(), FRAME_MS) {
                TickOutcome::Ended(scores) => {
                    ended += 1;
                    final_scores = Some(scores);
                }
                TickOutcome::Finished => break,
                _ => {}
            }
        }
        assert_eq!(ended, 1);
        assert!(state.is_ended());
        assert_eq!(state.alive_count(), 0);
        let scores = final_scores.expect("round should end with nobody jumping");
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.score == 0));

        // Further ticks change nothing
        let frames = state.frame_count;
        assert_eq!(
            tick(&mut state, &TickInput::jump(0), FRAME_MS),
            TickOutcome::Finished
        );
        assert_eq!(state.frame_count, frames);
    }

    #[test]
    fn test_determinism() {
        let mut a = round(3, GameMode::Lives, 2).start_immediately();
        let mut b = round(3, GameMode::Lives, 2).start_immediately();
        for i in 0..4000usize {
            let input = TickInput {
                jumps: if i % 40 == 0 { vec![i % 3] } else { vec![] },
            };
            let oa = tick(&mut a, &input, FRAME_MS);
            let ob = tick(&mut b, &input, FRAME_MS);
            assert_eq!(oa, ob);
            assert_eq!(a.events, b.events);
        }
        assert_eq!(a.rope.angle, b.rope.angle);
        assert_eq!(a.rope.schedule, b.rope.schedule);
    }
}
