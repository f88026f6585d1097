//! Frame driver
//!
//! Sits between the host's frame callback and [`tick`]: turns timestamps into
//! clamped deltas, gates on pause, batches jump presses into one-shot input
//! and reports the end of the round exactly once.

use crate::consts::{FRAME_MS, MAX_FRAME_DT_MS};
use crate::settings::GameSettings;
use crate::sim::{FinalScore, RoundState, TickInput, TickOutcome, tick};

type RoundEndHook = Box<dyn FnMut(&[FinalScore])>;

/// Drives one round from host frame callbacks
pub struct RoundDriver {
    state: RoundState,
    paused: bool,
    stopped: bool,
    /// Jump presses since the last frame
    pending_jumps: Vec<usize>,
    /// Host timestamp of the previous frame (ms)
    last_time: Option<f64>,
    on_round_end: Option<RoundEndHook>,
}

impl RoundDriver {
    pub fn new(settings: &GameSettings, seed: u64) -> Self {
        log::info!(
            "New round: {} player(s), {}, {}, seed {}",
            settings.player_count,
            settings.mode.as_str(),
            settings.difficulty.as_str(),
            seed
        );
        Self::from_state(RoundState::new(settings, seed))
    }

    /// Drive an already built state (tests, replays)
    pub fn from_state(state: RoundState) -> Self {
        Self {
            state,
            paused: false,
            stopped: false,
            pending_jumps: Vec::new(),
            last_time: None,
            on_round_end: None,
        }
    }

    /// Called once with the final scores when the last player goes down
    pub fn on_round_end(&mut self, hook: impl FnMut(&[FinalScore]) + 'static) {
        self.on_round_end = Some(Box::new(hook));
    }

    /// Start over with fresh state; the round-end hook is kept
    pub fn restart(&mut self, settings: &GameSettings, seed: u64) {
        log::info!("Restarting with seed {seed}");
        self.state = RoundState::new(settings, seed);
        self.paused = false;
        self.stopped = false;
        self.pending_jumps.clear();
        self.last_time = None;
    }

    /// Record a jump press; applied on the next frame
    pub fn queue_jump(&mut self, player: usize) {
        if self.paused || self.stopped {
            return;
        }
        self.pending_jumps.push(player);
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }
        self.paused = paused;
        if paused {
            self.pending_jumps.clear();
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop driving; later frames do nothing
    pub fn stop(&mut self) {
        self.stopped = true;
        self.pending_jumps.clear();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Advance to host time `now_ms`
    ///
    /// Returns `None` when nothing was simulated (paused or stopped).
    pub fn frame(&mut self, now_ms: f64) -> Option<TickOutcome> {
        if self.stopped {
            return None;
        }

        let dt = match self.last_time.replace(now_ms) {
            Some(last) => (now_ms - last) as f32,
            None => FRAME_MS,
        };

        // Keep the clock moving while paused so resuming doesn't jump ahead
        if self.paused {
            return None;
        }

        let dt = dt.clamp(0.0, MAX_FRAME_DT_MS);
        let input = TickInput {
            jumps: std::mem::take(&mut self.pending_jumps),
        };
        let outcome = tick(&mut self.state, &input, dt);

        if let TickOutcome::Ended(scores) = &outcome {
            self.stopped = true;
            if let Some(hook) = self.on_round_end.as_mut() {
                hook(scores);
            }
        }

        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn settings(players: usize) -> GameSettings {
        GameSettings {
            player_count: players,
            mode: GameMode::Elimination,
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_first_frame_uses_reference_dt() {
        let mut driver = RoundDriver::new(&settings(1), 1);
        driver.frame(5000.0);
        assert!(driver.state().countdown_value().is_some());
        // One reference frame consumed from the countdown
        match driver.state().phase {
            crate::sim::RoundPhase::Countdown { remaining_ms } => {
                assert!((remaining_ms - (3000.0 - FRAME_MS)).abs() < 1e-3)
            }
            other => panic!("unexpected phase {other:?}"),
        }
    }

    #[test]
    fn test_zero_timestamp_counts_as_a_frame() {
        let mut driver = RoundDriver::new(&settings(1), 1);
        driver.frame(0.0);
        driver.frame(40.0);
        match driver.state().phase {
            crate::sim::RoundPhase::Countdown { remaining_ms } => {
                assert!((remaining_ms - (3000.0 - FRAME_MS - 40.0)).abs() < 1e-3)
            }
            other => panic!("unexpected phase {other:?}"),
        }
    }

    #[test]
    fn test_restart_forgets_previous_timestamp() {
        let mut driver = RoundDriver::new(&settings(1), 1);
        driver.frame(500.0);
        driver.restart(&settings(1), 2);
        driver.frame(550.0);
        match driver.state().phase {
            crate::sim::RoundPhase::Countdown { remaining_ms } => {
                assert!((remaining_ms - (3000.0 - FRAME_MS)).abs() < 1e-3)
            }
            other => panic!("unexpected phase {other:?}"),
        }
    }

    #[test]
    fn test_large_gap_is_clamped() {
        let state = RoundState::new(&settings(1), 1).start_immediately();
        let mut driver = RoundDriver::from_state(state);
        driver.frame(1000.0);
        let before = driver.state().elapsed_ms;
        driver.frame(61_000.0);
        assert!((driver.state().elapsed_ms - before - MAX_FRAME_DT_MS).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_and_drops_jumps() {
        let state = RoundState::new(&settings(2), 3).start_immediately();
        let mut driver = RoundDriver::from_state(state);
        driver.frame(16.0);
        driver.toggle_pause();
        driver.queue_jump(0);
        let frames = driver.state().frame_count;
        assert_eq!(driver.frame(32.0), None);
        assert_eq!(driver.frame(10_000.0), None);
        assert_eq!(driver.state().frame_count, frames);

        driver.toggle_pause();
        let elapsed = driver.state().elapsed_ms;
        driver.frame(10_016.0);
        assert!(!driver.state().players[0].is_jumping());
        assert!((driver.state().elapsed_ms - elapsed - 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_queued_jump_applies_next_frame() {
        let state = RoundState::new(&settings(1), 3).start_immediately();
        let mut driver = RoundDriver::from_state(state);
        driver.frame(16.0);
        driver.queue_jump(0);
        driver.frame(32.0);
        assert!(driver.state().players[0].is_jumping());
    }

    #[test]
    fn test_round_end_hook_fires_once_then_stops() {
        let mut state = RoundState::new(&settings(1), 9).start_immediately();
        state.players[0].eliminate();
        let mut driver = RoundDriver::from_state(state);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = calls.clone();
        driver.on_round_end(move |scores| seen.borrow_mut().push(scores.to_vec()));

        assert!(matches!(driver.frame(16.0), Some(TickOutcome::Ended(_))));
        assert!(driver.is_stopped());
        assert_eq!(driver.frame(32.0), None);
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(calls.borrow()[0], vec![FinalScore { player_id: 0, score: 0 }]);
    }

    #[test]
    fn test_stop_and_restart() {
        let mut driver = RoundDriver::new(&settings(2), 4);
        driver.frame(16.0);
        driver.stop();
        assert_eq!(driver.frame(32.0), None);
        driver.restart(&settings(3), 5);
        assert!(!driver.is_stopped());
        assert_eq!(driver.state().players.len(), 3);
        assert!(driver.frame(48.0).is_some());
    }
}
