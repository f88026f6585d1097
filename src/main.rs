//! Rope Clock entry point
//!
//! The browser build is driven from the page (see `web.rs`). Natively this
//! runs a headless round with autopilot players, which is handy for tuning
//! difficulty presets and checking determinism of a seed.
//!
//! Usage: `rope-clock [players] [mode] [difficulty] [lives] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use rope_clock::consts::{FRAME_MS, JUMP_DURATION_MS, PROXIMITY_THRESHOLD};
    use rope_clock::highscores::{HighScores, today};
    use rope_clock::persistence::FileStore;
    use rope_clock::sim::{RoundState, TickOutcome, within_reach};
    use rope_clock::{GameSettings, RoundDriver, normalize_angle};

    /// Rounds stop here even if the autopilot never misses
    const MAX_SIM_MS: f64 = 10.0 * 60.0 * 1000.0;
    /// Chance per jump decision that an autopilot player hesitates
    const HESITATE_CHANCE: f32 = 0.02;

    /// Jumps each player when the rope is about to arrive
    struct Autopilot {
        rng: Pcg32,
    }

    impl Autopilot {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed.rotate_left(17)),
            }
        }

        /// Players that should press jump this frame
        fn decide(&mut self, state: &RoundState) -> Vec<usize> {
            if !state.is_active() {
                return Vec::new();
            }
            let rope = &state.rope;
            // Aim to be mid-air as the rope passes
            let lead = rope.speed / FRAME_MS * JUMP_DURATION_MS * 0.5;

            let mut jumps = Vec::new();
            for player in state.players.iter().filter(|p| p.can_jump()) {
                let ahead = normalize_angle((player.angle() - rope.angle) * rope.direction);
                let arriving = ahead <= lead
                    || (rope.current_behavior().is_oscillating()
                        && within_reach(rope.angle, player.angle(), PROXIMITY_THRESHOLD * 2.0));
                if arriving && self.rng.random::<f32>() >= HESITATE_CHANCE {
                    jumps.push(player.id);
                }
            }
            jumps
        }
    }

    fn arg<T: std::str::FromStr>(args: &[String], i: usize, default: T) -> Result<T, String> {
        match args.get(i) {
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("argument {} is invalid: {raw}", i + 1)),
            None => Ok(default),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let data_dir = std::env::var("ROPE_CLOCK_DATA").unwrap_or_else(|_| ".rope-clock".into());
        let mut store = FileStore::new(data_dir);

        let args: Vec<String> = std::env::args().skip(1).collect();
        let settings = if args.is_empty() {
            GameSettings::load(&store)
        } else {
            let defaults = GameSettings::default();
            let settings = GameSettings::parse(
                arg(&args, 0, defaults.player_count)?,
                args.get(1).map(String::as_str).unwrap_or(defaults.mode.as_str()),
                arg(&args, 3, defaults.lives)?,
                args.get(2)
                    .map(String::as_str)
                    .unwrap_or(defaults.difficulty.as_str()),
            )?;
            settings.save(&mut store)?;
            settings
        };
        let seed = arg(&args, 4, rand::random::<u64>())?;

        let mut driver = RoundDriver::new(&settings, seed);
        let mut autopilot = Autopilot::new(seed);
        let mut now = 0.0_f64;
        let mut result = None;

        while now < MAX_SIM_MS {
            now += FRAME_MS as f64;
            for id in autopilot.decide(driver.state()) {
                driver.queue_jump(id);
            }
            match driver.frame(now) {
                Some(TickOutcome::Ended(scores)) => {
                    result = Some(scores);
                    break;
                }
                Some(_) => {}
                None => break,
            }
        }

        let scores = match result {
            Some(scores) => scores,
            None => {
                log::info!("Round still running after {:.0}s, stopping", now / 1000.0);
                driver.stop();
                driver.state().scores()
            }
        };

        println!(
            "Seed {seed}: {} frames, {:.1}s",
            driver.state().frame_count,
            driver.state().elapsed_ms / 1000.0
        );
        for s in &scores {
            println!("  Player {}: {}", s.player_id + 1, s.score);
        }

        if let [only] = scores.as_slice() {
            let mut board = HighScores::load(&store);
            if board.qualifies(only.score) {
                if let Some(rank) = board.add_score("Player 1", only.score, &today()) {
                    println!("  High score #{rank}");
                }
                board.save(&mut store)?;
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Rope Clock (native, headless) starting...");
    if let Err(e) = headless::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is `web::start`; this just satisfies the compiler
}
