//! Browser bindings
//!
//! The page owns the canvas, the input listeners and the animation frame
//! loop; it calls into [`WebRound`] each frame and draws the returned view.

use wasm_bindgen::prelude::*;

use crate::driver::RoundDriver;
use crate::highscores::{HighScores, today};
use crate::persistence::{KeyValueStore, LocalStore, or_memory};
use crate::settings::GameSettings;
use crate::sim::{FinalScore, TickOutcome};
use crate::view::RoundView;

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// LocalStorage, or an in-memory stand-in when the browser refuses it
fn open_store() -> Box<dyn KeyValueStore> {
    or_memory(LocalStore::new())
}

/// Persist a finished single-player round
fn record_high_score(scores: &[FinalScore]) {
    let [only] = scores else {
        return;
    };
    let mut store = open_store();
    let mut board = HighScores::load(store.as_ref());
    if !board.qualifies(only.score) {
        return;
    }
    if let Some(rank) = board.add_score("Player 1", only.score, &today()) {
        log::info!("New high score #{rank}: {}", only.score);
    }
    if let Err(e) = board.save(store.as_mut()) {
        log::warn!("Failed to save high scores: {e}");
    }
}

/// One round driven by the page's frame loop
#[wasm_bindgen]
pub struct WebRound {
    driver: RoundDriver,
    dial_radius: f32,
}

#[wasm_bindgen]
impl WebRound {
    /// `settings_json` is a serialized `GameSettings`; empty means last saved
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str, seed: f64, dial_radius: f32) -> Result<WebRound, JsValue> {
        let mut store = open_store();
        let settings = if settings_json.is_empty() {
            GameSettings::load(store.as_ref())
        } else {
            let settings: GameSettings = serde_json::from_str(settings_json).map_err(to_js)?;
            settings.validate().map_err(to_js)?;
            if let Err(e) = settings.save(store.as_mut()) {
                log::warn!("Failed to save settings: {e}");
            }
            settings
        };

        let mut driver = RoundDriver::new(&settings, seed as u64);
        driver.on_round_end(record_high_score);
        Ok(WebRound {
            driver,
            dial_radius,
        })
    }

    /// Advance to the `requestAnimationFrame` timestamp; true once the round is over
    pub fn frame(&mut self, time: f64) -> bool {
        matches!(
            self.driver.frame(time),
            Some(TickOutcome::Ended(_) | TickOutcome::Finished)
        ) || self.driver.state().is_ended()
    }

    pub fn jump(&mut self, player: usize) {
        self.driver.queue_jump(player);
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.driver.toggle_pause();
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    /// Current render model as JSON
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&RoundView::capture(self.driver.state(), self.dial_radius))
            .map_err(to_js)
    }

    /// Saved leaderboard as JSON
    #[wasm_bindgen(js_name = highScoresJson)]
    pub fn high_scores_json() -> Result<String, JsValue> {
        serde_json::to_string(&HighScores::load(open_store().as_ref())).map_err(to_js)
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Rope Clock (web) ready");
}
