//! WebAssembly bindings for the casefile game
//!
//! The page owns rendering and drag/touch handling. It forwards each gesture
//! to a [`CaseGame`] command and redraws from the returned view objects.

use casefile_core::{InputModality, Session, SessionConfig};
use wasm_bindgen::prelude::*;

mod view;


pub use view::{BoardView, DecisionView, PieceView, ReinvestigateView, SlotView, TimerView};

// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Current timestamp in milliseconds
fn now() -> u64 {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now);
    ms.max(0.0) as u64
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct CaseGame {
    session: Session,
}

#[wasm_bindgen]
impl CaseGame {
    /// Create a game on the title screen. `touch` picks the touch time limit.
    #[wasm_bindgen(constructor)]
    pub fn new(touch: bool) -> Result<CaseGame, JsValue> {
        let modality = if touch {
            InputModality::Touch
        } else {
            InputModality::Pointer
        };
        let session = Session::new(SessionConfig::for_modality(modality))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(CaseGame { session })
    }

    /// Create a game from a JSON config document
    #[wasm_bindgen]
    pub fn with_config(json: &str) -> Result<CaseGame, JsValue> {
        let config = SessionConfig::from_json(json).map_err(|e| {
            web_sys::console::warn_1(&format!("casefile: {}", e).into());
            JsValue::from_str(&e.to_string())
        })?;
        let session = Session::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(CaseGame { session })
    }

    /// Leave the title screen and start the countdown
    #[wasm_bindgen]
    pub fn start(&mut self) -> bool {
        self.session.start(now()).is_ok()
    }

    /// Drop a piece onto a slot. Returns the rejection text, or nothing on success.
    #[wasm_bindgen]
    pub fn place_piece(&mut self, piece_id: usize, slot_index: usize) -> Option<String> {
        self.session
            .place_piece(piece_id, slot_index)
            .err()
            .map(|reason| reason.to_string())
    }

    /// Whether a drag over `slot_index` should highlight as a valid drop
    #[wasm_bindgen]
    pub fn can_drop(&self, piece_id: usize, slot_index: usize) -> bool {
        self.session.is_playing()
            && self
                .session
                .round()
                .placeable_slots(piece_id)
                .contains(&slot_index)
    }

    /// Take a placed piece back. Returns whether anything was removed.
    #[wasm_bindgen]
    pub fn remove_piece(&mut self, slot_index: usize) -> bool {
        self.session.remove_piece(slot_index).is_some()
    }

    /// Submit the board for indictment
    #[wasm_bindgen]
    pub fn indict(&mut self) -> JsValue {
        let result = self.session.request_indict(now());
        to_js(&DecisionView::new(result, &self.session))
    }

    /// Dismiss the case
    #[wasm_bindgen]
    pub fn dismiss(&mut self) -> JsValue {
        let result = self.session.request_dismiss(now());
        to_js(&DecisionView::new(result, &self.session))
    }

    /// Re-roll a few unused pieces. Returns `{ changed, not_applicable }`.
    #[wasm_bindgen]
    pub fn reinvestigate(&mut self) -> JsValue {
        let result = self.session.reinvestigate(now());
        to_js(&ReinvestigateView::from(result))
    }

    /// Advance the countdown (call from setInterval)
    #[wasm_bindgen]
    pub fn tick(&mut self) -> JsValue {
        let timer = self.session.tick(now());
        to_js(&TimerView::from(timer))
    }

    /// Move on to the next stage after a resolved round
    #[wasm_bindgen]
    pub fn next_stage(&mut self) -> bool {
        self.session.advance_stage(now()).is_ok()
    }

    /// Back to stage 1 after a game over
    #[wasm_bindgen]
    pub fn restart(&mut self) {
        self.session.reset_session();
    }

    #[wasm_bindgen]
    pub fn is_game_over(&self) -> bool {
        self.session.is_game_over()
    }

    #[wasm_bindgen]
    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    #[wasm_bindgen]
    pub fn stage(&self) -> u32 {
        self.session.stage()
    }

    /// Score as a number (milliseconds, lower is better)
    #[wasm_bindgen]
    pub fn score(&self) -> f64 {
        self.session.score() as f64
    }

    /// Suggested tick interval in milliseconds
    #[wasm_bindgen]
    pub fn tick_interval(&self) -> u32 {
        self.session.config().tick_interval_ms as u32
    }

    /// Board state for a redraw
    #[wasm_bindgen]
    pub fn board(&self) -> JsValue {
        to_js(&BoardView::new(&self.session, now()))
    }

    /// Full session state as a JS object
    #[wasm_bindgen]
    pub fn snapshot(&self) -> JsValue {
        to_js(&self.session.snapshot(now()))
    }

    /// Full session state as JSON
    #[wasm_bindgen]
    pub fn state_json(&self) -> String {
        serde_json::to_string(&self.session.snapshot(now())).unwrap_or_default()
    }
}

/// Format milliseconds as `MM:SS.d`
#[wasm_bindgen]
pub fn format_time(ms: f64) -> String {
    casefile_core::format_time(ms.max(0.0) as u64)
}
