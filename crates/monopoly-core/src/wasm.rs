//! WebAssembly bindings for the game engine.
//!
//! This module exposes the engine to JavaScript through wasm-bindgen. State
//! crosses the boundary as JSON strings; errors come back as `JsValue`
//! strings.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::actions::NoCards;
#[cfg(feature = "wasm")]
use crate::board::PlayerId;
#[cfg(feature = "wasm")]
use crate::game::{GameError, GameState};

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(feature = "wasm")]
fn to_js(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed game wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmGame {
    /// Create a new game on the standard board
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            state: GameState::new(),
        }
    }

    /// Add a player; identity and balance come from the wallet layer
    pub fn join(&mut self, id: &str, name: &str, starting_balance: i64) -> Result<(), JsValue> {
        self.state
            .join(PlayerId::new(id), name, starting_balance)
            .map(|_| ())
            .map_err(to_js)
    }

    /// Start the game
    pub fn start(&mut self) -> Result<(), JsValue> {
        self.state.start().map(|_| ()).map_err(to_js)
    }

    /// Pause the game
    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.state.pause().map(|_| ()).map_err(to_js)
    }

    /// Resume a paused game
    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.state.resume().map(|_| ()).map_err(to_js)
    }

    /// End the game
    pub fn end(&mut self) -> Result<(), JsValue> {
        self.state.end().map(|_| ()).map_err(to_js)
    }

    /// Roll for the acting player; returns the turn outcome as JSON.
    ///
    /// Chance and community-chest draws use the empty card table here, so
    /// card tiles are no-ops from JavaScript. A host that wants real decks
    /// embeds the engine natively and supplies its own
    /// [`CardResolver`](crate::actions::CardResolver).
    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self, id: &str) -> Result<String, JsValue> {
        let outcome = self
            .state
            .roll_and_resolve(&PlayerId::new(id), &mut NoCards)
            .map_err(to_js)?;
        Ok(serde_json::to_string(&outcome).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Buy the property the acting player stands on; returns the event JSON
    #[wasm_bindgen(js_name = buyProperty)]
    pub fn buy_property(&mut self, id: &str) -> Result<String, JsValue> {
        let event = self.state.buy_property(&PlayerId::new(id)).map_err(to_js)?;
        Ok(serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Build one improvement on an owned property; returns the event JSON
    #[wasm_bindgen(js_name = buildHouse)]
    pub fn build_house(&mut self, id: &str, position: u8) -> Result<String, JsValue> {
        let event = self
            .state
            .build_improvement(&PlayerId::new(id), position)
            .map_err(to_js)?;
        Ok(serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Pay bail for a jailed player; returns the event JSON
    #[wasm_bindgen(js_name = payBail)]
    pub fn pay_bail(&mut self, id: &str) -> Result<String, JsValue> {
        let event = self.state.pay_bail(&PlayerId::new(id)).map_err(to_js)?;
        Ok(serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string()))
    }

    /// Get the game summary as JSON
    #[wasm_bindgen(js_name = getSummary)]
    pub fn get_summary(&self) -> String {
        self.state.summary_json()
    }

    /// Get the identity of the player whose turn it is
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> Option<String> {
        self.state.current_player().map(|p| p.id.to_string())
    }

    /// Get a specific player's state as JSON
    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, id: &str) -> String {
        match self.state.players().get(&PlayerId::new(id)) {
            Some(p) => serde_json::to_string(p).unwrap_or_else(|_| "{}".to_string()),
            None => "null".to_string(),
        }
    }

    /// Get the tile catalog and per-game overlay as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        let board = serde_json::json!({
            "tiles": self.state.board().tiles(),
            "state": (0..crate::board::BOARD_SIZE)
                .map(|p| self.state.board_state().tile(p).clone())
                .collect::<Vec<_>>(),
        });
        serde_json::to_string(&board).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the full game state as JSON (save path)
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.state.to_json().unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(feature = "wasm")]
impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
