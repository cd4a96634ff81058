pub mod bag;
pub mod demo;
pub mod error;
pub mod factory;
pub mod field;
pub mod game;
pub mod input;
pub mod piece;
pub mod settings;
pub mod view;

use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use web_sys::console;

pub use demo::{DemoPilot, PilotConfig};
pub use error::EngineError;
pub use field::Field;
pub use game::{FrameEvents, GameEngine, GameplayState, RotationOutcome};
pub use input::InputFrame;
pub use piece::{Piece, PieceType, Point, Rotation, RotationTransition};
pub use settings::{GameSettings, SoftDropSpeed};
pub use view::FrameView;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

fn log(msg: &str) {
    console::log_1(&JsValue::from_str(msg));
}

fn js_error(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct GameClient {
    engine: GameEngine,
    input: InputFrame,
    pilot: Option<DemoPilot>,
}

#[wasm_bindgen]
impl GameClient {
    /// `settings` may be `undefined` for defaults; `seed` makes the bag
    /// reproducible.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue, seed: Option<u32>) -> Result<GameClient, JsValue> {
        let settings: GameSettings = if settings.is_undefined() || settings.is_null() {
            GameSettings::default()
        } else {
            from_value(settings)?
        };
        let engine = GameEngine::new(settings, seed.map(u64::from)).map_err(js_error)?;
        Ok(Self {
            engine,
            input: InputFrame::default(),
            pilot: None,
        })
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self, dt_ms: f32) -> Result<JsValue, JsValue> {
        let frame = match self.pilot.as_mut() {
            Some(pilot) => pilot.update(&self.engine, dt_ms),
            None => self.input,
        };
        let events = self.engine.update(dt_ms, frame);
        if events.game_over {
            log(&format!(
                "[game] over: score {} level {} lines {}",
                self.engine.score(),
                self.engine.level(),
                self.engine.total_lines()
            ));
        }
        to_value(&self.engine.snapshot()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = setInput)]
    pub fn set_input(&mut self, input: JsValue) -> Result<(), JsValue> {
        self.input = from_value(input)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setupGame)]
    pub fn setup_game(&mut self) {
        self.pilot = None;
        self.engine.setup_game();
    }

    /// Starts attract mode: the listed pieces come first and the pilot plays.
    #[wasm_bindgen(js_name = setupDemo)]
    pub fn setup_demo(&mut self, pieces: JsValue) -> Result<(), JsValue> {
        let names: Vec<String> = if pieces.is_undefined() || pieces.is_null() {
            Vec::new()
        } else {
            from_value(pieces)?
        };
        self.engine.setup_demo(names.as_slice()).map_err(js_error)?;
        self.pilot = Some(DemoPilot::new(PilotConfig::default()));
        log(&format!("[demo] started with {} scripted pieces", names.len()));
        Ok(())
    }

    #[wasm_bindgen(js_name = setAutoplay)]
    pub fn set_autoplay(&mut self, enabled: bool, pps: f32) {
        self.pilot = enabled.then(|| DemoPilot::new(PilotConfig { pps }));
    }

    pub fn pause(&mut self) -> bool {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.engine.resume()
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.engine.snapshot()).map_err(|e| e.into())
    }
}
