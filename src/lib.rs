mod app;
mod canvas;
mod config;
mod drawing;
mod event_handler;
mod math;
mod renderer;
mod session;
mod state;
pub mod svg;

// Re-export the main public interface
pub use app::run;
pub use canvas::{CanvasTransform, MAX_SCALE, MIN_SCALE};
pub use config::{Config, EncodeOptions};
pub use drawing::{Element, ElementKind, Layer, Tool, DEFAULT_LAYER_ID, DEFAULT_LAYER_NAME};
pub use event_handler::PREVIEW_ID;
pub use session::Session;
pub use svg::{decode, encode, encode_with};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Installs the platform's log backend. Safe to call more than once.
pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            let _ = console_log::init_with_level(log::Level::Info);
        } else {
            let _ = env_logger::try_init();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    init_logging();
}

/// Decodes SVG markup into the layer model, serialized as JSON.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn decode_svg(svg_text: &str) -> Result<String, JsValue> {
    serde_json::to_string(&decode(svg_text)).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encodes a JSON layer model to SVG, highlighting `selected` if given.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn encode_svg(layers_json: &str, selected: Option<String>) -> Result<String, JsValue> {
    let session = Session::from_json(layers_json, Config::default())
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
    Ok(encode(session.layers(), selected.as_deref()))
}
