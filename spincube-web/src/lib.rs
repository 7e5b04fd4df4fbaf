/// spincube Web - WASM host drawing the cube into an HTML canvas
///
/// Frames are rasterized by `spincube-core` and copied to the canvas through
/// its 2D context on every `requestAnimationFrame` tick.

use wasm_bindgen::prelude::*;

pub mod component;
pub mod routes;
pub mod surface;

pub use component::CubeComponent;
pub use routes::{mount, resolve, Route};
pub use surface::CanvasSurface;

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    // A logger may already be installed by the embedding bundle
    let _ = console_log::init_with_level(log::Level::Info);

    Ok(())
}
