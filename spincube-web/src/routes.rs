/// Navigation table of the demo page
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::component::CubeComponent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Cube,
}

const ROUTES: &[(&str, Route)] = &[("cube", Route::Cube)];

/// Look up a navigation path; surrounding slashes are ignored
pub fn resolve(path: &str) -> Option<Route> {
    let path = path.trim().trim_matches('/');
    ROUTES
        .iter()
        .find(|(name, _)| *name == path)
        .map(|(_, route)| *route)
}

/// Instantiate and start the component registered for `path`
#[wasm_bindgen]
pub fn mount(path: &str, canvas: HtmlCanvasElement, config: JsValue) -> Result<CubeComponent, JsValue> {
    match resolve(path) {
        Some(Route::Cube) => {
            log::info!("mounting cube component for /{}", path.trim_matches('/'));
            let mut component = CubeComponent::new(canvas, config)?;
            component.start()?;
            Ok(component)
        }
        None => Err(JsValue::from_str(&format!("no route for {path:?}"))),
    }
}
