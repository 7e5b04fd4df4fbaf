/// The cube component: scene construction, animation frames and texture fetch
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use spincube_core::{
    RenderLoop, RotationState, SceneConfig, Texture, TextureError, TickStatus,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, Response};

use crate::surface::{canvas_size, describe, CanvasSurface};

/// Read the configuration passed by the embedding page. Absent values keep
/// every default.
pub fn config_from_json(json: Option<&str>) -> Result<SceneConfig, spincube_core::ConfigError> {
    match json {
        Some(text) => SceneConfig::from_json(text),
        None => Ok(SceneConfig::default()),
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Loop state shared between the frame callback and the texture fetch
struct Stage {
    render_loop: RenderLoop,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
}

impl Stage {
    /// Follow layout changes of the canvas before drawing
    fn sync_size(&mut self) {
        let (width, height) = canvas_size(&self.canvas);
        self.render_loop.resize(width, height);
    }

    fn tick(&mut self) -> TickStatus {
        self.sync_size();
        match self.render_loop.tick(&mut self.surface) {
            Ok(status) => status,
            Err(err) => {
                log::error!("cube render loop halted: {}", err);
                TickStatus::Halt
            }
        }
    }
}

/// Registration with `requestAnimationFrame`
#[derive(Default)]
struct AnimationFrame {
    callback: Option<Closure<dyn FnMut(f64)>>,
    pending: Option<i32>,
}

impl AnimationFrame {
    fn request(&mut self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| to_js("no window"))?;
        if let Some(callback) = &self.callback {
            let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
            self.pending = Some(id);
        }
        Ok(())
    }

    fn cancel(&mut self) {
        if let (Some(id), Some(window)) = (self.pending.take(), web_sys::window()) {
            if let Err(err) = window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {}", describe(&err));
            }
        }
    }
}

/// A spinning textured cube drawn into a canvas
#[wasm_bindgen]
pub struct CubeComponent {
    canvas: HtmlCanvasElement,
    config: SceneConfig,
    stage: Option<Rc<RefCell<Stage>>>,
    frame: Rc<RefCell<AnimationFrame>>,
}

#[wasm_bindgen]
impl CubeComponent {
    /// `config` is an optional object with camelCase keys
    /// (`rotationSpeedX`, `size`, `texture`, `cameraZ`, ...)
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: JsValue) -> Result<CubeComponent, JsValue> {
        let json = if config.is_undefined() || config.is_null() {
            None
        } else if let Some(text) = config.as_string() {
            Some(text)
        } else {
            Some(String::from(js_sys::JSON::stringify(&config)?))
        };
        let config = config_from_json(json.as_deref()).map_err(to_js)?;

        Ok(CubeComponent {
            canvas,
            config,
            stage: None,
            frame: Rc::new(RefCell::new(AnimationFrame::default())),
        })
    }

    /// Build the scene for the canvas' current size and begin animating.
    /// Calling it again while running does nothing.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.stage.is_some() {
            return Ok(());
        }

        let (width, height) = canvas_size(&self.canvas);
        let surface = CanvasSurface::new(self.canvas.clone()).map_err(to_js)?;
        surface.set_size(width, height);

        let mut render_loop = RenderLoop::new(&self.config, width, height).map_err(to_js)?;
        render_loop.start();

        let stage = Rc::new(RefCell::new(Stage {
            render_loop,
            surface,
            canvas: self.canvas.clone(),
        }));

        let tick_stage = Rc::clone(&stage);
        let frame: Weak<RefCell<AnimationFrame>> = Rc::downgrade(&self.frame);
        let callback = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            let Some(frame) = frame.upgrade() else {
                return;
            };
            frame.borrow_mut().pending = None;

            if tick_stage.borrow_mut().tick() == TickStatus::Continue {
                if let Err(err) = frame.borrow_mut().request() {
                    log::error!("requestAnimationFrame failed: {}", describe(&err));
                }
            }
        });

        {
            let mut frame = self.frame.borrow_mut();
            frame.callback = Some(callback);
            frame.request()?;
        }

        spawn_texture_fetch(self.config.cube.texture.clone(), Rc::downgrade(&stage));
        self.stage = Some(stage);
        Ok(())
    }

    /// Cancel the pending frame; the component cannot be restarted
    pub fn stop(&mut self) {
        let mut frame = self.frame.borrow_mut();
        frame.cancel();
        frame.callback = None;
        if let Some(stage) = &self.stage {
            stage.borrow_mut().render_loop.stop();
        }
    }

    /// Re-read the canvas size now instead of waiting for the next frame
    pub fn resize(&self) {
        if let Some(stage) = &self.stage {
            stage.borrow_mut().sync_size();
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.stage
            .as_ref()
            .is_some_and(|stage| stage.borrow().render_loop.is_running())
    }

    /// Current `[x, y, z]` rotation of the cube in radians
    pub fn rotation(&self) -> Vec<f32> {
        let rotation = self
            .stage
            .as_ref()
            .map(|stage| stage.borrow().render_loop.rotation())
            .unwrap_or_default();
        let RotationState { x, y, z } = rotation;
        vec![x, y, z]
    }

    /// Frames presented so far
    pub fn frames(&self) -> f64 {
        self.stage
            .as_ref()
            .map(|stage| stage.borrow().render_loop.frames() as f64)
            .unwrap_or(0.0)
    }
}

impl Drop for CubeComponent {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_texture_fetch(url: String, stage: Weak<RefCell<Stage>>) {
    wasm_bindgen_futures::spawn_local(async move {
        let loaded = fetch_texture(&url).await;
        match stage.upgrade() {
            Some(stage) => stage
                .borrow_mut()
                .render_loop
                .scene_mut()
                .install_texture(loaded),
            None => log::debug!("component dropped before texture {} arrived", url),
        }
    });
}

async fn fetch_texture(url: &str) -> Result<Texture, TextureError> {
    let unavailable = |err: JsValue| TextureError::unavailable(url, describe(&err));

    let window = web_sys::window().ok_or_else(|| TextureError::unavailable(url, "no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(unavailable)?
        .dyn_into()
        .map_err(unavailable)?;
    if !response.ok() {
        return Err(TextureError::unavailable(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(unavailable)?)
        .await
        .map_err(unavailable)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Texture::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(config_from_json(None).unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_config_from_page_object() {
        let config =
            config_from_json(Some(r#"{"rotationSpeedY": 0.1, "texture": "/img/crate.png"}"#))
                .unwrap();
        assert_eq!(config.cube.rotation_speed_y, 0.1);
        assert_eq!(config.cube.texture, "/img/crate.png");
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(config_from_json(Some(r#"{"farClipping": -1}"#)).is_err());
    }
}
