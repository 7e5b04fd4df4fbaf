/// Canvas-backed drawing surface
use spincube_core::{Framebuffer, Surface, SurfaceError};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Size of the canvas backing store for a CSS size and device pixel ratio
pub fn backing_size(client_width: i32, client_height: i32, pixel_ratio: f64) -> (u32, u32) {
    let scale = |css: i32| (css.max(0) as f64 * pixel_ratio).round() as u32;
    (scale(client_width), scale(client_height))
}

/// Current backing-store size the canvas should have
pub fn canvas_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
    let pixel_ratio = web_sys::window()
        .map(|window| window.device_pixel_ratio())
        .unwrap_or(1.0);
    backing_size(canvas.client_width(), canvas.client_height(), pixel_ratio)
}

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Puts finished frames on a canvas through its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| SurfaceError::Backend(describe(&err)))?
            .ok_or_else(|| SurfaceError::Backend("canvas has no 2d context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Backend("unexpected 2d context type".to_string()))?;
        Ok(Self { canvas, context })
    }

    /// Match the backing store to `width` x `height`
    pub fn set_size(&self, width: u32, height: u32) {
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
    }
}

impl Surface for CanvasSurface {
    fn present(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError> {
        if !self.canvas.is_connected() {
            return Err(SurfaceError::Detached);
        }
        self.set_size(frame.width(), frame.height());

        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.pixels()),
            frame.width(),
            frame.height(),
        )
        .map_err(|err| SurfaceError::Backend(describe(&err)))?;
        self.context
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|err| SurfaceError::Backend(describe(&err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_size_scales_by_pixel_ratio() {
        assert_eq!(backing_size(300, 150, 1.0), (300, 150));
        assert_eq!(backing_size(300, 150, 2.0), (600, 300));
        assert_eq!(backing_size(101, 51, 1.5), (152, 77));
    }

    #[test]
    fn test_backing_size_of_hidden_canvas() {
        assert_eq!(backing_size(0, 0, 2.0), (0, 0));
        assert_eq!(backing_size(-4, 10, 1.0), (0, 10));
    }
}
