/// spincube Core Library - Scene construction and software rendering
///
/// This library builds the textured cube scene from configuration, advances
/// its rotation every frame and rasterizes it into an RGBA frame buffer that a
/// host (browser canvas, terminal) presents.

pub mod color;
pub mod config;
pub mod geometry;
pub mod projection;
pub mod raster;
pub mod render_loop;
pub mod scene;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use color::Color;
pub use config::{CameraParams, ConfigError, CubeParams, SceneConfig, StageParams};
pub use geometry::{Edge, Mesh, Triangle, Vertex};
pub use projection::Camera;
pub use raster::{Framebuffer, Rasterizer};
pub use render_loop::{LoopState, RenderLoop, Surface, SurfaceError, TickStatus};
pub use scene::{Material, Scene, SceneBuilder, SceneError};
pub use texture::{Texture, TextureError};
pub use transform::{RotationState, Transform};
