/// Per-frame animation and redraw
///
/// [`RenderLoop`] owns the scene, the camera and the frame buffer. It never
/// schedules itself: a host calls [`RenderLoop::tick`] from its own
/// display-refresh primitive and keeps doing so while the returned status is
/// [`TickStatus::Continue`].
use thiserror::Error;

use crate::config::SceneConfig;
use crate::projection::Camera;
use crate::raster::{Framebuffer, Rasterizer};
use crate::scene::{Scene, SceneBuilder, SceneError};
use crate::texture::{Texture, TextureError};
use crate::transform::RotationState;

/// Failures of the host drawing surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("drawing surface is no longer attached")]
    Detached,
    #[error("drawing surface rejected the frame: {0}")]
    Backend(String),
}

/// Host pixel sink that receives every finished frame
pub trait Surface {
    fn present(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Scene built, no frame drawn yet
    Idle,
    Running,
    /// Cancelled or lost its surface; never restarts
    Stopped,
}

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Schedule another frame
    Continue,
    /// Do not schedule again
    Halt,
}

pub struct RenderLoop {
    scene: Scene,
    camera: Camera,
    rasterizer: Rasterizer,
    speed_x: f32,
    speed_y: f32,
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    /// Build the scene for a `width` x `height` surface. The loop starts Idle.
    pub fn new(config: &SceneConfig, width: u32, height: u32) -> Result<Self, SceneError> {
        Self::from_builder(SceneBuilder::new(config), config, width, height)
    }

    /// Same as [`RenderLoop::new`] with the texture outcome already known
    pub fn with_texture(
        config: &SceneConfig,
        width: u32,
        height: u32,
        texture: Result<Texture, TextureError>,
    ) -> Result<Self, SceneError> {
        Self::from_builder(SceneBuilder::new(config).texture(texture), config, width, height)
    }

    fn from_builder(
        builder: SceneBuilder<'_>,
        config: &SceneConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        let (scene, camera) = builder.build(width, height)?;
        Ok(Self {
            scene,
            camera,
            rasterizer: Rasterizer::new(width, height),
            speed_x: config.cube.rotation_speed_x,
            speed_y: config.cube.rotation_speed_y,
            state: LoopState::Idle,
            frames: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rotation(&self) -> RotationState {
        self.scene.cube.rotation
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.rasterizer.framebuffer()
    }

    /// Idle -> Running. Has no effect once stopped.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            log::info!("render loop started");
            self.state = LoopState::Running;
        }
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            log::info!("render loop stopped after {} frames", self.frames);
            self.state = LoopState::Stopped;
        }
    }

    /// Adapt camera aspect and frame buffer to a resized surface.
    /// Zero-sized surfaces are ignored until they get an area again.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to empty surface {}x{}", width, height);
            return;
        }
        let current = self.rasterizer.framebuffer();
        if (current.width(), current.height()) == (width, height) {
            return;
        }
        log::debug!("surface resized to {}x{}", width, height);
        self.camera.set_aspect(width, height);
        self.rasterizer.resize(width, height);
    }

    /// Advance the cube by one frame's worth of rotation and keep the
    /// outline aligned with it
    pub fn animate(&mut self) {
        self.scene.cube.rotation.rotate(self.speed_x, self.speed_y, 0.0);
        self.scene.sync_outline();
    }

    /// Rasterize the current scene without advancing it
    pub fn draw(&mut self) -> &Framebuffer {
        self.rasterizer.render(&self.scene, &self.camera)
    }

    /// One display-refresh tick: animate, draw, present.
    ///
    /// A surface failure stops the loop and is returned so the host can
    /// report it; the host must not schedule another tick afterwards.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<TickStatus, SurfaceError> {
        if self.state != LoopState::Running {
            return Ok(TickStatus::Halt);
        }

        self.animate();
        let frame = self.rasterizer.render(&self.scene, &self.camera);

        if let Err(err) = surface.present(frame) {
            log::warn!("stopping render loop: {}", err);
            self.state = LoopState::Stopped;
            return Err(err);
        }

        self.frames += 1;
        log::trace!(
            "frame {} rotation ({:.3}, {:.3})",
            self.frames,
            self.scene.cube.rotation.x,
            self.scene.cube.rotation.y
        );
        Ok(TickStatus::Continue)
    }
}
