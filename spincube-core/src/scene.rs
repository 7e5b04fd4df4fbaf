/// One-time construction of the cube scene and its camera
use thiserror::Error;

use crate::color::Color;
use crate::config::{ConfigError, SceneConfig};
use crate::geometry::{Edge, Mesh};
use crate::projection::Camera;
use crate::texture::{Texture, TextureError};
use crate::transform::RotationState;

/// Faces meeting at more than this angle get an outline edge
const OUTLINE_THRESHOLD_DEGREES: f32 = 1.0;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("drawing surface has no area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
}

/// Unlit surface appearance: a base color optionally multiplied by a texture
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub map: Option<Texture>,
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self { color, map: None }
    }

    /// Color of the surface at texture coordinate (u, v)
    pub fn shade(&self, u: f32, v: f32) -> [u8; 4] {
        match &self.map {
            Some(texture) => self.color.modulate(texture.sample(u, v)),
            None => self.color.to_rgba(),
        }
    }
}

/// The textured cube
#[derive(Debug, Clone)]
pub struct CubeObject {
    pub mesh: Mesh,
    pub material: Material,
    pub rotation: RotationState,
}

/// Wireframe drawn over the cube's feature edges
#[derive(Debug, Clone)]
pub struct Outline {
    pub edges: Vec<Edge>,
    pub color: Color,
    pub rotation: RotationState,
}

/// Everything drawn in one frame
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    pub cube: CubeObject,
    pub outline: Option<Outline>,
    texture_source: String,
}

impl Scene {
    /// Where the cube texture is expected to come from
    pub fn texture_source(&self) -> &str {
        &self.texture_source
    }

    pub fn has_texture(&self) -> bool {
        self.cube.material.map.is_some()
    }

    /// Attach the outcome of loading the cube texture. A failed load keeps the
    /// blank material and is only logged; the scene stays renderable.
    pub fn install_texture(&mut self, loaded: Result<Texture, TextureError>) {
        match loaded {
            Ok(texture) => {
                log::info!(
                    "texture {} loaded ({}x{})",
                    self.texture_source,
                    texture.width(),
                    texture.height()
                );
                self.cube.material.map = Some(texture);
            }
            Err(err) => {
                log::warn!(
                    "texture {} unavailable, using blank material: {}",
                    self.texture_source,
                    err
                );
            }
        }
    }

    /// Mirror the cube rotation onto the outline
    pub fn sync_outline(&mut self) {
        if let Some(outline) = &mut self.outline {
            outline.rotation = self.cube.rotation;
        }
    }
}

/// Builds the [`Scene`] and [`Camera`] from configuration and surface size
pub struct SceneBuilder<'a> {
    config: &'a SceneConfig,
    texture: Option<Result<Texture, TextureError>>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(config: &'a SceneConfig) -> Self {
        Self {
            config,
            texture: None,
        }
    }

    /// Supply the texture up front instead of installing it later
    pub fn texture(mut self, loaded: Result<Texture, TextureError>) -> Self {
        self.texture = Some(loaded);
        self
    }

    pub fn build(self, width: u32, height: u32) -> Result<(Scene, Camera), SceneError> {
        self.config.validate()?;
        if width == 0 || height == 0 {
            return Err(SceneError::EmptySurface { width, height });
        }

        let config = self.config;
        let camera = Camera::perspective(&config.camera, width, height);

        let mesh = Mesh::cube(config.cube.size);
        let outline = config.stage.outline.then(|| Outline {
            edges: mesh.feature_edges(OUTLINE_THRESHOLD_DEGREES),
            color: config.stage.outline_color,
            rotation: RotationState::zero(),
        });

        let mut scene = Scene {
            background: config.stage.background,
            cube: CubeObject {
                mesh,
                material: Material::new(config.stage.material_color),
                rotation: RotationState::zero(),
            },
            outline,
            texture_source: config.cube.texture.clone(),
        };

        if let Some(loaded) = self.texture {
            scene.install_texture(loaded);
        }

        log::info!(
            "scene built: {}x{} surface, aspect {:.3}, cube size {}, camera z {}",
            width,
            height,
            camera.aspect,
            config.cube.size,
            config.camera.camera_z
        );

        Ok((scene, camera))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_build_defaults() {
        let config = SceneConfig::default();
        let (scene, camera) = SceneBuilder::new(&config).build(800, 400).unwrap();

        assert_relative_eq!(camera.aspect, 2.0);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 300.0));
        assert_eq!(scene.background, Color::BLACK);
        assert_eq!(scene.cube.mesh.triangles.len(), 12);
        assert_eq!(scene.outline.as_ref().map(|o| o.edges.len()), Some(12));
        assert_eq!(scene.texture_source(), "/assets/texture.jpg");
        assert!(!scene.has_texture());
    }

    #[test]
    fn test_outline_can_be_disabled() {
        let mut config = SceneConfig::default();
        config.stage.outline = false;
        let (scene, _) = SceneBuilder::new(&config).build(10, 10).unwrap();
        assert!(scene.outline.is_none());
    }

    #[test]
    fn test_rejects_empty_surface() {
        let config = SceneConfig::default();
        assert!(matches!(
            SceneBuilder::new(&config).build(640, 0),
            Err(SceneError::EmptySurface { width: 640, height: 0 })
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SceneConfig::default();
        config.cube.size = -1.0;
        assert!(matches!(
            SceneBuilder::new(&config).build(10, 10),
            Err(SceneError::Config(_))
        ));
    }

    #[test]
    fn test_failed_texture_falls_back_to_blank() {
        let config = SceneConfig::default();
        let (scene, _) = SceneBuilder::new(&config)
            .texture(Err(TextureError::unavailable("/missing.jpg", "404")))
            .build(10, 10)
            .unwrap();
        assert!(!scene.has_texture());
        assert_eq!(scene.cube.material.shade(0.5, 0.5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_texture_tinted_by_material() {
        let mut config = SceneConfig::default();
        config.stage.material_color = Color::new(255, 0, 0);
        let texture = Texture::from_rgba(1, 1, vec![[200, 100, 50, 255]]).unwrap();
        let (scene, _) = SceneBuilder::new(&config)
            .texture(Ok(texture))
            .build(10, 10)
            .unwrap();
        assert!(scene.has_texture());
        assert_eq!(scene.cube.material.shade(0.2, 0.9), [200, 0, 0, 255]);
    }

    #[test]
    fn test_sync_outline() {
        let config = SceneConfig::default();
        let (mut scene, _) = SceneBuilder::new(&config).build(10, 10).unwrap();
        scene.cube.rotation.rotate(0.4, -0.2, 0.0);
        scene.sync_outline();
        assert_eq!(scene.outline.unwrap().rotation, scene.cube.rotation);
    }
}
