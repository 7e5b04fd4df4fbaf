/// Component configuration: cube, camera and stage parameters
///
/// The host supplies these once when the component is instantiated. Keys are
/// camelCase on the wire (`rotationSpeedX`, `cameraZ`, `nearClipping`, ...)
/// and every key is optional.
use serde::Deserialize;
use thiserror::Error;

use crate::color::Color;

/// Errors raised while reading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("invalid color literal: {0:?}")]
    InvalidColor(String),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Cube parameters: per-frame rotation speeds, edge length and texture
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CubeParams {
    /// Radians added to the X rotation every frame
    pub rotation_speed_x: f32,
    /// Radians added to the Y rotation every frame
    pub rotation_speed_y: f32,
    pub size: f32,
    /// Path or URL of the texture image
    pub texture: String,
}

impl Default for CubeParams {
    fn default() -> Self {
        Self {
            rotation_speed_x: 0.02,
            rotation_speed_y: 0.01,
            size: 1.0,
            texture: "/assets/texture.jpg".to_string(),
        }
    }
}

/// Camera parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraParams {
    /// Distance of the camera from the origin along Z
    pub camera_z: f32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    #[serde(alias = "nearClippingPlane")]
    pub near_clipping: f32,
    #[serde(alias = "farClippingPlane")]
    pub far_clipping: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            camera_z: 300.0,
            field_of_view: 1.0,
            near_clipping: 1.0,
            far_clipping: 1000.0,
        }
    }
}

/// Stage appearance: background, outline and base material color
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageParams {
    pub background: Color,
    pub outline: bool,
    pub outline_color: Color,
    /// Tint multiplied with the texture; the whole surface color when no
    /// texture is available
    pub material_color: Color,
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            outline: true,
            outline_color: Color::BLACK,
            material_color: Color::WHITE,
        }
    }
}

/// Full configuration surface of the cube component
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SceneConfig {
    #[serde(flatten)]
    pub cube: CubeParams,
    #[serde(flatten)]
    pub camera: CameraParams,
    #[serde(flatten)]
    pub stage: StageParams,
}

impl SceneConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cube = &self.cube;
        let camera = &self.camera;

        if !cube.rotation_speed_x.is_finite() {
            return Err(ConfigError::invalid("rotationSpeedX", "must be finite"));
        }
        if !cube.rotation_speed_y.is_finite() {
            return Err(ConfigError::invalid("rotationSpeedY", "must be finite"));
        }
        if !(cube.size.is_finite() && cube.size > 0.0) {
            return Err(ConfigError::invalid(
                "size",
                format!("expected a positive edge length, got {}", cube.size),
            ));
        }
        if !camera.camera_z.is_finite() || camera.camera_z == 0.0 {
            return Err(ConfigError::invalid(
                "cameraZ",
                format!("expected a non-zero distance, got {}", camera.camera_z),
            ));
        }
        if !(camera.field_of_view > 0.0 && camera.field_of_view < 180.0) {
            return Err(ConfigError::invalid(
                "fieldOfView",
                format!("expected degrees in (0, 180), got {}", camera.field_of_view),
            ));
        }
        if !(camera.near_clipping.is_finite() && camera.near_clipping > 0.0) {
            return Err(ConfigError::invalid(
                "nearClipping",
                format!("expected a positive distance, got {}", camera.near_clipping),
            ));
        }
        // nalgebra's perspective rejects planes closer than its epsilon
        let gap = camera.far_clipping - camera.near_clipping;
        if !(camera.far_clipping.is_finite() && gap > f32::EPSILON * camera.far_clipping.max(1.0)) {
            return Err(ConfigError::invalid(
                "farClipping",
                format!(
                    "expected a distance beyond nearClipping ({}), got {}",
                    camera.near_clipping, camera.far_clipping
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.cube.rotation_speed_x, 0.02);
        assert_eq!(config.cube.rotation_speed_y, 0.01);
        assert_eq!(config.cube.texture, "/assets/texture.jpg");
        assert_eq!(config.camera.camera_z, 300.0);
        assert_eq!(config.camera.field_of_view, 1.0);
        assert_eq!(config.camera.near_clipping, 1.0);
        assert_eq!(config.camera.far_clipping, 1000.0);
        assert!(config.stage.outline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::from_json(
            r##"{"rotationSpeedX": 0.05, "size": 200, "nearClipping": 0.5, "background": "#112233"}"##,
        )
        .unwrap();
        assert_eq!(config.cube.rotation_speed_x, 0.05);
        assert_eq!(config.cube.rotation_speed_y, 0.01);
        assert_eq!(config.cube.size, 200.0);
        assert_eq!(config.camera.near_clipping, 0.5);
        assert_eq!(config.stage.background, Color::new(0x11, 0x22, 0x33));
    }

    #[test]
    fn test_clipping_aliases() {
        let config =
            SceneConfig::from_json(r#"{"nearClippingPlane": 2, "farClippingPlane": 50}"#).unwrap();
        assert_eq!(config.camera.near_clipping, 2.0);
        assert_eq!(config.camera.far_clipping, 50.0);
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            r#"{"size": 0}"#,
            r#"{"size": -3}"#,
            r#"{"cameraZ": 0}"#,
            r#"{"fieldOfView": 180}"#,
            r#"{"nearClipping": 0}"#,
            r#"{"nearClipping": 10, "farClipping": 10}"#,
            r#"{"nearClipping": 0.5, "farClipping": 0.50000006}"#,
        ];
        for case in cases {
            let err = SceneConfig::from_json(case).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidParameter { .. }),
                "{case} gave {err}"
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SceneConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(SceneConfig::from_json(r#"{"outlineColor": "teal"}"#).is_err());
    }
}
