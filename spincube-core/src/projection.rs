/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::config::CameraParams;

/// Perspective camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// A vertex after projection to screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Pixel coordinates, origin at the top-left corner
    pub x: f32,
    pub y: f32,
    /// Distance in front of the camera along its viewing axis
    pub depth: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::perspective(&CameraParams::default(), width, height)
    }

    /// Camera on the Z axis at `camera_z`, looking at the origin
    pub fn perspective(params: &CameraParams, width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, params.camera_z),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: params.field_of_view.to_radians(),
            aspect: aspect_ratio(width, height),
            near: params.near_clipping,
            far: params.far_clipping,
        }
    }

    /// Recompute the aspect ratio for a resized surface
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a model-space point through `mvp` to screen space.
    ///
    /// Returns `None` for points at or behind the camera plane; points
    /// outside the viewport are still returned so triangles crossing the
    /// border can be rasterized partially.
    pub fn project_to_screen(
        point: &Point3<f32>,
        mvp: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<ScreenPoint> {
        let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);

        // w is the view-space depth for a perspective projection
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;

        Some(ScreenPoint {
            x: (ndc_x + 1.0) * 0.5 * width as f32,
            y: (1.0 - ndc_y) * 0.5 * height as f32,
            depth: clip.w,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_relative_eq!(camera.aspect, 800.0 / 600.0);
        assert_relative_eq!(camera.fov, 1.0_f32.to_radians());
    }

    #[test]
    fn test_camera_sits_on_z_axis() {
        let params = CameraParams {
            camera_z: 42.0,
            ..CameraParams::default()
        };
        let camera = Camera::perspective(&params, 640, 480);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 42.0));
        assert_eq!(camera.target, Point3::origin());

        // the origin lands in the middle of the viewport, 42 units away
        let center = Camera::project_to_screen(
            &Point3::origin(),
            &camera.view_projection(),
            640,
            480,
        )
        .unwrap();
        assert_relative_eq!(center.x, 320.0, epsilon = 1e-3);
        assert_relative_eq!(center.y, 240.0, epsilon = 1e-3);
        assert_relative_eq!(center.depth, 42.0, epsilon = 1e-3);
    }

    #[test]
    fn test_set_aspect() {
        let mut camera = Camera::new(800, 600);
        camera.set_aspect(300, 300);
        assert_relative_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn test_points_behind_camera_are_rejected() {
        let camera = Camera::new(100, 100);
        let behind = Point3::new(0.0, 0.0, 400.0);
        assert!(Camera::project_to_screen(&behind, &camera.view_projection(), 100, 100).is_none());
    }

    #[test]
    fn test_screen_y_points_down() {
        let params = CameraParams {
            camera_z: 10.0,
            field_of_view: 90.0,
            ..CameraParams::default()
        };
        let camera = Camera::perspective(&params, 100, 100);
        let above = Camera::project_to_screen(
            &Point3::new(0.0, 1.0, 0.0),
            &camera.view_projection(),
            100,
            100,
        )
        .unwrap();
        assert!(above.y < 50.0);
    }
}
