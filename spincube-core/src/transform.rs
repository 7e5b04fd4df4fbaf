/// Rotation state and model transforms
use nalgebra::{Matrix4, Vector3};

/// Rotation around three axes (in radians). Angles accumulate without
/// wrapping; the trigonometry in [`Transform::rotation_matrix`] takes care of
/// periodicity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state using XYZ Euler order:
    /// the X rotation is outermost, so points are turned around Z first.
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        rx * ry * rz
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state, RotationState::new(0.0, 0.0, 0.0));

        state.rotate(0.1, 0.2, 0.3);
        assert_relative_eq!(state.x, 0.1);
        assert_relative_eq!(state.y, 0.2);
        assert_relative_eq!(state.z, 0.3);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_xyz_order() {
        let matrix = Transform::rotation_matrix(&RotationState::new(FRAC_PI_2, FRAC_PI_2, 0.0));
        let moved = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        // Ry(90°) sends +X to -Z, Rx(90°) sends -Z to +Y
        assert_relative_eq!(moved.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(moved.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(moved.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_full_turn_is_periodic() {
        let tau = std::f32::consts::TAU;
        let a = Transform::rotation_matrix(&RotationState::new(0.3, 0.7, 0.0));
        let b = Transform::rotation_matrix(&RotationState::new(0.3 + tau, 0.7 + 2.0 * tau, 0.0));
        assert!((a - b).norm() < 1e-4);
    }
}
