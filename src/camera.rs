//! Camera capability used to drive the view-dependent system variables.
//!
//! Two independent implementations: [`ArcBallCamera`] orbits a center point,
//! [`FirstPersonCamera`] moves freely. Both use a left-handed, +Y-up
//! convention to match the projection built by
//! [`SystemValues`](crate::variables::SystemValues).

use glam::{Mat4, Vec3};

/// Read-only view of a camera.
pub trait Camera {
    /// Eye position in world space.
    fn position(&self) -> Vec3;

    /// Euler angles as `(pitch, yaw, roll)` in radians.
    fn rotation(&self) -> Vec3;

    /// Unit vector the camera looks along.
    fn view_direction(&self) -> Vec3;

    fn up_vector(&self) -> Vec3;

    /// World-to-view matrix.
    fn matrix(&self) -> Mat4 {
        Mat4::look_to_lh(self.position(), self.view_direction(), self.up_vector())
    }
}

const PITCH_EPS: f32 = 0.0001;

fn direction_from_angles(pitch: f32, yaw: f32) -> Vec3 {
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
}

// ============================================================================
// Arc-ball
// ============================================================================

/// Orbits `center` at `distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcBallCamera {
    pub center: Vec3,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Azimuth around +Y.
    yaw: f32,
    /// Elevation, kept inside (-pi/2, pi/2).
    pitch: f32,
    roll: f32,
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 7.0)
    }
}

impl ArcBallCamera {
    #[must_use]
    pub fn new(center: Vec3, distance: f32) -> Self {
        Self {
            center,
            distance,
            min_distance: 0.5,
            max_distance: 1000.0,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    /// Adds to yaw / pitch (radians), clamping pitch short of the poles.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        use std::f32::consts::FRAC_PI_2;
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-FRAC_PI_2 + PITCH_EPS, FRAC_PI_2 - PITCH_EPS);
    }

    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll;
    }

    /// Moves toward (positive) or away from the center.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance - amount).clamp(self.min_distance, self.max_distance);
    }

    pub fn reset(&mut self) {
        *self = Self::new(Vec3::ZERO, 7.0);
    }
}

impl Camera for ArcBallCamera {
    fn position(&self) -> Vec3 {
        self.center - self.view_direction() * self.distance
    }

    fn rotation(&self) -> Vec3 {
        Vec3::new(self.pitch, self.yaw, self.roll)
    }

    fn view_direction(&self) -> Vec3 {
        direction_from_angles(self.pitch, self.yaw)
    }

    fn up_vector(&self) -> Vec3 {
        let forward = self.view_direction();
        let right = Vec3::Y.cross(forward).normalize_or_zero();
        let up = forward.cross(right);
        if self.roll == 0.0 {
            up
        } else {
            glam::Quat::from_axis_angle(forward, self.roll) * up
        }
    }
}

// ============================================================================
// First-person
// ============================================================================

/// Free-flying camera.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, -7.0))
    }
}

impl FirstPersonCamera {
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        use std::f32::consts::FRAC_PI_2;
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-FRAC_PI_2 + PITCH_EPS, FRAC_PI_2 - PITCH_EPS);
    }

    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.view_direction() * amount;
    }

    /// Moves along the camera's right vector.
    pub fn strafe(&mut self, amount: f32) {
        let right = Vec3::Y.cross(self.view_direction()).normalize_or_zero();
        self.position += right * amount;
    }

    pub fn move_up(&mut self, amount: f32) {
        self.position.y += amount;
    }

    /// Applies one frame of WASD movement.
    pub fn apply_keys(&mut self, keys_wasd: [bool; 4], speed: f32, delta: f32) {
        let step = speed * delta;
        let [w, a, s, d] = keys_wasd;
        if w {
            self.move_forward(step);
        }
        if s {
            self.move_forward(-step);
        }
        if d {
            self.strafe(step);
        }
        if a {
            self.strafe(-step);
        }
    }
}

impl Camera for FirstPersonCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Vec3 {
        Vec3::new(self.pitch, self.yaw, 0.0)
    }

    fn view_direction(&self) -> Vec3 {
        direction_from_angles(self.pitch, self.yaw)
    }

    fn up_vector(&self) -> Vec3 {
        Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arcball_looks_at_center() {
        let mut cam = ArcBallCamera::new(Vec3::new(1.0, 2.0, 3.0), 5.0);
        cam.rotate(0.7, 0.3);

        let to_center = (cam.center - cam.position()).normalize();
        assert!(to_center.abs_diff_eq(cam.view_direction(), 1e-5));
        assert!((cam.position().distance(cam.center) - 5.0).abs() < 1e-4);

        let center_in_view = cam.matrix().transform_point3(cam.center);
        assert!(center_in_view.x.abs() < 1e-4 && center_in_view.y.abs() < 1e-4);
        assert!(center_in_view.z > 0.0);
    }

    #[test]
    fn test_arcball_pitch_is_clamped() {
        let mut cam = ArcBallCamera::default();
        cam.rotate(0.0, 10.0);
        assert!(cam.rotation().x < std::f32::consts::FRAC_PI_2);
        assert!(cam.up_vector().is_finite());
    }

    #[test]
    fn test_first_person_moves_forward() {
        let mut cam = FirstPersonCamera::new(Vec3::ZERO);
        cam.apply_keys([true, false, false, false], 2.0, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::Z, 1e-6));

        cam.strafe(1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), 1e-6));
    }
}
