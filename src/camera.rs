//! Perspective camera for the sky scene.

use glam::{Mat4, Vec3};

use crate::params::{CameraPreset, FixedCamera, OrbitCamera, RenderConfig};

/// Camera system driven by a preset
pub struct CameraSystem {
    preset: CameraPreset,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset) -> Self {
        Self { preset }
    }

    pub fn preset(&self) -> &CameraPreset {
        &self.preset
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Arguments
    /// * `time_s` - Elapsed scene time in seconds
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Fixed(params) => Self::compute_fixed(params),
            CameraPreset::Orbit(params) => Self::compute_orbit(params, time_s),
        }
    }

    fn compute_fixed(p: &FixedCamera) -> (Vec3, Vec3) {
        (Vec3::from_array(p.position), Vec3::from_array(p.target))
    }

    /// Circle the target at constant height, starting on +Z
    fn compute_orbit(p: &OrbitCamera, time_s: f32) -> (Vec3, Vec3) {
        let angle = time_s * p.angular_speed_rad_per_s;
        let target = Vec3::from_array(p.target);
        let eye = Vec3::new(
            target.x + angle.sin() * p.radius_m,
            p.height_m,
            target.z + angle.cos() * p.radius_m,
        );
        (eye, target)
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(
        &self,
        time_s: f32,
        render_config: &RenderConfig,
    ) -> (Mat4, Vec3) {
        let (eye, target) = self.compute_position_and_target(time_s);

        // Y up, no roll
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane_m,
            render_config.far_plane_m,
        );

        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_camera_framing() {
        let camera = CameraSystem::new(CameraPreset::default());
        let (eye, target) = camera.compute_position_and_target(0.0);
        assert_eq!(eye, Vec3::new(0.0, -50.0, 100.0));
        assert_eq!(target, Vec3::ZERO);

        // Stationary regardless of time
        assert_eq!(camera.compute_position_and_target(100.0).0, eye);
    }

    #[test]
    fn test_orbit_keeps_radius_and_height() {
        let params = OrbitCamera::default();
        let camera = CameraSystem::new(CameraPreset::Orbit(params.clone()));

        for t in 0..50 {
            let (eye, target) = camera.compute_position_and_target(t as f32 * 10.0);
            let horizontal = Vec3::new(eye.x - target.x, 0.0, eye.z - target.z).length();
            assert!((horizontal - params.radius_m).abs() < 1e-3);
            assert_eq!(eye.y, params.height_m);
        }

        let (start, _) = camera.compute_position_and_target(0.0);
        let (later, _) = camera.compute_position_and_target(10.0);
        assert_ne!(start, later);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let camera = CameraSystem::new(CameraPreset::default());
        let render_config = RenderConfig::default();

        let (view_proj, eye_pos) = camera.create_view_proj_matrix(0.0, &render_config);

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(eye_pos.is_finite());

        // The look-at target projects to the centre of the screen
        let clip = view_proj * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn test_sky_sphere_inside_far_plane() {
        let camera = CameraSystem::new(CameraPreset::default());
        let render_config = RenderConfig::default();
        let (view_proj, _) = camera.create_view_proj_matrix(0.0, &render_config);

        // Zenith of a 1000 m sky sphere must not be clipped
        let clip = view_proj * Vec3::new(0.0, 1000.0, 0.0).extend(1.0);
        let depth = clip.z / clip.w;
        assert!(depth <= 1.0);
    }

    #[test]
    fn test_viewport_changes_projection() {
        let camera = CameraSystem::new(CameraPreset::default());
        let mut config = RenderConfig::default();
        let (before, _) = camera.create_view_proj_matrix(0.0, &config);

        assert!(config.set_viewport(600, 600));
        let (after, _) = camera.create_view_proj_matrix(0.0, &config);
        assert_ne!(before, after);

        // Zero-height resize leaves the projection unchanged
        assert!(!config.set_viewport(600, 0));
        let (same, _) = camera.create_view_proj_matrix(0.0, &config);
        assert_eq!(after, same);
    }
}
