//! Rendering configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    /// Must enclose the sky sphere as seen from the camera
    pub far_plane_m: f32,

    /// Clear color behind the sky (only visible if the sky is culled)
    pub clear_color: [f64; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane_m: 0.1,
            far_plane_m: 2000.0,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    /// Update the viewport size; zero-sized viewports (minimized windows) are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.window_width = width;
        self.window_height = height;
        true
    }
}
