//! Camera configuration and presets.

/// Fixed camera position (the default framing)
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Camera position (meters)
    pub position: [f32; 3],

    /// Look-at target (meters)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, -50.0, 100.0], // Below the horizon line, looking up at the clouds
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Slow orbit around the origin
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal distance from the origin (meters)
    pub radius_m: f32,

    /// Constant camera height (meters)
    pub height_m: f32,

    /// Angular speed (radians per second)
    pub angular_speed_rad_per_s: f32,

    /// Look-at target (meters)
    pub target: [f32; 3],
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius_m: 112.0,
            height_m: -50.0,
            angular_speed_rad_per_s: 0.02,
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Camera preset selection
#[derive(Debug, Clone)]
pub enum CameraPreset {
    /// Stationary camera
    Fixed(FixedCamera),

    /// Orbit around the scene origin
    Orbit(OrbitCamera),
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Fixed(FixedCamera::default())
    }
}
