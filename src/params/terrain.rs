//! Terrain heightfield parameters.

use crate::error::{SceneError, SceneResult};
use crate::palette::Color;

/// Terrain plane and displacement parameters
#[derive(Debug, Clone)]
pub struct TerrainParams {
    /// Plane extent along X (meters)
    pub width_m: f32,

    /// Plane extent along the plane's Y axis, world Z after rotation (meters)
    pub height_m: f32,

    /// Grid resolution along X (segments, vertices = segments + 1)
    pub segments_x: u32,

    /// Grid resolution along Y (segments, vertices = segments + 1)
    pub segments_y: u32,

    /// Peak displacement in meters (noise output is scaled by this)
    pub height_scale_m: f32,

    /// Planar coordinates are divided by this before sampling noise
    /// (meters per noise unit, larger = broader hills)
    pub frequency_divisor_m: f32,

    /// World-space height of the undisplaced plane (meters)
    pub base_elevation_m: f32,

    /// Diffuse surface color
    pub albedo: Color,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            width_m: 2000.0,
            height_m: 2000.0,
            segments_x: 256,
            segments_y: 256,
            height_scale_m: 50.0,
            frequency_divisor_m: 500.0,
            base_elevation_m: -100.0,
            albedo: Color::from_hex(0x446622),
        }
    }
}

impl TerrainParams {
    /// Reject parameters that would produce an empty or non-finite grid
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.width_m > 0.0 && self.height_m > 0.0) {
            return Err(SceneError::config(format!(
                "terrain extent must be positive, got {}x{}",
                self.width_m, self.height_m
            )));
        }
        if self.segments_x == 0 || self.segments_y == 0 {
            return Err(SceneError::config(format!(
                "terrain resolution must be at least 1x1, got {}x{}",
                self.segments_x, self.segments_y
            )));
        }
        if !(self.frequency_divisor_m.is_finite() && self.frequency_divisor_m != 0.0) {
            return Err(SceneError::config(format!(
                "terrain frequency divisor must be finite and non-zero, got {}",
                self.frequency_divisor_m
            )));
        }
        if !self.height_scale_m.is_finite() {
            return Err(SceneError::config("terrain height scale must be finite"));
        }
        Ok(())
    }
}
