//! Sky dome and cloud dome geometry parameters.

use crate::error::{SceneError, SceneResult};

/// Sky gradient sphere and the cloud density dome inside it
#[derive(Debug, Clone)]
pub struct SkyParams {
    /// Sky sphere radius (meters), rendered from the inside
    pub sky_radius_m: f32,

    /// Cloud dome radius (meters), slightly inside the sky
    pub cloud_dome_radius_m: f32,

    /// Longitude segments for both spheres
    pub width_segments: u32,

    /// Latitude segments for both spheres
    pub height_segments: u32,

    /// Gradient curve: mix factor = pow(max(h, 0), exponent)
    pub gradient_exponent: f32,

    /// Added to the world position before normalizing (shifts the horizon)
    pub gradient_offset: f32,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            sky_radius_m: 1000.0,
            cloud_dome_radius_m: 950.0,
            width_segments: 32,
            height_segments: 15,
            gradient_exponent: 0.8,
            gradient_offset: 0.0,
        }
    }
}

impl SkyParams {
    /// The cloud dome must sit strictly inside the sky sphere
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.cloud_dome_radius_m > 0.0 && self.sky_radius_m > self.cloud_dome_radius_m) {
            return Err(SceneError::config(format!(
                "need 0 < cloud dome radius < sky radius, got {} and {}",
                self.cloud_dome_radius_m, self.sky_radius_m
            )));
        }
        if self.width_segments < 3 || self.height_segments < 2 {
            return Err(SceneError::config(format!(
                "sky tessellation too coarse: {}x{}",
                self.width_segments, self.height_segments
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sky_valid() {
        assert!(SkyParams::default().validate().is_ok());
    }

    #[test]
    fn test_dome_outside_sky_rejected() {
        let params = SkyParams {
            cloud_dome_radius_m: 1200.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
