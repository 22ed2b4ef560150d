//! Cloud volume placement and cloud density field parameters.

use crate::error::{SceneError, SceneResult};

/// Procedural cloud volume ("puff") generation parameters
#[derive(Debug, Clone)]
pub struct CloudFieldParams {
    /// Number of clusters placed around the origin
    pub cluster_count: u32,

    /// Blobs per cluster, inclusive (min, max)
    pub blob_count: (u32, u32),

    /// Blob sphere radius range (meters)
    pub blob_radius_m: (f32, f32),

    /// Horizontal distance of each cluster from the origin (meters)
    pub ring_radius_m: (f32, f32),

    /// Cluster height band (meters, world Y)
    pub height_band_m: (f32, f32),

    /// Horizontal stretch of the blob placement envelope (dimensionless)
    pub horizontal_stretch: (f32, f32),

    /// Fixed Y scale applied to every cluster (1.0 = no flattening)
    pub vertical_flattening: f32,

    /// Blob sphere tessellation (longitude segments)
    pub blob_width_segments: u32,

    /// Blob sphere tessellation (latitude segments)
    pub blob_height_segments: u32,
}

impl Default for CloudFieldParams {
    fn default() -> Self {
        Self {
            cluster_count: 14,
            blob_count: (5, 9),
            blob_radius_m: (18.0, 34.0),
            ring_radius_m: (450.0, 750.0),
            height_band_m: (60.0, 220.0),
            horizontal_stretch: (1.4, 2.4),
            vertical_flattening: 0.6,
            blob_width_segments: 12,
            blob_height_segments: 8,
        }
    }
}

fn check_range(name: &str, (lo, hi): (f32, f32)) -> SceneResult<()> {
    if !(lo.is_finite() && hi.is_finite() && (hi - lo).is_finite()) || lo > hi {
        return Err(SceneError::config(format!(
            "{} range must be finite with min <= max and a finite width, got ({}, {})",
            name, lo, hi
        )));
    }
    Ok(())
}

impl CloudFieldParams {
    /// Reject configurations that would produce empty or degenerate clusters
    pub fn validate(&self) -> SceneResult<()> {
        if self.cluster_count == 0 {
            return Err(SceneError::config("cloud cluster count must be at least 1"));
        }

        let (min_blobs, max_blobs) = self.blob_count;
        if min_blobs == 0 || min_blobs > max_blobs {
            return Err(SceneError::config(format!(
                "blob count range must satisfy 1 <= min <= max, got ({}, {})",
                min_blobs, max_blobs
            )));
        }

        check_range("blob radius", self.blob_radius_m)?;
        if self.blob_radius_m.0 <= 0.0 {
            return Err(SceneError::config(format!(
                "blob radius must be positive, got min {}",
                self.blob_radius_m.0
            )));
        }

        check_range("ring radius", self.ring_radius_m)?;
        if self.ring_radius_m.0 < 0.0 {
            return Err(SceneError::config("ring radius must be non-negative"));
        }

        check_range("height band", self.height_band_m)?;

        check_range("horizontal stretch", self.horizontal_stretch)?;
        if self.horizontal_stretch.0 <= 0.0 {
            return Err(SceneError::config("horizontal stretch must be positive"));
        }

        if !(self.vertical_flattening > 0.0 && self.vertical_flattening.is_finite()) {
            return Err(SceneError::config(format!(
                "vertical flattening must be positive, got {}",
                self.vertical_flattening
            )));
        }

        if self.blob_width_segments < 3 || self.blob_height_segments < 2 {
            return Err(SceneError::config(format!(
                "blob tessellation too coarse: {}x{} (need at least 3x2)",
                self.blob_width_segments, self.blob_height_segments
            )));
        }
        Ok(())
    }
}

/// How pixels below the visibility cutoff are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutoffMode {
    /// Fully transparent below the cutoff (hard edge)
    #[default]
    Discard,

    /// Alpha ramps from zero at the cutoff instead of clipping
    SoftFade,
}

/// Animated fBm cloud coverage on the cloud dome
#[derive(Debug, Clone)]
pub struct CloudDensityParams {
    /// Surface UV multiplier (higher = smaller cloud features)
    pub uv_scale: f32,

    /// Horizontal drift in noise units per second
    pub drift_rate: f32,

    /// Frequency of the distortion fBm relative to the base UV
    pub distortion_frequency: f32,

    /// How fast the distortion field evolves, relative to drift
    pub distortion_rate: f32,

    /// Strength of the distortion offset (noise units)
    pub distortion_scale: f32,

    /// fBm value mapped to 50% coverage
    pub coverage_threshold: f32,

    /// Half-width of the smoothstep around the threshold
    pub coverage_softness: f32,

    /// Coverage below this is invisible
    pub visibility_cutoff: f32,

    /// fBm octaves (each doubles frequency, halves amplitude)
    pub octaves: u32,

    pub cutoff_mode: CutoffMode,
}

impl Default for CloudDensityParams {
    fn default() -> Self {
        Self {
            uv_scale: 5.0,
            drift_rate: 0.01,
            distortion_frequency: 0.5,
            distortion_rate: 0.1,
            distortion_scale: 0.5,
            coverage_threshold: 0.5,
            coverage_softness: 0.2,
            visibility_cutoff: 0.1,
            octaves: 6,
            cutoff_mode: CutoffMode::Discard,
        }
    }
}

impl CloudDensityParams {
    /// Reject settings that would turn coverage into NaN or an empty fBm
    pub fn validate(&self) -> SceneResult<()> {
        let fields = [
            ("uv scale", self.uv_scale),
            ("drift rate", self.drift_rate),
            ("distortion frequency", self.distortion_frequency),
            ("distortion rate", self.distortion_rate),
            ("distortion scale", self.distortion_scale),
            ("coverage threshold", self.coverage_threshold),
            ("coverage softness", self.coverage_softness),
            ("visibility cutoff", self.visibility_cutoff),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SceneError::config(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if self.coverage_softness <= 0.0 {
            return Err(SceneError::config(format!(
                "coverage softness must be positive, got {}",
                self.coverage_softness
            )));
        }

        if !(0.0..=1.0).contains(&self.visibility_cutoff) {
            return Err(SceneError::config(format!(
                "visibility cutoff must lie in [0, 1], got {}",
                self.visibility_cutoff
            )));
        }

        if self.octaves == 0 {
            return Err(SceneError::config("fBm needs at least one octave"));
        }
        Ok(())
    }
}
