//! GPU uniform block layouts.
//!
//! Field order and padding match the WGSL structs in `shaders/`; every block
//! is a multiple of 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::lights::LightRig;
use crate::palette::{Color, Palette};
use crate::params::{CloudDensityParams, CutoffMode, SkyParams};

/// Shared by every pipeline (bind group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

impl CameraUniforms {
    pub fn new(view_proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: eye.extend(1.0).to_array(),
        }
    }
}

/// Sky gradient material
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyUniforms {
    pub top_color: [f32; 4],
    pub bottom_color: [f32; 4],
    pub offset: f32,
    pub exponent: f32,
    pub _padding: [f32; 2],
}

impl SkyUniforms {
    pub fn new(palette: &Palette, sky: &SkyParams) -> Self {
        Self {
            top_color: palette.sky.top.to_linear_array(1.0),
            bottom_color: palette.sky.bottom.to_linear_array(1.0),
            offset: sky.gradient_offset,
            exponent: sky.gradient_exponent,
            _padding: [0.0; 2],
        }
    }
}

/// Animated cloud density dome material
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CloudDomeUniforms {
    pub color_shadow: [f32; 4],
    pub color_mid: [f32; 4],
    pub color_highlight: [f32; 4],
    pub time: f32,
    pub uv_scale: f32,
    pub drift_rate: f32,
    pub distortion_frequency: f32,
    pub distortion_rate: f32,
    pub distortion_scale: f32,
    pub coverage_threshold: f32,
    pub coverage_softness: f32,
    pub visibility_cutoff: f32,
    pub octaves: u32,
    /// 0 = discard below cutoff, 1 = soft fade
    pub cutoff_mode: u32,
    pub _padding: f32,
}

impl CloudDomeUniforms {
    pub fn new(palette: &Palette, density: &CloudDensityParams) -> Self {
        Self {
            color_shadow: palette.clouds.shadow.to_linear_array(1.0),
            color_mid: palette.clouds.mid.to_linear_array(1.0),
            color_highlight: palette.clouds.highlight.to_linear_array(1.0),
            time: 0.0,
            uv_scale: density.uv_scale,
            drift_rate: density.drift_rate,
            distortion_frequency: density.distortion_frequency,
            distortion_rate: density.distortion_rate,
            distortion_scale: density.distortion_scale,
            coverage_threshold: density.coverage_threshold,
            coverage_softness: density.coverage_softness,
            visibility_cutoff: density.visibility_cutoff,
            octaves: density.octaves,
            cutoff_mode: match density.cutoff_mode {
                CutoffMode::Discard => 0,
                CutoffMode::SoftFade => 1,
            },
            _padding: 0.0,
        }
    }
}

/// Cel-shaded cloud volume material
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CloudVolumeUniforms {
    pub color_highlight: [f32; 4],
    pub color_mid: [f32; 4],
    pub color_shadow: [f32; 4],
    pub light_dir: [f32; 4],
}

impl CloudVolumeUniforms {
    pub fn new(palette: &Palette, light_dir: Vec3) -> Self {
        Self {
            color_highlight: palette.clouds.highlight.to_linear_array(1.0),
            color_mid: palette.clouds.mid.to_linear_array(1.0),
            color_shadow: palette.clouds.shadow.to_linear_array(1.0),
            light_dir: light_dir.normalize_or_zero().extend(0.0).to_array(),
        }
    }
}

/// Lit terrain material; light radiance is pre-multiplied by intensity and
/// zeroed for hidden lights
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainUniforms {
    pub albedo: [f32; 4],
    pub ambient: [f32; 4],
    pub key_dir: [f32; 4],
    pub key_color: [f32; 4],
    pub fill_dir: [f32; 4],
    pub fill_color: [f32; 4],
}

impl TerrainUniforms {
    pub fn new(albedo: Color, rig: &LightRig) -> Self {
        Self {
            albedo: albedo.to_linear_array(1.0),
            ambient: rig.ambient.radiance().extend(0.0).to_array(),
            key_dir: rig.key.direction().extend(0.0).to_array(),
            key_color: rig.key.radiance().extend(0.0).to_array(),
            fill_dir: rig.fill.direction().extend(0.0).to_array(),
            fill_color: rig.fill.radiance().extend(0.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes_are_16_byte_multiples() {
        for size in [
            std::mem::size_of::<CameraUniforms>(),
            std::mem::size_of::<SkyUniforms>(),
            std::mem::size_of::<CloudDomeUniforms>(),
            std::mem::size_of::<CloudVolumeUniforms>(),
            std::mem::size_of::<TerrainUniforms>(),
        ] {
            assert_eq!(size % 16, 0, "uniform block of {} bytes", size);
        }
        assert_eq!(std::mem::size_of::<CloudDomeUniforms>(), 96);
    }

    #[test]
    fn test_dome_uniforms_carry_density_params() {
        let density = CloudDensityParams {
            cutoff_mode: CutoffMode::SoftFade,
            ..Default::default()
        };
        let u = CloudDomeUniforms::new(&Palette::default(), &density);
        assert_eq!(u.octaves, 6);
        assert_eq!(u.cutoff_mode, 1);
        assert_eq!(u.uv_scale, 5.0);
        assert_eq!(u.time, 0.0);
    }
}
