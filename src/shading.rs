//! CPU versions of the scene's fragment shading.
//!
//! Each function mirrors the math of a WGSL entry point in `shaders/`
//! line for line, so the shading can be checked without a GPU.

use glam::{Vec2, Vec3};

use crate::lights::LightRig;
use crate::noise::Noise2;
use crate::params::{CloudDensityParams, CutoffMode};

/// Hermite interpolation between two edges, clamped to [0, 1]
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fractal Brownian motion: octaves of noise, each at double the frequency
/// and half the amplitude of the previous, starting at amplitude 0.5.
pub fn fbm<N: Noise2>(noise: &N, p: Vec2, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut p = p;
    for _ in 0..octaves {
        value += amplitude * noise.sample(p.x, p.y);
        p *= 2.0;
        amplitude *= 0.5;
    }
    value
}

/// Result of evaluating the cloud density field at one surface point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensitySample {
    /// Raw fBm value
    pub noise: f32,

    /// Smoothstepped coverage in [0, 1]
    pub coverage: f32,

    /// Blended cloud color (same space as the input tones)
    pub color: Vec3,

    /// Output opacity
    pub alpha: f32,
}

/// Map an fBm value to a coverage fraction around the configured threshold
///
/// Same curve as `smoothstep(threshold - softness, threshold + softness, x)`,
/// written around the threshold so the midpoint lands on exactly 0.5.
pub fn coverage_fraction(noise_value: f32, params: &CloudDensityParams) -> f32 {
    let width = 2.0 * params.coverage_softness;
    let t = ((noise_value - params.coverage_threshold) / width + 0.5).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Opacity for a coverage value; `None` means the pixel contributes nothing
pub fn visibility(coverage: f32, params: &CloudDensityParams) -> Option<f32> {
    match params.cutoff_mode {
        CutoffMode::Discard => (coverage >= params.visibility_cutoff).then_some(coverage),
        CutoffMode::SoftFade => {
            let alpha = coverage * smoothstep(0.0, params.visibility_cutoff, coverage);
            (alpha > 0.0).then_some(alpha)
        }
    }
}

/// Two-stage blend shadow -> mid -> highlight keyed by the fBm value
pub fn cloud_tone(noise_value: f32, shadow: Vec3, mid: Vec3, highlight: Vec3) -> Vec3 {
    let color = shadow.lerp(mid, smoothstep(0.0, 0.5, noise_value));
    color.lerp(highlight, smoothstep(0.5, 1.0, noise_value))
}

/// Animated cloud coverage for a dome surface coordinate.
///
/// `uv` is the raw surface coordinate; `time_s` the elapsed scene time.
pub fn cloud_density<N: Noise2>(
    noise: &N,
    params: &CloudDensityParams,
    uv: Vec2,
    time_s: f32,
    tones: [Vec3; 3],
) -> Option<DensitySample> {
    let uv = uv * params.uv_scale;
    let t = time_s * params.drift_rate;

    let motion = Vec2::new(t, 0.0);
    let distortion = fbm(
        noise,
        uv * params.distortion_frequency + Vec2::splat(t * params.distortion_rate),
        params.octaves,
    ) * params.distortion_scale;

    let value = fbm(noise, uv + motion + Vec2::splat(distortion), params.octaves);
    let coverage = coverage_fraction(value, params);
    let alpha = visibility(coverage, params)?;

    Some(DensitySample {
        noise: value,
        coverage,
        color: cloud_tone(value, tones[0], tones[1], tones[2]),
        alpha,
    })
}

/// Vertical sky gradient seen along a world-space position on the sky sphere
pub fn sky_gradient(world_position: Vec3, top: Vec3, bottom: Vec3, offset: f32, exponent: f32) -> Vec3 {
    let h = (world_position + Vec3::splat(offset)).normalize_or_zero().y;
    bottom.lerp(top, h.max(0.0).powf(exponent))
}

/// Highlight step edges (intensity = N·L)
pub const CEL_HIGHLIGHT_EDGES: (f32, f32) = (0.5, 0.52);

/// Shadow step edges (intensity = N·L)
pub const CEL_SHADOW_EDGES: (f32, f32) = (-0.2, -0.18);

/// Three-band toon shading for cloud volumes
pub fn cel_shade(normal: Vec3, light_dir: Vec3, shadow: Vec3, mid: Vec3, highlight: Vec3) -> Vec3 {
    let intensity = normal.dot(light_dir.normalize_or_zero());
    let step_highlight = smoothstep(CEL_HIGHLIGHT_EDGES.0, CEL_HIGHLIGHT_EDGES.1, intensity);
    let step_shadow = smoothstep(CEL_SHADOW_EDGES.0, CEL_SHADOW_EDGES.1, intensity);

    let shadow_mid = shadow.lerp(mid, step_shadow);
    shadow_mid.lerp(highlight, step_highlight)
}

/// Diffuse terrain lighting: ambient plus two Lambert directional lights
pub fn lit_diffuse(albedo: Vec3, normal: Vec3, rig: &LightRig) -> Vec3 {
    let mut light = rig.ambient.radiance();
    for directional in [&rig.key, &rig.fill] {
        let n_dot_l = normal.dot(directional.direction()).max(0.0);
        light += directional.radiance() * n_dot_l;
    }
    albedo * light
}
