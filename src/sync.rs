//! Palette, light and time synchronization into shader uniforms.
//!
//! The host never touches uniforms directly: it calls the `on_*` entry points
//! and the renderer uploads whatever blocks were marked dirty. Values are
//! mutated in place; no geometry or material is rebuilt.

use glam::Vec3;

use crate::lights::LightRig;
use crate::palette::{Color, Palette};
use crate::params::{CloudDensityParams, SkyParams};
use crate::uniforms::{CloudDomeUniforms, CloudVolumeUniforms, SkyUniforms, TerrainUniforms};

/// Current value of every shader-backed material's uniforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniformSet {
    pub sky: SkyUniforms,
    pub cloud_dome: CloudDomeUniforms,
    pub cloud_volume: CloudVolumeUniforms,
    pub terrain: TerrainUniforms,
}

/// Which uniform blocks changed since the renderer last uploaded them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyBlocks {
    pub sky: bool,
    pub cloud_dome: bool,
    pub cloud_volume: bool,
    pub terrain: bool,
}

impl DirtyBlocks {
    pub fn any(&self) -> bool {
        self.sky || self.cloud_dome || self.cloud_volume || self.terrain
    }

    fn all() -> Self {
        Self {
            sky: true,
            cloud_dome: true,
            cloud_volume: true,
            terrain: true,
        }
    }
}

/// Sole writer of the scene's uniforms and lights
#[derive(Debug, Clone)]
pub struct UniformSync {
    uniforms: ShaderUniformSet,
    lights: LightRig,
    palette: Palette,
    terrain_albedo: Color,
    dirty: DirtyBlocks,
}

impl UniformSync {
    /// Initial uniforms for a palette. Everything starts dirty so the first
    /// frame uploads the full set.
    pub fn new(
        palette: &Palette,
        lights: LightRig,
        sky: &SkyParams,
        density: &CloudDensityParams,
        terrain_albedo: Color,
    ) -> Self {
        let mut lights = lights;
        lights.key.color = palette.sky.top;
        lights.fill.color = palette.sky.bottom;

        let uniforms = ShaderUniformSet {
            sky: SkyUniforms::new(palette, sky),
            cloud_dome: CloudDomeUniforms::new(palette, density),
            cloud_volume: CloudVolumeUniforms::new(palette, lights.key.direction()),
            terrain: TerrainUniforms::new(terrain_albedo, &lights),
        };

        Self {
            uniforms,
            lights,
            palette: *palette,
            terrain_albedo,
            dirty: DirtyBlocks::all(),
        }
    }

    /// Apply a palette. Only categories that differ from the last applied
    /// palette are written; applying the same palette twice changes nothing.
    pub fn on_palette_change(&mut self, palette: &Palette) {
        let previous = self.palette;

        if palette.sky.top != previous.sky.top {
            self.uniforms.sky.top_color = palette.sky.top.to_linear_array(1.0);
            self.lights.key.color = palette.sky.top;
            self.dirty.sky = true;
            self.dirty.terrain = true;
            log::debug!("Sky top -> {}", palette.sky.top);
        }

        if palette.sky.bottom != previous.sky.bottom {
            self.uniforms.sky.bottom_color = palette.sky.bottom.to_linear_array(1.0);
            self.lights.fill.color = palette.sky.bottom;
            self.dirty.sky = true;
            self.dirty.terrain = true;
            log::debug!("Sky bottom -> {}", palette.sky.bottom);
        }

        if palette.clouds.shadow != previous.clouds.shadow {
            let c = palette.clouds.shadow.to_linear_array(1.0);
            self.uniforms.cloud_dome.color_shadow = c;
            self.uniforms.cloud_volume.color_shadow = c;
            self.dirty.cloud_dome = true;
            self.dirty.cloud_volume = true;
            log::debug!("Cloud shadow -> {}", palette.clouds.shadow);
        }

        if palette.clouds.mid != previous.clouds.mid {
            let c = palette.clouds.mid.to_linear_array(1.0);
            self.uniforms.cloud_dome.color_mid = c;
            self.uniforms.cloud_volume.color_mid = c;
            self.dirty.cloud_dome = true;
            self.dirty.cloud_volume = true;
            log::debug!("Cloud mid -> {}", palette.clouds.mid);
        }

        if palette.clouds.highlight != previous.clouds.highlight {
            let c = palette.clouds.highlight.to_linear_array(1.0);
            self.uniforms.cloud_dome.color_highlight = c;
            self.uniforms.cloud_volume.color_highlight = c;
            self.dirty.cloud_dome = true;
            self.dirty.cloud_volume = true;
            log::debug!("Cloud highlight -> {}", palette.clouds.highlight);
        }

        if self.dirty.terrain {
            self.refresh_terrain();
        }
        self.palette = *palette;
    }

    /// Show or hide the ambient and both directional lights
    pub fn on_lights_toggle(&mut self, enabled: bool) {
        if self.lights.is_visible() == enabled {
            return;
        }
        self.lights.set_visible(enabled);
        self.refresh_terrain();
        self.dirty.terrain = true;
        log::debug!("Lights {}", if enabled { "on" } else { "off" });
    }

    /// Set the ambient light intensity
    pub fn on_ambient_intensity(&mut self, intensity: f32) {
        self.lights.ambient.intensity = intensity;
        self.refresh_terrain();
        self.dirty.terrain = true;
    }

    /// Write the elapsed scene time (seconds) into the cloud dome.
    ///
    /// Called once per displayed frame with a non-decreasing value.
    pub fn on_tick(&mut self, elapsed_s: f32) {
        self.uniforms.cloud_dome.time = elapsed_s;
        self.dirty.cloud_dome = true;
    }

    fn refresh_terrain(&mut self) {
        self.uniforms.terrain = TerrainUniforms::new(self.terrain_albedo, &self.lights);
    }

    pub fn uniforms(&self) -> &ShaderUniformSet {
        &self.uniforms
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn lights_enabled(&self) -> bool {
        self.lights.is_visible()
    }

    /// Direction the cloud volumes are lit from
    pub fn light_dir(&self) -> Vec3 {
        Vec3::from_slice(&self.uniforms.cloud_volume.light_dir[..3])
    }

    /// Blocks changed since the last call; resets the flags
    pub fn take_dirty(&mut self) -> DirtyBlocks {
        std::mem::take(&mut self.dirty)
    }
}
