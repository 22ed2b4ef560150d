//! One-shot scene construction.
//!
//! Terrain and cloud volumes are generated here, once. After `build` only the
//! uniform sync layer changes anything.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clouds::CloudField;
use crate::error::SceneResult;
use crate::geometry::Mesh;
use crate::lights::LightRig;
use crate::noise::SimplexNoise;
use crate::palette::Palette;
use crate::params::{CloudDensityParams, CloudFieldParams, SkyParams, TerrainParams};
use crate::sync::UniformSync;
use crate::terrain::HeightfieldGrid;

/// Everything needed to build a scene
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Seed for the noise permutation table
    pub seed: u64,

    /// Seed for cloud placement; `None` draws a fresh layout every build
    pub cloud_seed: Option<u64>,

    pub terrain: TerrainParams,
    pub clouds: CloudFieldParams,
    pub density: CloudDensityParams,
    pub sky: SkyParams,
    pub palette: Palette,
    pub lights_enabled: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            cloud_seed: None,
            terrain: TerrainParams::default(),
            clouds: CloudFieldParams::default(),
            density: CloudDensityParams::default(),
            sky: SkyParams::default(),
            palette: Palette::default(),
            lights_enabled: true,
        }
    }
}

/// Built scene: immutable geometry plus the mutable uniform state
pub struct Scene {
    pub noise: SimplexNoise,
    pub terrain: HeightfieldGrid,
    pub clouds: CloudField,
    pub sky_mesh: Mesh,
    pub dome_mesh: Mesh,
    pub sync: UniformSync,
    pub config: SceneConfig,
}

impl Scene {
    pub fn build(config: SceneConfig) -> SceneResult<Self> {
        config.sky.validate()?;
        config.density.validate()?;

        let noise = SimplexNoise::new(config.seed);
        let terrain = HeightfieldGrid::generate(&config.terrain, &noise)?;

        let clouds = match config.cloud_seed {
            Some(seed) => CloudField::generate(&config.clouds, &mut StdRng::seed_from_u64(seed))?,
            None => CloudField::generate(&config.clouds, &mut rand::thread_rng())?,
        };

        let sky_mesh = Mesh::sphere(
            config.sky.sky_radius_m,
            config.sky.width_segments,
            config.sky.height_segments,
        );
        let dome_mesh = Mesh::sphere(
            config.sky.cloud_dome_radius_m,
            config.sky.width_segments,
            config.sky.height_segments,
        );

        let mut sync = UniformSync::new(
            &config.palette,
            LightRig::for_palette(&config.palette),
            &config.sky,
            &config.density,
            config.terrain.albedo,
        );
        if !config.lights_enabled {
            sync.on_lights_toggle(false);
        }

        log::info!(
            "Scene built: seed {}, {} terrain vertices, {} cloud clusters ({} blobs)",
            config.seed,
            terrain.mesh.vertex_count(),
            clouds.len(),
            clouds.blob_count()
        );

        Ok(Self {
            noise,
            terrain,
            clouds,
            sky_mesh,
            dome_mesh,
            sync,
            config,
        })
    }

    /// Terrain mesh laid flat at its base elevation
    pub fn terrain_world_mesh(&self) -> Mesh {
        self.terrain.world_mesh(self.config.terrain.base_elevation_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CutoffMode;

    fn small_config() -> SceneConfig {
        SceneConfig {
            cloud_seed: Some(7),
            terrain: TerrainParams {
                segments_x: 8,
                segments_y: 8,
                ..Default::default()
            },
            clouds: CloudFieldParams {
                cluster_count: 3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_build_default_layout() {
        let scene = Scene::build(small_config()).unwrap();
        assert_eq!(scene.terrain.mesh.vertex_count(), 81);
        assert_eq!(scene.clouds.len(), 3);
        assert_eq!(scene.sky_mesh.vertex_count(), 33 * 16);
        assert_eq!(scene.dome_mesh.vertex_count(), 33 * 16);

        let (lo, hi) = scene.dome_mesh.bounds().unwrap();
        assert!((hi.y - 950.0).abs() < 1e-2);
        assert!((lo.y + 950.0).abs() < 1e-2);
    }

    #[test]
    fn test_same_seeds_same_scene() {
        let a = Scene::build(small_config()).unwrap();
        let b = Scene::build(small_config()).unwrap();
        assert_eq!(a.terrain.mesh, b.terrain.mesh);
        assert_eq!(a.clouds.world_mesh(), b.clouds.world_mesh());
        assert_eq!(a.noise.state().permutation(), b.noise.state().permutation());
    }

    #[test]
    fn test_lights_off_at_build() {
        let config = SceneConfig {
            lights_enabled: false,
            ..small_config()
        };
        let scene = Scene::build(config).unwrap();
        assert!(!scene.sync.lights_enabled());
        assert_eq!(scene.sync.uniforms().terrain.ambient, [0.0; 4]);
    }

    #[test]
    fn test_density_mode_reaches_uniforms() {
        let mut config = small_config();
        config.density.cutoff_mode = CutoffMode::SoftFade;
        let scene = Scene::build(config).unwrap();
        assert_eq!(scene.sync.uniforms().cloud_dome.cutoff_mode, 1);
    }

    #[test]
    fn test_terrain_sits_below_origin() {
        let scene = Scene::build(small_config()).unwrap();
        let (lo, hi) = scene.terrain_world_mesh().bounds().unwrap();
        let scale = scene.config.terrain.height_scale_m;
        assert!(lo.y >= -100.0 - scale - 1e-3);
        assert!(hi.y <= -100.0 + scale + 1e-3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.clouds.cluster_count = 0;
        assert!(Scene::build(config).is_err());

        let mut config = small_config();
        config.sky.cloud_dome_radius_m = 2000.0;
        assert!(Scene::build(config).is_err());

        let mut config = small_config();
        config.density.coverage_softness = 0.0;
        assert!(Scene::build(config).is_err());
    }
}
