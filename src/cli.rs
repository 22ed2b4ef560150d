//! Command-line argument parsing.

use clap::Parser;

use crate::palette::{Color, Palette};
use crate::params::{CameraPreset, CutoffMode, FixedCamera, OrbitCamera, RenderConfig};
use crate::scene::SceneConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "skyscape")]
#[command(about = "Procedural sky, cloud and terrain backdrop", long_about = None)]
pub struct Args {
    /// Seed for the noise permutation table (terrain and cloud dome)
    #[arg(long, value_name = "SEED", default_value_t = 42)]
    pub seed: u64,

    /// Seed for cloud volume placement (random layout when omitted)
    #[arg(long, value_name = "SEED")]
    pub cloud_seed: Option<u64>,

    /// Number of cloud clusters on the ring
    #[arg(long, value_name = "COUNT", default_value_t = 14)]
    pub clouds: u32,

    /// Sky color at the zenith
    #[arg(long, value_name = "HEX")]
    pub sky_top: Option<Color>,

    /// Sky color at the horizon
    #[arg(long, value_name = "HEX")]
    pub sky_bottom: Option<Color>,

    /// Darkest cloud tone
    #[arg(long, value_name = "HEX")]
    pub cloud_shadow: Option<Color>,

    /// Middle cloud tone
    #[arg(long, value_name = "HEX")]
    pub cloud_mid: Option<Color>,

    /// Brightest cloud tone
    #[arg(long, value_name = "HEX")]
    pub cloud_highlight: Option<Color>,

    /// Start with all lights hidden
    #[arg(long)]
    pub lights_off: bool,

    /// Fade thin cloud coverage out instead of cutting it off
    #[arg(long)]
    pub soft_edges: bool,

    /// Camera preset: fixed (default), orbit
    #[arg(long, value_name = "PRESET", default_value = "fixed")]
    pub camera: String,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,
}

impl Args {
    /// Default palette with any colors given on the command line applied
    pub fn palette(&self) -> Palette {
        let mut palette = Palette::default();
        if let Some(c) = self.sky_top {
            palette.sky.top = c;
        }
        if let Some(c) = self.sky_bottom {
            palette.sky.bottom = c;
        }
        if let Some(c) = self.cloud_shadow {
            palette.clouds.shadow = c;
        }
        if let Some(c) = self.cloud_mid {
            palette.clouds.mid = c;
        }
        if let Some(c) = self.cloud_highlight {
            palette.clouds.highlight = c;
        }
        palette
    }

    pub fn scene_config(&self) -> SceneConfig {
        let mut config = SceneConfig {
            seed: self.seed,
            cloud_seed: self.cloud_seed,
            palette: self.palette(),
            lights_enabled: !self.lights_off,
            ..Default::default()
        };
        config.clouds.cluster_count = self.clouds;
        if self.soft_edges {
            config.density.cutoff_mode = CutoffMode::SoftFade;
        }
        config
    }

    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default();
        if !config.set_viewport(self.width, self.height) {
            log::warn!(
                "Ignoring window size {}x{}, using {}x{}",
                self.width,
                self.height,
                config.window_width,
                config.window_height
            );
        }
        config
    }

    /// Parse camera preset from command-line arguments
    pub fn camera_preset(&self) -> CameraPreset {
        match self.camera.to_lowercase().as_str() {
            "fixed" => CameraPreset::Fixed(FixedCamera::default()),
            "orbit" => CameraPreset::Orbit(OrbitCamera::default()),
            other => {
                log::warn!("Unknown camera preset '{}', using fixed", other);
                CameraPreset::Fixed(FixedCamera::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["skyscape"]);
        let config = args.scene_config();
        assert_eq!(config.seed, 42);
        assert_eq!(config.cloud_seed, None);
        assert_eq!(config.clouds.cluster_count, 14);
        assert_eq!(config.palette, Palette::default());
        assert!(config.lights_enabled);
        assert_eq!(config.density.cutoff_mode, CutoffMode::Discard);
        assert!(matches!(args.camera_preset(), CameraPreset::Fixed(_)));
    }

    #[test]
    fn test_color_flags() {
        let args = Args::parse_from([
            "skyscape",
            "--sky-top",
            "#102030",
            "--cloud-mid",
            "aabbcc",
            "--lights-off",
            "--soft-edges",
        ]);
        let config = args.scene_config();
        assert_eq!(config.palette.sky.top, Color::from_hex(0x102030));
        assert_eq!(config.palette.clouds.mid, Color::from_hex(0xaabbcc));
        assert_eq!(config.palette.sky.bottom, Palette::default().sky.bottom);
        assert!(!config.lights_enabled);
        assert_eq!(config.density.cutoff_mode, CutoffMode::SoftFade);
    }

    #[test]
    fn test_bad_color_rejected() {
        assert!(Args::try_parse_from(["skyscape", "--sky-top", "blue"]).is_err());
    }

    #[test]
    fn test_window_size() {
        let args = Args::parse_from(["skyscape", "--width", "800", "--height", "400"]);
        assert_eq!(args.render_config().aspect_ratio(), 2.0);

        let args = Args::parse_from(["skyscape", "--height", "0"]);
        assert_eq!(args.render_config().window_height, 720);
    }

    #[test]
    fn test_orbit_preset() {
        let args = Args::parse_from(["skyscape", "--camera", "Orbit"]);
        assert!(matches!(args.camera_preset(), CameraPreset::Orbit(_)));
    }
}
