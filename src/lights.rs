//! Scene light rig: one ambient and two directional lights.

use glam::Vec3;

use crate::palette::{Color, Palette};

/// Uniform light from every direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
    pub visible: bool,
}

impl AmbientLight {
    /// Linear color scaled by intensity, zero when hidden
    pub fn radiance(&self) -> Vec3 {
        if self.visible {
            self.color.to_linear() * self.intensity
        } else {
            Vec3::ZERO
        }
    }
}

/// Light shining from `position` toward the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub visible: bool,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }

    /// Linear color scaled by intensity, zero when hidden
    pub fn radiance(&self) -> Vec3 {
        if self.visible {
            self.color.to_linear() * self.intensity
        } else {
            Vec3::ZERO
        }
    }
}

/// Ambient fill plus a key light tinted by the sky top and a fill light
/// tinted by the sky bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
}

impl LightRig {
    /// Rig tinted by a palette's sky colors
    pub fn for_palette(palette: &Palette) -> Self {
        let mut rig = Self::default();
        rig.key.color = palette.sky.top;
        rig.fill.color = palette.sky.bottom;
        rig
    }

    /// Show or hide all three lights. Colors and intensities are untouched.
    pub fn set_visible(&mut self, visible: bool) {
        self.ambient.visible = visible;
        self.key.visible = visible;
        self.fill.visible = visible;
    }

    /// True when every light is on
    pub fn is_visible(&self) -> bool {
        self.ambient.visible && self.key.visible && self.fill.visible
    }
}

impl Default for LightRig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.2,
                visible: true,
            },
            key: DirectionalLight {
                color: palette.sky.top,
                intensity: 1.0,
                position: Vec3::new(5.0, 5.0, 5.0),
                visible: true,
            },
            fill: DirectionalLight {
                color: palette.sky.bottom,
                intensity: 0.5,
                position: Vec3::new(-5.0, -5.0, -5.0),
                visible: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_lights_emit_nothing() {
        let mut rig = LightRig::default();
        assert!(rig.ambient.radiance().length() > 0.0);

        rig.set_visible(false);
        assert!(!rig.is_visible());
        assert_eq!(rig.ambient.radiance(), Vec3::ZERO);
        assert_eq!(rig.key.radiance(), Vec3::ZERO);
        assert_eq!(rig.fill.radiance(), Vec3::ZERO);
    }

    #[test]
    fn test_directions_oppose() {
        let rig = LightRig::default();
        let sum = rig.key.direction() + rig.fill.direction();
        assert!(sum.length() < 1e-6);
        assert!((rig.key.direction().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_palette_tints_directional_lights() {
        let mut palette = Palette::default();
        palette.sky.top = Color::from_hex(0xff0000);
        palette.sky.bottom = Color::from_hex(0x00ff00);

        let rig = LightRig::for_palette(&palette);
        assert_eq!(rig.key.color, palette.sky.top);
        assert_eq!(rig.fill.color, palette.sky.bottom);
        assert_eq!(rig.ambient.color, Color::WHITE);
    }
}
