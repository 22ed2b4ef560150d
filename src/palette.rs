//! Colors and the externally owned palette state.

use glam::Vec3;
use std::fmt;
use std::str::FromStr;

/// sRGB color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Packed 0xRRGGBB value (components rounded to 8 bits)
    pub fn to_hex(self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    /// sRGB components as a vector
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    /// Linear-light components, as written into shader uniforms
    pub fn to_linear(self) -> Vec3 {
        Vec3::new(
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        )
    }

    /// Linear components padded to a vec4 uniform slot
    pub fn to_linear_array(self, w: f32) -> [f32; 4] {
        self.to_linear().extend(w).to_array()
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Error returned for strings that are not `#rrggbb`
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color '{0}', expected #rrggbb")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::from_hex)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Sky gradient endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyColors {
    pub top: Color,
    pub bottom: Color,
}

/// Three cloud tones, darkest to brightest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudColors {
    pub shadow: Color,
    pub mid: Color,
    pub highlight: Color,
}

/// Colors owned by the host UI and pushed into the scene on change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub sky: SkyColors,
    pub clouds: CloudColors,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky: SkyColors {
                top: Color::from_hex(0x4d71a8),
                bottom: Color::from_hex(0xb9d5ff),
            },
            clouds: CloudColors {
                shadow: Color::from_hex(0xa4b1c4),
                mid: Color::from_hex(0xd4dde8),
                highlight: Color::from_hex(0xffffff),
            },
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sky top {} bottom {} | clouds shadow {} mid {} highlight {}",
            self.sky.top,
            self.sky.bottom,
            self.clouds.shadow,
            self.clouds.mid,
            self.clouds.highlight
        )
    }
}

/// Named palettes the host can cycle through
pub fn presets() -> [(&'static str, Palette); 4] {
    let palette = |top, bottom, shadow, mid, highlight| Palette {
        sky: SkyColors {
            top: Color::from_hex(top),
            bottom: Color::from_hex(bottom),
        },
        clouds: CloudColors {
            shadow: Color::from_hex(shadow),
            mid: Color::from_hex(mid),
            highlight: Color::from_hex(highlight),
        },
    };

    [
        ("day", Palette::default()),
        ("dusk", palette(0x2b2d5c, 0xf4a261, 0x6d597a, 0xb56576, 0xffcdb2)),
        ("storm", palette(0x3a4750, 0x8d99ae, 0x41474d, 0x6c757d, 0xadb5bd)),
        ("night", palette(0x0b1026, 0x2c3e67, 0x1c2235, 0x3a4566, 0x8793b8)),
    ]
}
