//! Skyscape library - procedural sky, cloud and terrain backdrop

pub mod camera;
pub mod cli;
pub mod clouds;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod lights;
pub mod noise;
pub mod palette;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod shading;
pub mod sync;
pub mod terrain;
pub mod uniforms;

pub use error::{SceneError, SceneResult};
