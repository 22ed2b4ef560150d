//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (meters, seconds, radians, etc.)
//! - Documented ranges and meanings
//! - Validation where bad values would produce degenerate geometry

mod camera;
mod clouds;
mod render;
mod sky;
mod terrain;

// Re-export all types
pub use camera::{CameraPreset, FixedCamera, OrbitCamera};
pub use clouds::{CloudDensityParams, CloudFieldParams, CutoffMode};
pub use render::RenderConfig;
pub use sky::SkyParams;
pub use terrain::TerrainParams;
