//! Error types for scene construction and procedural generation.

/// Errors surfaced to the host while building or mounting the scene
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Generation parameters that would produce degenerate geometry
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to create rendering surface: {0}")]
    Surface(String),

    #[error("No suitable GPU adapter found")]
    Adapter,

    #[error("Failed to request GPU device: {0}")]
    Device(String),
}

impl SceneError {
    pub fn config<T: ToString>(msg: T) -> Self {
        SceneError::Config(msg.to_string())
    }
}

/// Result type alias for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
