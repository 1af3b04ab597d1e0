use std::io;

/// All error types for the scene-tiler pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SceneTilerError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Input error: {0}")]
    Input(String),
    #[error("Transform error: {0}")]
    Transform(String),
    #[error("Mesh error: {0}")]
    Mesh(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SceneTilerError>;
