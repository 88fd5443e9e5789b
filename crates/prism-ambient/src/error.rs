//! Error types for the ambient layer.

use thiserror::Error;

/// Result alias for animator operations.
pub type Result<T> = std::result::Result<T, AmbientError>;

/// Errors reported by the animator itself.
///
/// Surface problems are not in here: they never escape `mount` or `tick`, they
/// are logged and degrade to "nothing drawn".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmbientError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors reported by a [`RenderSurface`](crate::RenderSurface) or by the host
/// while acquiring one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The host cannot provide a drawable surface (no GPU, headless, ...).
    #[error("no render surface available: {0}")]
    Unavailable(String),

    /// The surface was lost and must be re-acquired; the frame is skipped.
    #[error("render surface lost")]
    Lost,

    #[error("unknown template {0}")]
    UnknownTemplate(u32),

    #[error("template rejected: {0}")]
    InvalidTemplate(String),
}
