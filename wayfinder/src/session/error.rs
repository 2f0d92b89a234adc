//! Engine session errors.

use thiserror::Error;

use crate::surface::SurfaceError;

/// Errors that can occur during the session lifecycle.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The rendering surface could not be initialized.
    #[error("Failed to start engine session: {0}")]
    SurfaceInit(#[from] SurfaceError),

    /// The session was started outside a Tokio runtime.
    #[error("Engine session requires a Tokio runtime")]
    NoRuntime,

    /// The session task panicked or was aborted.
    #[error("Engine session task failed: {0}")]
    Task(String),
}
