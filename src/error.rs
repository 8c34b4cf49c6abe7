//! Error types for flame presentation
//!
//! The simulation itself cannot fail; only the GPU surface can.

use thiserror::Error;

/// Errors raised while bringing up or presenting to a drawing surface
#[derive(Debug, Error)]
pub enum RenderError {
    /// The host has no drawing surface (yet)
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// No GPU adapter compatible with the surface
    #[error("No compatible GPU adapter")]
    AdapterUnavailable,

    /// Device request was rejected
    #[error("GPU device request failed: {0}")]
    Device(String),

    /// Acquiring the next surface texture failed
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
