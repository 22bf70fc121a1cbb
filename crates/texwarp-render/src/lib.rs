//! TexWarp Render - GPU Layer
//!
//! This crate provides the wgpu-based rendering layer for TexWarp:
//! - Backend/device initialization
//! - Source texture management and image loading
//! - The warp pipeline (static geometry, per-frame texture coordinates)
//! - Surface blitting and offscreen capture for PNG export

use thiserror::Error;

pub mod backend;
pub mod blit;
pub mod capture;
pub mod texture;
pub mod warp_renderer;

pub use backend::WgpuBackend;
pub use blit::BlitRenderer;
pub use capture::FrameCapture;
pub use texture::{load_image, LoadError, RgbaTexture};
pub use warp_renderer::WarpRenderer;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Adapter or device acquisition failed
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Surface creation or configuration failed
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// GPU buffer readback failed
    #[error("Readback error: {0}")]
    ReadbackError(String),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
