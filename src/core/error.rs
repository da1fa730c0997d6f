use super::region::{Region, TextureSize};

/// Errors raised inside the presentation engine.
///
/// None of these reach the framebuffer source: the `DisplaySink` boundary
/// logs and counts them, and the next frame renders the last good state.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("region {region:?} does not fit texture {size:?}")]
    OutOfBounds { region: Region, size: TextureSize },

    #[error("no display texture at a compatible size (have {have:?}, need {need:?})")]
    NoCompatibleTexture {
        have: Option<TextureSize>,
        need: Option<TextureSize>,
    },

    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("texture allocation of {size:?} failed: {reason}")]
    Allocation { size: TextureSize, reason: String },

    #[error("texture readback failed: {0}")]
    Readback(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<wgpu::SurfaceError> for PresentError {
    fn from(err: wgpu::SurfaceError) -> Self {
        PresentError::Surface(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PresentError>;
