use sd_core::LayoutError;
use thiserror::Error;

/// Failure of a whole render attempt.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Metrics(#[from] LayoutError),

    #[error("cannot allocate a {width}x{height} drawing surface")]
    Surface { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Failure to load a background image. Renderers downgrade these to a
/// fallback fill; they never abort a render.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("asset reference escapes the asset root: {0}")]
    OutsideRoot(String),

    #[error("asset read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
}
