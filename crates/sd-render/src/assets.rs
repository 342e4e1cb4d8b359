//! Background image loading.
//!
//! A slide's background is an opaque reference string: a path resolved
//! against an asset root, or an inline `data:` URL.

use crate::error::AssetError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Component, Path, PathBuf};
use tiny_skia::{ColorU8, IntSize, Pixmap};

/// Resolves background references to encoded image bytes.
pub trait AssetSource: Send + Sync {
    fn load(&self, reference: &str) -> Result<Vec<u8>, AssetError>;
}

/// Loads paths relative to a root directory, plus inline `data:` URLs.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `reference` onto the root. Absolute paths and `..` segments are
    /// rejected so a reference can never name a file outside the root.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(reference);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(AssetError::OutsideRoot(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for FsAssets {
    fn load(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        if reference.starts_with("data:") {
            return decode_data_url(reference);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(AssetError::NotFound(format!(
                "{reference} (remote assets are not fetched)"
            )));
        }
        let path = self.resolve(reference)?;
        if !path.is_file() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        Ok(std::fs::read(path)?)
    }
}

/// Decode a `data:[<mime>][;base64],<payload>` URL into raw bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, AssetError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::InvalidDataUrl("missing `data:` prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::InvalidDataUrl("missing `,` separator".into()))?;
    if header.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| AssetError::InvalidDataUrl(e.to_string()))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Decode PNG/JPEG/GIF/WebP bytes into a premultiplied pixmap.
pub fn decode_image(bytes: &[u8]) -> Result<Pixmap, AssetError> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| AssetError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = Vec::with_capacity(rgba.as_raw().len());
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        let p = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| AssetError::Decode(format!("empty image {width}x{height}")))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| AssetError::Decode(format!("bad pixel buffer for {width}x{height}")))
}
