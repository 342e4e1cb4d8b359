//! Whole-deck export into a zip archive of PNGs.
//!
//! Slides render one at a time on the blocking pool; only the encoded PNG
//! of the current slide is alive at once, and the task yields between
//! slides so the stdio loop stays responsive.

use sd_core::{AspectRatio, Slide};
use sd_render::{RasterRenderer, RenderError};
use std::io::{Cursor, Write};
use std::sync::Arc;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("slide {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: RenderError,
    },

    #[error("archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("render worker failed: {0}")]
    Worker(String),
}

/// Archive entry name for the slide at `index` (0-based): `1.png`, `2.png`, ...
pub fn entry_name(index: usize) -> String {
    format!("{}.png", index + 1)
}

/// Render every slide in order and pack the PNGs into a zip archive.
pub async fn export_deck(
    renderer: Arc<RasterRenderer>,
    slides: Vec<Slide>,
    aspect: AspectRatio,
) -> Result<Vec<u8>, ExportError> {
    let total = slides.len();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, slide) in slides.into_iter().enumerate() {
        let worker = Arc::clone(&renderer);
        let png = tokio::task::spawn_blocking(move || worker.export_slide(&slide, aspect))
            .await
            .map_err(|e| ExportError::Worker(e.to_string()))?
            .map_err(|source| ExportError::Render {
                index: index + 1,
                source,
            })?;

        zip.start_file(entry_name(index), options)?;
        zip.write_all(&png)?;
        log::info!("exported slide {}/{total} ({} bytes)", index + 1, png.len());

        tokio::task::yield_now().await;
    }

    Ok(zip.finish()?.into_inner())
}
