//! Canvas2D text metrics.
//!
//! Measures with `CanvasRenderingContext2d.measureText`, so on-screen layout
//! and client export wrap exactly where the browser will draw.

use sd_core::{FontSpec, LayoutError, TextMetrics};
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct CanvasMetrics {
    ctx: CanvasRenderingContext2d,
    font: FontCache,
}

/// Last font shorthand set on a context; setting `font` re-parses CSS.
///
/// Anything else that writes the context's font (painting, a canvas resize
/// resetting the context state) must call [`FontCache::invalidate`].
#[derive(Debug, Default)]
pub struct FontCache(RefCell<Option<String>>);

impl FontCache {
    /// Record `css` as current. Returns true when the context needs it set.
    pub fn update(&self, css: &str) -> bool {
        let mut current = self.0.borrow_mut();
        if current.as_deref() == Some(css) {
            return false;
        }
        *current = Some(css.to_string());
        true
    }

    pub fn invalidate(&self) {
        self.0.borrow_mut().take();
    }
}

impl CanvasMetrics {
    /// Metrics backed by `canvas`'s 2D context.
    ///
    /// Fails when the canvas cannot hand out a 2D context (detached, already
    /// bound to WebGL, ...). Layout must not run without metrics.
    pub fn for_canvas(canvas: &HtmlCanvasElement) -> Result<Self, LayoutError> {
        let ctx = context_2d(canvas)?;
        Ok(Self::from_context(ctx))
    }

    pub fn from_context(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            font: FontCache::default(),
        }
    }

    /// Forget the cached font; the context's font state is no longer ours.
    pub fn invalidate(&self) {
        self.font.invalidate();
    }
}

impl TextMetrics for CanvasMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        let css = font.to_css();
        if self.font.update(&css) {
            self.ctx.set_font(&css);
        }
        match self.ctx.measure_text(text) {
            Ok(m) => m.width() as f32,
            Err(_) => {
                log::warn!("measureText failed for {:?}", font.family);
                0.0
            }
        }
    }
}

/// The 2D context of `canvas`, or `MetricsUnavailable`.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, LayoutError> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or_else(|| LayoutError::MetricsUnavailable("canvas has no 2d context".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_cache_sets_once_until_invalidated() {
        let cache = FontCache::default();
        let css = "600 40px \"Inter\", sans-serif";
        assert!(cache.update(css));
        assert!(!cache.update(css));

        // A resize resets the context to `10px sans-serif`.
        cache.invalidate();
        assert!(cache.update(css));
        assert!(!cache.update(css));
        assert!(cache.update("400 20px \"Inter\", sans-serif"));
    }
}
