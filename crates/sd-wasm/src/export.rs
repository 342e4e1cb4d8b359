//! Client-side export: render a slide on a detached canvas and return PNG.

use crate::metrics::{CanvasMetrics, context_2d};
use crate::render2d::paint_slide;
use sd_core::layout::{Viewport, layout_slide};
use sd_core::{AspectRatio, Slide};
use sd_render::RenderOptions;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

/// Render `slide_json` at the size fixed by `aspect` (`"9:16"`, `"1:1"`,
/// `"16:9"`) and return a `data:image/png;base64,...` URL.
///
/// `background` must already be loaded; pass `undefined` to get the
/// fallback fill.
#[wasm_bindgen]
pub fn export_slide_png(
    slide_json: &str,
    aspect: &str,
    background: Option<HtmlImageElement>,
) -> Result<String, JsValue> {
    let slide: Slide =
        serde_json::from_str(slide_json).map_err(|e| JsValue::from_str(&format!("bad slide: {e}")))?;
    let viewport = export_viewport(aspect).map_err(|e| JsValue::from_str(&e))?;

    let canvas = detached_canvas(viewport)?;
    let ctx = context_2d(&canvas).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let metrics = CanvasMetrics::from_context(ctx.clone());
    let geometry = layout_slide(&slide, viewport, &metrics);
    log::debug!(
        "export {} at {}×{}: {} layer(s)",
        slide.id,
        viewport.width,
        viewport.height,
        geometry.len()
    );

    paint_slide(
        &ctx,
        &slide,
        &geometry,
        viewport,
        background.as_ref(),
        RenderOptions::default().fallback_background,
    );
    canvas.to_data_url_with_type("image/png")
}

/// Target size for an aspect ratio string.
pub fn export_viewport(aspect: &str) -> Result<Viewport, String> {
    let (w, h) = aspect.parse::<AspectRatio>()?.dimensions();
    Ok(Viewport::new(w as f32, h as f32))
}

fn detached_canvas(viewport: Viewport) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document to create an export canvas in"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(viewport.width as u32);
    canvas.set_height(viewport.height as u32);
    Ok(canvas)
}
