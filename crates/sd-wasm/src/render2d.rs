//! Canvas2D slide painter.
//!
//! Shared by the interactive surface and client export: background cover
//! fit with CSS filters, then each layer line as shadow → stroke → fill.
//! Selection chrome and snap guides are a separate overlay pass so export
//! never draws them.

use sd_core::layout::{LayerGeometry, Viewport};
use sd_core::mapper::cover_rect;
use sd_core::{Color, LayerId, Slide, TextAlign};
use sd_editor::SnapIndicator;
use sd_render::hit::{HandleSide, body_rect, handle_rect};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

const ACCENT: &str = "#4FC3F7";
const HANDLE_FILL: &str = "#FFFFFF";

/// Paint `slide` at `viewport` size. `geometry` must come from the same
/// slide and viewport.
pub fn paint_slide(
    ctx: &CanvasRenderingContext2d,
    slide: &Slide,
    geometry: &[LayerGeometry],
    viewport: Viewport,
    background: Option<&HtmlImageElement>,
    fallback: Color,
) {
    paint_background(ctx, slide, viewport, background, fallback);
    for geo in geometry {
        paint_layer(ctx, geo);
    }
}

// ─── Background ──────────────────────────────────────────────────────────

fn paint_background(
    ctx: &CanvasRenderingContext2d,
    slide: &Slide,
    viewport: Viewport,
    image: Option<&HtmlImageElement>,
    fallback: Color,
) {
    ctx.set_fill_style_str(&fallback.to_css());
    ctx.fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);

    // Not loaded yet, or failed: the fallback fill stands.
    let Some(img) = image.filter(|img| img.complete() && img.natural_width() > 0) else {
        if slide.background.is_some() {
            log::debug!("background for {} not ready; using fallback", slide.id);
        }
        return;
    };
    let Some(dest) = cover_rect(
        img.natural_width() as f32,
        img.natural_height() as f32,
        viewport,
        slide.effects.image_offset,
        slide.effects.image_offset_y,
    ) else {
        return;
    };

    ctx.save();
    ctx.set_filter(&slide.effects.to_css_filter());
    if ctx
        .draw_image_with_html_image_element_and_dw_and_dh(
            img,
            dest.x as f64,
            dest.y as f64,
            dest.width as f64,
            dest.height as f64,
        )
        .is_err()
    {
        log::warn!("drawImage failed for {}; using fallback", slide.id);
    }
    ctx.restore();
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Pass {
    Fill,
    Stroke,
}

fn paint_layer(ctx: &CanvasRenderingContext2d, geo: &LayerGeometry) {
    if geo.lines.is_empty() {
        return;
    }
    ctx.save();
    ctx.set_font(&geo.font.to_css());
    ctx.set_text_baseline("middle");
    ctx.set_line_join("round");

    let fill = geo.fill.to_css();
    if let Some(shadow) = &geo.shadow {
        ctx.set_shadow_color(&shadow.color.to_css());
        ctx.set_shadow_blur(shadow.blur as f64);
        ctx.set_shadow_offset_x(shadow.offset_x as f64);
        ctx.set_shadow_offset_y(shadow.offset_y as f64);
        ctx.set_fill_style_str(&fill);
        draw_lines(ctx, geo, Pass::Fill);
        clear_shadow(ctx);
    }
    if geo.stroke.width > 0.0 {
        ctx.set_stroke_style_str(&geo.stroke.color.to_css());
        ctx.set_line_width(geo.stroke.width as f64);
        draw_lines(ctx, geo, Pass::Stroke);
    }
    ctx.set_fill_style_str(&fill);
    draw_lines(ctx, geo, Pass::Fill);
    ctx.restore();
}

fn clear_shadow(ctx: &CanvasRenderingContext2d) {
    ctx.set_shadow_blur(0.0);
    ctx.set_shadow_offset_x(0.0);
    ctx.set_shadow_offset_y(0.0);
    ctx.set_shadow_color("transparent");
}

fn draw_lines(ctx: &CanvasRenderingContext2d, geo: &LayerGeometry, pass: Pass) {
    for (i, line) in geo.lines.iter().enumerate() {
        let y = geo.line_center_y(i) as f64;
        if geo.letter_spacing == 0.0 {
            ctx.set_text_align(geo.align.as_css());
            draw_run(ctx, &line.text, geo.text_anchor_x() as f64, y, pass);
        } else {
            // Canvas has no portable letter-spacing; place glyphs one by one
            // from the line's left edge.
            ctx.set_text_align(TextAlign::Left.as_css());
            let mut x = geo.line_left(i) as f64;
            let mut buf = [0u8; 4];
            for ch in line.text.chars() {
                let s = ch.encode_utf8(&mut buf);
                draw_run(ctx, s, x, y, pass);
                let advance = ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
                x += advance + geo.letter_spacing as f64;
            }
        }
    }
}

fn draw_run(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, pass: Pass) {
    let result = match pass {
        Pass::Fill => ctx.fill_text(text, x, y),
        Pass::Stroke => ctx.stroke_text(text, x, y),
    };
    if result.is_err() {
        log::trace!("text draw failed at ({x:.1}, {y:.1})");
    }
}

// ─── Overlay ─────────────────────────────────────────────────────────────

/// Selection boxes, resize handles and snap guides for the live surface.
pub fn paint_overlay(
    ctx: &CanvasRenderingContext2d,
    geometry: &[LayerGeometry],
    selection: &[LayerId],
    snap: SnapIndicator,
    viewport: Viewport,
) {
    ctx.save();
    let selected: Vec<&LayerGeometry> = geometry
        .iter()
        .filter(|g| selection.contains(&g.layer_id))
        .collect();

    // Snapping only happens for a single selection, whose anchor then sits
    // exactly on the target.
    if let [only] = selected.as_slice()
        && snap.any()
    {
        draw_guides(ctx, only, snap, viewport);
    }

    ctx.set_stroke_style_str(ACCENT);
    ctx.set_line_width(1.5);
    for geo in &selected {
        let r = body_rect(geo);
        ctx.stroke_rect(r.x0, r.y0, r.width(), r.height());
    }

    ctx.set_line_width(1.0);
    for geo in &selected {
        for side in [HandleSide::Left, HandleSide::Right] {
            let r = handle_rect(geo, side);
            ctx.set_fill_style_str(HANDLE_FILL);
            ctx.fill_rect(r.x0, r.y0, r.width(), r.height());
            ctx.stroke_rect(r.x0, r.y0, r.width(), r.height());
        }
    }
    ctx.restore();
}

fn draw_guides(
    ctx: &CanvasRenderingContext2d,
    geo: &LayerGeometry,
    snap: SnapIndicator,
    viewport: Viewport,
) {
    ctx.set_stroke_style_str(ACCENT);
    ctx.set_line_width(1.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(4.0),
        &JsValue::from_f64(4.0),
    ));
    ctx.begin_path();
    let (ax, ay) = (geo.anchor.0 as f64, geo.anchor.1 as f64);
    if snap.horizontal {
        ctx.move_to(ax, 0.0);
        ctx.line_to(ax, viewport.height as f64);
    }
    if snap.vertical {
        ctx.move_to(0.0, ay);
        ctx.line_to(viewport.width as f64, ay);
    }
    ctx.stroke();
    let _ = ctx.set_line_dash(&js_sys::Array::new());
}
