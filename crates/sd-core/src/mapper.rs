//! Percentage ↔ pixel coordinate mapping.
//!
//! The model stores anchors as percentages of the slide; renderers and the
//! interaction controller work in pixels. This module owns both directions,
//! the alignment-aware box placement, the placement envelope that keeps a
//! layer fully on the slide, and the cover-fit math for background images.

use crate::layout::{BOX_PADDING, LayerGeometry, ResolvedBounds, Viewport};
use crate::model::{Slide, TextAlign};
use serde::Serialize;

/// Anchor percentages → pixel center.
pub fn to_pixel_center(x: f32, y: f32, viewport: Viewport) -> (f32, f32) {
    (x / 100.0 * viewport.width, y / 100.0 * viewport.height)
}

/// Pixel point → anchor percentages. Returns `(0, 0)` for an empty viewport.
pub fn to_percent(px: f32, py: f32, viewport: Viewport) -> (f32, f32) {
    if viewport.is_empty() {
        return (0.0, 0.0);
    }
    (px / viewport.width * 100.0, py / viewport.height * 100.0)
}

/// Left edge of a `box_width`-wide box anchored at `cx`.
///
/// Centered boxes sit on the anchor; left/right boxes pin to the matching
/// edge of the wrap budget so content length never moves that edge.
pub fn box_origin_x(align: TextAlign, cx: f32, wrap_width: f32, box_width: f32) -> f32 {
    match align {
        TextAlign::Center => cx - box_width / 2.0,
        TextAlign::Left => cx - wrap_width / 2.0,
        TextAlign::Right => cx + wrap_width / 2.0 - box_width,
    }
}

/// Horizontal point text is drawn from, for the given alignment.
pub fn text_anchor_x(align: TextAlign, cx: f32, wrap_width: f32) -> f32 {
    match align {
        TextAlign::Center => cx,
        TextAlign::Left => cx - wrap_width / 2.0,
        TextAlign::Right => cx + wrap_width / 2.0,
    }
}

// ─── Placement envelope ──────────────────────────────────────────────────

/// Legal anchor range, in percent, keeping a layer's box on the slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Envelope {
    /// The unconstrained envelope: the whole percentage square.
    pub const FULL: Envelope = Envelope {
        min_x: 0.0,
        max_x: 100.0,
        min_y: 0.0,
        max_y: 100.0,
    };

    /// Clamp an anchor into the envelope.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.max(self.min_x).min(self.max_x),
            y.max(self.min_y).min(self.max_y),
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Collapse an inverted range to its midpoint, then intersect with [0, 100].
fn legal_range(min: f32, max: f32) -> (f32, f32) {
    let (min, max) = if min > max {
        let mid = (min + max) / 2.0;
        (mid, mid)
    } else {
        (min, max)
    };
    (min.clamp(0.0, 100.0), max.clamp(0.0, 100.0))
}

/// Placement envelope for a laid-out layer.
///
/// When the slide doesn't constrain layers this is [`Envelope::FULL`].
/// Otherwise it is the anchor range for which the padded content box stays
/// inside `[0, W] × [0, H]`. Content larger than the slide degenerates to a
/// single point.
pub fn bounds_for(slide: &Slide, geometry: &LayerGeometry, viewport: Viewport) -> Envelope {
    if !slide.settings.constrain_to_slide || viewport.is_empty() {
        return Envelope::FULL;
    }

    let box_w = geometry.content_width + 2.0 * BOX_PADDING;
    let box_h = geometry.block_height + 2.0 * BOX_PADDING;
    // Box left edge relative to the anchor x.
    let offset = box_origin_x(geometry.align, 0.0, geometry.wrap_width, geometry.content_width)
        - BOX_PADDING;

    let min_cx = -offset;
    let max_cx = viewport.width - box_w - offset;
    let min_cy = box_h / 2.0;
    let max_cy = viewport.height - box_h / 2.0;

    let (min_x, max_x) = legal_range(
        min_cx / viewport.width * 100.0,
        max_cx / viewport.width * 100.0,
    );
    let (min_y, max_y) = legal_range(
        min_cy / viewport.height * 100.0,
        max_cy / viewport.height * 100.0,
    );
    Envelope {
        min_x,
        max_x,
        min_y,
        max_y,
    }
}

// ─── Background cover fit ────────────────────────────────────────────────

/// Destination rectangle for drawing an `image_w × image_h` image so that it
/// covers the target, panned by `offset_x`/`offset_y` percent of the overflow
/// (0 = start edge, 50 = centered, 100 = end edge).
pub fn cover_rect(
    image_w: f32,
    image_h: f32,
    target: Viewport,
    offset_x: f32,
    offset_y: f32,
) -> Option<ResolvedBounds> {
    if image_w <= 0.0 || image_h <= 0.0 || target.is_empty() {
        return None;
    }
    let scale = (target.width / image_w).max(target.height / image_h);
    let width = image_w * scale;
    let height = image_h * scale;
    let pan_x = offset_x.clamp(0.0, 100.0) / 100.0;
    let pan_y = offset_y.clamp(0.0, 100.0) / 100.0;
    Some(ResolvedBounds {
        x: (target.width - width) * pan_x,
        y: (target.height - height) * pan_y,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_slide;
    use crate::metrics::MonospaceMetrics;
    use crate::model::{LayerKind, TextLayer};

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 1000.0,
    };

    #[test]
    fn pixel_percent_roundtrip() {
        let vp = Viewport::new(1080.0, 1920.0);
        let (cx, cy) = to_pixel_center(25.0, 75.0, vp);
        assert_eq!((cx, cy), (270.0, 1440.0));
        let (x, y) = to_percent(cx, cy, vp);
        assert!((x - 25.0).abs() < 1e-4 && (y - 75.0).abs() < 1e-4);
    }

    #[test]
    fn box_origin_by_alignment() {
        assert_eq!(box_origin_x(TextAlign::Center, 500.0, 400.0, 100.0), 450.0);
        assert_eq!(box_origin_x(TextAlign::Left, 500.0, 400.0, 100.0), 300.0);
        assert_eq!(box_origin_x(TextAlign::Right, 500.0, 400.0, 100.0), 600.0);
        assert_eq!(text_anchor_x(TextAlign::Right, 500.0, 400.0), 700.0);
    }

    #[test]
    fn envelope_keeps_centered_box_inside() {
        let m = MonospaceMetrics { advance: 1.0 };
        let mut layer = TextLayer::new(LayerKind::Body, "abcde");
        layer.font_size = Some(20.0);
        let slide = Slide::new().with_layers(vec![layer]);
        let geo = &layout_slide(&slide, VIEWPORT, &m)[0];
        let env = bounds_for(&slide, geo, VIEWPORT);
        // Box is 100 + 16 wide: anchor x ranges over [58, 942] px.
        assert!((env.min_x - 5.8).abs() < 1e-4, "min_x {}", env.min_x);
        assert!((env.max_x - 94.2).abs() < 1e-4, "max_x {}", env.max_x);
    }

    #[test]
    fn envelope_follows_alignment() {
        let m = MonospaceMetrics { advance: 1.0 };
        let envelope = |align| {
            let mut layer = TextLayer::new(LayerKind::Body, "abcde");
            layer.font_size = Some(20.0);
            layer.width = 40.0;
            layer.align = Some(align);
            let slide = Slide::new().with_layers(vec![layer]);
            let geo = &layout_slide(&slide, VIEWPORT, &m)[0];
            bounds_for(&slide, geo, VIEWPORT)
        };

        // Left: box starts at anchor - 200 - 8, so the anchor needs >= 208 px.
        let left = envelope(TextAlign::Left);
        assert!((left.min_x - 20.8).abs() < 1e-4, "min_x {}", left.min_x);
        assert_eq!(left.max_x, 100.0);

        // Right: box ends at anchor + 200 + 8, so the anchor stays <= 792 px.
        let right = envelope(TextAlign::Right);
        assert_eq!(right.min_x, 0.0);
        assert!((right.max_x - 79.2).abs() < 1e-4, "max_x {}", right.max_x);
    }

    #[test]
    fn oversized_content_degenerates_to_a_point() {
        let m = MonospaceMetrics { advance: 1.0 };
        let mut layer = TextLayer::new(LayerKind::Body, "waytoolongtofitanywhere");
        layer.font_size = Some(60.0);
        let slide = Slide::new().with_layers(vec![layer]);
        let geo = &layout_slide(&slide, VIEWPORT, &m)[0];
        let env = bounds_for(&slide, geo, VIEWPORT);
        assert_eq!(env.min_x, env.max_x);
        assert!((env.min_x - 50.0).abs() < 1e-3);
        assert_eq!(env.clamp(0.0, 50.0).0, env.min_x);
    }

    #[test]
    fn unconstrained_slide_uses_full_envelope() {
        let m = MonospaceMetrics::default();
        let mut slide = Slide::new().with_layer_added(TextLayer::new(LayerKind::Body, "x"));
        slide.settings.constrain_to_slide = false;
        let geo = &layout_slide(&slide, VIEWPORT, &m)[0];
        assert_eq!(bounds_for(&slide, geo, VIEWPORT), Envelope::FULL);
    }

    #[test]
    fn cover_fits_and_pans() {
        let target = Viewport::new(100.0, 100.0);
        let centered = cover_rect(200.0, 100.0, target, 50.0, 50.0).unwrap();
        assert_eq!(centered.width, 200.0);
        assert_eq!(centered.height, 100.0);
        assert_eq!(centered.x, -50.0);
        let left = cover_rect(200.0, 100.0, target, 0.0, 50.0).unwrap();
        assert_eq!(left.x, 0.0);
        let right = cover_rect(200.0, 100.0, target, 100.0, 50.0).unwrap();
        assert_eq!(right.x, -100.0);
        assert!(cover_rect(0.0, 10.0, target, 50.0, 50.0).is_none());
    }
}
