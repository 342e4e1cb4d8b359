//! Text layout engine.
//!
//! Converts a slide's percentage-based layers into pixel geometry for one
//! render size: resolved font, wrapped lines with measured widths, block
//! height, stroke and shadow parameters, and the boxes used for hit testing
//! and containment. Every backend runs this same code, so screen, client
//! export, and server export agree on where text goes.
//!
//! Layout is a pure function of `(slide, viewport, metrics)`. Geometry is
//! never cached or mutated; each pass derives it afresh.

use crate::id::LayerId;
use crate::mapper;
use crate::metrics::{FontSpec, TextMetrics};
use crate::model::*;
use serde::Serialize;

// ─── Shared constants ────────────────────────────────────────────────────

/// Width at which layer font sizes and pixel parameters are authored.
pub const REFERENCE_WIDTH: f32 = 1000.0;
/// Line-height multiplier when a layer doesn't set one.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.15;
/// Floor on a layer's authored font size, before scaling.
pub const MIN_FONT_SIZE: f32 = 12.0;
/// Padding around the tight content box, in render pixels.
pub const BOX_PADDING: f32 = 8.0;

pub const DEFAULT_SHADOW_BLUR: f32 = 20.0;
pub const DEFAULT_SHADOW_OPACITY: f32 = 80.0;
pub const DEFAULT_SHADOW_OFFSET_Y: f32 = 4.0;

// ─── Geometry types ──────────────────────────────────────────────────────

/// The render surface dimensions, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1920.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True until the surface reports a real, positive size.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    /// Ratio of this width to the reference width.
    pub fn scale(&self) -> f32 {
        self.width / REFERENCE_WIDTH
    }
}

/// Axis-aligned box in render pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResolvedBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ResolvedBounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow by `d` on every side.
    pub fn inflate(&self, d: f32) -> Self {
        Self {
            x: self.x - d,
            y: self.y - d,
            width: self.width + 2.0 * d,
            height: self.height + 2.0 * d,
        }
    }
}

/// One wrapped line and its measured width (letter spacing included).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGeometry {
    pub text: String,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedStroke {
    /// Render pixels. Zero means no stroke pass.
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShadow {
    /// Color with the resolved opacity folded into alpha.
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Derived per-layer geometry for one render size.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerGeometry {
    pub layer_id: LayerId,
    pub lines: Vec<LineGeometry>,
    pub font: FontSpec,
    /// Extra advance per character, render pixels.
    pub letter_spacing: f32,
    /// Line pitch in render pixels (`size × multiplier`).
    pub line_height: f32,
    pub block_height: f32,
    /// Wrap budget in render pixels.
    pub wrap_width: f32,
    /// Widest measured line (tight width).
    pub content_width: f32,
    pub align: TextAlign,
    /// Anchor point `(cx, cy)` in render pixels.
    pub anchor: (f32, f32),
    pub fill: Color,
    pub stroke: ResolvedStroke,
    pub shadow: Option<ResolvedShadow>,
    /// Wrap-budget box, centered on the anchor.
    pub bounds: ResolvedBounds,
    /// Tight content box, positioned according to alignment.
    pub content_bounds: ResolvedBounds,
}

impl LayerGeometry {
    /// Vertical center of line `i`. Lines are centered as a block on the anchor.
    pub fn line_center_y(&self, i: usize) -> f32 {
        let top = self.anchor.1 - self.block_height / 2.0;
        top + (i as f32 + 0.5) * self.line_height
    }

    /// Horizontal text anchor: the wrap-box edge or center matching alignment.
    pub fn text_anchor_x(&self) -> f32 {
        mapper::text_anchor_x(self.align, self.anchor.0, self.wrap_width)
    }

    /// Left edge of line `i` when drawn from its alignment anchor.
    pub fn line_left(&self, i: usize) -> f32 {
        let width = self.lines.get(i).map_or(0.0, |l| l.width);
        let ax = self.text_anchor_x();
        match self.align {
            TextAlign::Left => ax,
            TextAlign::Center => ax - width / 2.0,
            TextAlign::Right => ax - width,
        }
    }

    /// Content box grown by [`BOX_PADDING`]: the visible selection box.
    pub fn padded_bounds(&self) -> ResolvedBounds {
        self.content_bounds.inflate(BOX_PADDING)
    }
}

// ─── Layout ──────────────────────────────────────────────────────────────

/// Lay out every layer of `slide` in paint order.
///
/// An empty viewport yields empty geometry; this happens transiently while
/// a host surface is still sizing itself.
pub fn layout_slide(
    slide: &Slide,
    viewport: Viewport,
    metrics: &dyn TextMetrics,
) -> Vec<LayerGeometry> {
    if viewport.is_empty() {
        log::trace!(
            "layout skipped for {}: viewport {}x{}",
            slide.id,
            viewport.width,
            viewport.height
        );
        return Vec::new();
    }
    slide
        .layers
        .iter()
        .map(|layer| layout_layer(slide, layer, viewport, metrics))
        .collect()
}

/// Lay out a single layer of `slide`.
pub fn layout_layer(
    slide: &Slide,
    layer: &TextLayer,
    viewport: Viewport,
    metrics: &dyn TextMetrics,
) -> LayerGeometry {
    let scale = viewport.scale();
    let settings = &slide.settings;

    let font = resolve_font(slide, layer, viewport);
    let letter_spacing = layer.letter_spacing.unwrap_or(0.0) * scale;
    let multiplier = layer
        .line_height
        .filter(|lh| lh.is_finite() && *lh > 0.0)
        .unwrap_or(DEFAULT_LINE_HEIGHT);

    let text = if layer.uppercase {
        layer.content.to_uppercase()
    } else {
        layer.content.clone()
    };

    let width_pct = if layer.width.is_finite() {
        layer.width.clamp(MIN_LAYER_WIDTH, 100.0)
    } else {
        80.0
    };
    let wrap_width = width_pct / 100.0 * viewport.width;

    let lines = wrap_text(&text, wrap_width, &font, letter_spacing, metrics);
    let content_width = lines.iter().fold(0.0_f32, |acc, l| acc.max(l.width));
    let line_height = font.size * multiplier;
    let block_height = lines.len() as f32 * line_height;

    let align = slide.alignment(layer);
    let (px, py) = slide.anchor(layer);
    let (cx, cy) = mapper::to_pixel_center(clamp_percent(px), clamp_percent(py), viewport);

    let top = cy - block_height / 2.0;
    let bounds = ResolvedBounds {
        x: cx - wrap_width / 2.0,
        y: top,
        width: wrap_width,
        height: block_height,
    };
    let content_bounds = ResolvedBounds {
        x: mapper::box_origin_x(align, cx, wrap_width, content_width),
        y: top,
        width: content_width,
        height: block_height,
    };

    let geometry = LayerGeometry {
        layer_id: layer.id,
        lines,
        font,
        letter_spacing,
        line_height,
        block_height,
        wrap_width,
        content_width,
        align,
        anchor: (cx, cy),
        fill: settings.fill_color,
        stroke: resolve_stroke(settings, layer, scale),
        shadow: resolve_shadow(settings, scale),
        bounds,
        content_bounds,
    };
    log::trace!(
        "layout {}: {} line(s), {:.1}px font, content {:.1}/{:.1}px",
        layer.id,
        geometry.lines.len(),
        geometry.font.size,
        geometry.content_width,
        geometry.wrap_width
    );
    geometry
}

/// Effective font for a layer at this render size.
pub fn resolve_font(slide: &Slide, layer: &TextLayer, viewport: Viewport) -> FontSpec {
    let base = layer
        .font_size
        .filter(|s| s.is_finite())
        .unwrap_or_else(|| layer.kind.default_size())
        .max(MIN_FONT_SIZE);
    let font_scale = match slide.settings.font_scale {
        s if s.is_finite() && s > 0.0 => s,
        _ => 1.0,
    };
    let family = layer
        .font_family
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(&slide.settings.font_family);
    FontSpec::new(family, layer.kind.weight(), base * font_scale * viewport.scale())
}

/// Layer override wins when present (even when disabled); otherwise the
/// global stroke applies whenever its width is positive.
pub fn resolve_stroke(settings: &TextSettings, layer: &TextLayer, scale: f32) -> ResolvedStroke {
    match &layer.stroke {
        Some(o) if o.enabled => ResolvedStroke {
            width: o.width.unwrap_or(settings.stroke_width).max(0.0) * scale,
            color: o.color.unwrap_or(settings.stroke_color),
        },
        Some(o) => ResolvedStroke {
            width: 0.0,
            color: o.color.unwrap_or(settings.stroke_color),
        },
        None => ResolvedStroke {
            width: settings.stroke_width.max(0.0) * scale,
            color: settings.stroke_color,
        },
    }
}

pub fn resolve_shadow(settings: &TextSettings, scale: f32) -> Option<ResolvedShadow> {
    if !settings.shadow {
        return None;
    }
    let opacity = settings
        .shadow_opacity
        .unwrap_or(DEFAULT_SHADOW_OPACITY)
        .clamp(0.0, 100.0);
    Some(ResolvedShadow {
        color: settings
            .shadow_color
            .unwrap_or(Color::BLACK)
            .with_alpha_scaled(opacity / 100.0),
        blur: settings.shadow_blur.unwrap_or(DEFAULT_SHADOW_BLUR).max(0.0) * scale,
        offset_x: settings.shadow_offset_x.unwrap_or(0.0) * scale,
        offset_y: settings.shadow_offset_y.unwrap_or(DEFAULT_SHADOW_OFFSET_Y) * scale,
    })
}

/// Measured width of `text` with uniform letter spacing.
pub fn measure_line(
    metrics: &dyn TextMetrics,
    text: &str,
    font: &FontSpec,
    letter_spacing: f32,
) -> f32 {
    let base = metrics.measure(text, font);
    if letter_spacing == 0.0 {
        base
    } else {
        base + letter_spacing * text.chars().count() as f32
    }
}

/// Greedy word wrap.
///
/// Explicit newlines split paragraphs first; each paragraph is then wrapped
/// word by word. A word wider than `budget` stays whole on its own line.
/// Blank paragraphs produce no line; content with no words at all yields a
/// single empty line.
pub fn wrap_text(
    text: &str,
    budget: f32,
    font: &FontSpec,
    letter_spacing: f32,
    metrics: &dyn TextMetrics,
) -> Vec<LineGeometry> {
    let measure = |s: &str| measure_line(metrics, s, font, letter_spacing);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= budget {
                current = candidate;
            } else {
                let width = measure(&current);
                lines.push(LineGeometry {
                    text: std::mem::replace(&mut current, word.to_string()),
                    width,
                });
            }
        }
        if !current.is_empty() {
            let width = measure(&current);
            lines.push(LineGeometry {
                text: current,
                width,
            });
        }
    }

    if lines.is_empty() {
        lines.push(LineGeometry {
            text: String::new(),
            width: 0.0,
        });
    }
    lines
}
