//! Slide data model.
//!
//! A deck is an ordered list of slides; each slide carries a background
//! image reference, an ordered list of text layers (paint order = list
//! order), slide-wide text settings and background image effects.
//!
//! Positions are resolution independent: a layer's anchor `(x, y)` is the
//! percentage of slide width/height at which its geometric center sits, and
//! its `width` is the percentage of slide width available for wrapping.
//! Pixel geometry is always derived (see [`crate::layout`]) and never stored.
//!
//! Selection is deliberately absent from this model. It is view state owned
//! by the interaction controller and never serialized with the deck.

use crate::id::{LayerId, SlideId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0]; serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| -> Option<f32> { Some((hex_val(bytes[i])? * 17) as f32 / 255.0) };
        let long = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// 8-bit RGBA channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS color string for Canvas2D (`rgba(r, g, b, a)`).
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Layer kinds & alignment ─────────────────────────────────────────────

/// Semantic role of a text layer. Only affects default weight and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Heading,
    #[default]
    Body,
    Subtext,
}

impl LayerKind {
    /// Font weight: headings are black (900), everything else semibold (600).
    pub fn weight(self) -> u16 {
        match self {
            LayerKind::Heading => 900,
            LayerKind::Body | LayerKind::Subtext => 600,
        }
    }

    /// Default font size in pixels at the 1000px reference width.
    pub fn default_size(self) -> f32 {
        match self {
            LayerKind::Heading => 64.0,
            LayerKind::Body => 40.0,
            LayerKind::Subtext => 28.0,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Canvas2D `textAlign` keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

// ─── Text layers ─────────────────────────────────────────────────────────

/// Per-layer stroke override. When present it wins over the slide's
/// global stroke, including turning the stroke off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeOverride {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

/// Smallest wrap budget, in percent of slide width.
pub const MIN_LAYER_WIDTH: f32 = 5.0;

fn default_layer_width() -> f32 {
    80.0
}

/// One run of text positioned on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: LayerId,
    #[serde(default)]
    pub kind: LayerKind,
    /// Text content. May contain explicit `\n` line breaks.
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in px at the reference width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Line-height multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Extra advance per character, px at the reference width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,

    /// Anchor x in percent of slide width. `None` falls back to the
    /// slide's legacy `positionX`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Anchor y in percent of slide height. `None` falls back to the
    /// slide's legacy `positionY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Wrap budget in percent of slide width, centered on the anchor.
    #[serde(default = "default_layer_width")]
    pub width: f32,
}

impl TextLayer {
    /// A new layer with import defaults: centered at (50, 50), 80% wide.
    pub fn new(kind: LayerKind, content: impl Into<String>) -> Self {
        Self {
            id: LayerId::generate(),
            kind,
            content: content.into(),
            font_family: None,
            font_size: None,
            line_height: None,
            letter_spacing: None,
            uppercase: false,
            stroke: None,
            align: Some(TextAlign::Center),
            x: Some(50.0),
            y: Some(50.0),
            width: default_layer_width(),
        }
    }

    /// Same layer with a fresh identity.
    pub fn with_new_id(&self) -> Self {
        Self {
            id: LayerId::generate(),
            ..self.clone()
        }
    }

    /// Clamp every field back into its legal range.
    ///
    /// Anchors land in [0, 100], the wrap budget in [5, 100], and an
    /// explicit font size is floored at 12px-equivalent.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.x = self.x.map(clamp_percent);
        self.y = self.y.map(clamp_percent);
        self.width = if self.width.is_finite() {
            self.width.clamp(MIN_LAYER_WIDTH, 100.0)
        } else {
            default_layer_width()
        };
        self.font_size = self
            .font_size
            .map(|s| if s.is_finite() { s.max(crate::layout::MIN_FONT_SIZE) } else { self.kind.default_size() });
        self.line_height = self.line_height.filter(|lh| lh.is_finite() && *lh > 0.0);
        self
    }
}

/// Clamp a percentage coordinate into [0, 100]; NaN collapses to 50.
pub fn clamp_percent(v: f32) -> f32 {
    if v.is_nan() { 50.0 } else { v.clamp(0.0, 100.0) }
}

// ─── Slide-wide settings ─────────────────────────────────────────────────

/// Slide-level text settings: defaults and global styling for every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSettings {
    pub font_family: String,
    /// Multiplier applied to every layer's font size.
    pub font_scale: f32,
    pub fill_color: Color,
    pub stroke_color: Color,
    /// Global stroke width, px at the reference width. 0 disables.
    pub stroke_width: f32,

    pub shadow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f32>,
    /// Shadow opacity in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f32>,

    pub alignment: TextAlign,
    /// Legacy anchor used by layers without an explicit `x`.
    pub position_x: f32,
    /// Legacy anchor used by layers without an explicit `y`.
    pub position_y: f32,
    /// Clamp interactive moves/resizes so content stays fully visible.
    pub constrain_to_slide: bool,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_family: "Inter".into(),
            font_scale: 1.0,
            fill_color: Color::WHITE,
            stroke_color: Color::BLACK,
            stroke_width: 0.0,
            shadow: true,
            shadow_blur: None,
            shadow_opacity: None,
            shadow_color: None,
            shadow_offset_x: None,
            shadow_offset_y: None,
            alignment: TextAlign::Center,
            position_x: 50.0,
            position_y: 50.0,
            constrain_to_slide: true,
        }
    }
}

/// Background image effects. Percentages use 100 as "unchanged".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageEffects {
    /// Gates the color filters below. Panning always applies.
    pub enabled: bool,
    pub grayscale: bool,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Horizontal pan of the cover-cropped overflow, 0 = left, 100 = right.
    pub image_offset: f32,
    /// Vertical pan of the cover-cropped overflow, 0 = top, 100 = bottom.
    pub image_offset_y: f32,
}

impl Default for ImageEffects {
    fn default() -> Self {
        Self {
            enabled: false,
            grayscale: false,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            image_offset: 50.0,
            image_offset_y: 50.0,
        }
    }
}

impl ImageEffects {
    /// True when a color filter would visibly change the background.
    pub fn has_filters(&self) -> bool {
        self.enabled
            && (self.grayscale
                || (self.brightness - 100.0).abs() > f32::EPSILON
                || (self.contrast - 100.0).abs() > f32::EPSILON
                || (self.saturation - 100.0).abs() > f32::EPSILON)
    }

    /// CSS `filter` string equivalent of these effects (`none` when off).
    pub fn to_css_filter(&self) -> String {
        if !self.has_filters() {
            return "none".to_string();
        }
        let mut parts = Vec::with_capacity(4);
        if self.grayscale {
            parts.push("grayscale(100%)".to_string());
        }
        parts.push(format!("brightness({}%)", self.brightness));
        parts.push(format!("contrast({}%)", self.contrast));
        parts.push(format!("saturate({}%)", self.saturation));
        parts.join(" ")
    }
}

// ─── Slides ──────────────────────────────────────────────────────────────

/// One deck entry. Replaced whole on every edit (copy-on-write).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    /// Background image reference: a path, URL, or `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub layers: Vec<TextLayer>,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub settings: TextSettings,
    #[serde(default)]
    pub effects: ImageEffects,
}

impl Slide {
    pub fn new() -> Self {
        Self {
            id: SlideId::generate(),
            background: None,
            layers: Vec::new(),
            template: String::new(),
            settings: TextSettings::default(),
            effects: ImageEffects::default(),
        }
    }

    /// Look up a layer by ID.
    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Position of a layer in paint order.
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Resolved anchor: layer override first, then the slide's legacy position.
    pub fn anchor(&self, layer: &TextLayer) -> (f32, f32) {
        (
            layer.x.unwrap_or(self.settings.position_x),
            layer.y.unwrap_or(self.settings.position_y),
        )
    }

    /// Resolved alignment: layer override first, then the slide setting.
    pub fn alignment(&self, layer: &TextLayer) -> TextAlign {
        layer.align.unwrap_or(self.settings.alignment)
    }

    // ── Copy-on-write edits ──

    /// New revision with the given layer list.
    #[must_use]
    pub fn with_layers(&self, layers: Vec<TextLayer>) -> Self {
        Self {
            layers,
            ..self.clone()
        }
    }

    /// New revision with `layer` appended on top.
    #[must_use]
    pub fn with_layer_added(&self, layer: TextLayer) -> Self {
        let mut layers = self.layers.clone();
        layers.push(layer.normalized());
        self.with_layers(layers)
    }

    /// New revision with the layer of the same ID replaced.
    /// Returns `None` when no such layer exists.
    #[must_use]
    pub fn with_layer_replaced(&self, layer: TextLayer) -> Option<Self> {
        let idx = self.layer_index(layer.id)?;
        let mut layers = self.layers.clone();
        layers[idx] = layer.normalized();
        Some(self.with_layers(layers))
    }

    /// New revision without the given layers.
    #[must_use]
    pub fn without_layers(&self, ids: &[LayerId]) -> Self {
        let layers = self
            .layers
            .iter()
            .filter(|l| !ids.contains(&l.id))
            .cloned()
            .collect();
        self.with_layers(layers)
    }

    /// New revision with the layer at `from` moved to `to` (remove, then insert).
    /// Returns `None` when either index is out of bounds.
    #[must_use]
    pub fn with_layer_moved(&self, from: usize, to: usize) -> Option<Self> {
        if from >= self.layers.len() || to >= self.layers.len() {
            return None;
        }
        let mut layers = self.layers.clone();
        let layer = layers.remove(from);
        layers.insert(to, layer);
        Some(self.with_layers(layers))
    }

    #[must_use]
    pub fn with_background(&self, background: Option<String>) -> Self {
        Self {
            background,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_effects(&self, effects: ImageEffects) -> Self {
        Self {
            effects,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_settings(&self, settings: TextSettings) -> Self {
        Self {
            settings,
            ..self.clone()
        }
    }

    /// Deep copy with fresh IDs for the slide and all of its layers.
    #[must_use]
    pub fn duplicated(&self) -> Self {
        Self {
            id: SlideId::generate(),
            layers: self.layers.iter().map(TextLayer::with_new_id).collect(),
            ..self.clone()
        }
    }
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Aspect ratios ───────────────────────────────────────────────────────

/// Export aspect ratio. Fixes the render target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "1:1")]
    Square1x1,
    #[serde(rename = "16:9")]
    Landscape16x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Portrait9x16,
        AspectRatio::Square1x1,
        AspectRatio::Landscape16x9,
    ];

    /// Target `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Portrait9x16 => (1080, 1920),
            AspectRatio::Square1x1 => (1080, 1080),
            AspectRatio::Landscape16x9 => (1920, 1080),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Square1x1 => "1:1",
            AspectRatio::Landscape16x9 => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "9:16" => Ok(AspectRatio::Portrait9x16),
            "1:1" => Ok(AspectRatio::Square1x1),
            "16:9" => Ok(AspectRatio::Landscape16x9),
            other => Err(format!("unknown aspect ratio `{other}` (expected 9:16, 1:1 or 16:9)")),
        }
    }
}
