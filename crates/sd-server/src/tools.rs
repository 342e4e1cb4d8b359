//! Tool dispatch for the stdio server.
//!
//! A request is `{"tool": "<name>", "args": {...}}`. Each tool maps onto one
//! deck mutation contract or a render. Replies are `{"status": "ok", ...}`
//! on success and `{"error": "...", "code": "..."}` on failure; bad input
//! never panics the server.

use crate::config::ServerConfig;
use crate::export::{ExportError, export_deck};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sd_core::{
    AspectRatio, Color, Deck, DeckError, LayerId, LayerKind, LayoutError, Slide, SlideId,
    StrokeOverride, TextAlign, TextLayer, TextSettings,
};
use sd_render::{FontMetrics, FsAssets, RasterRenderer, RenderError, RenderOptions};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("rendering unavailable: {0}")]
    RendererUnavailable(String),

    #[error("render worker failed: {0}")]
    Worker(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Stable machine-readable code for the reply.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_)
            | ToolError::Deck(DeckError::SlideNotFound(_) | DeckError::LayerNotFound(_)) => {
                "not_found"
            }
            ToolError::Deck(DeckError::IndexOutOfBounds { .. }) => "out_of_bounds",
            ToolError::InvalidArgs(_) => "invalid_args",
            ToolError::RendererUnavailable(_) => "unavailable",
            _ => "internal",
        }
    }
}

// ─── Arguments ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlideRef {
    slide_id: SlideId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerRef {
    slide_id: SlideId,
    layer_id: LayerId,
}

#[derive(Deserialize)]
struct LoadDeckArgs {
    deck: Deck,
}

#[derive(Deserialize)]
struct CreateSlideArgs {
    background: Option<String>,
    /// Insert position; appended when absent.
    index: Option<usize>,
}

#[derive(Deserialize)]
struct ReorderArgs {
    from: usize,
    to: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetBackgroundArgs {
    slide_id: SlideId,
    background: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLayerArgs {
    slide_id: SlideId,
    #[serde(default)]
    kind: LayerKind,
    content: String,
    x: Option<f32>,
    y: Option<f32>,
    width: Option<f32>,
}

/// Partial layer update: only present fields change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerPatch {
    pub content: Option<String>,
    pub kind: Option<LayerKind>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub uppercase: Option<bool>,
    pub align: Option<TextAlign>,
    pub stroke: Option<StrokeOverride>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
}

impl LayerPatch {
    pub fn apply(self, layer: &mut TextLayer) {
        if let Some(v) = self.content {
            layer.content = v;
        }
        if let Some(v) = self.kind {
            layer.kind = v;
        }
        if let Some(v) = self.font_family {
            layer.font_family = Some(v);
        }
        if let Some(v) = self.font_size {
            layer.font_size = Some(v);
        }
        if let Some(v) = self.line_height {
            layer.line_height = Some(v);
        }
        if let Some(v) = self.letter_spacing {
            layer.letter_spacing = Some(v);
        }
        if let Some(v) = self.uppercase {
            layer.uppercase = v;
        }
        if let Some(v) = self.align {
            layer.align = Some(v);
        }
        if let Some(v) = self.stroke {
            layer.stroke = Some(v);
        }
        if let Some(v) = self.x {
            layer.x = Some(v);
        }
        if let Some(v) = self.y {
            layer.y = Some(v);
        }
        if let Some(v) = self.width {
            layer.width = v;
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLayerArgs {
    slide_id: SlideId,
    layer_id: LayerId,
    #[serde(flatten)]
    patch: LayerPatch,
}

/// Partial slide text-settings update: only present fields change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub font_family: Option<String>,
    pub font_scale: Option<f32>,
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width: Option<f32>,
    pub shadow: Option<bool>,
    pub shadow_blur: Option<f32>,
    pub shadow_opacity: Option<f32>,
    pub shadow_color: Option<Color>,
    pub shadow_offset_x: Option<f32>,
    pub shadow_offset_y: Option<f32>,
    pub alignment: Option<TextAlign>,
    pub constrain_to_slide: Option<bool>,
}

impl SettingsPatch {
    pub fn apply(self, settings: &mut TextSettings) {
        if let Some(v) = self.font_family {
            settings.font_family = v;
        }
        if let Some(v) = self.font_scale {
            settings.font_scale = v;
        }
        if let Some(v) = self.fill_color {
            settings.fill_color = v;
        }
        if let Some(v) = self.stroke_color {
            settings.stroke_color = v;
        }
        if let Some(v) = self.stroke_width {
            settings.stroke_width = v.max(0.0);
        }
        if let Some(v) = self.shadow {
            settings.shadow = v;
        }
        settings.shadow_blur = self.shadow_blur.or(settings.shadow_blur);
        settings.shadow_opacity = self
            .shadow_opacity
            .map(|v| v.clamp(0.0, 100.0))
            .or(settings.shadow_opacity);
        settings.shadow_color = self.shadow_color.or(settings.shadow_color);
        settings.shadow_offset_x = self.shadow_offset_x.or(settings.shadow_offset_x);
        settings.shadow_offset_y = self.shadow_offset_y.or(settings.shadow_offset_y);
        if let Some(v) = self.alignment {
            settings.alignment = v;
        }
        if let Some(v) = self.constrain_to_slide {
            settings.constrain_to_slide = v;
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSettingsArgs {
    slide_id: SlideId,
    #[serde(flatten)]
    patch: SettingsPatch,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyFilterArgs {
    slide_id: SlideId,
    enabled: Option<bool>,
    grayscale: Option<bool>,
    brightness: Option<f32>,
    contrast: Option<f32>,
    saturation: Option<f32>,
    image_offset: Option<f32>,
    image_offset_y: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderArgs {
    slide_id: SlideId,
    aspect: Option<String>,
}

#[derive(Deserialize)]
struct ExportArgs {
    aspect: Option<String>,
    /// Write the archive here; otherwise it is returned base64-encoded.
    out: Option<PathBuf>,
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArgs(e.to_string()))
}

fn parse_aspect(aspect: Option<&str>) -> Result<AspectRatio, ToolError> {
    aspect
        .map_or(Ok(AspectRatio::default()), |s| s.parse::<AspectRatio>())
        .map_err(ToolError::InvalidArgs)
}

// ─── Server ──────────────────────────────────────────────────────────────

/// Build the font-backed raster renderer described by `config`.
pub fn build_renderer(config: &ServerConfig) -> Result<RasterRenderer, LayoutError> {
    let mut fonts = FontMetrics::with_system_fonts(config.font_dir.as_deref())?;
    fonts.set_fallback_family(&config.default_font);
    log::info!("renderer ready with {} font face(s)", fonts.face_count());
    Ok(RasterRenderer::new(
        fonts,
        FsAssets::new(config.asset_root.clone()),
        RenderOptions {
            fallback_background: config.fallback_background,
        },
    ))
}

/// Owns the deck and answers tool requests against it.
pub struct ToolServer {
    deck: Deck,
    renderer: Result<Arc<RasterRenderer>, String>,
}

impl ToolServer {
    /// Empty deck; rendering is disabled (with a warning) if no fonts load.
    pub fn new(config: &ServerConfig) -> Self {
        let renderer = build_renderer(config).map(Arc::new).map_err(|e| {
            log::warn!("rendering disabled: {e}");
            e.to_string()
        });
        Self {
            deck: Deck::new(),
            renderer,
        }
    }

    pub fn with_renderer(deck: Deck, renderer: Option<Arc<RasterRenderer>>) -> Self {
        Self {
            deck,
            renderer: renderer.ok_or_else(|| "no renderer configured".to_string()),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Parse and answer one request line.
    pub async fn handle_line(&mut self, line: &str) -> Value {
        match serde_json::from_str::<ToolRequest>(line) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => json!({ "error": format!("malformed request: {e}"), "code": "invalid_request" }),
        }
    }

    pub async fn dispatch(&mut self, request: ToolRequest) -> Value {
        let ToolRequest { tool, args } = request;
        match self.call(&tool, args).await {
            Ok(Value::Object(mut body)) => {
                body.insert("status".into(), json!("ok"));
                Value::Object(body)
            }
            Ok(other) => json!({ "status": "ok", "result": other }),
            Err(e) => {
                log::warn!("{tool}: {e}");
                json!({ "error": e.to_string(), "code": e.code() })
            }
        }
    }

    fn renderer(&self) -> Result<Arc<RasterRenderer>, ToolError> {
        self.renderer
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| ToolError::RendererUnavailable(e.clone()))
    }

    fn slide_ids(&self) -> Vec<&str> {
        self.deck.slides.iter().map(|s| s.id.as_str()).collect()
    }

    async fn call(&mut self, tool: &str, args: Value) -> Result<Value, ToolError> {
        log::debug!("tool {tool}");
        match tool {
            "get_deck" => {
                let deck = serde_json::to_value(&self.deck)?;
                Ok(json!({ "deck": deck }))
            }

            "load_deck" => {
                let LoadDeckArgs { deck } = parse(args)?;
                let mut next = Deck::new();
                for slide in deck.slides {
                    next.add_slide(slide);
                }
                self.deck = next;
                Ok(json!({ "slides": self.slide_ids() }))
            }

            "create_slide" => {
                let CreateSlideArgs { background, index } = parse(args)?;
                let len = self.deck.len();
                if let Some(index) = index
                    && index > len
                {
                    return Err(DeckError::IndexOutOfBounds { index, len }.into());
                }
                let id = self.deck.add_slide(Slide::new().with_background(background));
                if let Some(index) = index {
                    self.deck.reorder_slide(len, index)?;
                }
                Ok(json!({ "slideId": id.as_str(), "index": self.deck.index_of(id)? }))
            }

            "duplicate_slide" => {
                let SlideRef { slide_id } = parse(args)?;
                let copy = self.deck.duplicate_slide(slide_id)?;
                Ok(json!({ "slideId": copy.as_str() }))
            }

            "delete_slide" => {
                let SlideRef { slide_id } = parse(args)?;
                let removed = self.deck.delete_slide(slide_id)?;
                Ok(json!({ "slideId": removed.id.as_str(), "remaining": self.deck.len() }))
            }

            "reorder_slide" => {
                let ReorderArgs { from, to } = parse(args)?;
                self.deck.reorder_slide(from, to)?;
                Ok(json!({ "slides": self.slide_ids() }))
            }

            "set_background" => {
                let SetBackgroundArgs {
                    slide_id,
                    background,
                } = parse(args)?;
                let slide = self
                    .deck
                    .update_slide(slide_id, |s| Ok(s.with_background(background)))?;
                Ok(json!({ "slideId": slide.id.as_str(), "background": slide.background }))
            }

            "add_layer" => {
                let a: AddLayerArgs = parse(args)?;
                let mut layer = TextLayer::new(a.kind, a.content);
                layer.x = a.x.or(layer.x);
                layer.y = a.y.or(layer.y);
                layer.width = a.width.unwrap_or(layer.width);
                let id = layer.id;
                self.deck
                    .update_slide(a.slide_id, |s| Ok(s.with_layer_added(layer)))?;
                Ok(json!({ "layerId": id.as_str() }))
            }

            "delete_layer" => {
                let LayerRef { slide_id, layer_id } = parse(args)?;
                self.deck.update_slide(slide_id, |s| {
                    s.layer(layer_id).ok_or(DeckError::LayerNotFound(layer_id))?;
                    Ok(s.without_layers(&[layer_id]))
                })?;
                Ok(json!({ "layerId": layer_id.as_str() }))
            }

            "update_layer" => {
                let UpdateLayerArgs {
                    slide_id,
                    layer_id,
                    patch,
                } = parse(args)?;
                let slide = self.deck.update_slide(slide_id, |s| {
                    let mut layer = s
                        .layer(layer_id)
                        .cloned()
                        .ok_or(DeckError::LayerNotFound(layer_id))?;
                    patch.apply(&mut layer);
                    s.with_layer_replaced(layer)
                        .ok_or(DeckError::LayerNotFound(layer_id))
                })?;
                let layer = serde_json::to_value(slide.layer(layer_id))?;
                Ok(json!({ "layer": layer }))
            }

            "update_settings" => {
                let UpdateSettingsArgs { slide_id, patch } = parse(args)?;
                let slide = self.deck.update_slide(slide_id, |s| {
                    let mut settings = s.settings.clone();
                    patch.apply(&mut settings);
                    Ok(s.with_settings(settings))
                })?;
                let settings = serde_json::to_value(&slide.settings)?;
                Ok(json!({ "settings": settings }))
            }

            "apply_filter" => {
                let a: ApplyFilterArgs = parse(args)?;
                let slide = self.deck.update_slide(a.slide_id, |s| {
                    let mut fx = s.effects.clone();
                    fx.enabled = a.enabled.unwrap_or(true);
                    fx.grayscale = a.grayscale.unwrap_or(fx.grayscale);
                    fx.brightness = a.brightness.unwrap_or(fx.brightness);
                    fx.contrast = a.contrast.unwrap_or(fx.contrast);
                    fx.saturation = a.saturation.unwrap_or(fx.saturation);
                    fx.image_offset = a.image_offset.map_or(fx.image_offset, sd_core::clamp_percent);
                    fx.image_offset_y = a
                        .image_offset_y
                        .map_or(fx.image_offset_y, sd_core::clamp_percent);
                    Ok(s.with_effects(fx))
                })?;
                let effects = serde_json::to_value(&slide.effects)?;
                Ok(json!({
                    "effects": effects,
                    "cssFilter": slide.effects.to_css_filter(),
                }))
            }

            "render_slide" => {
                let RenderArgs { slide_id, aspect } = parse(args)?;
                let aspect = parse_aspect(aspect.as_deref())?;
                let renderer = self.renderer()?;
                let slide = self.deck.slide(slide_id)?.clone();
                let png = tokio::task::spawn_blocking(move || renderer.export_slide(&slide, aspect))
                    .await
                    .map_err(|e| ToolError::Worker(e.to_string()))??;
                let (width, height) = aspect.dimensions();
                Ok(json!({
                    "mime": "image/png",
                    "width": width,
                    "height": height,
                    "data": STANDARD.encode(&png),
                }))
            }

            "export_deck" => {
                let ExportArgs { aspect, out } = parse(args)?;
                let aspect = parse_aspect(aspect.as_deref())?;
                let renderer = self.renderer()?;
                let slides = self.deck.slides.clone();
                let count = slides.len();
                let archive = export_deck(renderer, slides, aspect).await?;
                match out {
                    Some(path) => {
                        tokio::fs::write(&path, &archive).await?;
                        Ok(json!({
                            "path": path.display().to_string(),
                            "slides": count,
                            "bytes": archive.len(),
                        }))
                    }
                    None => Ok(json!({
                        "slides": count,
                        "mime": "application/zip",
                        "data": STANDARD.encode(&archive),
                    })),
                }
            }

            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}
