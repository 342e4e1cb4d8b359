//! Server-side raster renderer.
//!
//! Paints a slide into a `tiny-skia` pixmap: cover-fit background with
//! pixel filters, then every layer line as shadow → stroke → fill, using
//! the shared layout engine with font-file metrics.

use crate::assets::{AssetSource, decode_image};
use crate::error::RenderError;
use crate::filters::{FilterList, apply_filters, gaussian_blur};
use crate::text::FontMetrics;
use sd_core::layout::{LayerGeometry, ResolvedShadow, Viewport, layout_slide};
use sd_core::mapper::cover_rect;
use sd_core::{AspectRatio, Color, Slide};
use tiny_skia::{
    FillRule, FilterQuality, LineJoin, Paint, Path, Pixmap, PixmapPaint, Stroke, Transform,
};

/// Renderer-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Painted when a slide has no background or it fails to load.
    pub fallback_background: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fallback_background: Color::rgba(17.0 / 255.0, 17.0 / 255.0, 17.0 / 255.0, 1.0),
        }
    }
}

/// Stateless per call: every render allocates its own surface, so one
/// renderer can serve concurrent requests.
pub struct RasterRenderer {
    fonts: FontMetrics,
    assets: Box<dyn AssetSource>,
    options: RenderOptions,
}

impl RasterRenderer {
    pub fn new(fonts: FontMetrics, assets: impl AssetSource + 'static, options: RenderOptions) -> Self {
        Self {
            fonts,
            assets: Box::new(assets),
            options,
        }
    }

    pub fn fonts(&self) -> &FontMetrics {
        &self.fonts
    }

    /// Render `slide` at `width × height` pixels.
    ///
    /// Layout treats an empty viewport as a no-op and yields no geometry, but
    /// a bitmap cannot be empty: a zero dimension is `RenderError::Surface`
    /// and the caller keeps whatever it showed before.
    pub fn render(&self, slide: &Slide, width: u32, height: u32) -> Result<Pixmap, RenderError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        let viewport = Viewport::new(width as f32, height as f32);

        paint_background(&mut pixmap, slide, self.assets.as_ref(), &self.options);

        for geometry in layout_slide(slide, viewport, &self.fonts) {
            self.paint_layer(&mut pixmap, &geometry);
        }
        log::debug!("rendered {} at {width}x{height}", slide.id);
        Ok(pixmap)
    }

    pub fn render_png(&self, slide: &Slide, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.render(slide, width, height)?)
    }

    /// Render at the target size of `aspect` and encode as PNG.
    pub fn export_slide(&self, slide: &Slide, aspect: AspectRatio) -> Result<Vec<u8>, RenderError> {
        let (width, height) = aspect.dimensions();
        self.render_png(slide, width, height)
    }

    fn paint_layer(&self, pixmap: &mut Pixmap, geo: &LayerGeometry) {
        let Some(vertical) = self.fonts.vertical_metrics(&geo.font) else {
            log::warn!("no face for {}; skipping layer {}", geo.font.to_css(), geo.layer_id);
            return;
        };
        let fill = paint_for(geo.fill);

        for (i, line) in geo.lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            let baseline = geo.line_center_y(i) + vertical.middle_to_baseline();
            let Some(path) = self.fonts.line_path(
                &line.text,
                &geo.font,
                geo.line_left(i),
                baseline,
                geo.letter_spacing,
            ) else {
                continue;
            };

            if let Some(shadow) = &geo.shadow {
                paint_shadow(pixmap, &path, shadow);
            }
            if geo.stroke.width > 0.0 {
                let stroke = Stroke {
                    width: geo.stroke.width,
                    line_join: LineJoin::Round,
                    ..Stroke::default()
                };
                pixmap.stroke_path(
                    &path,
                    &paint_for(geo.stroke.color),
                    &stroke,
                    Transform::identity(),
                    None,
                );
            }
            pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        }
    }
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

fn paint_for(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Fallback fill, then the cover-fit background image with its filters.
///
/// A missing or undecodable image leaves the fallback fill in place.
pub fn paint_background(
    pixmap: &mut Pixmap,
    slide: &Slide,
    assets: &dyn AssetSource,
    options: &RenderOptions,
) {
    let [r, g, b, a] = options.fallback_background.to_rgba8();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

    let Some(reference) = slide.background.as_deref().filter(|r| !r.is_empty()) else {
        return;
    };
    let image = match assets.load(reference).and_then(|bytes| decode_image(&bytes)) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("background for {} unavailable, using fallback fill: {e}", slide.id);
            return;
        }
    };

    let target = Viewport::new(pixmap.width() as f32, pixmap.height() as f32);
    let (iw, ih) = (image.width() as f32, image.height() as f32);
    let Some(rect) = cover_rect(
        iw,
        ih,
        target,
        slide.effects.image_offset,
        slide.effects.image_offset_y,
    ) else {
        return;
    };
    let transform = Transform::from_row(rect.width / iw, 0.0, 0.0, rect.height / ih, rect.x, rect.y);
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);

    apply_filters(pixmap, &FilterList::from_effects(&slide.effects));
}

/// Blurred copy of `path` in the shadow color, composited at the offset.
fn paint_shadow(pixmap: &mut Pixmap, path: &Path, shadow: &ResolvedShadow) {
    let sigma = shadow.blur / 2.0;
    let margin = (sigma * 3.0).ceil() + 1.0;
    let bounds = path.bounds();
    let origin_x = (bounds.left() - margin).floor();
    let origin_y = (bounds.top() - margin).floor();
    let width = (bounds.width() + 2.0 * margin).ceil() as u32 + 1;
    let height = (bounds.height() + 2.0 * margin).ceil() as u32 + 1;
    let Some(mut scratch) = Pixmap::new(width, height) else {
        return;
    };

    scratch.fill_path(
        path,
        &paint_for(shadow.color),
        FillRule::Winding,
        Transform::from_translate(-origin_x, -origin_y),
        None,
    );
    gaussian_blur(&mut scratch, sigma);
    pixmap.draw_pixmap(
        0,
        0,
        scratch.as_ref(),
        &PixmapPaint::default(),
        Transform::from_translate(origin_x + shadow.offset_x, origin_y + shadow.offset_y),
        None,
    );
}
