//! Font-file text metrics and glyph outlines for the server renderer.
//!
//! Faces are discovered with `fontdb` and matched by family + weight, with
//! a sans-serif fallback. Advances and outlines come from `ttf-parser`.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use sd_core::{FontSpec, LayoutError, TextMetrics};
use std::path::Path;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Text metrics backed by real font files.
pub struct FontMetrics {
    db: Database,
}

/// Scaled vertical metrics of a face, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMetrics {
    pub ascender: f32,
    /// Negative below the baseline, as in the font file.
    pub descender: f32,
}

impl VerticalMetrics {
    /// Offset from a line's vertical center to its baseline, matching the
    /// Canvas2D `textBaseline = "middle"` convention.
    pub fn middle_to_baseline(&self) -> f32 {
        (self.ascender + self.descender) / 2.0
    }
}

impl FontMetrics {
    /// Wrap an already populated database. Fails when it holds no faces.
    pub fn new(db: Database) -> Result<Self, LayoutError> {
        if db.is_empty() {
            return Err(LayoutError::MetricsUnavailable(
                "no font faces loaded".to_string(),
            ));
        }
        log::debug!("font metrics ready with {} face(s)", db.len());
        Ok(Self { db })
    }

    /// System fonts plus an optional extra directory.
    pub fn with_system_fonts(extra_dir: Option<&Path>) -> Result<Self, LayoutError> {
        let mut db = Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            db.load_fonts_dir(dir);
        }
        Self::new(db)
    }

    /// Family used when a requested family isn't installed.
    pub fn set_fallback_family(&mut self, family: &str) {
        self.db.set_sans_serif_family(family);
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Run `f` with the face best matching `font`, falling back to the
    /// sans-serif family and then to any loaded face.
    pub fn with_face<R>(&self, font: &FontSpec, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        let families = [Family::Name(font.family.as_str()), Family::SansSerif];
        let id = self
            .db
            .query(&Query {
                families: &families,
                weight: Weight(font.weight),
                stretch: Stretch::Normal,
                style: Style::Normal,
            })
            .or_else(|| self.db.faces().next().map(|face| face.id))?;
        self.db
            .with_face_data(id, |data, index| Face::parse(data, index).ok().map(|face| f(&face)))
            .flatten()
    }

    pub fn vertical_metrics(&self, font: &FontSpec) -> Option<VerticalMetrics> {
        self.with_face(font, |face| {
            let scale = font.size / f32::from(face.units_per_em());
            VerticalMetrics {
                ascender: f32::from(face.ascender()) * scale,
                descender: f32::from(face.descender()) * scale,
            }
        })
    }

    /// Outline of one line of text as a single path.
    ///
    /// `left` is the x of the first glyph's origin and `baseline` the y of
    /// the baseline; each character advances by its glyph width plus
    /// `letter_spacing`.
    pub fn line_path(
        &self,
        text: &str,
        font: &FontSpec,
        left: f32,
        baseline: f32,
        letter_spacing: f32,
    ) -> Option<tiny_skia::Path> {
        self.with_face(font, |face| {
            let scale = font.size / f32::from(face.units_per_em());
            let mut sink = GlyphSink {
                builder: tiny_skia::PathBuilder::new(),
                scale,
                origin_x: left,
                baseline,
            };
            for c in text.chars() {
                let glyph = face.glyph_index(c).unwrap_or(GlyphId(0));
                let _ = face.outline_glyph(glyph, &mut sink);
                sink.origin_x += glyph_advance(face, glyph) * scale + letter_spacing;
            }
            sink.builder.finish()
        })
        .flatten()
    }
}

impl TextMetrics for FontMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        self.with_face(font, |face| {
            let scale = font.size / f32::from(face.units_per_em());
            text.chars()
                .map(|c| glyph_advance(face, face.glyph_index(c).unwrap_or(GlyphId(0))))
                .sum::<f32>()
                * scale
        })
        .unwrap_or_else(|| {
            log::warn!("no face for {}; estimating width", font.to_css());
            text.chars().count() as f32 * font.size * 0.5
        })
    }
}

fn glyph_advance(face: &Face<'_>, glyph: GlyphId) -> f32 {
    f32::from(face.glyph_hor_advance(glyph).unwrap_or(0))
}

/// Feeds `ttf-parser` outlines into a `tiny-skia` path, flipping Y.
struct GlyphSink {
    builder: tiny_skia::PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl GlyphSink {
    fn tx(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn ty(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }
}

impl OutlineBuilder for GlyphSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.tx(x), self.ty(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.tx(x), self.ty(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(self.tx(x1), self.ty(y1), self.tx(x), self.ty(y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.tx(x1),
            self.ty(y1),
            self.tx(x2),
            self.ty(y2),
            self.tx(x),
            self.ty(y),
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
