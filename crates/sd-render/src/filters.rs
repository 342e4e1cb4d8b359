//! Pixel filters for the raster backend.
//!
//! Canvas2D applies CSS `filter` natively; tiny-skia has no filter
//! pipeline, so background effects and shadow blur are composed per pixel
//! here using the CSS filter formulas.

use sd_core::ImageEffects;
use tiny_skia::{ColorU8, Pixmap};

/// One color filter step, in CSS units (1.0 = unchanged).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterFunction {
    /// 0 = unchanged, 1 = fully gray.
    Grayscale(f32),
    /// 0 = black, 1 = unchanged.
    Brightness(f32),
    /// 0 = flat gray, 1 = unchanged.
    Contrast(f32),
    /// 0 = desaturated, 1 = unchanged.
    Saturate(f32),
}

/// Ordered filter chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterList {
    pub filters: Vec<FilterFunction>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, filter: FilterFunction) -> Self {
        self.filters.push(filter);
        self
    }

    /// Same chain, in the same order, as `ImageEffects::to_css_filter`.
    pub fn from_effects(effects: &ImageEffects) -> Self {
        if !effects.has_filters() {
            return Self::new();
        }
        let mut list = Self::new();
        if effects.grayscale {
            list = list.push(FilterFunction::Grayscale(1.0));
        }
        list.push(FilterFunction::Brightness(effects.brightness.max(0.0) / 100.0))
            .push(FilterFunction::Contrast(effects.contrast.max(0.0) / 100.0))
            .push(FilterFunction::Saturate(effects.saturation.max(0.0) / 100.0))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter over one unpremultiplied RGB triple in [0, 1].
    pub fn apply_rgb(&self, mut rgb: [f32; 3]) -> [f32; 3] {
        for filter in &self.filters {
            rgb = match *filter {
                FilterFunction::Grayscale(amount) => grayscale(rgb, amount),
                FilterFunction::Brightness(amount) => rgb.map(|c| c * amount),
                FilterFunction::Contrast(amount) => rgb.map(|c| (c - 0.5) * amount + 0.5),
                FilterFunction::Saturate(amount) => saturate(rgb, amount),
            }
            .map(|c| c.clamp(0.0, 1.0));
        }
        rgb
    }
}

fn grayscale([r, g, b]: [f32; 3], amount: f32) -> [f32; 3] {
    let a = amount.clamp(0.0, 1.0);
    let inv = 1.0 - a;
    [
        (0.2126 + 0.7874 * inv) * r + (0.7152 - 0.7152 * inv) * g + (0.0722 - 0.0722 * inv) * b,
        (0.2126 - 0.2126 * inv) * r + (0.7152 + 0.2848 * inv) * g + (0.0722 - 0.0722 * inv) * b,
        (0.2126 - 0.2126 * inv) * r + (0.7152 - 0.7152 * inv) * g + (0.0722 + 0.9278 * inv) * b,
    ]
}

fn saturate([r, g, b]: [f32; 3], s: f32) -> [f32; 3] {
    [
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    ]
}

/// Apply a filter chain to every pixel of `pixmap`, preserving alpha.
pub fn apply_filters(pixmap: &mut Pixmap, filters: &FilterList) {
    if filters.is_empty() {
        return;
    }
    for pixel in pixmap.pixels_mut() {
        let c = pixel.demultiply();
        if c.alpha() == 0 {
            continue;
        }
        let to_unit = |v: u8| f32::from(v) / 255.0;
        let [r, g, b] = filters.apply_rgb([to_unit(c.red()), to_unit(c.green()), to_unit(c.blue())]);
        let to_u8 = |v: f32| (v * 255.0).round() as u8;
        *pixel = ColorU8::from_rgba(to_u8(r), to_u8(g), to_u8(b), c.alpha()).premultiply();
    }
}

// ─── Blur ────────────────────────────────────────────────────────────────

/// Approximate a Gaussian blur of standard deviation `sigma` with three
/// box-blur passes.
///
/// Canvas2D's `shadowBlur` is twice the standard deviation, so callers pass
/// `shadow_blur / 2`.
pub fn gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    let radius = sigma.round();
    if radius.is_nan() || radius < 1.0 {
        return;
    }
    let radius = radius as usize;
    for _ in 0..3 {
        box_blur(pixmap, radius);
    }
}

/// Separable box blur over premultiplied channels, clamped at the edges.
pub fn box_blur(pixmap: &mut Pixmap, radius: usize) {
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    let data = pixmap.data_mut();
    let mut line = Vec::with_capacity(width.max(height) * 4);

    for y in 0..height {
        line.clear();
        line.extend_from_slice(&data[y * width * 4..(y + 1) * width * 4]);
        blur_line(&line, width, radius, |i, px| {
            data[(y * width + i) * 4..(y * width + i) * 4 + 4].copy_from_slice(&px);
        });
    }
    for x in 0..width {
        line.clear();
        for y in 0..height {
            line.extend_from_slice(&data[(y * width + x) * 4..(y * width + x) * 4 + 4]);
        }
        blur_line(&line, height, radius, |i, px| {
            data[(i * width + x) * 4..(i * width + x) * 4 + 4].copy_from_slice(&px);
        });
    }
}

/// Running-sum box filter over one row/column of RGBA pixels.
fn blur_line(src: &[u8], len: usize, radius: usize, mut write: impl FnMut(usize, [u8; 4])) {
    let window = (2 * radius + 1) as u32;
    let at = |i: isize| pixel_at(src, len, i);

    let mut sum = [0u32; 4];
    for k in -(radius as isize)..=(radius as isize) {
        for (s, v) in sum.iter_mut().zip(at(k)) {
            *s += u32::from(*v);
        }
    }
    for i in 0..len {
        let px = sum.map(|s| ((s + window / 2) / window) as u8);
        write(i, px);
        let leaving = at(i as isize - radius as isize);
        let entering = at(i as isize + radius as isize + 1);
        for c in 0..4 {
            sum[c] = sum[c] + u32::from(entering[c]) - u32::from(leaving[c]);
        }
    }
}

fn pixel_at(src: &[u8], len: usize, i: isize) -> &[u8] {
    let i = i.clamp(0, len as isize - 1) as usize;
    &src[i * 4..i * 4 + 4]
}
