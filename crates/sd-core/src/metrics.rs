//! Text measurement interface.
//!
//! Layout only ever asks one question of a backend: how wide is this string
//! in this font. Each backend (Canvas2D on screen, Canvas2D for export, the
//! font-file rasterizer on the server) implements [`TextMetrics`]; tests use
//! the deterministic [`MonospaceMetrics`].

use std::sync::Arc;

/// Resolved font request for a measurement.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    /// Size in render pixels (already scaled to the target width).
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: u16, size: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            size,
        }
    }

    /// CSS font shorthand, e.g. `900 64px "Inter", sans-serif`.
    pub fn to_css(&self) -> String {
        format!("{} {}px \"{}\", sans-serif", self.weight, self.size, self.family)
    }
}

/// Measures the advance width of a string, in pixels.
///
/// Implementations must not add letter spacing; the layout engine adds it
/// uniformly so every backend agrees on spacing.
pub trait TextMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f32;
}

impl<T: TextMetrics + ?Sized> TextMetrics for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        (**self).measure(text, font)
    }
}

impl<T: TextMetrics + ?Sized> TextMetrics for Box<T> {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        (**self).measure(text, font)
    }
}

impl<T: TextMetrics + ?Sized> TextMetrics for Arc<T> {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        (**self).measure(text, font)
    }
}

/// Fixed-advance metrics: every character is `advance × size` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> f32 {
        text.chars().count() as f32 * font.size * self.advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_width_scales_with_size() {
        let m = MonospaceMetrics::default();
        let font = FontSpec::new("Inter", 600, 10.0);
        assert_eq!(m.measure("abcd", &font), 24.0);
        assert_eq!(m.measure("", &font), 0.0);
    }

    #[test]
    fn font_css_shorthand() {
        let font = FontSpec::new("Inter", 900, 64.0);
        assert_eq!(font.to_css(), "900 64px \"Inter\", sans-serif");
    }

    #[test]
    fn dyn_provider_delegates() {
        let boxed: Box<dyn TextMetrics> = Box::new(MonospaceMetrics { advance: 1.0 });
        let font = FontSpec::new("Inter", 600, 2.0);
        assert_eq!(boxed.measure("abc", &font), 6.0);
    }
}
