//! Hit testing: point → layer or resize handle.
//!
//! Walks layer geometry front-to-back (last painted is topmost). Resize
//! handles of selected layers take precedence over every layer body, so a
//! handle overlapping another layer's text still grabs the handle.

use kurbo::{Point, Rect};
use sd_core::layout::{BOX_PADDING, LayerGeometry};
use sd_core::LayerId;

/// Side length of the square resize handles, in layout pixels.
pub const HANDLE_SIZE: f64 = 16.0;

/// Which wrap-box edge a resize handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleSide {
    Left,
    Right,
}

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The layer's padded content box.
    Body(LayerId),
    /// A resize handle of a selected layer.
    Handle { layer: LayerId, side: HandleSide },
}

impl Hit {
    pub fn layer(&self) -> LayerId {
        match *self {
            Hit::Body(id) | Hit::Handle { layer: id, .. } => id,
        }
    }
}

/// Padded content box: the draggable region.
pub fn body_rect(geometry: &LayerGeometry) -> Rect {
    let b = geometry.content_bounds;
    Rect::new(
        f64::from(b.x),
        f64::from(b.y),
        f64::from(b.right()),
        f64::from(b.bottom()),
    )
    .inflate(f64::from(BOX_PADDING), f64::from(BOX_PADDING))
}

/// Handle square centered on one wrap-box edge at the anchor's height.
pub fn handle_rect(geometry: &LayerGeometry, side: HandleSide) -> Rect {
    let edge = match side {
        HandleSide::Left => geometry.bounds.x,
        HandleSide::Right => geometry.bounds.right(),
    };
    Rect::from_center_size(
        Point::new(f64::from(edge), f64::from(geometry.anchor.1)),
        (HANDLE_SIZE, HANDLE_SIZE),
    )
}

/// Find what is under `(px, py)`. Returns `None` on empty background.
pub fn hit_test(
    geometry: &[LayerGeometry],
    selected: &[LayerId],
    px: f32,
    py: f32,
) -> Option<Hit> {
    let point = Point::new(f64::from(px), f64::from(py));

    for geo in geometry.iter().rev() {
        if !selected.contains(&geo.layer_id) {
            continue;
        }
        for side in [HandleSide::Left, HandleSide::Right] {
            if handle_rect(geo, side).contains(point) {
                return Some(Hit::Handle {
                    layer: geo.layer_id,
                    side,
                });
            }
        }
    }

    geometry
        .iter()
        .rev()
        .find(|geo| body_rect(geo).contains(point))
        .map(|geo| Hit::Body(geo.layer_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sd_core::layout::{Viewport, layout_slide};
    use sd_core::{LayerKind, MonospaceMetrics, Slide, TextLayer};

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 1000.0,
    };

    fn two_layer_slide() -> (Slide, LayerId, LayerId) {
        let mut back = TextLayer::new(LayerKind::Body, "back layer");
        back.font_size = Some(20.0);
        let mut front = TextLayer::new(LayerKind::Body, "front");
        front.font_size = Some(20.0);
        let (b, f) = (back.id, front.id);
        (Slide::new().with_layers(vec![back, front]), b, f)
    }

    #[test]
    fn topmost_body_wins() {
        let (slide, _, front) = two_layer_slide();
        let geo = layout_slide(&slide, VIEWPORT, &MonospaceMetrics::default());
        assert_eq!(hit_test(&geo, &[], 500.0, 500.0), Some(Hit::Body(front)));
    }

    #[test]
    fn padding_extends_body() {
        let (slide, back, _) = two_layer_slide();
        let geo = layout_slide(&slide, VIEWPORT, &MonospaceMetrics::default());
        // "back layer" is 120px wide, centered: 440..560. Padding reaches 432.
        assert_eq!(hit_test(&geo, &[], 435.0, 500.0), Some(Hit::Body(back)));
        assert_eq!(hit_test(&geo, &[], 425.0, 500.0), None);
    }

    #[test]
    fn handles_only_for_selected_layers() {
        let (slide, back, _) = two_layer_slide();
        let geo = layout_slide(&slide, VIEWPORT, &MonospaceMetrics::default());
        // Wrap box is 80% wide: edges at 100 and 900.
        assert_eq!(hit_test(&geo, &[], 900.0, 500.0), None);
        assert_eq!(
            hit_test(&geo, &[back], 900.0, 500.0),
            Some(Hit::Handle {
                layer: back,
                side: HandleSide::Right
            })
        );
        assert_eq!(
            hit_test(&geo, &[back], 101.0, 505.0).map(|h| h.layer()),
            Some(back)
        );
    }

    #[test]
    fn miss_on_background() {
        let (slide, _, _) = two_layer_slide();
        let geo = layout_slide(&slide, VIEWPORT, &MonospaceMetrics::default());
        assert_eq!(hit_test(&geo, &[], 10.0, 10.0), None);
    }
}
