//! Slide mutations produced by interaction.
//!
//! Every mutation is absolute (target values, not deltas), so applying the
//! same mutation twice yields the same slide. Application never touches the
//! input revision; it returns a new `Slide`.

use sd_core::{LayerId, Slide, clamp_percent};

#[derive(Debug, Clone, PartialEq)]
pub enum LayerMutation {
    /// Set anchors `(id, x, y)` in percent.
    SetAnchors(Vec<(LayerId, f32, f32)>),
    /// Set a layer's center x and wrap width, both in percent.
    Resize { id: LayerId, x: f32, width: f32 },
    RemoveLayers(Vec<LayerId>),
}

/// Apply a mutation, producing the next revision of `slide`.
///
/// Returns `None` when no layer named by the mutation exists.
pub fn apply_mutation(slide: &Slide, mutation: &LayerMutation) -> Option<Slide> {
    match mutation {
        LayerMutation::SetAnchors(anchors) => {
            let mut touched = false;
            let layers = slide
                .layers
                .iter()
                .map(|layer| match anchors.iter().find(|(id, ..)| *id == layer.id) {
                    Some(&(_, x, y)) => {
                        touched = true;
                        let mut moved = layer.clone();
                        moved.x = Some(clamp_percent(x));
                        moved.y = Some(clamp_percent(y));
                        moved
                    }
                    None => layer.clone(),
                })
                .collect();
            touched.then(|| slide.with_layers(layers))
        }
        LayerMutation::Resize { id, x, width } => {
            let mut layer = slide.layer(*id)?.clone();
            layer.x = Some(*x);
            layer.width = *width;
            slide.with_layer_replaced(layer)
        }
        LayerMutation::RemoveLayers(ids) => {
            let next = slide.without_layers(ids);
            (next.layers.len() != slide.layers.len()).then_some(next)
        }
    }
}
