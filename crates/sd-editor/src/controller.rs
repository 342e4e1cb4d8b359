//! Interaction controller: pointer gestures and keyboard edits.
//!
//! A small state machine (`idle → dragging → idle`, `idle → resizing → idle`)
//! driven by pointer events. It reads the current slide and its layout
//! geometry, and answers with absolute [`LayerMutation`]s; it never edits a
//! slide itself. Selection is view state owned here, keyed by layer ID, and
//! is never written into the slide model.
//!
//! All gesture math happens in layout pixels: screen coordinates are divided
//! by the surface zoom first, so zooming the view never distorts a drag.

use crate::mutation::LayerMutation;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::input::Modifiers;
use sd_core::layout::{LayerGeometry, Viewport};
use sd_core::mapper::{Envelope, bounds_for};
use sd_core::{LayerId, Slide, clamp_percent};
use sd_render::hit::{HandleSide, Hit, hit_test};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Configuration ───────────────────────────────────────────────────────

/// Tunables for snapping, resizing and nudging. All values in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionConfig {
    pub snap_targets_x: Vec<f32>,
    pub snap_targets_y: Vec<f32>,
    /// Snap when the dragged anchor is within this distance of a target.
    pub snap_threshold: f32,
    /// Smallest width a resize may produce.
    pub min_resize_width: f32,
    pub nudge_step: f32,
    pub nudge_step_large: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            snap_targets_x: vec![50.0],
            snap_targets_y: vec![50.0],
            snap_threshold: 1.5,
            min_resize_width: 10.0,
            nudge_step: 0.2,
            nudge_step_large: 2.0,
        }
    }
}

// ─── State ───────────────────────────────────────────────────────────────

/// Which axes the current drag is snapped on.
///
/// `horizontal` means the x coordinate landed on a target (drawn as a
/// vertical guide line); `vertical` means the y coordinate did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapIndicator {
    pub horizontal: bool,
    pub vertical: bool,
}

impl SnapIndicator {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragStart {
    id: LayerId,
    x: f32,
    y: f32,
    envelope: Envelope,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Dragging {
        /// Pointer position at gesture start, layout pixels.
        origin: (f32, f32),
        starts: Vec<DragStart>,
    },
    Resizing {
        id: LayerId,
        side: HandleSide,
        /// Pixel x of the edge opposite the grabbed handle.
        fixed_edge: f32,
    },
}

/// Public view of the gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Resizing,
}

pub type Selection = SmallVec<[LayerId; 4]>;

pub struct InteractionController {
    pub config: InteractionConfig,
    selection: Selection,
    gesture: Gesture,
    snap: SnapIndicator,
    zoom: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            selection: SmallVec::new(),
            gesture: Gesture::Idle,
            snap: SnapIndicator::default(),
            zoom: 1.0,
        }
    }

    // ── Accessors ──

    pub fn selection(&self) -> &[LayerId] {
        &self.selection
    }

    pub fn is_selected(&self, id: LayerId) -> bool {
        self.selection.contains(&id)
    }

    pub fn phase(&self) -> GesturePhase {
        match self.gesture {
            Gesture::Idle => GesturePhase::Idle,
            Gesture::Dragging { .. } => GesturePhase::Dragging,
            Gesture::Resizing { .. } => GesturePhase::Resizing,
        }
    }

    pub fn snap(&self) -> SnapIndicator {
        self.snap
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Visual scale of the surface (screen px per layout px).
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    // ── Selection ──

    pub fn select(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        self.selection = ids.into_iter().collect();
    }

    pub fn select_all(&mut self, slide: &Slide) {
        self.select(slide.layers.iter().map(|l| l.id));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Drop selected IDs that no longer exist on `slide`.
    pub fn retain_existing(&mut self, slide: &Slide) {
        self.selection.retain(|id| slide.layer(*id).is_some());
    }

    // ── Pointer gestures ──

    fn to_layout(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.zoom, y / self.zoom)
    }

    /// Pointer pressed at screen `(x, y)`.
    ///
    /// Selects and starts a drag or resize; never mutates the slide.
    pub fn pointer_down(
        &mut self,
        slide: &Slide,
        geometry: &[LayerGeometry],
        viewport: Viewport,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    ) {
        self.end_gesture();
        if viewport.is_empty() {
            return;
        }
        let (px, py) = self.to_layout(x, y);

        match hit_test(geometry, &self.selection, px, py) {
            Some(Hit::Handle { layer, side }) => {
                let Some(geo) = geometry.iter().find(|g| g.layer_id == layer) else {
                    return;
                };
                let fixed_edge = match side {
                    HandleSide::Left => geo.bounds.right(),
                    HandleSide::Right => geo.bounds.x,
                };
                self.select([layer]);
                self.gesture = Gesture::Resizing {
                    id: layer,
                    side,
                    fixed_edge,
                };
                log::debug!("resize {layer} from {side:?}, fixed edge {fixed_edge:.1}px");
            }
            Some(Hit::Body(id)) => {
                if !self.selection.contains(&id) {
                    if modifiers.shift {
                        self.selection.push(id);
                    } else {
                        self.select([id]);
                    }
                }
                let starts: Vec<DragStart> = self
                    .selection
                    .iter()
                    .filter_map(|sel| {
                        let layer = slide.layer(*sel)?;
                        let geo = geometry.iter().find(|g| g.layer_id == *sel)?;
                        let (x, y) = slide.anchor(layer);
                        Some(DragStart {
                            id: *sel,
                            x,
                            y,
                            envelope: bounds_for(slide, geo, viewport),
                        })
                    })
                    .collect();
                log::debug!("drag {} layer(s)", starts.len());
                self.gesture = Gesture::Dragging {
                    origin: (px, py),
                    starts,
                };
            }
            None => {
                if !modifiers.shift {
                    self.clear_selection();
                }
            }
        }
    }

    /// Pointer moved while captured. Returns the mutation to apply, if any.
    pub fn pointer_move(
        &mut self,
        slide: &Slide,
        viewport: Viewport,
        x: f32,
        y: f32,
    ) -> Option<LayerMutation> {
        if viewport.is_empty() {
            return None;
        }
        let (px, py) = self.to_layout(x, y);

        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging { origin, starts } => {
                let origin = *origin;
                let starts: Vec<DragStart> = starts
                    .iter()
                    .filter(|s| slide.layer(s.id).is_some())
                    .copied()
                    .collect();
                if starts.is_empty() {
                    log::warn!("drag target no longer on slide {}; ending gesture", slide.id);
                    self.end_gesture();
                    return None;
                }
                let dx = (px - origin.0) / viewport.width * 100.0;
                let dy = (py - origin.1) / viewport.height * 100.0;
                Some(self.drag_to(&starts, dx, dy))
            }
            &Gesture::Resizing {
                id,
                side,
                fixed_edge,
            } => {
                if slide.layer(id).is_none() {
                    log::warn!("resize target {id} no longer on slide; ending gesture");
                    self.end_gesture();
                    return None;
                }
                Some(self.resize_to(slide, viewport, id, side, fixed_edge, px))
            }
        }
    }

    /// Pointer released or capture lost: back to idle, discarding state.
    pub fn pointer_up(&mut self) {
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("gesture ended");
        }
        self.gesture = Gesture::Idle;
        self.snap = SnapIndicator::default();
    }

    fn drag_to(&mut self, starts: &[DragStart], dx: f32, dy: f32) -> LayerMutation {
        let mut snapped = (None, None);
        if let [only] = starts {
            let threshold = self.config.snap_threshold;
            snapped = (
                snap_target(only.x + dx, &self.config.snap_targets_x, threshold),
                snap_target(only.y + dy, &self.config.snap_targets_y, threshold),
            );
        }
        self.snap = SnapIndicator {
            horizontal: snapped.0.is_some(),
            vertical: snapped.1.is_some(),
        };
        let anchors = starts
            .iter()
            .map(|s| {
                let x = snapped.0.unwrap_or(s.x + dx);
                let y = snapped.1.unwrap_or(s.y + dy);
                let (x, y) = s.envelope.clamp(x, y);
                (s.id, x, y)
            })
            .collect();
        LayerMutation::SetAnchors(anchors)
    }

    fn resize_to(
        &self,
        slide: &Slide,
        viewport: Viewport,
        id: LayerId,
        side: HandleSide,
        fixed_edge: f32,
        pointer_x: f32,
    ) -> LayerMutation {
        let w = viewport.width;
        let min_width = self.config.min_resize_width / 100.0 * w;
        let moving = if slide.settings.constrain_to_slide {
            pointer_x.clamp(0.0, w)
        } else {
            pointer_x
        };
        // Never wider than the slide, never narrower than the floor, and the
        // new center stays in [0, W] so the fixed edge survives normalization.
        let (left, right) = match side {
            HandleSide::Right => {
                let right = moving
                    .max(fixed_edge + min_width)
                    .max(-fixed_edge)
                    .min(fixed_edge + w)
                    .min(2.0 * w - fixed_edge);
                (fixed_edge, right)
            }
            HandleSide::Left => {
                let left = moving
                    .min(fixed_edge - min_width)
                    .min(2.0 * w - fixed_edge)
                    .max(fixed_edge - w)
                    .max(-fixed_edge);
                (left, fixed_edge)
            }
        };
        let width_px = right - left;
        let center = left + width_px / 2.0;
        LayerMutation::Resize {
            id,
            x: center / w * 100.0,
            width: width_px / w * 100.0,
        }
    }

    // ── Keyboard ──

    /// Move every selected layer by one step. Clamped to [0, 100] only; the
    /// containment envelope applies to pointer drags, not nudges.
    pub fn nudge(&self, slide: &Slide, dx: i8, dy: i8, large: bool) -> Option<LayerMutation> {
        let step = if large {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        let anchors: Vec<_> = slide
            .layers
            .iter()
            .filter(|l| self.selection.contains(&l.id))
            .map(|l| {
                let (x, y) = slide.anchor(l);
                (
                    l.id,
                    clamp_percent(x + f32::from(dx) * step),
                    clamp_percent(y + f32::from(dy) * step),
                )
            })
            .collect();
        (!anchors.is_empty()).then_some(LayerMutation::SetAnchors(anchors))
    }

    /// Remove every selected layer and clear the selection.
    pub fn delete_selected(&mut self) -> Option<LayerMutation> {
        if self.selection.is_empty() {
            return None;
        }
        let ids = self.selection.drain(..).collect();
        self.end_gesture();
        Some(LayerMutation::RemoveLayers(ids))
    }

    /// Resolve a key through the shortcut map and act on it.
    pub fn key(&mut self, slide: &Slide, key: &str, m: Modifiers) -> Option<LayerMutation> {
        match ShortcutMap::resolve(key, m.ctrl, m.shift, m.alt, m.meta)? {
            ShortcutAction::Nudge { dx, dy, large } => self.nudge(slide, dx, dy, large),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::SelectAll => {
                self.select_all(slide);
                None
            }
            ShortcutAction::Deselect => {
                self.clear_selection();
                None
            }
        }
    }
}

/// Nearest target within `threshold` of `value`, if any.
fn snap_target(value: f32, targets: &[f32], threshold: f32) -> Option<f32> {
    targets
        .iter()
        .copied()
        .filter(|t| (t - value).abs() <= threshold)
        .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
}
