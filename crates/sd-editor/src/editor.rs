//! Slide editor: the single write path for one slide.
//!
//! Holds the current slide revision, its layout geometry for the current
//! surface size, and the interaction controller. Pointer gestures, keyboard
//! edits and style-panel writes all end in [`SlideEditor::replace_slide`],
//! which swaps in a new revision, re-lays it out, and notifies history.

use crate::controller::{InteractionConfig, InteractionController};
use crate::input::InputEvent;
use crate::mutation::{LayerMutation, apply_mutation};
use sd_core::layout::{LayerGeometry, Viewport, layout_slide};
use sd_core::{Slide, TextMetrics};

/// Receives every committed revision. Coalescing rapid edits into undo
/// checkpoints is the receiver's job; the editor never reads it back.
pub trait HistorySink {
    fn record(&mut self, slide: &Slide);
}

impl<F: FnMut(&Slide)> HistorySink for F {
    fn record(&mut self, slide: &Slide) {
        self(slide)
    }
}

pub struct SlideEditor<M: TextMetrics> {
    slide: Slide,
    metrics: M,
    viewport: Viewport,
    geometry: Vec<LayerGeometry>,
    pub controller: InteractionController,
    history: Option<Box<dyn HistorySink>>,
    revision: u64,
}

impl<M: TextMetrics> SlideEditor<M> {
    /// Editor for `slide` on a surface that hasn't reported its size yet.
    pub fn new(slide: Slide, metrics: M, config: InteractionConfig) -> Self {
        Self {
            slide,
            metrics,
            viewport: Viewport::new(0.0, 0.0),
            geometry: Vec::new(),
            controller: InteractionController::new(config),
            history: None,
            revision: 0,
        }
    }

    pub fn with_history(mut self, sink: impl HistorySink + 'static) -> Self {
        self.set_history(sink);
        self
    }

    /// Attach (or swap) the history receiver.
    pub fn set_history(&mut self, sink: impl HistorySink + 'static) {
        self.history = Some(Box::new(sink));
    }

    pub fn slide(&self) -> &Slide {
        &self.slide
    }

    pub fn geometry(&self) -> &[LayerGeometry] {
        &self.geometry
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Number of revisions committed since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Surface size in layout pixels (unzoomed).
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.relayout();
    }

    fn relayout(&mut self) {
        self.geometry = layout_slide(&self.slide, self.viewport, &self.metrics);
    }

    /// Load a different slide without notifying history (slide switch).
    pub fn load_slide(&mut self, slide: Slide) {
        self.controller.pointer_up();
        self.controller.clear_selection();
        self.slide = slide;
        self.relayout();
    }

    /// Commit a new revision of the current slide.
    pub fn replace_slide(&mut self, slide: Slide) {
        self.slide = slide;
        self.controller.retain_existing(&self.slide);
        self.relayout();
        self.revision += 1;
        if let Some(history) = self.history.as_mut() {
            history.record(&self.slide);
        }
    }

    /// Apply an interaction mutation. Returns whether a revision was committed.
    pub fn apply(&mut self, mutation: &LayerMutation) -> bool {
        match apply_mutation(&self.slide, mutation) {
            Some(next) if next != self.slide => {
                self.replace_slide(next);
                true
            }
            Some(_) => false,
            None => {
                log::debug!("mutation matched no layer on {}", self.slide.id);
                false
            }
        }
    }

    /// Route one input event. Returns whether the slide changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        let mutation = match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.controller.pointer_down(
                    &self.slide,
                    &self.geometry,
                    self.viewport,
                    *x,
                    *y,
                    *modifiers,
                );
                None
            }
            InputEvent::PointerMove { x, y, .. } => {
                self.controller
                    .pointer_move(&self.slide, self.viewport, *x, *y)
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => {
                self.controller.pointer_up();
                None
            }
            InputEvent::Key { key, modifiers } => {
                self.controller.key(&self.slide, key, *modifiers)
            }
        };
        mutation.is_some_and(|m| self.apply(&m))
    }
}
