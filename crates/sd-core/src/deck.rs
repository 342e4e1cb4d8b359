//! Deck: the ordered list of slides, and the whole-slide mutation contracts.
//!
//! Slides are only ever replaced whole. Every operation here either swaps a
//! slide value, inserts/removes one, or reorders the list.

use crate::error::DeckError;
use crate::id::{LayerId, SlideId};
use crate::model::{Slide, TextLayer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slide(&self, id: SlideId) -> Result<&Slide, DeckError> {
        self.slides
            .iter()
            .find(|s| s.id == id)
            .ok_or(DeckError::SlideNotFound(id))
    }

    pub fn slide_at(&self, index: usize) -> Result<&Slide, DeckError> {
        self.slides.get(index).ok_or(DeckError::IndexOutOfBounds {
            index,
            len: self.slides.len(),
        })
    }

    pub fn index_of(&self, id: SlideId) -> Result<usize, DeckError> {
        self.slides
            .iter()
            .position(|s| s.id == id)
            .ok_or(DeckError::SlideNotFound(id))
    }

    /// Append a slide at the end. Its layers are normalized on the way in.
    pub fn add_slide(&mut self, slide: Slide) -> SlideId {
        let id = slide.id;
        let layers = slide.layers.iter().cloned().map(TextLayer::normalized).collect();
        self.slides.push(slide.with_layers(layers));
        log::debug!("added slide {id} ({} total)", self.slides.len());
        id
    }

    /// Insert a deep copy (fresh slide and layer IDs) right after the original.
    pub fn duplicate_slide(&mut self, id: SlideId) -> Result<SlideId, DeckError> {
        let index = self.index_of(id)?;
        let copy = self.slides[index].duplicated();
        let new_id = copy.id;
        self.slides.insert(index + 1, copy);
        log::debug!("duplicated slide {id} as {new_id}");
        Ok(new_id)
    }

    pub fn delete_slide(&mut self, id: SlideId) -> Result<Slide, DeckError> {
        let index = self.index_of(id)?;
        Ok(self.slides.remove(index))
    }

    /// Move the slide at `from` to `to` (remove, then insert).
    pub fn reorder_slide(&mut self, from: usize, to: usize) -> Result<(), DeckError> {
        let len = self.slides.len();
        for index in [from, to] {
            if index >= len {
                return Err(DeckError::IndexOutOfBounds { index, len });
            }
        }
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        Ok(())
    }

    /// Swap in a new revision of an existing slide, matched by ID.
    pub fn replace_slide(&mut self, slide: Slide) -> Result<(), DeckError> {
        let index = self.index_of(slide.id)?;
        self.slides[index] = slide;
        Ok(())
    }

    /// Apply `edit` to a slide and store the returned revision.
    pub fn update_slide<F>(&mut self, id: SlideId, edit: F) -> Result<&Slide, DeckError>
    where
        F: FnOnce(&Slide) -> Result<Slide, DeckError>,
    {
        let index = self.index_of(id)?;
        let next = edit(&self.slides[index])?;
        self.slides[index] = next;
        Ok(&self.slides[index])
    }

    /// Find a layer anywhere on a given slide.
    pub fn layer(&self, slide: SlideId, layer: LayerId) -> Result<&TextLayer, DeckError> {
        self.slide(slide)?
            .layer(layer)
            .ok_or(DeckError::LayerNotFound(layer))
    }
}
