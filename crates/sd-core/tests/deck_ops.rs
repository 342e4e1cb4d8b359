//! Integration tests: deck mutation contracts.

use pretty_assertions::assert_eq;
use sd_core::{Deck, DeckError, LayerId, LayerKind, Slide, SlideId, TextLayer};

fn fixture_deck() -> Deck {
    serde_json::from_str(include_str!("fixtures/deck.json")).unwrap()
}

fn ids(deck: &Deck) -> Vec<SlideId> {
    deck.slides.iter().map(|s| s.id).collect()
}

#[test]
fn duplicate_inserts_after_original_with_fresh_ids() {
    let mut deck = fixture_deck();
    let intro = SlideId::intern("intro");
    let copy = deck.duplicate_slide(intro).unwrap();

    assert_eq!(ids(&deck), vec![intro, copy, SlideId::intern("outro")]);
    let original = deck.slide(intro).unwrap();
    let duplicate = deck.slide(copy).unwrap();
    assert_eq!(original.layers.len(), duplicate.layers.len());
    for (a, b) in original.layers.iter().zip(&duplicate.layers) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.content, b.content);
    }
}

#[test]
fn reorder_is_remove_then_insert() {
    let mut deck = fixture_deck();
    let added = deck.add_slide(Slide::new());
    deck.reorder_slide(2, 0).unwrap();
    assert_eq!(
        ids(&deck),
        vec![added, SlideId::intern("intro"), SlideId::intern("outro")]
    );
    assert_eq!(
        deck.reorder_slide(0, 3),
        Err(DeckError::IndexOutOfBounds { index: 3, len: 3 })
    );
}

#[test]
fn delete_and_replace_report_missing_slides() {
    let mut deck = fixture_deck();
    let outro = SlideId::intern("outro");
    let removed = deck.delete_slide(outro).unwrap();
    assert_eq!(removed.id, outro);
    assert_eq!(deck.len(), 1);
    assert_eq!(deck.delete_slide(outro), Err(DeckError::SlideNotFound(outro)));
    assert_eq!(deck.replace_slide(removed), Err(DeckError::SlideNotFound(outro)));
}

#[test]
fn replace_slide_keeps_previous_revision_intact() {
    let mut deck = fixture_deck();
    let before = deck.slide_at(0).unwrap().clone();
    let edited = before.with_layer_added(TextLayer::new(LayerKind::Subtext, "new"));
    deck.replace_slide(edited).unwrap();

    assert_eq!(before.layers.len(), 3);
    assert_eq!(deck.slide_at(0).unwrap().layers.len(), 4);
}

#[test]
fn add_slide_normalizes_layers() {
    let mut deck = Deck::new();
    let mut layer = TextLayer::new(LayerKind::Body, "off-slide");
    layer.x = Some(250.0);
    layer.width = 0.0;
    let id = deck.add_slide(Slide::new().with_layers(vec![layer]));
    let stored = &deck.slide(id).unwrap().layers[0];
    assert_eq!(stored.x, Some(100.0));
    assert_eq!(stored.width, 5.0);
}

#[test]
fn missing_layer_lookup() {
    let deck = fixture_deck();
    let ghost = LayerId::intern("ghost");
    assert_eq!(
        deck.layer(SlideId::intern("intro"), ghost),
        Err(DeckError::LayerNotFound(ghost))
    );
}
