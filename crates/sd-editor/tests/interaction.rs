//! Integration tests: pointer gestures through `SlideEditor`.
//!
//! Drives the editor with screen-space input events and checks the
//! committed slide revisions and their geometry.

use pretty_assertions::assert_eq;
use sd_core::layout::Viewport;
use sd_core::{LayerId, LayerKind, MonospaceMetrics, Slide, TextAlign, TextLayer};
use sd_editor::{GesturePhase, InputEvent, InteractionConfig, Modifiers, SlideEditor};
use std::cell::RefCell;
use std::rc::Rc;

const VIEWPORT: Viewport = Viewport {
    width: 1000.0,
    height: 1000.0,
};

fn layer(content: &str, x: f32, y: f32) -> TextLayer {
    let mut layer = TextLayer::new(LayerKind::Body, content);
    layer.font_size = Some(20.0);
    layer.x = Some(x);
    layer.y = Some(y);
    layer
}

fn editor_with(layers: Vec<TextLayer>) -> SlideEditor<MonospaceMetrics> {
    let slide = Slide::new().with_layers(layers);
    let mut editor = SlideEditor::new(slide, MonospaceMetrics::default(), InteractionConfig::default());
    editor.set_viewport(VIEWPORT.width, VIEWPORT.height);
    editor
}

fn anchor(editor: &SlideEditor<MonospaceMetrics>, id: LayerId) -> (f32, f32) {
    let slide = editor.slide();
    slide.anchor(slide.layer(id).unwrap())
}

fn click(editor: &mut SlideEditor<MonospaceMetrics>, x: f32, y: f32) {
    editor.handle_event(&InputEvent::pointer_down(x, y));
    editor.handle_event(&InputEvent::pointer_up(x, y));
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn zero_delta_drag_leaves_anchor_unchanged() {
    let a = layer("steady", 42.0, 37.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);

    click(&mut editor, 420.0, 370.0);

    assert_eq!(editor.controller.selection(), &[id]);
    assert_eq!(anchor(&editor, id), (42.0, 37.0));
    assert_eq!(editor.revision(), 0);
}

#[test]
fn drag_near_center_snaps_and_raises_indicator() {
    let a = layer("snap", 40.0, 30.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);

    editor.handle_event(&InputEvent::pointer_down(400.0, 300.0));
    // +9.2% puts x at 49.2, within 1.5 of the center line.
    editor.handle_event(&InputEvent::pointer_move(492.0, 300.0));

    assert_eq!(anchor(&editor, id).0, 50.0);
    assert!(editor.controller.snap().horizontal);
    assert!(!editor.controller.snap().vertical);

    // Leaving the threshold clears the indicator.
    editor.handle_event(&InputEvent::pointer_move(600.0, 300.0));
    assert!(!editor.controller.snap().horizontal);
    assert!((anchor(&editor, id).0 - 60.0).abs() < 1e-3);

    editor.handle_event(&InputEvent::pointer_up(600.0, 300.0));
    assert_eq!(editor.controller.phase(), GesturePhase::Idle);
    assert!(!editor.controller.snap().any());
}

#[test]
fn drag_stays_inside_slide_for_extreme_deltas() {
    let deltas = [
        (-5000.0, 0.0),
        (5000.0, 0.0),
        (0.0, -5000.0),
        (0.0, 5000.0),
        (3000.0, -3000.0),
        (-480.0, 470.0),
        (123.0, -456.0),
    ];
    for align in [TextAlign::Center, TextAlign::Left, TextAlign::Right] {
        let mut a = layer("contained text", 50.0, 50.0);
        a.align = Some(align);
        let id = a.id;
        let mut editor = editor_with(vec![a]);

        for (dx, dy) in deltas {
            let (gx, gy) = content_center(&editor, id);
            editor.handle_event(&InputEvent::pointer_down(gx, gy));
            editor.handle_event(&InputEvent::pointer_move(gx + dx, gy + dy));
            editor.handle_event(&InputEvent::pointer_up(gx + dx, gy + dy));

            let geo = editor
                .geometry()
                .iter()
                .find(|g| g.layer_id == id)
                .unwrap();
            let b = geo.padded_bounds();
            let eps = 1e-2;
            assert!(
                b.x >= -eps && b.right() <= VIEWPORT.width + eps,
                "{align:?} delta ({dx}, {dy}): box x {}..{}",
                b.x,
                b.right()
            );
            assert!(
                b.y >= -eps && b.bottom() <= VIEWPORT.height + eps,
                "{align:?} delta ({dx}, {dy}): box y {}..{}",
                b.y,
                b.bottom()
            );

            // Put it back in the middle for the next gesture.
            let centered = editor
                .slide()
                .with_layer_replaced(layer_at(editor.slide(), id, 50.0, 50.0))
                .unwrap();
            editor.replace_slide(centered);
        }
    }
}

#[test]
fn aligned_layers_reach_their_own_slide_edge() {
    let mut left = layer("flush", 50.0, 30.0);
    left.align = Some(TextAlign::Left);
    let mut right = layer("flush", 50.0, 70.0);
    right.align = Some(TextAlign::Right);
    let (il, ir) = (left.id, right.id);
    let mut editor = editor_with(vec![left, right]);

    for (id, dx) in [(il, -5000.0), (ir, 5000.0)] {
        let (gx, gy) = content_center(&editor, id);
        editor.handle_event(&InputEvent::pointer_down(gx, gy));
        editor.handle_event(&InputEvent::pointer_move(gx + dx, gy));
        editor.handle_event(&InputEvent::pointer_up(gx + dx, gy));
    }

    let padded = |id| {
        let geo = editor.geometry().iter().find(|g| g.layer_id == id).unwrap();
        geo.padded_bounds()
    };
    assert!(padded(il).x.abs() < 1e-2, "left-aligned box at {}", padded(il).x);
    assert!(
        (padded(ir).right() - VIEWPORT.width).abs() < 1e-2,
        "right-aligned box ends at {}",
        padded(ir).right()
    );
}

fn content_center(editor: &SlideEditor<MonospaceMetrics>, id: LayerId) -> (f32, f32) {
    let geo = editor.geometry().iter().find(|g| g.layer_id == id).unwrap();
    let b = geo.content_bounds;
    (b.x + b.width / 2.0, b.y + b.height / 2.0)
}

fn layer_at(slide: &Slide, id: LayerId, x: f32, y: f32) -> TextLayer {
    let mut l = slide.layer(id).unwrap().clone();
    l.x = Some(x);
    l.y = Some(y);
    l
}

#[test]
fn unconstrained_slide_allows_edge_overhang() {
    let a = layer("loose", 50.0, 50.0);
    let id = a.id;
    let mut slide = Slide::new().with_layers(vec![a]);
    slide.settings.constrain_to_slide = false;
    let mut editor = SlideEditor::new(slide, MonospaceMetrics::default(), InteractionConfig::default());
    editor.set_viewport(VIEWPORT.width, VIEWPORT.height);

    editor.handle_event(&InputEvent::pointer_down(500.0, 500.0));
    editor.handle_event(&InputEvent::pointer_move(-2000.0, 500.0));
    assert_eq!(anchor(&editor, id).0, 0.0);
}

#[test]
fn multi_selection_moves_together_without_snapping() {
    let a = layer("first", 30.0, 30.0);
    let b = layer("second", 70.0, 70.0);
    let (ia, ib) = (a.id, b.id);
    let mut editor = editor_with(vec![a, b]);

    click(&mut editor, 300.0, 300.0);
    editor.handle_event(&InputEvent::PointerDown {
        x: 700.0,
        y: 700.0,
        modifiers: Modifiers::SHIFT,
    });
    editor.handle_event(&InputEvent::pointer_up(700.0, 700.0));
    assert_eq!(editor.controller.selection().len(), 2);

    // Pointer-down on an already selected layer keeps the multi-selection.
    editor.handle_event(&InputEvent::pointer_down(300.0, 300.0));
    editor.handle_event(&InputEvent::pointer_move(495.0, 300.0));
    assert!((anchor(&editor, ia).0 - 49.5).abs() < 1e-3);
    assert!((anchor(&editor, ib).0 - 89.5).abs() < 1e-3);
    assert!(!editor.controller.snap().any());
}

#[test]
fn pointer_down_on_unselected_layer_replaces_selection() {
    let a = layer("first", 30.0, 30.0);
    let b = layer("second", 70.0, 70.0);
    let ib = b.id;
    let mut editor = editor_with(vec![a, b]);

    let cmd = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    editor.handle_event(&InputEvent::key("a", cmd));
    assert_eq!(editor.controller.selection().len(), 2);
    editor.handle_event(&InputEvent::key("Escape", Modifiers::NONE));
    click(&mut editor, 700.0, 700.0);
    assert_eq!(editor.controller.selection(), &[ib]);
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn right_handle_resize_keeps_left_edge() {
    let a = layer("resizable", 50.0, 50.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 500.0, 500.0);

    // Wrap box is 80% wide: handles at x = 100 and x = 900.
    editor.handle_event(&InputEvent::pointer_down(900.0, 500.0));
    assert_eq!(editor.controller.phase(), GesturePhase::Resizing);
    editor.handle_event(&InputEvent::pointer_move(500.0, 500.0));

    let l = editor.slide().layer(id).unwrap();
    assert!((l.width - 40.0).abs() < 1e-3, "width {}", l.width);
    // New x = (left edge + new width / 2) / W × 100 = (100 + 200) / 1000 × 100.
    assert!((l.x.unwrap() - 30.0).abs() < 1e-3, "x {:?}", l.x);

    let geo = editor.geometry().iter().find(|g| g.layer_id == id).unwrap();
    assert!((geo.bounds.x - 100.0).abs() < 1e-2, "left edge {}", geo.bounds.x);
    assert_eq!(l.y, Some(50.0));
    assert_eq!(l.font_size, Some(20.0));
}

#[test]
fn left_handle_resize_keeps_right_edge() {
    let a = layer("resizable", 50.0, 50.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 500.0, 500.0);

    editor.handle_event(&InputEvent::pointer_down(100.0, 500.0));
    for x in [150.0, 320.0, 610.0, 880.0, -50.0] {
        editor.handle_event(&InputEvent::pointer_move(x, 500.0));
        let geo = editor.geometry().iter().find(|g| g.layer_id == id).unwrap();
        assert!(
            (geo.bounds.right() - 900.0).abs() < 1e-2,
            "pointer {x}: right edge {}",
            geo.bounds.right()
        );
    }
}

#[test]
fn resize_respects_minimum_width() {
    let a = layer("narrow", 50.0, 50.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 500.0, 500.0);

    editor.handle_event(&InputEvent::pointer_down(900.0, 500.0));
    editor.handle_event(&InputEvent::pointer_move(0.0, 500.0));
    let l = editor.slide().layer(id).unwrap();
    assert!((l.width - 10.0).abs() < 1e-3, "width {}", l.width);
}

#[test]
fn resize_clamps_moving_edge_to_surface() {
    let a = layer("wide", 50.0, 50.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 500.0, 500.0);

    editor.handle_event(&InputEvent::pointer_down(900.0, 500.0));
    editor.handle_event(&InputEvent::pointer_move(1400.0, 500.0));
    let geo = editor.geometry().iter().find(|g| g.layer_id == id).unwrap();
    assert!((geo.bounds.right() - 1000.0).abs() < 1e-2);
    assert!((geo.bounds.x - 100.0).abs() < 1e-2);
}

fn wide_layer(content: &str, x: f32, width: f32) -> TextLayer {
    let mut layer = layer(content, x, 50.0);
    layer.width = width;
    layer
}

fn bounds_of(editor: &SlideEditor<MonospaceMetrics>, id: LayerId) -> (f32, f32) {
    let geo = editor.geometry().iter().find(|g| g.layer_id == id).unwrap();
    (geo.bounds.x, geo.bounds.right())
}

#[test]
fn resize_keeps_fixed_edge_past_left_slide_edge() {
    // Wrap box spans -300..500.
    let a = wide_layer("edge", 10.0, 80.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 100.0, 500.0);

    editor.handle_event(&InputEvent::pointer_down(500.0, 500.0));
    assert_eq!(editor.controller.phase(), GesturePhase::Resizing);
    for x in [0.0, 200.0, -400.0] {
        editor.handle_event(&InputEvent::pointer_move(x, 500.0));
        let (left, _) = bounds_of(&editor, id);
        assert!((left + 300.0).abs() < 1e-2, "pointer {x}: left edge {left}");
    }
    let l = editor.slide().layer(id).unwrap();
    assert!((l.x.unwrap() - 0.0).abs() < 1e-3, "x {:?}", l.x);
    assert!((l.width - 60.0).abs() < 1e-3, "width {}", l.width);
}

#[test]
fn resize_keeps_fixed_edge_past_right_slide_edge() {
    // Wrap box spans 500..1300.
    let a = wide_layer("edge", 90.0, 80.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 900.0, 500.0);

    editor.handle_event(&InputEvent::pointer_down(500.0, 500.0));
    assert_eq!(editor.controller.phase(), GesturePhase::Resizing);
    editor.handle_event(&InputEvent::pointer_move(1000.0, 500.0));
    let (_, right) = bounds_of(&editor, id);
    assert!((right - 1300.0).abs() < 1e-2, "right edge {right}");
    assert_eq!(editor.slide().layer(id).unwrap().x, Some(100.0));
}

#[test]
fn unconstrained_resize_keeps_fixed_edge() {
    // Wrap box spans 600..1000.
    let a = wide_layer("loose", 80.0, 40.0);
    let id = a.id;
    let mut slide = Slide::new().with_layers(vec![a]);
    slide.settings.constrain_to_slide = false;
    let mut editor = SlideEditor::new(slide, MonospaceMetrics::default(), InteractionConfig::default());
    editor.set_viewport(VIEWPORT.width, VIEWPORT.height);
    click(&mut editor, 800.0, 500.0);

    editor.handle_event(&InputEvent::pointer_down(1000.0, 500.0));
    editor.handle_event(&InputEvent::pointer_move(1500.0, 500.0));
    let (left, right) = bounds_of(&editor, id);
    assert!((left - 600.0).abs() < 1e-2, "left edge {left}");
    assert!((right - 1400.0).abs() < 1e-2, "right edge {right}");
}

// ─── Keyboard & history ──────────────────────────────────────────────────

#[test]
fn delete_key_removes_selected_layers() {
    let a = layer("keep", 30.0, 30.0);
    let b = layer("drop", 70.0, 70.0);
    let (ia, ib) = (a.id, b.id);
    let mut editor = editor_with(vec![a, b]);
    click(&mut editor, 700.0, 700.0);

    assert!(editor.handle_event(&InputEvent::key("Backspace", Modifiers::NONE)));
    assert!(editor.slide().layer(ib).is_none());
    assert!(editor.slide().layer(ia).is_some());
    assert!(editor.controller.selection().is_empty());
}

#[test]
fn arrow_keys_nudge_selection() {
    let a = layer("nudge", 50.0, 50.0);
    let id = a.id;
    let mut editor = editor_with(vec![a]);
    click(&mut editor, 500.0, 500.0);

    editor.handle_event(&InputEvent::key("ArrowUp", Modifiers::SHIFT));
    editor.handle_event(&InputEvent::key("ArrowRight", Modifiers::NONE));
    let (x, y) = anchor(&editor, id);
    assert!((x - 50.2).abs() < 1e-4 && (y - 48.0).abs() < 1e-4, "({x}, {y})");
}

#[test]
fn history_receives_every_committed_revision() {
    let seen = Rc::new(RefCell::new(Vec::<Slide>::new()));
    let sink = Rc::clone(&seen);

    let a = layer("tracked", 30.0, 30.0);
    let slide = Slide::new().with_layers(vec![a]);
    let mut editor = SlideEditor::new(slide, MonospaceMetrics::default(), InteractionConfig::default())
        .with_history(move |s: &Slide| sink.borrow_mut().push(s.clone()));
    editor.set_viewport(VIEWPORT.width, VIEWPORT.height);

    editor.handle_event(&InputEvent::pointer_down(300.0, 300.0));
    editor.handle_event(&InputEvent::pointer_move(310.0, 300.0));
    editor.handle_event(&InputEvent::pointer_move(320.0, 300.0));
    editor.handle_event(&InputEvent::pointer_up(320.0, 300.0));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen.last(), Some(editor.slide()));
    assert_eq!(editor.revision(), 2);
}

#[test]
fn gestures_are_ignored_until_surface_has_size() {
    let a = layer("early", 50.0, 50.0);
    let id = a.id;
    let slide = Slide::new().with_layers(vec![a]);
    let mut editor = SlideEditor::new(slide, MonospaceMetrics::default(), InteractionConfig::default());

    assert!(editor.geometry().is_empty());
    editor.handle_event(&InputEvent::pointer_down(500.0, 500.0));
    assert!(!editor.handle_event(&InputEvent::pointer_move(600.0, 500.0)));
    assert_eq!(anchor(&editor, id), (50.0, 50.0));
}
