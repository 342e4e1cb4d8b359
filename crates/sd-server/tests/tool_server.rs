//! Integration tests: the tool surface end to end, request line in, reply out.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;
use sd_core::Deck;
use sd_server::tools::build_renderer;
use sd_server::{ServerConfig, ToolServer, export_deck};
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::Arc;

const DECK_JSON: &str = include_str!("../../sd-core/tests/fixtures/deck.json");

fn fixture_deck() -> Deck {
    serde_json::from_str(DECK_JSON).unwrap()
}

fn server() -> ToolServer {
    ToolServer::with_renderer(fixture_deck(), None)
}

async fn call(server: &mut ToolServer, tool: &str, args: Value) -> Value {
    let line = json!({ "tool": tool, "args": args }).to_string();
    server.handle_line(&line).await
}

fn slide_order(server: &ToolServer) -> Vec<String> {
    server
        .deck()
        .slides
        .iter()
        .map(|s| s.id.as_str().to_string())
        .collect()
}

// ─── Slides ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_slide_at_index() {
    let mut s = server();
    let reply = call(&mut s, "create_slide", json!({ "index": 0, "background": "bg.png" })).await;
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["index"], 0);

    let id = reply["slideId"].as_str().unwrap().to_string();
    assert_eq!(slide_order(&s), vec![id, "intro".into(), "outro".into()]);
    assert_eq!(s.deck().slides[0].background.as_deref(), Some("bg.png"));
}

#[tokio::test]
async fn create_slide_without_args_appends() {
    let mut s = server();
    let reply = s.handle_line(r#"{"tool":"create_slide"}"#).await;
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["index"], 2);
}

#[tokio::test]
async fn duplicate_then_reorder_then_delete() {
    let mut s = server();
    let dup = call(&mut s, "duplicate_slide", json!({ "slideId": "intro" })).await;
    let copy = dup["slideId"].as_str().unwrap().to_string();
    assert_eq!(slide_order(&s), vec!["intro".to_string(), copy.clone(), "outro".into()]);

    let reply = call(&mut s, "reorder_slide", json!({ "from": 2, "to": 0 })).await;
    assert_eq!(reply["slides"], json!(["outro", "intro", copy]));

    let reply = call(&mut s, "delete_slide", json!({ "slideId": "intro" })).await;
    assert_eq!(reply["remaining"], 2);
    assert_eq!(slide_order(&s), vec!["outro".to_string(), copy]);
}

#[tokio::test]
async fn reorder_out_of_bounds_is_reported() {
    let mut s = server();
    let reply = call(&mut s, "reorder_slide", json!({ "from": 0, "to": 7 })).await;
    assert_eq!(reply["code"], "out_of_bounds");
    assert!(reply["error"].as_str().unwrap().contains('7'));
    assert_eq!(slide_order(&s), vec!["intro".to_string(), "outro".into()]);
}

#[tokio::test]
async fn missing_slide_is_not_found() {
    let mut s = server();
    let reply = call(&mut s, "delete_slide", json!({ "slideId": "nope" })).await;
    assert_eq!(reply["code"], "not_found");
    assert!(reply.get("status").is_none());
}

// ─── Layers & styling ────────────────────────────────────────────────────

#[tokio::test]
async fn add_update_delete_layer() {
    let mut s = server();
    let reply = call(
        &mut s,
        "add_layer",
        json!({ "slideId": "outro", "kind": "subtext", "content": "see you", "y": 80 }),
    )
    .await;
    let layer_id = reply["layerId"].as_str().unwrap().to_string();

    let reply = call(
        &mut s,
        "update_layer",
        json!({
            "slideId": "outro",
            "layerId": layer_id,
            "content": "see you soon",
            "width": 500,
            "align": "left"
        }),
    )
    .await;
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["layer"]["content"], "see you soon");
    // Width is normalized into [5, 100].
    assert_eq!(reply["layer"]["width"], 100.0);
    assert_eq!(reply["layer"]["align"], "left");
    assert_eq!(reply["layer"]["y"], 80.0);

    let reply = call(
        &mut s,
        "delete_layer",
        json!({ "slideId": "outro", "layerId": layer_id }),
    )
    .await;
    assert_eq!(reply["status"], "ok");
    let again = call(
        &mut s,
        "delete_layer",
        json!({ "slideId": "outro", "layerId": layer_id }),
    )
    .await;
    assert_eq!(again["code"], "not_found");
}

#[tokio::test]
async fn set_background_and_filter() {
    let mut s = server();
    let reply = call(&mut s, "set_background", json!({ "slideId": "outro", "background": "night.png" })).await;
    assert_eq!(reply["background"], "night.png");

    let reply = call(
        &mut s,
        "apply_filter",
        json!({ "slideId": "outro", "grayscale": true, "brightness": 80, "imageOffsetY": 140 }),
    )
    .await;
    assert_eq!(reply["effects"]["enabled"], true);
    assert_eq!(reply["effects"]["imageOffsetY"], 100.0);
    assert_eq!(
        reply["cssFilter"],
        "grayscale(100%) brightness(80%) contrast(100%) saturate(100%)"
    );
}

#[tokio::test]
async fn update_settings_patches_slide_text_settings() {
    let mut s = server();
    let reply = call(
        &mut s,
        "update_settings",
        json!({
            "slideId": "intro",
            "constrainToSlide": false,
            "fontScale": 1.5,
            "shadow": false,
            "strokeWidth": 4
        }),
    )
    .await;
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["settings"]["constrainToSlide"], false);

    let settings = &s.deck().slides[0].settings;
    assert!(!settings.constrain_to_slide);
    assert!(!settings.shadow);
    assert_eq!(settings.font_scale, 1.5);
    assert_eq!(settings.stroke_width, 4.0);

    let reply = call(&mut s, "update_settings", json!({ "slideId": "nope" })).await;
    assert_eq!(reply["code"], "not_found");
}

#[tokio::test]
async fn load_and_get_deck_round_trip() {
    let mut s = ToolServer::with_renderer(Deck::new(), None);
    let reply = call(&mut s, "load_deck", json!({ "deck": serde_json::from_str::<Value>(DECK_JSON).unwrap() })).await;
    assert_eq!(reply["slides"], json!(["intro", "outro"]));

    let reply = call(&mut s, "get_deck", Value::Null).await;
    let deck: Deck = serde_json::from_value(reply["deck"].clone()).unwrap();
    assert_eq!(deck, *s.deck());
}

// ─── Boundary errors ─────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let mut s = server();
    let reply = call(&mut s, "make_coffee", json!({})).await;
    assert_eq!(reply["code"], "not_found");
    assert!(reply["error"].as_str().unwrap().contains("make_coffee"));
}

#[tokio::test]
async fn malformed_requests_become_errors() {
    let mut s = server();
    let reply = s.handle_line("{not json").await;
    assert_eq!(reply["code"], "invalid_request");

    let reply = call(&mut s, "reorder_slide", json!({ "from": "first" })).await;
    assert_eq!(reply["code"], "invalid_args");
}

#[tokio::test]
async fn render_without_fonts_is_unavailable() {
    let mut s = server();
    let reply = call(&mut s, "render_slide", json!({ "slideId": "intro" })).await;
    assert_eq!(reply["code"], "unavailable");
}

// ─── Rendering (needs at least one installed font) ───────────────────────

fn renderer() -> Option<Arc<sd_render::RasterRenderer>> {
    build_renderer(&ServerConfig::default()).ok().map(Arc::new)
}

#[tokio::test]
async fn render_slide_returns_png() {
    let Some(renderer) = renderer() else {
        eprintln!("no fonts installed; skipping");
        return;
    };
    let mut s = ToolServer::with_renderer(fixture_deck(), Some(renderer));
    let reply = call(&mut s, "render_slide", json!({ "slideId": "outro", "aspect": "1:1" })).await;
    assert_eq!(reply["status"], "ok");
    assert_eq!((reply["width"].clone(), reply["height"].clone()), (json!(1080), json!(1080)));

    let png = STANDARD.decode(reply["data"].as_str().unwrap()).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn export_writes_one_png_per_slide() {
    let Some(renderer) = renderer() else {
        eprintln!("no fonts installed; skipping");
        return;
    };
    let deck = fixture_deck();
    let archive = export_deck(renderer, deck.slides, sd_core::AspectRatio::Square1x1)
        .await
        .unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["1.png".to_string(), "2.png".to_string()]);
    assert!(zip.by_name("1.png").unwrap().size() > 0);
}
