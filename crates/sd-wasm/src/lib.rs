//! WASM bridge for SlideDraft: exposes the slide editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the
//! `<canvas>`, loads background images, and forwards pointer/keyboard
//! events; everything else (layout, hit testing, gestures, painting) runs
//! here.

mod export;
mod metrics;
mod render2d;

pub use export::{export_slide_png, export_viewport};
pub use metrics::CanvasMetrics;

use sd_core::Slide;
use sd_editor::{InputEvent, InteractionConfig, Modifiers, SlideEditor};
use sd_render::RenderOptions;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// The WASM-facing surface controller for one slide.
#[wasm_bindgen]
pub struct SdCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    editor: SlideEditor<CanvasMetrics>,
    background: Option<HtmlImageElement>,
    options: RenderOptions,
}

#[wasm_bindgen]
impl SdCanvas {
    /// Bind to `canvas`. Fails if the canvas has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<SdCanvas, JsValue> {
        install_console_hooks();

        let ctx = metrics::context_2d(&canvas).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let metrics = CanvasMetrics::from_context(ctx.clone());
        let mut editor = SlideEditor::new(Slide::new(), metrics, InteractionConfig::default());
        editor.set_viewport(canvas.width() as f32, canvas.height() as f32);

        Ok(Self {
            canvas,
            ctx,
            editor,
            background: None,
            options: RenderOptions::default(),
        })
    }

    /// Replace the interaction tunables from camelCase JSON.
    pub fn set_config_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<InteractionConfig>(json) {
            Ok(config) => {
                self.editor.controller.config = config;
                true
            }
            Err(e) => {
                log::warn!("ignoring interaction config: {e}");
                false
            }
        }
    }

    /// Show a different slide. Clears selection; history is not notified.
    pub fn load_slide_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Slide>(json) {
            Ok(slide) => {
                self.editor.load_slide(slide);
                true
            }
            Err(e) => {
                log::warn!("rejected slide JSON: {e}");
                false
            }
        }
    }

    /// Commit an edited revision of the current slide (style panel writes).
    pub fn replace_slide_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Slide>(json) {
            Ok(slide) => {
                self.editor.replace_slide(slide);
                true
            }
            Err(e) => {
                log::warn!("rejected slide JSON: {e}");
                false
            }
        }
    }

    pub fn get_slide_json(&self) -> String {
        serde_json::to_string(self.editor.slide()).unwrap_or_default()
    }

    /// A loaded `<img>` for the slide background, or `undefined` to clear.
    pub fn set_background_image(&mut self, image: Option<HtmlImageElement>) {
        self.background = image;
    }

    /// Resize the drawing surface (layout pixels, before CSS zoom).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
        // Resizing resets the context state, font included.
        self.editor.metrics().invalidate();
        self.editor.set_viewport(width as f32, height as f32);
    }

    /// Visual zoom applied by the host (CSS transform scale).
    pub fn set_zoom(&mut self, zoom: f64) {
        self.editor.controller.set_zoom(zoom as f32);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Pointer pressed at screen coordinates relative to the canvas.
    /// Returns true if the slide changed.
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        alt: bool,
        ctrl: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers {
            shift,
            alt,
            ctrl,
            meta,
        };
        self.editor.handle_event(&InputEvent::PointerDown {
            x: x as f32,
            y: y as f32,
            modifiers,
        })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.editor
            .handle_event(&InputEvent::pointer_move(x as f32, y as f32))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.editor
            .handle_event(&InputEvent::pointer_up(x as f32, y as f32))
    }

    /// Capture lost: abandon the gesture.
    pub fn pointer_cancel(&mut self) {
        self.editor.handle_event(&InputEvent::PointerCancel);
    }

    /// `KeyboardEvent.key` plus modifiers. Returns true if the slide changed.
    pub fn handle_key(&mut self, key: &str, shift: bool, alt: bool, ctrl: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            alt,
            ctrl,
            meta,
        };
        self.editor.handle_event(&InputEvent::key(key, modifiers))
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Paint the slide plus selection chrome.
    pub fn render(&self) {
        let viewport = self.editor.viewport();
        if viewport.is_empty() {
            return;
        }
        render2d::paint_slide(
            &self.ctx,
            self.editor.slide(),
            self.editor.geometry(),
            viewport,
            self.background.as_ref(),
            self.options.fallback_background,
        );
        render2d::paint_overlay(
            &self.ctx,
            self.editor.geometry(),
            self.editor.controller.selection(),
            self.editor.controller.snap(),
            viewport,
        );
        // Painting leaves the last layer's font on the shared context.
        self.editor.metrics().invalidate();
    }

    /// Selected layer IDs as a JSON array.
    pub fn selected_ids(&self) -> String {
        selection_json(self.editor.controller.selection())
    }

    /// Called with the slide JSON after every committed revision.
    pub fn set_history_callback(&mut self, callback: js_sys::Function) {
        self.editor.set_history(move |slide: &Slide| {
            let Ok(json) = serde_json::to_string(slide) else {
                return;
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("history callback threw: {e:?}");
            }
        });
    }
}

fn selection_json(ids: &[sd_core::LayerId]) -> String {
    let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}

/// Set the console log level (`"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("unknown log level `{level}`"),
    }
}

// ─── Console logging & panic hook ────────────────────────────────────────

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
static LOGGER: ConsoleLogger = ConsoleLogger;

fn install_console_hooks() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("SlideDraft WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_core::LayerId;

    #[test]
    fn selection_serializes_as_id_strings() {
        let ids = [LayerId::intern("title"), LayerId::intern("body")];
        assert_eq!(selection_json(&ids), r#"["title","body"]"#);
        assert_eq!(selection_json(&[]), "[]");
    }
}
