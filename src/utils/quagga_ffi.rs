// ============================================================================
// QUAGGA FFI - Foreign Function Interface para QuaggaJS
// ============================================================================
// Wrappers del objeto global `Quagga` - Sin estado, sin lógica
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

// Con `catch`: si `Quagga` no está cargado o rechaza la config, la
// excepción llega como Err en vez de desenrollar el future que llama
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = Quagga, js_name = init)]
    pub fn quagga_init(config: &JsValue, callback: &js_sys::Function) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = Quagga, js_name = start)]
    pub fn quagga_start() -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = Quagga, js_name = pause)]
    pub fn quagga_pause() -> Result<(), JsValue>;

    /// Algunas versiones devuelven una Promise
    #[wasm_bindgen(catch, js_namespace = Quagga, js_name = stop)]
    pub fn quagga_stop() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = Quagga, js_name = onProcessed)]
    pub fn quagga_on_processed(callback: &js_sys::Function) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = Quagga, js_name = offProcessed)]
    pub fn quagga_off_processed(callback: &js_sys::Function) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["Quagga", "ImageDebug"], js_name = drawPath)]
    pub fn quagga_draw_path(
        path: &JsValue,
        def: &JsValue,
        ctx: &CanvasRenderingContext2d,
        style: &JsValue,
    ) -> Result<(), JsValue>;
}

/// Helper: leer `Quagga.canvas.<group>.<name>`
fn quagga_canvas_field(group: &str, name: &str) -> Option<JsValue> {
    let global = js_sys::global();
    let quagga = js_sys::Reflect::get(&global, &JsValue::from_str("Quagga")).ok()?;
    let canvas = js_sys::Reflect::get(&quagga, &JsValue::from_str("canvas")).ok()?;
    let group = js_sys::Reflect::get(&canvas, &JsValue::from_str(group)).ok()?;
    let value = js_sys::Reflect::get(&group, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Canvas DOM de Quagga: `image` (frame) u `overlay` (debug)
pub fn quagga_dom_canvas(name: &str) -> Option<HtmlCanvasElement> {
    quagga_canvas_field("dom", name)?.dyn_into().ok()
}

/// Contexto 2D de un canvas de Quagga
pub fn quagga_context(name: &str) -> Option<CanvasRenderingContext2d> {
    quagga_canvas_field("ctx", name)?.dyn_into().ok()
}
