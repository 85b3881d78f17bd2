use std::cell::RefCell;

use async_trait::async_trait;
use futures::channel::oneshot;
use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, Element};

use super::quagga::parse_frame_json;
use super::{DetectionEngine, EngineInit, FrameHandler, Point, RenderHost};
use crate::capture::{CaptureSurface, ImageCapture};
use crate::config::{CaptureOptions, DrawStyle, ViewportTarget};
use crate::dom::{append_child, create_element, describe_js_error, head, query_selector, set_display, set_text_content};
use crate::error::{Result, ScannerError};
use crate::utils::quagga_ffi;

fn json_to_js(value: &serde_json::Value) -> std::result::Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&text)
}

/// Motor de detección usando QuaggaJS
pub struct QuaggaEngine {
    processed: RefCell<Option<Closure<dyn FnMut(JsValue)>>>,
}

impl QuaggaEngine {
    pub fn new() -> Self {
        Self {
            processed: RefCell::new(None),
        }
    }
}

impl Default for QuaggaEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl DetectionEngine for QuaggaEngine {
    type Target = Element;
    type Image = Blob;

    async fn init(&self, init: EngineInit<'_, Element>) -> Result<()> {
        let config = json_to_js(&init.settings.engine_config(init.readers))
            .map_err(|e| ScannerError::EngineInit(describe_js_error(&e)))?;

        // Inyectar el elemento destino en inputStream.target
        let input_stream = js_sys::Reflect::get(&config, &JsValue::from_str("inputStream"))
            .map_err(|e| ScannerError::EngineInit(describe_js_error(&e)))?;
        js_sys::Reflect::set(&input_stream, &JsValue::from_str("target"), init.target)
            .map_err(|e| ScannerError::EngineInit(describe_js_error(&e)))?;

        let (sender, receiver) = oneshot::channel::<Result<()>>();
        let callback = Closure::once_into_js(move |err: JsValue| {
            let outcome = if err.is_null() || err.is_undefined() {
                Ok(())
            } else {
                Err(ScannerError::EngineInit(describe_js_error(&err)))
            };
            let _ = sender.send(outcome);
        });

        log::info!("📷 Inicializando QuaggaJS con {} lectores", init.readers.len());
        quagga_ffi::quagga_init(&config, callback.unchecked_ref())
            .map_err(|e| ScannerError::EngineInit(describe_js_error(&e)))?;

        receiver
            .await
            .unwrap_or_else(|_| Err(ScannerError::EngineInit("init callback dropped".to_string())))
    }

    fn start(&self) {
        if let Err(e) = quagga_ffi::quagga_start() {
            log::warn!("⚠️ Quagga.start() falló: {}", describe_js_error(&e));
        }
    }

    fn pause(&self) {
        if let Err(e) = quagga_ffi::quagga_pause() {
            log::warn!("⚠️ Quagga.pause() falló: {}", describe_js_error(&e));
        }
    }

    async fn stop(&self) {
        match quagga_ffi::quagga_stop() {
            Ok(result) => {
                if let Some(promise) = result.dyn_ref::<js_sys::Promise>() {
                    if let Err(e) = JsFuture::from(promise.clone()).await {
                        log::warn!("⚠️ Quagga.stop() falló: {}", describe_js_error(&e));
                    }
                }
            }
            Err(e) => log::warn!("⚠️ Quagga.stop() falló: {}", describe_js_error(&e)),
        }
        log::info!("⏹️ QuaggaJS detenido");
    }

    fn on_processed(&self, handler: FrameHandler) {
        self.off_processed();

        let closure = Closure::wrap(Box::new(move |result: JsValue| {
            let json = js_sys::JSON::stringify(&result)
                .ok()
                .and_then(|s| s.as_string())
                .unwrap_or_default();
            match parse_frame_json(&json) {
                Ok(frame) => handler(frame.as_ref()),
                Err(e) => log::debug!("{}", e),
            }
        }) as Box<dyn FnMut(JsValue)>);

        if let Err(e) = quagga_ffi::quagga_on_processed(closure.as_ref().unchecked_ref()) {
            log::warn!("⚠️ Quagga.onProcessed() falló: {}", describe_js_error(&e));
        }
        *self.processed.borrow_mut() = Some(closure);
    }

    fn off_processed(&self) {
        // Soltar la closure sólo después de desregistrarla
        if let Some(closure) = self.processed.borrow_mut().take() {
            if let Err(e) = quagga_ffi::quagga_off_processed(closure.as_ref().unchecked_ref()) {
                log::warn!("⚠️ Quagga.offProcessed() falló: {}", describe_js_error(&e));
            }
        }
    }

    fn clear_overlay(&self) {
        let (Some(ctx), Some(canvas)) = (
            quagga_ffi::quagga_context("overlay"),
            quagga_ffi::quagga_dom_canvas("overlay"),
        ) else {
            return;
        };
        ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    }

    fn draw_path(&self, path: &[Point], style: &DrawStyle) {
        let Some(ctx) = quagga_ffi::quagga_context("overlay") else {
            return;
        };

        let points = js_sys::Array::new();
        for point in path {
            let js_point = js_sys::Object::new();
            let _ = js_sys::Reflect::set(&js_point, &"x".into(), &JsValue::from_f64(point.x));
            let _ = js_sys::Reflect::set(&js_point, &"y".into(), &JsValue::from_f64(point.y));
            points.push(&js_point);
        }

        let def = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&def, &"x".into(), &"x".into());
        let _ = js_sys::Reflect::set(&def, &"y".into(), &"y".into());

        let drawn = serde_json::to_value(style)
            .map_err(|e| JsValue::from_str(&e.to_string()))
            .and_then(|v| json_to_js(&v))
            .and_then(|js_style| quagga_ffi::quagga_draw_path(&points, &def, &ctx, &js_style));
        if let Err(e) = drawn {
            log::debug!("no se pudo dibujar el overlay: {}", describe_js_error(&e));
        }
    }

    fn capture(&self, surface: CaptureSurface, options: &CaptureOptions) -> ImageCapture<Blob> {
        let name = match surface {
            CaptureSurface::Frame => "image",
            CaptureSurface::Overlay => "overlay",
        };
        let Some(canvas) = quagga_ffi::quagga_dom_canvas(name) else {
            return ImageCapture::failed(ScannerError::CaptureFailed(format!("canvas '{}' not available", name)));
        };

        let (sender, capture) = ImageCapture::pending();
        // Recibe el Blob, `null` si el canvas no produjo nada, o el error de toBlob
        let callback = Closure::once_into_js(move |value: JsValue| match value.dyn_into::<Blob>() {
            Ok(blob) => sender.resolve(blob),
            Err(value) if value.is_null() || value.is_undefined() => {
                sender.reject(ScannerError::CaptureFailed("canvas produced no blob".to_string()))
            }
            Err(error) => sender.reject(ScannerError::CaptureFailed(describe_js_error(&error))),
        });

        if let Err(e) = canvas.to_blob_with_type_and_encoder_options(
            callback.unchecked_ref(),
            options.format.mime_type(),
            &JsValue::from_f64(options.quality),
        ) {
            log::warn!("⚠️ toBlob falló: {}", describe_js_error(&e));
            // toBlob lanzó: el callback no se llamará nunca, así que se invoca aquí con el error
            let _ = callback.unchecked_ref::<js_sys::Function>().call1(&JsValue::NULL, &e);
        }
        capture
    }
}

impl Drop for QuaggaEngine {
    fn drop(&mut self) {
        self.off_processed();
    }
}

/// Host de render sobre el DOM del navegador
#[derive(Clone, Copy, Debug, Default)]
pub struct DomHost;

impl RenderHost for DomHost {
    type Element = Element;

    fn resolve(&self, target: &ViewportTarget<Element>) -> Result<Element> {
        match target {
            ViewportTarget::Element(element) if element.is_connected() => Ok(element.clone()),
            ViewportTarget::Element(_) => Err(ScannerError::ViewportNotFound(target.describe())),
            ViewportTarget::Selector(selector) => query_selector(selector)
                .map_err(|_| ScannerError::InvalidSelector(selector.clone()))?
                .ok_or_else(|| ScannerError::ViewportNotFound(selector.clone())),
        }
    }

    fn element_id(&self, element: &Element) -> Option<String> {
        let id = element.id();
        (!id.is_empty()).then_some(id)
    }

    fn insert_style_rules(&self, rules: &[String]) -> Result<()> {
        let head = head().ok_or_else(|| ScannerError::Dom("No <head> element".to_string()))?;
        let style = create_element("style").map_err(|e| ScannerError::Dom(describe_js_error(&e)))?;
        set_text_content(&style, &rules.join("\n"));
        append_child(&head, &style).map_err(|e| ScannerError::Dom(describe_js_error(&e)))
    }

    fn set_visible(&self, element: &Element, visible: bool) {
        if let Err(e) = set_display(element, visible) {
            log::warn!("⚠️ No se pudo cambiar la visibilidad: {}", describe_js_error(&e));
        }
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, callback).forget();
    }
}
