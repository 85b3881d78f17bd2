// ============================================================================
// JS BINDINGS - API exportada a JavaScript
// ============================================================================
// `new BarcodeScannerBuilder("#scanner-viewport").addReader("ean_reader")
//      .autoLayout(true).build()` -> BarcodeScanner con start/stop/scanCode
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Element;

use crate::builder::ScannerBuilder;
use crate::config::{DrawStyle, EngineSettings, ImageFormat, ViewportTarget};
use crate::engine::web::{DomHost, QuaggaEngine};
use crate::error::ScannerError;
use crate::scanner::Scanner;
use crate::state::SessionState;
use crate::symbology::Symbology;

type WebScanner = Scanner<QuaggaEngine, DomHost>;

impl From<ScannerError> for JsValue {
    fn from(error: ScannerError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

#[wasm_bindgen(start)]
pub fn start_module() {
    // Inicializar panic hook para mejor debugging
    console_error_panic_hook::set_once();

    // Inicializar logging
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("🚀 barcode-scanner cargado");
}

#[wasm_bindgen(js_name = BarcodeScannerBuilder)]
pub struct JsScannerBuilder {
    inner: ScannerBuilder<Element>,
}

#[wasm_bindgen(js_class = BarcodeScannerBuilder)]
impl JsScannerBuilder {
    /// `viewport`: selector CSS o elemento DOM
    #[wasm_bindgen(constructor)]
    pub fn new(viewport: JsValue) -> Result<JsScannerBuilder, JsValue> {
        let target = if let Some(selector) = viewport.as_string() {
            ViewportTarget::Selector(selector)
        } else {
            let element = viewport
                .dyn_into::<Element>()
                .map_err(|_| JsValue::from_str("viewport must be a selector or an Element"))?;
            ViewportTarget::Element(element)
        };
        Ok(Self {
            inner: ScannerBuilder::new(target),
        })
    }

    #[wasm_bindgen(js_name = addReader)]
    pub fn add_reader(self, name: &str) -> Result<JsScannerBuilder, JsValue> {
        let symbology: Symbology = name.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Ok(Self {
            inner: self.inner.add_reader(symbology),
        })
    }

    #[wasm_bindgen(js_name = autoLayout)]
    pub fn auto_layout(self, enabled: bool) -> JsScannerBuilder {
        Self {
            inner: self.inner.auto_layout(enabled),
        }
    }

    #[wasm_bindgen(js_name = captureImages)]
    pub fn capture_images(self, enabled: bool) -> JsScannerBuilder {
        Self {
            inner: self.inner.capture_images(enabled),
        }
    }

    /// `mime`: "image/png", "image/jpeg" o "image/webp"
    #[wasm_bindgen(js_name = imageFormat)]
    pub fn image_format(self, mime: &str) -> Result<JsScannerBuilder, JsValue> {
        let format = ImageFormat::from_mime_type(mime)
            .ok_or_else(|| JsValue::from_str(&format!("Unsupported image format: {}", mime)))?;
        Ok(Self {
            inner: self.inner.image_format(format),
        })
    }

    #[wasm_bindgen(js_name = imageQuality)]
    pub fn image_quality(self, quality: f64) -> JsScannerBuilder {
        Self {
            inner: self.inner.image_quality(quality),
        }
    }

    /// `validator(code) -> boolean`; una excepción cuenta como rechazo
    pub fn validator(self, validator: js_sys::Function) -> JsScannerBuilder {
        Self {
            inner: self.inner.validator(move |code| {
                validator
                    .call1(&JsValue::NULL, &JsValue::from_str(code))
                    .map(|accepted| accepted.is_truthy())
                    .unwrap_or(false)
            }),
        }
    }

    #[wasm_bindgen(js_name = drawLocated)]
    pub fn draw_located(self, color: &str, line_width: f64) -> JsScannerBuilder {
        Self {
            inner: self.inner.draw_located(DrawStyle::new(color, line_width)),
        }
    }

    #[wasm_bindgen(js_name = drawDetected)]
    pub fn draw_detected(self, color: &str, line_width: f64) -> JsScannerBuilder {
        Self {
            inner: self.inner.draw_detected(DrawStyle::new(color, line_width)),
        }
    }

    #[wasm_bindgen(js_name = drawScanLine)]
    pub fn draw_scan_line(self, color: &str, line_width: f64) -> JsScannerBuilder {
        Self {
            inner: self.inner.draw_scan_line(DrawStyle::new(color, line_width)),
        }
    }

    /// Overrides de la config del motor en JSON
    #[wasm_bindgen(js_name = engineSettings)]
    pub fn engine_settings(self, json: &str) -> Result<JsScannerBuilder, JsValue> {
        let settings = EngineSettings::from_json(json).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self {
            inner: self.inner.engine_settings(settings),
        })
    }

    pub fn build(self) -> JsScanner {
        JsScanner {
            inner: self.inner.build(QuaggaEngine::new(), DomHost),
        }
    }
}

#[wasm_bindgen(js_name = BarcodeScanner)]
pub struct JsScanner {
    inner: WebScanner,
}

#[wasm_bindgen(js_class = BarcodeScanner)]
impl JsScanner {
    pub fn start(&self) -> js_sys::Promise {
        let scanner = self.inner.clone();
        future_to_promise(async move {
            scanner.start().await?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn stop(&self) -> js_sys::Promise {
        let scanner = self.inner.clone();
        future_to_promise(async move {
            scanner.stop().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resuelve a `{ code, format, image?, overlayImage? }`; las imágenes son Promises de Blob
    #[wasm_bindgen(js_name = scanCode)]
    pub fn scan_code(&self) -> js_sys::Promise {
        let scanner = self.inner.clone();
        future_to_promise(async move {
            let result = scanner.scan_code().await?;

            let object = js_sys::Object::new();
            js_sys::Reflect::set(&object, &"code".into(), &JsValue::from_str(&result.code))?;
            let format = result
                .format
                .map(|f| JsValue::from_str(f.format_name()))
                .unwrap_or(JsValue::NULL);
            js_sys::Reflect::set(&object, &"format".into(), &format)?;

            if let Some(image) = result.image {
                let promise = future_to_promise(async move { Ok(JsValue::from(image.await?)) });
                js_sys::Reflect::set(&object, &"image".into(), &promise)?;
            }
            if let Some(overlay) = result.overlay_image {
                let promise = future_to_promise(async move { Ok(JsValue::from(overlay.await?)) });
                js_sys::Reflect::set(&object, &"overlayImage".into(), &promise)?;
            }

            Ok(object.into())
        })
    }

    pub fn hide(&self) {
        self.inner.hide();
    }

    pub fn show(&self) {
        self.inner.show();
    }

    /// "not_started", "idle" o "scanning"
    pub fn state(&self) -> String {
        match self.inner.state() {
            SessionState::NotStarted => "not_started",
            SessionState::Idle => "idle",
            SessionState::Scanning => "scanning",
        }
        .to_string()
    }
}
