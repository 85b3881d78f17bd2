// ============================================================================
// CONFIG - Snapshot inmutable de la configuración del scanner
// ============================================================================

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::symbology::Symbology;

/// Umbral de error de decodificación: por debajo se acepta el frame
pub const ACCEPT_ERROR_THRESHOLD: f64 = 0.10;

/// Tiempo que el overlay queda visible tras resolver un scan
pub const OVERLAY_CLEAR_DELAY_MS: u32 = 1500;

/// Validador opcional del código leído
pub type Validator = Rc<dyn Fn(&str) -> bool>;

/// Dónde montar el video: elemento directo o selector CSS
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportTarget<El> {
    Element(El),
    Selector(String),
}

impl<El> ViewportTarget<El> {
    /// Descripción legible para errores y logs
    pub fn describe(&self) -> String {
        match self {
            ViewportTarget::Element(_) => "<element>".to_string(),
            ViewportTarget::Selector(selector) => selector.clone(),
        }
    }
}

/// Estilo de trazo para el overlay de debug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStyle {
    pub color: String,
    pub line_width: f64,
}

impl DrawStyle {
    pub fn new(color: &str, line_width: f64) -> Self {
        Self {
            color: color.to_string(),
            line_width,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayStyles {
    /// Candidatos localizados (todos menos el aceptado)
    pub located: Option<DrawStyle>,
    pub detected: Option<DrawStyle>,
    pub scan_line: Option<DrawStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}

/// Opciones de captura de imágenes del resultado
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    pub format: ImageFormat,
    /// 0.0 - 1.0, sólo aplica a formatos con pérdida
    pub quality: f64,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: 0.92,
        }
    }
}

// ============================================================================
// ENGINE SETTINGS - Parámetros pass-through para Quagga.init
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub facing_mode: String,
    pub width: u32,
    pub height: u32,
    pub patch_size: String,
    pub half_sample: bool,
    pub frequency: u32,
    pub locate: bool,
    /// Claves adicionales que se copian tal cual a la config del motor
    pub extra: Map<String, Value>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            facing_mode: "environment".to_string(),
            width: 640,
            height: 480,
            patch_size: "medium".to_string(),
            half_sample: true,
            frequency: 10,
            locate: true,
            extra: Map::new(),
        }
    }
}

impl EngineSettings {
    /// Carga los valores por defecto desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            facing_mode: option_env!("SCANNER_FACING_MODE")
                .map(|s| s.to_string())
                .unwrap_or(defaults.facing_mode),
            width: option_env!("SCANNER_WIDTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.width),
            height: option_env!("SCANNER_HEIGHT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.height),
            patch_size: option_env!("SCANNER_PATCH_SIZE")
                .map(|s| s.to_string())
                .unwrap_or(defaults.patch_size),
            half_sample: defaults.half_sample,
            frequency: option_env!("SCANNER_FREQUENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frequency),
            locate: defaults.locate,
            extra: defaults.extra,
        }
    }

    /// Parsea overrides en JSON; los campos ausentes toman el valor por defecto
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Error parseando engine settings: {}", e))
    }

    /// Config completa para el motor. `target` lo inyecta el adaptador.
    pub fn engine_config(&self, readers: &[Symbology]) -> Value {
        let mut config = Map::new();
        for (key, value) in &self.extra {
            config.insert(key.clone(), value.clone());
        }

        config.insert(
            "inputStream".to_string(),
            json!({
                "type": "LiveStream",
                "constraints": {
                    "width": { "ideal": self.width },
                    "height": { "ideal": self.height },
                    "facingMode": self.facing_mode,
                },
            }),
        );
        config.insert(
            "locator".to_string(),
            json!({
                "patchSize": self.patch_size,
                "halfSample": self.half_sample,
            }),
        );
        // Sin workers: todo corre en el event loop
        config.insert("numOfWorkers".to_string(), json!(0));
        config.insert("frequency".to_string(), json!(self.frequency));
        config.insert("locate".to_string(), json!(self.locate));
        config.insert(
            "decoder".to_string(),
            json!({
                "readers": readers.iter().map(|r| r.reader_name()).collect::<Vec<_>>(),
            }),
        );

        Value::Object(config)
    }
}

lazy_static::lazy_static! {
    pub static ref DEFAULT_SETTINGS: EngineSettings = EngineSettings::from_env();
}

// ============================================================================
// SCANNER CONFIG
// ============================================================================

/// Configuración congelada por `ScannerBuilder::build()`
#[derive(Clone)]
pub struct ScannerConfig<El> {
    pub viewport: ViewportTarget<El>,
    pub readers: Vec<Symbology>,
    pub auto_layout: bool,
    pub capture: Option<CaptureOptions>,
    pub validator: Option<Validator>,
    pub styles: OverlayStyles,
    pub engine: EngineSettings,
}

impl<El> ScannerConfig<El> {
    pub fn accepts(&self, code: &str) -> bool {
        self.validator.as_ref().map_or(true, |validate| validate(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_injects_readers_in_order() {
        let settings = EngineSettings::default();
        let config = settings.engine_config(&[Symbology::Ean13, Symbology::Code128]);

        assert_eq!(
            config["decoder"]["readers"],
            json!(["ean_reader", "code_128_reader"])
        );
        assert_eq!(config["numOfWorkers"], json!(0));
        assert_eq!(config["inputStream"]["constraints"]["facingMode"], json!("environment"));
    }

    #[test]
    fn extra_keys_pass_through_but_do_not_override_readers() {
        let settings = EngineSettings::from_json(
            r#"{"frequency": 5, "extra": {"debug": true, "decoder": {"readers": ["x"]}}}"#,
        )
        .unwrap();
        let config = settings.engine_config(&[Symbology::Code39]);

        assert_eq!(config["debug"], json!(true));
        assert_eq!(config["frequency"], json!(5));
        assert_eq!(config["decoder"]["readers"], json!(["code_39_reader"]));
        assert_eq!(settings.patch_size, "medium");
    }

    #[test]
    fn invalid_settings_json_is_an_error() {
        assert!(EngineSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn mime_types_round_trip() {
        for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Webp] {
            assert_eq!(ImageFormat::from_mime_type(format.mime_type()), Some(format));
        }
        assert_eq!(ImageFormat::from_mime_type("image/gif"), None);
    }
}
