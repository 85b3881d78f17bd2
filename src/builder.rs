// ============================================================================
// SCANNER BUILDER - Builder pattern para configurar el scanner
// ============================================================================

use std::rc::Rc;

use crate::config::{
    CaptureOptions, DrawStyle, EngineSettings, ImageFormat, OverlayStyles, ScannerConfig, Validator,
    ViewportTarget, DEFAULT_SETTINGS,
};
use crate::engine::{DetectionEngine, RenderHost};
use crate::scanner::Scanner;
use crate::symbology::Symbology;

pub struct ScannerBuilder<El> {
    viewport: ViewportTarget<El>,
    readers: Vec<Symbology>,
    auto_layout: bool,
    capture_images: bool,
    capture: CaptureOptions,
    validator: Option<Validator>,
    styles: OverlayStyles,
    engine: EngineSettings,
}

impl<El> ScannerBuilder<El> {
    /// Crear nuevo builder para un viewport
    pub fn new(viewport: ViewportTarget<El>) -> Self {
        Self {
            viewport,
            readers: Vec::new(),
            auto_layout: false,
            capture_images: false,
            capture: CaptureOptions::default(),
            validator: None,
            styles: OverlayStyles::default(),
            engine: DEFAULT_SETTINGS.clone(),
        }
    }

    pub fn for_element(element: El) -> Self {
        Self::new(ViewportTarget::Element(element))
    }

    pub fn for_selector(selector: &str) -> Self {
        Self::new(ViewportTarget::Selector(selector.to_string()))
    }

    /// Reemplazar el viewport
    pub fn viewport(mut self, viewport: ViewportTarget<El>) -> Self {
        self.viewport = viewport;
        self
    }

    /// Agregar simbología. Se conserva el orden y no se deduplica: el primero gana.
    pub fn add_reader(mut self, symbology: Symbology) -> Self {
        self.readers.push(symbology);
        self
    }

    pub fn auto_layout(mut self, enabled: bool) -> Self {
        self.auto_layout = enabled;
        self
    }

    pub fn capture_images(mut self, enabled: bool) -> Self {
        self.capture_images = enabled;
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.capture.format = format;
        self
    }

    pub fn image_quality(mut self, quality: f64) -> Self {
        self.capture.quality = quality.clamp(0.0, 1.0);
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.validator = Some(Rc::new(validator));
        self
    }

    pub fn draw_located(mut self, style: DrawStyle) -> Self {
        self.styles.located = Some(style);
        self
    }

    pub fn draw_detected(mut self, style: DrawStyle) -> Self {
        self.styles.detected = Some(style);
        self
    }

    pub fn draw_scan_line(mut self, style: DrawStyle) -> Self {
        self.styles.scan_line = Some(style);
        self
    }

    pub fn engine_settings(mut self, settings: EngineSettings) -> Self {
        self.engine = settings;
        self
    }

    /// Congelar la configuración. Sin simbologías se usa la de por defecto.
    pub fn build_config(self) -> ScannerConfig<El> {
        let mut readers = self.readers;
        if readers.is_empty() {
            readers.push(Symbology::default());
        }

        ScannerConfig {
            viewport: self.viewport,
            readers,
            auto_layout: self.auto_layout,
            capture: self.capture_images.then_some(self.capture),
            validator: self.validator,
            styles: self.styles,
            engine: self.engine,
        }
    }

    /// Construir el scanner con su motor y host
    pub fn build<E, H>(self, engine: E, host: H) -> Scanner<E, H>
    where
        E: DetectionEngine<Target = El> + 'static,
        H: RenderHost<Element = El> + 'static,
        El: Clone + 'static,
    {
        Scanner::new(self.build_config(), engine, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ScannerBuilder<()> {
        ScannerBuilder::for_selector("#scanner-viewport")
    }

    #[test]
    fn empty_reader_list_gets_the_default() {
        let config = builder().build_config();
        assert_eq!(config.readers, vec![Symbology::Code128]);
    }

    #[test]
    fn readers_keep_call_order_without_dedup() {
        let config = builder()
            .add_reader(Symbology::Ean13)
            .add_reader(Symbology::Code39)
            .add_reader(Symbology::Ean13)
            .build_config();
        assert_eq!(
            config.readers,
            vec![Symbology::Ean13, Symbology::Code39, Symbology::Ean13]
        );
    }

    #[test]
    fn later_calls_overwrite_single_valued_options() {
        let config = builder()
            .draw_detected(DrawStyle::new("red", 2.0))
            .draw_detected(DrawStyle::new("blue", 3.0))
            .viewport(ViewportTarget::Selector("#other".to_string()))
            .image_format(ImageFormat::Jpeg)
            .image_quality(1.7)
            .capture_images(true)
            .build_config();

        assert_eq!(config.styles.detected, Some(DrawStyle::new("blue", 3.0)));
        assert_eq!(config.viewport, ViewportTarget::Selector("#other".to_string()));
        assert_eq!(
            config.capture,
            Some(CaptureOptions { format: ImageFormat::Jpeg, quality: 1.0 })
        );
    }

    #[test]
    fn capture_is_off_unless_enabled() {
        let config = builder().image_format(ImageFormat::Webp).build_config();
        assert!(config.capture.is_none());
        assert!(!config.auto_layout);
    }

    #[test]
    fn validator_is_consulted() {
        let config = builder()
            .validator(|code| code.len() == 13)
            .build_config();
        assert!(config.accepts("4006381333931"));
        assert!(!config.accepts("123"));
        assert!(builder().build_config().accepts("anything"));
    }
}
