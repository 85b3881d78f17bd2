use std::rc::Rc;

use async_trait::async_trait;

use crate::capture::{CaptureSurface, ImageCapture};
use crate::config::{CaptureOptions, DrawStyle, EngineSettings, ViewportTarget, ACCEPT_ERROR_THRESHOLD};
use crate::error::Result;
use crate::symbology::Symbology;

/// Punto en coordenadas de píxel del canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Decodificación reportada por el motor para un frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decode {
    pub code: Option<String>,
    pub format: Option<Symbology>,
    /// Métrica de error (menor es mejor)
    pub error: Option<f64>,
}

/// Resultado de un frame procesado (sólo lectura)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameResult {
    /// Todas las zonas candidatas localizadas
    pub boxes: Vec<Vec<Point>>,
    /// Zona del código aceptado, si la hay
    pub accepted_box: Option<Vec<Point>>,
    pub line: Option<[Point; 2]>,
    pub decode: Option<Decode>,
}

impl FrameResult {
    /// Decodificación que supera el umbral de calidad
    pub fn qualified_decode(&self) -> Option<&Decode> {
        self.decode
            .as_ref()
            .filter(|d| d.error.map_or(false, |e| e < ACCEPT_ERROR_THRESHOLD))
    }

    /// Candidatos a dibujar como "located": todos menos el aceptado
    pub fn located_boxes(&self) -> impl Iterator<Item = &Vec<Point>> {
        self.boxes
            .iter()
            .filter(move |b| self.accepted_box.as_ref() != Some(*b))
    }
}

/// Callback por frame; `None` cuando el motor no produjo resultado
pub type FrameHandler = Rc<dyn Fn(Option<&FrameResult>)>;

/// Lo que el scanner inyecta en la config del motor
pub struct EngineInit<'a, T> {
    pub target: &'a T,
    pub readers: &'a [Symbology],
    pub settings: &'a EngineSettings,
}

/// Motor de detección externo (QuaggaJS en web)
#[async_trait(?Send)]
pub trait DetectionEngine {
    /// Elemento donde el motor monta video y canvas
    type Target;
    type Image: 'static;

    /// Inicializar el motor y abrir la cámara
    async fn init(&self, init: EngineInit<'_, Self::Target>) -> Result<()>;

    /// Iniciar o reanudar la detección por frame
    fn start(&self);

    fn pause(&self);

    /// Detener la detección y liberar la cámara
    async fn stop(&self);

    fn on_processed(&self, handler: FrameHandler);

    fn off_processed(&self);

    fn clear_overlay(&self);

    fn draw_path(&self, path: &[Point], style: &DrawStyle);

    /// Inicia la captura de un canvas; el resultado llega después
    fn capture(&self, surface: CaptureSurface, options: &CaptureOptions) -> ImageCapture<Self::Image>;
}

/// Entorno de render: documento, estilos y timers
pub trait RenderHost {
    type Element: Clone;

    fn resolve(&self, target: &ViewportTarget<Self::Element>) -> Result<Self::Element>;

    fn element_id(&self, element: &Self::Element) -> Option<String>;

    fn insert_style_rules(&self, rules: &[String]) -> Result<()>;

    fn set_visible(&self, element: &Self::Element, visible: bool);

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64) -> Vec<Point> {
        vec![
            Point::new(offset, offset),
            Point::new(offset + 10.0, offset),
            Point::new(offset + 10.0, offset + 10.0),
            Point::new(offset, offset + 10.0),
        ]
    }

    #[test]
    fn located_boxes_skip_the_accepted_one() {
        let frame = FrameResult {
            boxes: vec![square(0.0), square(20.0), square(40.0)],
            accepted_box: Some(square(20.0)),
            ..Default::default()
        };
        let located: Vec<_> = frame.located_boxes().collect();
        assert_eq!(located, vec![&square(0.0), &square(40.0)]);
    }

    #[test]
    fn threshold_is_strict() {
        let mut frame = FrameResult {
            decode: Some(Decode {
                code: Some("A".to_string()),
                format: None,
                error: Some(ACCEPT_ERROR_THRESHOLD),
            }),
            ..Default::default()
        };
        assert!(frame.qualified_decode().is_none());

        frame.decode.as_mut().unwrap().error = Some(0.05);
        assert!(frame.qualified_decode().is_some());

        frame.decode.as_mut().unwrap().error = None;
        assert!(frame.qualified_decode().is_none());
    }
}
