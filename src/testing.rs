// ============================================================================
// TESTING - Motor y host simulados para tests nativos
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::capture::{CaptureSurface, ImageCapture};
use crate::config::{CaptureOptions, DrawStyle, ViewportTarget};
use crate::engine::{Decode, DetectionEngine, EngineInit, FrameHandler, FrameResult, Point, RenderHost};
use crate::error::{Result, ScannerError};
use crate::symbology::Symbology;

/// Frame con un código Code128 aceptado en (10,10)-(110,40)
pub fn frame(code: &str, error: f64) -> FrameResult {
    let accepted = vec![
        Point::new(10.0, 10.0),
        Point::new(110.0, 10.0),
        Point::new(110.0, 40.0),
        Point::new(10.0, 40.0),
    ];
    FrameResult {
        boxes: vec![accepted.clone()],
        accepted_box: Some(accepted),
        line: Some([Point::new(10.0, 25.0), Point::new(110.0, 25.0)]),
        decode: Some(Decode {
            code: Some(code.to_string()),
            format: Some(Symbology::Code128),
            error: Some(error),
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    pub id: Option<String>,
    pub attached: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            id: None,
            attached: true,
        }
    }
}

impl MockElement {
    pub fn with_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            attached: true,
        }
    }

    pub fn detached() -> Self {
        Self {
            id: Some("gone".to_string()),
            attached: false,
        }
    }
}

// ============================================================================
// MOCK ENGINE
// ============================================================================

#[derive(Default)]
struct EngineState {
    init_calls: Cell<u32>,
    stop_calls: Cell<u32>,
    pause_calls: Cell<u32>,
    clear_calls: Cell<u32>,
    video: Cell<bool>,
    detecting: Cell<bool>,
    init_error: RefCell<Option<String>>,
    init_gate: RefCell<Option<oneshot::Receiver<()>>>,
    stop_gate: RefCell<Option<oneshot::Receiver<()>>>,
    capture_error: RefCell<Option<String>>,
    handler: RefCell<Option<FrameHandler>>,
    readers: RefCell<Vec<Symbology>>,
    draws: RefCell<Vec<(Vec<Point>, DrawStyle)>>,
    captures: RefCell<Vec<(CaptureSurface, CaptureOptions)>>,
}

#[derive(Clone, Default)]
pub struct MockEngine {
    state: Rc<EngineState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_init(&self, message: &str) {
        *self.state.init_error.borrow_mut() = Some(message.to_string());
    }

    /// El próximo `init` queda bloqueado hasta enviar por el canal
    pub fn hold_next_init(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.state.init_gate.borrow_mut() = Some(receiver);
        sender
    }

    /// El próximo `stop` queda bloqueado hasta enviar por el canal
    pub fn hold_next_stop(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.state.stop_gate.borrow_mut() = Some(receiver);
        sender
    }

    /// Las próximas capturas fallan como un `toBlob` que lanza
    pub fn fail_captures(&self, message: &str) {
        *self.state.capture_error.borrow_mut() = Some(message.to_string());
    }

    /// Entregar un frame como lo haría el motor (sólo con detección activa)
    pub fn emit(&self, frame: Option<&FrameResult>) {
        if self.state.detecting.get() {
            self.force_emit(frame);
        }
    }

    /// Entregar un frame aunque la detección esté en pausa
    pub fn force_emit(&self, frame: Option<&FrameResult>) {
        let handler = self.state.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(frame);
        }
    }

    pub fn init_calls(&self) -> u32 {
        self.state.init_calls.get()
    }

    pub fn stop_calls(&self) -> u32 {
        self.state.stop_calls.get()
    }

    pub fn pause_calls(&self) -> u32 {
        self.state.pause_calls.get()
    }

    pub fn clear_calls(&self) -> u32 {
        self.state.clear_calls.get()
    }

    pub fn is_detecting(&self) -> bool {
        self.state.detecting.get()
    }

    pub fn is_video_running(&self) -> bool {
        self.state.video.get()
    }

    pub fn has_handler(&self) -> bool {
        self.state.handler.borrow().is_some()
    }

    pub fn readers(&self) -> Vec<Symbology> {
        self.state.readers.borrow().clone()
    }

    pub fn draws(&self) -> Vec<(Vec<Point>, DrawStyle)> {
        self.state.draws.borrow().clone()
    }

    pub fn captures(&self) -> Vec<(CaptureSurface, CaptureOptions)> {
        self.state.captures.borrow().clone()
    }
}

#[async_trait(?Send)]
impl DetectionEngine for MockEngine {
    type Target = MockElement;
    type Image = String;

    async fn init(&self, init: EngineInit<'_, MockElement>) -> Result<()> {
        self.state.init_calls.set(self.state.init_calls.get() + 1);

        let gate = self.state.init_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if let Some(message) = self.state.init_error.borrow_mut().take() {
            return Err(ScannerError::EngineInit(message));
        }

        *self.state.readers.borrow_mut() = init.readers.to_vec();
        self.state.video.set(true);
        Ok(())
    }

    fn start(&self) {
        self.state.detecting.set(true);
    }

    fn pause(&self) {
        self.state.pause_calls.set(self.state.pause_calls.get() + 1);
        self.state.detecting.set(false);
    }

    async fn stop(&self) {
        self.state.stop_calls.set(self.state.stop_calls.get() + 1);
        self.state.detecting.set(false);

        let gate = self.state.stop_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.state.video.set(false);
    }

    fn on_processed(&self, handler: FrameHandler) {
        *self.state.handler.borrow_mut() = Some(handler);
    }

    fn off_processed(&self) {
        *self.state.handler.borrow_mut() = None;
    }

    fn clear_overlay(&self) {
        self.state.clear_calls.set(self.state.clear_calls.get() + 1);
    }

    fn draw_path(&self, path: &[Point], style: &DrawStyle) {
        self.state.draws.borrow_mut().push((path.to_vec(), style.clone()));
    }

    fn capture(&self, surface: CaptureSurface, options: &CaptureOptions) -> ImageCapture<String> {
        self.state.captures.borrow_mut().push((surface, *options));
        let (sender, capture) = ImageCapture::pending();
        if let Some(message) = self.state.capture_error.borrow().clone() {
            sender.reject(ScannerError::CaptureFailed(message));
            return capture;
        }
        let name = match surface {
            CaptureSurface::Frame => "frame",
            CaptureSurface::Overlay => "overlay",
        };
        sender.resolve(format!("{}:{}", name, options.format.mime_type()));
        capture
    }
}

// ============================================================================
// MOCK HOST
// ============================================================================

#[derive(Default)]
struct HostState {
    elements: RefCell<Vec<(String, MockElement)>>,
    style_inserts: Cell<u32>,
    rules: RefCell<Vec<String>>,
    visibility: RefCell<Vec<bool>>,
    timers: RefCell<Vec<(u32, Box<dyn FnOnce()>)>>,
}

#[derive(Clone, Default)]
pub struct MockHost {
    state: Rc<HostState>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrar un elemento encontrable por selector
    pub fn attach(&self, selector: &str, element: MockElement) {
        self.state
            .elements
            .borrow_mut()
            .push((selector.to_string(), element));
    }

    pub fn style_inserts(&self) -> u32 {
        self.state.style_inserts.get()
    }

    pub fn rules(&self) -> Vec<String> {
        self.state.rules.borrow().clone()
    }

    pub fn visibility_changes(&self) -> Vec<bool> {
        self.state.visibility.borrow().clone()
    }

    pub fn pending_timers(&self) -> Vec<u32> {
        self.state.timers.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    /// Ejecutar todos los timers pendientes
    pub fn fire_timers(&self) {
        let timers: Vec<_> = self.state.timers.borrow_mut().drain(..).collect();
        for (_, callback) in timers {
            callback();
        }
    }
}

impl RenderHost for MockHost {
    type Element = MockElement;

    fn resolve(&self, target: &ViewportTarget<MockElement>) -> Result<MockElement> {
        match target {
            ViewportTarget::Element(element) if element.attached => Ok(element.clone()),
            ViewportTarget::Element(_) => Err(ScannerError::ViewportNotFound(target.describe())),
            ViewportTarget::Selector(selector) => {
                if selector.is_empty() || selector.contains("##") {
                    return Err(ScannerError::InvalidSelector(selector.clone()));
                }
                self.state
                    .elements
                    .borrow()
                    .iter()
                    .find(|(s, _)| s == selector)
                    .map(|(_, element)| element.clone())
                    .ok_or_else(|| ScannerError::ViewportNotFound(selector.clone()))
            }
        }
    }

    fn element_id(&self, element: &MockElement) -> Option<String> {
        element.id.clone()
    }

    fn insert_style_rules(&self, rules: &[String]) -> Result<()> {
        self.state.style_inserts.set(self.state.style_inserts.get() + 1);
        self.state.rules.borrow_mut().extend_from_slice(rules);
        Ok(())
    }

    fn set_visible(&self, _element: &MockElement, visible: bool) {
        self.state.visibility.borrow_mut().push(visible);
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        self.state.timers.borrow_mut().push((delay_ms, callback));
    }
}
