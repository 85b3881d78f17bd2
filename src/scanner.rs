// ============================================================================
// SCANNER - Ciclo de vida de la sesión + puente frame -> scan_code()
// ============================================================================
// Todo corre en el event loop: el estado compartido es Rc<RefCell<..>> y el
// callback por frame nunca se ejecuta a la vez que un método público.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;

use crate::capture::{CaptureSurface, ImageCapture};
use crate::config::{ScannerConfig, OVERLAY_CLEAR_DELAY_MS};
use crate::engine::{DetectionEngine, EngineInit, FrameHandler, FrameResult, RenderHost};
use crate::error::{Result, ScannerError};
use crate::layout;
use crate::overlay;
use crate::state::{Phase, RequestSlot, Session, SessionState};
use crate::symbology::Symbology;

/// Resultado de un scan aceptado
pub struct ScanResult<I> {
    pub code: String,
    pub format: Option<Symbology>,
    /// Frame de video crudo (si se pidió captura)
    pub image: Option<ImageCapture<I>>,
    /// Canvas de debug con los trazos (si se pidió captura)
    pub overlay_image: Option<ImageCapture<I>>,
}

impl<I> fmt::Debug for ScanResult<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanResult")
            .field("code", &self.code)
            .field("format", &self.format)
            .field("image", &self.image.is_some())
            .field("overlay_image", &self.overlay_image.is_some())
            .finish()
    }
}

struct Shared<E, H>
where
    E: DetectionEngine,
    H: RenderHost,
{
    config: ScannerConfig<H::Element>,
    engine: E,
    host: H,
    session: RefCell<Session<H::Element>>,
    request: RequestSlot<ScanResult<E::Image>>,
    /// `start()` en espera de que termine un `stop()` en curso
    stop_waiters: RefCell<Vec<oneshot::Sender<()>>>,
}

/// Scanner con un único scan pendiente como máximo
pub struct Scanner<E, H>
where
    E: DetectionEngine,
    H: RenderHost,
{
    shared: Rc<Shared<E, H>>,
}

impl<E, H> Clone for Scanner<E, H>
where
    E: DetectionEngine,
    H: RenderHost,
{
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<E, H> Scanner<E, H>
where
    E: DetectionEngine<Target = H::Element> + 'static,
    H: RenderHost + 'static,
    H::Element: 'static,
{
    pub fn new(config: ScannerConfig<H::Element>, engine: E, host: H) -> Self {
        Self {
            shared: Rc::new(Shared {
                config,
                engine,
                host,
                session: RefCell::new(Session::new()),
                request: RequestSlot::new(),
                stop_waiters: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ScannerConfig<H::Element> {
        &self.shared.config
    }

    pub fn engine(&self) -> &E {
        &self.shared.engine
    }

    pub fn state(&self) -> SessionState {
        let running = self.shared.session.borrow().is_running();
        SessionState::derive(running, self.shared.request.is_pending())
    }

    pub fn phase(&self) -> Phase {
        self.shared.session.borrow().phase
    }

    /// Abrir video y motor. No-op si ya está iniciado.
    pub async fn start(&self) -> Result<()> {
        loop {
            let stopping = {
                let mut session = self.shared.session.borrow_mut();
                if session.is_started() {
                    log::debug!("📷 Scanner ya iniciado, ignorando start()");
                    return Ok(());
                }
                if session.phase == Phase::Stopping {
                    let (sender, receiver) = oneshot::channel();
                    self.shared.stop_waiters.borrow_mut().push(sender);
                    Some(receiver)
                } else {
                    session.phase = Phase::Starting;
                    None
                }
            };

            match stopping {
                // El motor no se reinicia hasta que el stop() anterior termine
                Some(receiver) => {
                    log::debug!("📷 Esperando a que termine stop()...");
                    let _ = receiver.await;
                }
                None => break,
            }
        }

        log::info!("📷 Iniciando scanner...");
        match self.open_session().await {
            Ok(()) => {
                log::info!("✅ Scanner listo");
                Ok(())
            }
            Err(e) => {
                // Volver a "no iniciado" para permitir reintentar
                let mut session = self.shared.session.borrow_mut();
                if session.phase == Phase::Starting {
                    session.phase = Phase::Idle;
                }
                Err(e)
            }
        }
    }

    async fn open_session(&self) -> Result<()> {
        let shared = &self.shared;

        let viewport = shared.host.resolve(&shared.config.viewport)?;
        shared.session.borrow_mut().viewport = Some(viewport.clone());

        if shared.config.auto_layout {
            let id = shared
                .host
                .element_id(&viewport)
                .filter(|id| !id.is_empty())
                .ok_or(ScannerError::MissingViewportId)?;
            layout::ensure_layout(&id, |rules| shared.host.insert_style_rules(rules))?;
        }

        shared
            .engine
            .init(EngineInit {
                target: &viewport,
                readers: &shared.config.readers,
                settings: &shared.config.engine,
            })
            .await?;

        if shared.session.borrow().phase != Phase::Starting {
            // stop() llegó mientras se esperaba al motor
            shared.engine.stop().await;
            return Err(ScannerError::StartAborted);
        }

        // Video activo, detección en pausa hasta scan_code()
        shared.engine.on_processed(self.frame_handler());
        shared.session.borrow_mut().phase = Phase::Running;
        Ok(())
    }

    /// Detener video y motor; cancela el scan pendiente. Idempotente.
    pub async fn stop(&self) {
        {
            let mut session = self.shared.session.borrow_mut();
            if !session.is_started() {
                return;
            }
            session.phase = Phase::Stopping;
        }

        log::info!("⏹️ Deteniendo scanner...");
        self.shared.engine.off_processed();
        if self.shared.request.reject(ScannerError::StoppedWhileScanning) {
            log::info!("⏹️ Scan pendiente cancelado");
        }
        self.shared.engine.stop().await;

        {
            let mut session = self.shared.session.borrow_mut();
            if session.phase == Phase::Stopping {
                session.phase = Phase::Idle;
            }
        }

        let waiters: Vec<_> = self.shared.stop_waiters.borrow_mut().drain(..).collect();
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    /// Esperar el próximo código aceptado
    pub async fn scan_code(&self) -> Result<ScanResult<E::Image>> {
        let (pending, generation) = {
            let mut session = self.shared.session.borrow_mut();
            if !session.is_running() {
                return Err(ScannerError::NotStarted);
            }
            let pending = self.shared.request.claim()?;
            session.generation += 1;
            (pending, session.generation)
        };

        let mut guard = ScanGuard {
            shared: Rc::downgrade(&self.shared),
            generation,
            armed: true,
        };

        log::debug!("🔍 Escaneando...");
        self.shared.engine.start();

        let outcome = pending.wait().await;
        guard.armed = false;
        self.schedule_overlay_clear(generation);
        outcome
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    fn set_visible(&self, visible: bool) {
        let session = self.shared.session.borrow();
        if let Some(viewport) = &session.viewport {
            self.shared.host.set_visible(viewport, visible);
        }
    }

    fn frame_handler(&self) -> FrameHandler {
        let weak: Weak<Shared<E, H>> = Rc::downgrade(&self.shared);
        Rc::new(move |frame: Option<&FrameResult>| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_frame(frame);
            }
        })
    }

    /// Limpiar el overlay tras un rato, salvo que ya haya empezado otro scan
    fn schedule_overlay_clear(&self, generation: u64) {
        let weak = Rc::downgrade(&self.shared);
        self.shared.host.set_timeout(
            OVERLAY_CLEAR_DELAY_MS,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    let current = shared.session.borrow().generation;
                    if current == generation && !shared.request.is_pending() {
                        shared.engine.clear_overlay();
                    }
                }
            }),
        );
    }
}

/// Libera el slot si el future de `scan_code()` se descarta sin resolverse
struct ScanGuard<E, H>
where
    E: DetectionEngine,
    H: RenderHost,
{
    shared: Weak<Shared<E, H>>,
    generation: u64,
    armed: bool,
}

impl<E, H> Drop for ScanGuard<E, H>
where
    E: DetectionEngine,
    H: RenderHost,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if shared.session.borrow().generation != self.generation {
            return;
        }
        if shared.request.abandon() {
            log::debug!("🔍 Scan descartado, pausando detección");
            shared.engine.pause();
        }
    }
}

impl<E, H> Shared<E, H>
where
    E: DetectionEngine,
    H: RenderHost,
{
    fn handle_frame(&self, frame: Option<&FrameResult>) {
        if !self.request.is_pending() {
            return;
        }
        let Some(frame) = frame else {
            return;
        };

        self.engine.clear_overlay();
        overlay::draw_located(&self.engine, &self.config.styles, frame);

        let Some(decode) = frame.qualified_decode() else {
            log::trace!("frame sin decodificación aceptable");
            return;
        };

        let code = match decode.code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => {
                self.engine.pause();
                self.request.reject(ScannerError::EmptyDecode);
                return;
            }
        };

        if !self.config.accepts(code) {
            log::debug!("🚫 Código rechazado por el validador: {}", code);
            return;
        }

        overlay::draw_accepted(&self.engine, &self.config.styles, frame);

        let (image, overlay_image) = match &self.config.capture {
            Some(options) => (
                Some(self.engine.capture(CaptureSurface::Frame, options)),
                Some(self.engine.capture(CaptureSurface::Overlay, options)),
            ),
            None => (None, None),
        };

        log::info!("✅ Código detectado: {}", code);
        let result = ScanResult {
            code: code.to_string(),
            format: decode.format,
            image,
            overlay_image,
        };

        self.engine.pause();
        self.request.resolve(result);
    }
}
