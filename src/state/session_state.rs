// ============================================================================
// SESSION STATE - Fase del ciclo de vida del scanner
// ============================================================================

/// Fase interna del ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Estado observable: derivado de "iniciado" + "request pendiente"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    /// Video activo, detección en pausa
    Idle,
    /// Video activo, detección activa, request pendiente
    Scanning,
}

impl SessionState {
    pub fn derive(started: bool, pending: bool) -> Self {
        match (started, pending) {
            (false, _) => SessionState::NotStarted,
            (true, false) => SessionState::Idle,
            (true, true) => SessionState::Scanning,
        }
    }
}

/// Estado mutable de la sesión
pub struct Session<El> {
    pub phase: Phase,
    /// Viewport resuelto en el último `start()`
    pub viewport: Option<El>,
    /// Se incrementa en cada `scan_code()`; invalida limpiezas de overlay atrasadas
    pub generation: u64,
}

impl<El> Session<El> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            viewport: None,
            generation: 0,
        }
    }

    /// "Iniciado" incluye `Starting` para que un segundo `start()` sea no-op
    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::Starting | Phase::Running)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

impl<El> Default for Session<El> {
    fn default() -> Self {
        Self::new()
    }
}
