// ============================================================================
// ERRORS - Errores del scanner
// ============================================================================

use std::fmt;

/// Error del scanner
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerError {
    /// El viewport configurado no existe en el documento
    ViewportNotFound(String),
    /// El selector CSS no es válido
    InvalidSelector(String),
    /// Auto-layout necesita un `id` estable en el viewport
    MissingViewportId,
    /// El motor de detección falló al inicializarse
    EngineInit(String),
    /// `stop()` se llamó mientras `start()` esperaba al motor
    StartAborted,
    NotStarted,
    AlreadyScanning,
    StoppedWhileScanning,
    /// El motor aceptó un frame sin texto decodificado
    EmptyDecode,
    /// El handle del request se perdió sin resolverse
    RequestDropped,
    CaptureFailed(String),
    /// Operación DOM fallida (estilos, visibilidad)
    Dom(String),
}

impl fmt::Display for ScannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerError::ViewportNotFound(target) => write!(f, "Viewport not found: {}", target),
            ScannerError::InvalidSelector(selector) => write!(f, "Invalid viewport selector: {}", selector),
            ScannerError::MissingViewportId => write!(f, "Auto-layout requires the viewport element to have an id"),
            ScannerError::EngineInit(msg) => write!(f, "Detection engine failed to initialize: {}", msg),
            ScannerError::StartAborted => write!(f, "Scanner was stopped while starting"),
            ScannerError::NotStarted => write!(f, "Scanner is not started"),
            ScannerError::AlreadyScanning => write!(f, "A scan is already in progress"),
            ScannerError::StoppedWhileScanning => write!(f, "Scanner was stopped while scanning"),
            ScannerError::EmptyDecode => write!(f, "Detection engine reported a result without a code"),
            ScannerError::RequestDropped => write!(f, "Scan request was dropped before completion"),
            ScannerError::CaptureFailed(msg) => write!(f, "Image capture failed: {}", msg),
            ScannerError::Dom(msg) => write!(f, "DOM error: {}", msg),
        }
    }
}

impl std::error::Error for ScannerError {}

pub type Result<T, E = ScannerError> = std::result::Result<T, E>;
