// ============================================================================
// OVERLAY - Dibujo de debug sobre el canvas del motor
// ============================================================================

use crate::config::OverlayStyles;
use crate::engine::{DetectionEngine, FrameResult};

/// Candidatos localizados, excepto el aceptado (se dibuja aparte)
pub fn draw_located<E: DetectionEngine>(engine: &E, styles: &OverlayStyles, frame: &FrameResult) {
    if let Some(style) = &styles.located {
        for candidate in frame.located_boxes() {
            engine.draw_path(candidate, style);
        }
    }
}

/// Zona y línea de escaneo del código aceptado
pub fn draw_accepted<E: DetectionEngine>(engine: &E, styles: &OverlayStyles, frame: &FrameResult) {
    if let (Some(style), Some(accepted)) = (&styles.detected, &frame.accepted_box) {
        engine.draw_path(accepted, style);
    }
    if let (Some(style), Some(line)) = (&styles.scan_line, &frame.line) {
        engine.draw_path(line, style);
    }
}
