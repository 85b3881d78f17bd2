// ============================================================================
// BARCODE SCANNER - Fachada sobre QuaggaJS (Rust + WASM)
// ============================================================================
// Arquitectura:
// - Builder: configuración fluida -> snapshot inmutable
// - Scanner: ciclo de vida start/stop + puente frame -> scan_code()
// - Engine: traits del motor/host + implementación web (QuaggaJS + DOM)
// - Bindings: API exportada a JavaScript
// ============================================================================

pub mod builder;
pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
mod overlay;
pub mod scanner;
pub mod state;
pub mod symbology;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod utils;
#[cfg(target_arch = "wasm32")]
pub mod bindings;

#[cfg(test)]
mod testing;

pub use builder::ScannerBuilder;
pub use capture::{CaptureSurface, ImageCapture};
pub use config::{
    CaptureOptions, DrawStyle, EngineSettings, ImageFormat, ScannerConfig, Validator, ViewportTarget,
    ACCEPT_ERROR_THRESHOLD, OVERLAY_CLEAR_DELAY_MS,
};
pub use engine::{DetectionEngine, FrameResult, RenderHost};
pub use error::{Result, ScannerError};
pub use scanner::{ScanResult, Scanner};
pub use state::SessionState;
pub use symbology::Symbology;
