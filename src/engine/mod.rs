// Motor de detección: traits comunes + implementación por plataforma

#[cfg(target_arch = "wasm32")]
pub mod web;

pub mod quagga;
pub mod traits;

pub use traits::*;
