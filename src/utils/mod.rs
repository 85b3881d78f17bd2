// Utils compartidos

pub mod quagga_ffi;

pub use quagga_ffi::*;
