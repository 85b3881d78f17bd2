// ============================================================================
// SYMBOLOGIES - Conjunto cerrado de lectores soportados por QuaggaJS
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Simbología de código de barras que el motor puede reconocer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Code128,
    Ean13,
    Ean8,
    Code39,
    Code39Vin,
    Codabar,
    UpcA,
    UpcE,
    Interleaved2of5,
    Standard2of5,
    Code93,
}

impl Symbology {
    pub const ALL: [Symbology; 11] = [
        Symbology::Code128,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Code39,
        Symbology::Code39Vin,
        Symbology::Codabar,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Interleaved2of5,
        Symbology::Standard2of5,
        Symbology::Code93,
    ];

    /// Nombre del lector en `decoder.readers`
    pub fn reader_name(&self) -> &'static str {
        match self {
            Symbology::Code128 => "code_128_reader",
            Symbology::Ean13 => "ean_reader",
            Symbology::Ean8 => "ean_8_reader",
            Symbology::Code39 => "code_39_reader",
            Symbology::Code39Vin => "code_39_vin_reader",
            Symbology::Codabar => "codabar_reader",
            Symbology::UpcA => "upc_reader",
            Symbology::UpcE => "upc_e_reader",
            Symbology::Interleaved2of5 => "i2of5_reader",
            Symbology::Standard2of5 => "2of5_reader",
            Symbology::Code93 => "code_93_reader",
        }
    }

    /// Formato tal como lo reporta `codeResult.format`
    pub fn format_name(&self) -> &'static str {
        match self {
            Symbology::Code128 => "code_128",
            Symbology::Ean13 => "ean_13",
            Symbology::Ean8 => "ean_8",
            Symbology::Code39 => "code_39",
            Symbology::Code39Vin => "code_39_vin",
            Symbology::Codabar => "codabar",
            Symbology::UpcA => "upc_a",
            Symbology::UpcE => "upc_e",
            Symbology::Interleaved2of5 => "i2of5",
            Symbology::Standard2of5 => "2of5",
            Symbology::Code93 => "code_93",
        }
    }

    /// Acepta tanto el nombre del lector como el del formato
    pub fn from_engine_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.reader_name() == name || s.format_name() == name)
    }
}

impl Default for Symbology {
    fn default() -> Self {
        Symbology::Code128
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_name())
    }
}

impl FromStr for Symbology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_engine_name(s).ok_or_else(|| format!("Unknown symbology: {}", s))
    }
}
