// ============================================================================
// QUAGGA RESULT - Parseo del resultado de `Quagga.onProcessed`
// ============================================================================
// El resultado llega como JSON (JSON.stringify en el lado web). Los vectores
// de Quagga pueden ser arrays, objetos {x, y} o Float32Array serializados
// como {"0": x, "1": y}.
// ============================================================================

use serde::Deserialize;

use super::{Decode, FrameResult, Point};
use crate::symbology::Symbology;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair([f64; 2]),
    Named { x: f64, y: f64 },
    Indexed {
        #[serde(rename = "0")]
        x: f64,
        #[serde(rename = "1")]
        y: f64,
    },
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Pair([x, y]) => Point::new(x, y),
            RawPoint::Named { x, y } | RawPoint::Indexed { x, y } => Point::new(x, y),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDecodedCode {
    #[serde(default)]
    error: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCodeResult {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    decoded_codes: Vec<RawDecodedCode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    #[serde(default)]
    boxes: Vec<Vec<RawPoint>>,
    #[serde(rename = "box", default)]
    accepted_box: Option<Vec<RawPoint>>,
    #[serde(default)]
    line: Option<Vec<RawPoint>>,
    #[serde(default)]
    code_result: Option<RawCodeResult>,
}

/// Mediana de los errores por carácter; `None` si no hay ninguno
pub fn median_error(errors: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = errors.iter().copied().filter(|e| e.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn to_path(raw: Vec<RawPoint>) -> Vec<Point> {
    raw.into_iter().map(Point::from).collect()
}

/// Convierte el JSON de un frame. `Ok(None)` cuando Quagga no produjo resultado.
pub fn parse_frame_json(json: &str) -> Result<Option<FrameResult>, String> {
    let trimmed = json.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    let raw: RawResult =
        serde_json::from_str(trimmed).map_err(|e| format!("Error parseando resultado de Quagga: {}", e))?;

    let line = raw.line.and_then(|points| {
        let mut points = points.into_iter().map(Point::from);
        match (points.next(), points.next()) {
            (Some(a), Some(b)) => Some([a, b]),
            _ => None,
        }
    });

    let decode = raw.code_result.map(|code_result| {
        let errors: Vec<f64> = code_result
            .decoded_codes
            .iter()
            .filter_map(|c| c.error)
            .collect();
        Decode {
            code: code_result.code,
            format: code_result.format.as_deref().and_then(Symbology::from_engine_name),
            error: median_error(&errors),
        }
    });

    Ok(Some(FrameResult {
        boxes: raw.boxes.into_iter().map(to_path).collect(),
        accepted_box: raw.accepted_box.map(to_path),
        line,
        decode,
    }))
}
