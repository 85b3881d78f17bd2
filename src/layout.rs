// ============================================================================
// AUTO-LAYOUT - Reglas CSS que superponen el canvas de debug al video
// ============================================================================
// El registro vive por hilo (en wasm: el único hilo del documento). Una vez
// insertadas las reglas de un viewport no se vuelven a insertar, ni siquiera
// tras ciclos stop/start. `forget_applied_layouts()` lo reinicia cuando el
// documento (y su hoja de estilos) se reemplaza.
// ============================================================================

use std::cell::RefCell;
use std::collections::HashSet;

use crate::error::Result;

thread_local! {
    static APPLIED_LAYOUTS: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Reglas para el viewport con `id` dado. Quagga marca su canvas con `drawingBuffer`.
pub fn layout_rules(viewport_id: &str) -> Vec<String> {
    let scope = format!("#{}", viewport_id);
    vec![
        format!("{} {{ position: relative; overflow: hidden; }}", scope),
        format!(
            "{0} video, {0} canvas {{ display: block; width: 100%; height: auto; }}",
            scope
        ),
        format!(
            "{} canvas.drawingBuffer {{ position: absolute; top: 0; left: 0; }}",
            scope
        ),
    ]
}

pub fn is_layout_applied(viewport_id: &str) -> bool {
    APPLIED_LAYOUTS.with(|applied| applied.borrow().contains(viewport_id))
}

/// Inserta las reglas como mucho una vez por viewport. Devuelve `true` si insertó.
pub fn ensure_layout<F>(viewport_id: &str, insert: F) -> Result<bool>
where
    F: FnOnce(&[String]) -> Result<()>,
{
    if is_layout_applied(viewport_id) {
        return Ok(false);
    }

    insert(&layout_rules(viewport_id))?;

    APPLIED_LAYOUTS.with(|applied| {
        applied.borrow_mut().insert(viewport_id.to_string());
    });
    log::debug!("🎨 Auto-layout aplicado a #{}", viewport_id);
    Ok(true)
}

/// Olvida los viewports registrados (documento nuevo)
pub fn forget_applied_layouts() {
    APPLIED_LAYOUTS.with(|applied| applied.borrow_mut().clear());
}
