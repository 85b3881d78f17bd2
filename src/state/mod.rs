// ============================================================================
// STATE MODULE - Estado de sesión + slot del request pendiente
// ============================================================================

pub mod request_slot;
pub mod session_state;

pub use request_slot::*;
pub use session_state::*;
