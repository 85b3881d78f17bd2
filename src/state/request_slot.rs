// ============================================================================
// REQUEST SLOT - Como mucho un scan pendiente por scanner
// ============================================================================
// Un segundo `claim()` con un request vivo se rechaza, nunca se encola.
// ============================================================================

use std::cell::RefCell;

use futures::channel::oneshot;

use crate::error::{Result, ScannerError};

pub struct RequestSlot<T> {
    sender: RefCell<Option<oneshot::Sender<Result<T>>>>,
}

impl<T> RequestSlot<T> {
    pub fn new() -> Self {
        Self {
            sender: RefCell::new(None),
        }
    }

    /// Un request cuyo receptor ya no existe no cuenta como pendiente
    pub fn is_pending(&self) -> bool {
        self.sender
            .borrow()
            .as_ref()
            .map_or(false, |sender| !sender.is_canceled())
    }

    /// Ocupar el slot y devolver el lado que espera
    pub fn claim(&self) -> Result<PendingRequest<T>> {
        let mut slot = self.sender.borrow_mut();
        if matches!(slot.as_ref(), Some(sender) if !sender.is_canceled()) {
            return Err(ScannerError::AlreadyScanning);
        }
        let (sender, receiver) = oneshot::channel();
        *slot = Some(sender);
        Ok(PendingRequest { receiver })
    }

    /// Resolver el request pendiente. `false` si no había ninguno.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: ScannerError) -> bool {
        self.settle(Err(error))
    }

    /// Vaciar el slot sin notificar a nadie. `false` si ya estaba vacío.
    pub fn abandon(&self) -> bool {
        self.sender.borrow_mut().take().is_some()
    }

    fn settle(&self, outcome: Result<T>) -> bool {
        // Se suelta el borrow antes de enviar
        let sender = self.sender.borrow_mut().take();
        match sender {
            Some(sender) => {
                let _ = sender.send(outcome);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lado consumidor del request
pub struct PendingRequest<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> PendingRequest<T> {
    pub async fn wait(self) -> Result<T> {
        self.receiver
            .await
            .unwrap_or(Err(ScannerError::RequestDropped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn second_claim_is_rejected_without_touching_the_first() {
        let slot = RequestSlot::<u32>::new();
        let first = slot.claim().unwrap();

        assert!(matches!(slot.claim(), Err(ScannerError::AlreadyScanning)));
        assert!(slot.is_pending());

        assert!(slot.resolve(7));
        assert_eq!(block_on(first.wait()), Ok(7));
        assert!(!slot.is_pending());
    }

    #[test]
    fn settle_without_request_is_a_no_op() {
        let slot = RequestSlot::<u32>::new();
        assert!(!slot.resolve(1));
        assert!(!slot.reject(ScannerError::StoppedWhileScanning));
    }

    #[test]
    fn rejection_reaches_the_waiter() {
        let slot = RequestSlot::<u32>::new();
        let pending = slot.claim().unwrap();
        slot.reject(ScannerError::StoppedWhileScanning);
        assert_eq!(block_on(pending.wait()), Err(ScannerError::StoppedWhileScanning));
    }

    #[test]
    fn slot_is_reusable_after_settling() {
        let slot = RequestSlot::<u32>::new();
        let _ = slot.claim().unwrap();
        slot.reject(ScannerError::StoppedWhileScanning);
        assert!(slot.claim().is_ok());
    }

    #[test]
    fn dropped_waiter_frees_the_slot() {
        let slot = RequestSlot::<u32>::new();
        let pending = slot.claim().unwrap();
        drop(pending);

        assert!(!slot.is_pending());
        let next = slot.claim().unwrap();
        assert!(slot.resolve(3));
        assert_eq!(block_on(next.wait()), Ok(3));
    }

    #[test]
    fn abandon_empties_without_settling() {
        let slot = RequestSlot::<u32>::new();
        let _pending = slot.claim().unwrap();
        assert!(slot.abandon());
        assert!(!slot.abandon());
        assert!(!slot.is_pending());
    }
}
