// ============================================================================
// IMAGE CAPTURE - Captura diferida del frame y del overlay
// ============================================================================
// La conversión canvas -> blob es asíncrona: el motor la inicia al aceptar el
// frame y el resultado llega por un canal oneshot.
// ============================================================================

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::{Result, ScannerError};

/// Canvas del que se captura la imagen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSurface {
    /// Frame de video sin dibujos
    Frame,
    /// Canvas de debug con los trazos
    Overlay,
}

/// Lado productor de una captura
pub struct CaptureSender<I> {
    sender: oneshot::Sender<Result<I>>,
}

impl<I> CaptureSender<I> {
    pub fn resolve(self, image: I) {
        // El consumidor pudo haber descartado el resultado; no es un error
        let _ = self.sender.send(Ok(image));
    }

    pub fn reject(self, error: ScannerError) {
        let _ = self.sender.send(Err(error));
    }
}

/// Future de una imagen capturada; se resuelve de forma independiente al scan
pub struct ImageCapture<I> {
    receiver: oneshot::Receiver<Result<I>>,
}

impl<I> ImageCapture<I> {
    pub fn pending() -> (CaptureSender<I>, ImageCapture<I>) {
        let (sender, receiver) = oneshot::channel();
        (CaptureSender { sender }, ImageCapture { receiver })
    }

    /// Captura que ya falló (p.ej. canvas inexistente)
    pub fn failed(error: ScannerError) -> ImageCapture<I> {
        let (sender, capture) = Self::pending();
        sender.reject(error);
        capture
    }
}

impl<I> Future for ImageCapture<I> {
    type Output = Result<I>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ScannerError::CaptureFailed(
                "capture was abandoned".to_string(),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn resolved_capture_yields_image() {
        let (sender, capture) = ImageCapture::pending();
        sender.resolve(vec![1u8, 2, 3]);
        assert_eq!(block_on(capture), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn dropped_sender_rejects_instead_of_hanging() {
        let (sender, capture) = ImageCapture::<Vec<u8>>::pending();
        drop(sender);
        assert!(matches!(block_on(capture), Err(ScannerError::CaptureFailed(_))));
    }

    #[test]
    fn failed_capture_keeps_its_error() {
        let capture = ImageCapture::<()>::failed(ScannerError::CaptureFailed("no blob".to_string()));
        assert_eq!(
            block_on(capture),
            Err(ScannerError::CaptureFailed("no blob".to_string()))
        );
    }
}
