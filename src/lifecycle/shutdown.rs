//! Shutdown latch shared by the server and its background tasks.
//!
//! Once triggered it stays triggered, so a listener created after the
//! signal still observes it.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

/// Receiving side of a [`Shutdown`] latch.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Latch the signal. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|triggered| !std::mem::replace(triggered, true));
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownListener {
    /// Resolve once shutdown has been triggered.
    pub async fn recv(&mut self) {
        // Err means every Shutdown handle is gone; treat that as shutdown too.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_listener() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.subscribe();
        let mut worker = shutdown.subscribe();
        assert_eq!(shutdown.listener_count(), 2);

        shutdown.trigger();
        server.recv().await;
        worker.recv().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_late_listener_sees_earlier_trigger() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        tokio::time::timeout(Duration::from_millis(50), late.recv())
            .await
            .expect("latched trigger was missed");
    }

    #[tokio::test]
    async fn test_untriggered_listener_waits() {
        let shutdown = Shutdown::new();
        let mut listener = shutdown.subscribe();
        assert!(tokio::time::timeout(Duration::from_millis(20), listener.recv())
            .await
            .is_err());
    }
}
