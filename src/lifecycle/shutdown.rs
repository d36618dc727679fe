//! Stop signal for the demo catalog server.

use tokio::sync::broadcast;

/// Fans a single stop request out to every server that subscribed.
///
/// `HttpServer::run` holds a receiver and stops accepting connections when
/// it fires. Requests already inside the include middleware finish their
/// linked fetches before the server returns.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to hand to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to drain and stop. A no-op when nothing
    /// is listening yet.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
