use async_trait::async_trait;

use crate::state::Signal;

/// Lifecycle callbacks of the realtime connection.
///
/// Callbacks may query or disconnect the client, but must not register
/// handlers: the handler list is locked while a signal is delivered.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called when the WebSocket handshake completes
    async fn on_open(&self);

    /// Called when the connection closes, whichever side closed it
    async fn on_close(&self);

    /// Called for every text frame received
    async fn on_message(&self, raw: &str);

    /// Called when the transport reports an error
    async fn on_error(&self, error: &str);
}

/// Deliver a signal to every handler, in registration order
pub(crate) async fn dispatch(handlers: &[Box<dyn EventHandler>], signal: &Signal) {
    for handler in handlers {
        match signal {
            Signal::Opened => handler.on_open().await,
            Signal::Closed => handler.on_close().await,
            Signal::Message(raw) => handler.on_message(raw).await,
            Signal::Errored(error) => handler.on_error(error).await,
        }
    }
}
