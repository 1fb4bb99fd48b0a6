use crate::error::ConsoleError;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Live WebSocket session handle
pub(crate) struct WebSocketConnection {
    pub id: u64,
    pub socket: mpsc::Sender<Message>,
    pub _task_handle: tokio::task::JoinHandle<()>,
}

impl WebSocketConnection {
    pub async fn send(&self, message: Message) -> Result<(), ConsoleError> {
        self.socket
            .send(message)
            .await
            .map_err(|e| ConsoleError::SendError(e.to_string()))
    }

    /// Start the closing handshake; the driver task reports the close
    pub async fn close(&self) -> Result<(), ConsoleError> {
        self.send(Message::Close(None)).await
    }
}
