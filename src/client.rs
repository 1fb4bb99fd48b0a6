use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use tracing::{debug, error, info, trace, warn};

use crate::auth::{Credentials, auth_query_string};
use crate::connection::WebSocketConnection;
use crate::error::ConsoleError;
use crate::event::{EventHandler, dispatch};
use crate::origin::{CONSOLE_PATH, PageOrigin};
use crate::state::{SessionState, Signal};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Identifier of a console session, unique per client
pub type SessionId = u64;

/// Handlers plus the transport state they mirror
#[derive(Clone)]
struct Signals {
    event_handlers: Arc<Mutex<Vec<Box<dyn EventHandler>>>>,
    state: Arc<watch::Sender<SessionState>>,
}

impl Signals {
    async fn emit(&self, signal: Signal) {
        dispatch(&self.event_handlers.lock().await, &signal).await;
        self.state.send_modify(|state| *state = state.next(&signal));
    }
}

/// Client for the `/console` endpoint of a Pusher-compatible server.
///
/// Holds at most one live session. Connecting while a session is live
/// closes the old one first, and nothing from the old session reaches the
/// handlers after that. Disconnecting during a handshake cancels it.
pub struct ConsoleClient {
    origin: PageOrigin,
    generation: Arc<AtomicU64>,
    // Session whose handshake is in flight, 0 when none
    pending: AtomicU64,
    // Last session cancelled by `disconnect` before it opened
    cancelled: AtomicU64,
    connection: Arc<Mutex<Option<Arc<WebSocketConnection>>>>,
    signals: Signals,
}

impl ConsoleClient {
    /// Create a client for the server behind `origin`
    pub fn new(origin: PageOrigin) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);

        Self {
            origin,
            generation: Arc::new(AtomicU64::new(0)),
            pending: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            connection: Arc::new(Mutex::new(None)),
            signals: Signals {
                event_handlers: Arc::new(Mutex::new(Vec::new())),
                state: Arc::new(state),
            },
        }
    }

    pub fn origin(&self) -> &PageOrigin {
        &self.origin
    }

    /// Add an event handler for the connection lifecycle
    pub async fn add_event_handler<H: EventHandler + 'static>(&self, handler: H) {
        let mut handlers = self.signals.event_handlers.lock().await;
        handlers.push(Box::new(handler));
    }

    /// Current transport state
    pub fn state(&self) -> SessionState {
        *self.signals.state.borrow()
    }

    /// Id of the live session, if any
    pub async fn current(&self) -> Option<SessionId> {
        self.connection.lock().await.as_ref().map(|c| c.id)
    }

    /// Open a signed session to the console endpoint.
    ///
    /// The credentials are consumed once the query string is signed. A failed
    /// handshake is reported to the handlers as an error followed by a close.
    pub async fn connect(&self, credentials: Credentials) -> Result<(), ConsoleError> {
        let query = auth_query_string(&credentials)?;
        drop(credentials);
        let url = self.origin.console_url(&query)?;

        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.store(id, Ordering::SeqCst);

        let previous = self.connection.lock().await.take();
        if let Some(previous) = previous {
            info!("Closing console session {} before reconnecting", previous.id);
            if let Err(e) = previous.close().await {
                warn!("Error sending close frame: {}", e);
            }
        }
        self.signals.state.send_replace(SessionState::Connecting);

        info!(
            "Connecting to {}//{}{}",
            self.origin.websocket_protocol(),
            url.host_str().unwrap_or_default(),
            CONSOLE_PATH
        );

        let ws_stream = match connect_async(url.as_str()).await {
            Ok((stream, response)) => {
                debug!("Connected to console endpoint. Status: {}", response.status());
                stream
            }
            Err(e) => {
                error!("Failed to connect to console endpoint: {}", e);
                self.clear_pending(id);
                if self.is_current(id) {
                    self.signals.emit(Signal::Errored(e.to_string())).await;
                    self.signals.emit(Signal::Closed).await;
                } else if self.was_cancelled(id) {
                    self.signals.emit(Signal::Closed).await;
                }
                return Err(e.into());
            }
        };

        let (tx, rx) = mpsc::channel::<Message>(100);
        let (ready_tx, ready_rx) = oneshot::channel();
        {
            let mut slot = self.connection.lock().await;
            self.clear_pending(id);
            if !self.is_current(id) {
                drop(slot);
                return self.abandon(id, ws_stream).await;
            }

            let (sink, stream) = ws_stream.split();
            *slot = Some(Arc::new(WebSocketConnection {
                id,
                socket: tx,
                _task_handle: self.spawn_ws_task(id, sink, stream, rx, ready_rx),
            }));
        }

        // The driver task waits for this so frames never precede the open
        if self.is_current(id) {
            self.signals.emit(Signal::Opened).await;
        }
        let _ = ready_tx.send(());

        Ok(())
    }

    fn is_current(&self, id: SessionId) -> bool {
        self.generation.load(Ordering::SeqCst) == id
    }

    fn clear_pending(&self, id: SessionId) {
        let _ = self
            .pending
            .compare_exchange(id, 0, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Cancelled by `disconnect`, with no newer connect since
    fn was_cancelled(&self, id: SessionId) -> bool {
        self.cancelled.load(Ordering::SeqCst) == id
            && self.generation.load(Ordering::SeqCst) == id + 1
    }

    /// Close a stream whose session ended before it was installed
    async fn abandon(&self, id: SessionId, mut ws_stream: WsStream) -> Result<(), ConsoleError> {
        if let Err(e) = ws_stream.close(None).await {
            debug!("Error closing abandoned session {}: {}", id, e);
        }

        if self.was_cancelled(id) {
            info!("Console session {} cancelled during handshake", id);
            self.signals.emit(Signal::Closed).await;
            return Err(ConsoleError::ConnectionError(format!(
                "Session {} cancelled during handshake",
                id
            )));
        }

        Err(ConsoleError::ConnectionError(format!(
            "Session {} superseded during handshake",
            id
        )))
    }

    /// Drive one session: forward queued frames, dispatch inbound ones
    fn spawn_ws_task(
        &self,
        id: SessionId,
        mut sink: SplitSink<WsStream, Message>,
        mut stream: SplitStream<WsStream>,
        mut rx: mpsc::Receiver<Message>,
        ready: oneshot::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let signals = self.signals.clone();
        let generation = Arc::clone(&self.generation);
        let connection = Arc::clone(&self.connection);

        tokio::spawn(async move {
            let _ = ready.await;
            let is_current = || generation.load(Ordering::SeqCst) == id;
            let mut outbound_open = true;

            loop {
                tokio::select! {
                    outbound = rx.recv(), if outbound_open => match outbound {
                        Some(message) => {
                            if let Err(e) = sink.send(message).await {
                                error!("Error sending message: {}", e);
                                if is_current() {
                                    signals.emit(Signal::Errored(e.to_string())).await;
                                }
                                break;
                            }
                        }
                        None => outbound_open = false,
                    },
                    inbound = stream.next() => match inbound {
                        Some(Ok(Message::Text(text))) => {
                            trace!("Received message: {}", text);
                            if is_current() {
                                signals.emit(Signal::Message(text)).await;
                            } else {
                                debug!("Dropping message for superseded session {}", id);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping");
                            if let Err(e) = sink.send(Message::Pong(data)).await {
                                error!("Failed to send pong: {}", e);
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!("Close frame received: {:?}", frame);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            if is_current() {
                                signals.emit(Signal::Errored(e.to_string())).await;
                            }
                            break;
                        }
                        None => break,
                    },
                }
            }

            if !is_current() {
                debug!("Superseded session {} finished", id);
                return;
            }

            {
                let mut slot = connection.lock().await;
                if slot.as_ref().is_some_and(|c| c.id == id) {
                    *slot = None;
                }
            }

            signals.emit(Signal::Closed).await;
        })
    }

    /// Close the live session, or cancel one still in its handshake.
    /// A no-op when nothing is connected.
    pub async fn disconnect(&self) -> Result<(), ConsoleError> {
        let connection = {
            let mut slot = self.connection.lock().await;
            let connection = slot.take();

            if connection.is_none() {
                let pending = self.pending.swap(0, Ordering::SeqCst);
                if pending != 0 && self.is_current(pending) {
                    info!("Cancelling console session {} during handshake", pending);
                    self.cancelled.store(pending, Ordering::SeqCst);
                    self.generation.fetch_add(1, Ordering::SeqCst);
                } else {
                    debug!("Disconnect requested with no live session");
                }
            }
            connection
        };

        if let Some(connection) = connection {
            info!("Disconnecting console session {}", connection.id);
            if let Err(e) = connection.close().await {
                warn!("Error sending close frame: {}", e);
            }
        }

        Ok(())
    }

    /// Wait until the session is closed, by either side
    pub async fn wait_for_disconnect(&self) {
        let mut state = self.signals.state.subscribe();
        if state.wait_for(|state| !state.is_live()).await.is_err() {
            warn!("Session state channel closed");
        }
    }
}
