use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::auth::Credentials;
use crate::error::ConsoleError;
use crate::event::EventHandler;
use crate::message::ConsoleEvent;
use crate::origin::PageOrigin;
use crate::state::{SessionState, Signal};
use crate::view::{ConsoleView, EventRow, UNSUPPORTED_WARNING};

/// Top-level state of the live event console
#[derive(Debug, Clone)]
pub struct Console {
    view: ConsoleView,
    state: SessionState,
    transport_supported: bool,
}

impl Console {
    /// Set up the page for `origin`; without a transport only a warning is shown
    pub fn init(origin: &PageOrigin) -> Self {
        let mut view = ConsoleView::new();
        let transport_supported = origin.supports_websocket();

        if !transport_supported {
            warn!("No WebSocket transport for this origin");
            view.warn(UNSUPPORTED_WARNING);
        }

        Self {
            view,
            state: SessionState::Disconnected,
            transport_supported,
        }
    }

    pub fn is_functional(&self) -> bool {
        self.transport_supported
    }

    pub fn view(&self) -> &ConsoleView {
        &self.view
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn counter(&self) -> u64 {
        self.view.counter()
    }

    /// Type into the `appKey` and `secret` inputs
    pub fn fill_credentials(&mut self, app_key: &str, secret: &str) {
        let form = self.view.form_mut();
        form.app_key = app_key.to_string();
        form.secret = secret.to_string();
    }

    /// Submit the connect form, capturing the credentials to sign with
    pub fn submit_connect(&mut self) -> Result<Credentials, ConsoleError> {
        if !self.transport_supported {
            return Err(ConsoleError::TransportUnsupported(
                UNSUPPORTED_WARNING.to_string(),
            ));
        }

        let form = self.view.form();
        let credentials = Credentials::new(&form.app_key, &form.secret);
        self.state = self.state.connect();
        Ok(credentials)
    }

    /// Submit the disconnect form; counter and table are kept
    pub fn submit_disconnect(&mut self) {
        self.view.form_mut().clear();
    }

    /// Apply a transport signal. Returns the row inserted for a message.
    pub fn handle(&mut self, signal: &Signal) -> Option<EventRow> {
        self.state = self.state.next(signal);

        match signal {
            Signal::Opened => {
                info!("Websocket connected");
                self.view.show_connected();
                None
            }
            Signal::Closed => {
                info!("Websocket closed");
                self.view.show_disconnected();
                None
            }
            Signal::Message(raw) => self.add_event(raw),
            Signal::Errored(err) => {
                error!("Error: {}", err);
                None
            }
        }
    }

    fn add_event(&mut self, raw: &str) -> Option<EventRow> {
        let event = match ConsoleEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed event {:?}: {}", raw, e);
                return None;
            }
        };

        self.view.increment_counter();
        let row = EventRow::from_event(&event);
        self.view.prepend_row(row.clone());
        Some(row)
    }
}

/// Event handler that feeds a shared [`Console`]
pub struct ConsoleHandler {
    console: Arc<Mutex<Console>>,
    echo: bool,
}

impl ConsoleHandler {
    pub fn new(console: Arc<Mutex<Console>>) -> Self {
        Self {
            console,
            echo: false,
        }
    }

    /// Print each new row to stdout as it is added
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    async fn apply(&self, signal: Signal) {
        let mut console = self.console.lock().await;
        if let Some(row) = console.handle(&signal)
            && self.echo
        {
            println!("{:>6} {}", console.counter(), row.to_line());
        }
    }
}

#[async_trait]
impl EventHandler for ConsoleHandler {
    async fn on_open(&self) {
        self.apply(Signal::Opened).await;
    }

    async fn on_close(&self) {
        self.apply(Signal::Closed).await;
    }

    async fn on_message(&self, raw: &str) {
        self.apply(Signal::Message(raw.to_string())).await;
    }

    async fn on_error(&self, error: &str) {
        self.apply(Signal::Errored(error.to_string())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelClass;

    fn console() -> Console {
        Console::init(&PageOrigin::parse("http://localhost:8080").unwrap())
    }

    fn message(event_type: &str, socket: &str) -> Signal {
        Signal::Message(format!(
            r#"{{"type":"{}","socket":"{}","details":"d","time":"t"}}"#,
            event_type, socket
        ))
    }

    #[test]
    fn init_hides_disconnect_control() {
        let console = console();
        assert!(console.is_functional());
        assert!(console.view().connect_visible());
        assert!(!console.view().disconnect_visible());
        assert!(console.view().status().is_empty());
    }

    #[test]
    fn unsupported_transport_warns_and_refuses_connect() {
        let mut console = Console::init(&PageOrigin::parse("file:///console.html").unwrap());
        assert!(!console.is_functional());
        assert_eq!(console.view().status(), [UNSUPPORTED_WARNING]);

        console.fill_credentials("key", "secret");
        assert!(matches!(
            console.submit_connect(),
            Err(ConsoleError::TransportUnsupported(_))
        ));
        assert_eq!(console.state(), SessionState::Disconnected);
    }

    #[test]
    fn submit_connect_captures_form_values() {
        let mut console = console();
        console.fill_credentials("app", "shh");

        let credentials = console.submit_connect().unwrap();
        assert_eq!(credentials.app_key(), "app");
        assert_eq!(console.state(), SessionState::Connecting);
    }

    #[test]
    fn open_and_close_toggle_controls() {
        let mut console = console();
        console.handle(&Signal::Opened);
        assert_eq!(console.state(), SessionState::Open);
        assert!(!console.view().connect_visible());
        assert!(console.view().disconnect_visible());

        console.handle(&Signal::Closed);
        assert_eq!(console.state(), SessionState::Disconnected);
        assert!(console.view().connect_visible());
        assert!(!console.view().disconnect_visible());
    }

    #[test]
    fn events_count_and_stack_most_recent_first() {
        let mut console = console();
        console.handle(&Signal::Opened);

        for i in 0..5 {
            let row = console.handle(&message("Subscribed", &i.to_string())).unwrap();
            assert_eq!(row.label, LabelClass::Info);
        }

        assert_eq!(console.counter(), 5);
        let sockets: Vec<_> = console.view().rows().map(|r| r.socket.as_str()).collect();
        assert_eq!(sockets, ["4", "3", "2", "1", "0"]);
    }

    #[test]
    fn malformed_message_is_skipped() {
        let mut console = console();
        console.handle(&message("Connection", "a"));
        assert!(console.handle(&Signal::Message("{not json".to_string())).is_none());
        console.handle(&message("Foo", "b"));

        assert_eq!(console.counter(), 2);
        let labels: Vec<_> = console.view().rows().map(|r| r.label).collect();
        assert_eq!(labels, [LabelClass::Warning, LabelClass::Success]);
    }

    #[test]
    fn errors_leave_view_untouched() {
        let mut console = console();
        console.handle(&Signal::Opened);
        console.handle(&Signal::Errored("reset by peer".to_string()));

        assert_eq!(console.state(), SessionState::Open);
        assert!(console.view().disconnect_visible());
    }

    #[test]
    fn disconnect_clears_credentials_but_keeps_history() {
        let mut console = console();
        console.fill_credentials("app", "shh");
        console.submit_connect().unwrap();
        console.handle(&Signal::Opened);
        console.handle(&message("Vacated", "x"));

        console.submit_disconnect();
        console.handle(&Signal::Closed);

        assert!(console.view().form().app_key.is_empty());
        assert!(console.view().form().secret.is_empty());
        assert_eq!(console.counter(), 1);
        assert_eq!(console.view().row_count(), 1);
    }

    #[test]
    fn disconnect_without_session_leaves_controls() {
        let mut console = console();
        console.submit_disconnect();

        assert_eq!(console.state(), SessionState::Disconnected);
        assert!(console.view().connect_visible());
        assert!(!console.view().disconnect_visible());
    }

    #[tokio::test]
    async fn handler_applies_signals_to_shared_console() {
        let shared = Arc::new(Mutex::new(console()));
        let handler = ConsoleHandler::new(Arc::clone(&shared));

        handler.on_open().await;
        handler
            .on_message(r#"{"type":"Occupied","socket":"s","details":"d","time":1}"#)
            .await;
        handler.on_close().await;

        let console = shared.lock().await;
        assert_eq!(console.counter(), 1);
        assert_eq!(console.state(), SessionState::Disconnected);
        assert!(console.view().connect_visible());
    }
}
