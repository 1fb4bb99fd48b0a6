/// Lifecycle of the console session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

/// Signals delivered by the realtime transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Opened,
    Closed,
    Message(String),
    Errored(String),
}

impl SessionState {
    /// State after the user submits the connect form
    pub fn connect(self) -> Self {
        match self {
            SessionState::Open => SessionState::Open,
            _ => SessionState::Connecting,
        }
    }

    /// State after the transport delivers `signal`
    pub fn next(self, signal: &Signal) -> Self {
        match signal {
            Signal::Opened => SessionState::Open,
            Signal::Closed => SessionState::Disconnected,
            Signal::Message(_) | Signal::Errored(_) => self,
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, SessionState::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_session_lifecycle() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Disconnected);

        let state = state.connect();
        assert_eq!(state, SessionState::Connecting);

        let state = state.next(&Signal::Opened);
        assert_eq!(state, SessionState::Open);

        let state = state.next(&Signal::Message("{}".to_string()));
        assert_eq!(state, SessionState::Open);

        let state = state.next(&Signal::Closed);
        assert_eq!(state, SessionState::Disconnected);
        assert!(!state.is_live());
    }

    #[test]
    fn errors_do_not_change_state() {
        let state = SessionState::Connecting.next(&Signal::Errored("boom".to_string()));
        assert_eq!(state, SessionState::Connecting);
        assert!(state.is_live());
    }

    #[test]
    fn close_during_handshake_disconnects() {
        assert_eq!(
            SessionState::Connecting.next(&Signal::Closed),
            SessionState::Disconnected
        );
    }
}
