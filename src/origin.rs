use url::Url;

use crate::error::ConsoleError;

/// Path of the monitoring endpoint on the server
pub const CONSOLE_PATH: &str = "/console";

/// The origin the console is served from.
///
/// The WebSocket endpoint lives on the same host, with `wss:` for a secure
/// origin and `ws:` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrigin {
    url: Url,
}

impl PageOrigin {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(origin: &str) -> Result<Self, ConsoleError> {
        Ok(Self::new(Url::parse(origin)?))
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn websocket_protocol(&self) -> &'static str {
        if self.is_secure() { "wss:" } else { "ws:" }
    }

    /// Host with the port appended when it is not the scheme default
    pub fn host(&self) -> Option<String> {
        let host = self.url.host_str()?;
        Some(match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// Whether a WebSocket can be opened from this origin at all
    pub fn supports_websocket(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https") && self.url.host_str().is_some()
    }

    /// `<protocol>//<host>/console?<query>`
    pub fn console_url(&self, query: &str) -> Result<Url, ConsoleError> {
        if !self.supports_websocket() {
            return Err(ConsoleError::TransportUnsupported(format!(
                "no WebSocket transport for origin {}",
                self.url
            )));
        }

        let host = self
            .host()
            .ok_or_else(|| ConsoleError::ConnectionError("Origin has no host".to_string()))?;

        let url = format!(
            "{}//{}{}?{}",
            self.websocket_protocol(),
            host,
            CONSOLE_PATH,
            query
        );
        Ok(Url::parse(&url)?)
    }
}
