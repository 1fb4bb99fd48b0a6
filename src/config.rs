//! Console configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first via `dotenvy`.
//! Command line flags take precedence over anything set here.

/// Origin used when `CONSOLE_ORIGIN` is not set
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Settings for one console run
#[derive(Clone, Default)]
pub struct ConsoleConfig {
    /// Origin the console talks to, e.g. `https://pusher.example.com`.
    pub origin: String,

    /// Application key (`PUSHER_APP_KEY`).
    pub app_key: Option<String>,

    /// Application secret (`PUSHER_SECRET`).
    pub secret: Option<String>,
}

impl std::fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConfig")
            .field("origin", &self.origin)
            .field("app_key", &self.app_key)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConsoleConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            origin: std::env::var("CONSOLE_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string()),
            app_key: non_empty_env("PUSHER_APP_KEY"),
            secret: non_empty_env("PUSHER_SECRET"),
        }
    }

    /// Overlay values given on the command line
    pub fn with_overrides(
        mut self,
        origin: Option<String>,
        app_key: Option<String>,
        secret: Option<String>,
    ) -> Self {
        if let Some(origin) = origin {
            self.origin = origin;
        }
        if app_key.is_some() {
            self.app_key = app_key;
        }
        if secret.is_some() {
            self.secret = secret;
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
