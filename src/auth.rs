use std::fmt;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ConsoleError;

type HmacSha256 = Hmac<Sha256>;

/// Version of the console auth scheme sent as `auth_version`
pub const AUTH_VERSION: &str = "1.0";

/// Canonical request prefix the server signs for the console endpoint
const CONSOLE_REQUEST_PREFIX: &str = "GET\n/console\n";

/// Application key and secret as entered in the connect form
#[derive(Clone)]
pub struct Credentials {
    app_key: String,
    secret: String,
}

impl Credentials {
    pub fn new(app_key: &str, secret: &str) -> Self {
        Self {
            app_key: app_key.to_string(),
            secret: secret.to_string(),
        }
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Build the signed query string for the current time
pub fn auth_query_string(credentials: &Credentials) -> Result<String, ConsoleError> {
    signed_query_string(credentials, Utc::now().timestamp())
}

/// Build the signed query string for a given unix timestamp (seconds).
///
/// The result is `auth_key`, `auth_timestamp`, `auth_version` and
/// `auth_signature` in that order, where the signature is the hex HMAC-SHA256
/// of `"GET\n/console\n" + <first three params>` keyed by the secret.
pub fn signed_query_string(
    credentials: &Credentials,
    timestamp: i64,
) -> Result<String, ConsoleError> {
    let timestamp = timestamp.to_string();
    let params = param_string(&[
        ("auth_key", credentials.app_key.as_str()),
        ("auth_timestamp", timestamp.as_str()),
        ("auth_version", AUTH_VERSION),
    ]);

    let signature = sign(
        &credentials.secret,
        &format!("{}{}", CONSOLE_REQUEST_PREFIX, params),
    )?;

    Ok(format!(
        "{}&{}",
        params,
        param_string(&[("auth_signature", signature.as_str())])
    ))
}

/// Hex-encoded HMAC-SHA256 of `payload` keyed by `secret`
pub fn sign(secret: &str, payload: &str) -> Result<String, ConsoleError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ConsoleError::AuthError("HMAC creation failed".to_string()))?;

    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn param_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

// Form encoding: spaces travel as '+'
fn form_encode(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}
