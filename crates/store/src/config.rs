//! Connection settings for the graph store

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_ADDRESS: &str = "localhost";
const DEFAULT_PORT: u16 = 443;
const DEFAULT_ENCRYPT: bool = true;
const DEFAULT_SSL_VALIDATE_CERTIFICATE: bool = false;
const DEFAULT_ENDPOINT_PATH: &str = "/sparql";

/// Where and how to reach the store. Read once at startup.
#[derive(Clone)]
pub struct StoreConfig {
    pub address: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub encrypt: bool,
    pub ssl_validate_certificate: bool,
    pub endpoint_path: String,
    pub timeout: Option<Duration>,
}

impl StoreConfig {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            user: None,
            password: None,
            encrypt: DEFAULT_ENCRYPT,
            ssl_validate_certificate: DEFAULT_SSL_VALIDATE_CERTIFICATE,
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            timeout: None,
        }
    }

    /// Builder pattern: set credentials
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Builder pattern: set transport encryption flags
    pub fn with_encryption(mut self, encrypt: bool, ssl_validate_certificate: bool) -> Self {
        self.encrypt = encrypt;
        self.ssl_validate_certificate = ssl_validate_certificate;
        self
    }

    /// Read `GRAPH_STORE_*` variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            address: env_or_default("GRAPH_STORE_ADDRESS", DEFAULT_ADDRESS),
            port: env_parsed("GRAPH_STORE_PORT").unwrap_or(DEFAULT_PORT),
            user: env_non_empty("GRAPH_STORE_USER"),
            password: env_non_empty("GRAPH_STORE_PASSWORD"),
            encrypt: env_flag("GRAPH_STORE_ENCRYPT", DEFAULT_ENCRYPT),
            ssl_validate_certificate: env_flag(
                "GRAPH_STORE_SSL_VALIDATE_CERTIFICATE",
                DEFAULT_SSL_VALIDATE_CERTIFICATE,
            ),
            endpoint_path: env_or_default("GRAPH_STORE_ENDPOINT_PATH", DEFAULT_ENDPOINT_PATH),
            timeout: env_parsed::<u64>("GRAPH_STORE_TIMEOUT_SECS")
                .filter(|value| *value > 0)
                .map(Duration::from_secs),
        }
    }

    /// Base URL of the SPARQL endpoint
    pub fn endpoint_url(&self) -> String {
        let scheme = if self.encrypt { "https" } else { "http" };
        let path = self.endpoint_path.trim_start_matches('/');
        format!("{}://{}:{}/{}", scheme, self.address, self.port, path)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, DEFAULT_PORT)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("encrypt", &self.encrypt)
            .field("ssl_validate_certificate", &self.ssl_validate_certificate)
            .field("endpoint_path", &self.endpoint_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| parse_setting(key, &value))
}

/// A value that does not parse is ignored with a warning, so the default applies
fn parse_setting<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value, using the default", key, value);
            None
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|value| parse_flag(&value))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    matches!(value.as_str(), "1" | "true" | "yes" | "on")
}
