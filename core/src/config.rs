//! Request client configuration: base URL plus headers sent with every call.

use log::debug;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "PHARMACY_API_URL";

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Configuration for `base_url` with the JSON default headers.
    /// A trailing slash on `base_url` is stripped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
        }
    }

    /// Read `PHARMACY_API_URL`, loading a `.env` file first when present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("loaded environment from {}", path.display());
        }
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    /// Add or replace a default header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.default_headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
