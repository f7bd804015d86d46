//! Types shared by the account client and its HTTP collaborator.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Header name to value mapping.
pub type Headers = BTreeMap<String, String>;

/// A Plex.tv user record.
///
/// The record is kept as raw JSON; only the token field is read by the client.
pub type User = Value;

/// Configuration for the reqwest-backed HTTP client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "https://plex.tv")
    pub base_url: String,
    /// Unique identifier of this client installation
    pub client_identifier: String,
    /// Product name reported to Plex.tv
    pub product: String,
    /// Product version reported to Plex.tv
    pub version: String,
    pub device: Option<String>,
    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://plex.tv".to_string(),
            client_identifier: uuid::Uuid::new_v4().to_string(),
            product: "plex-account".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            device: None,
            device_name: None,
            platform: None,
            platform_version: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_client_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.client_identifier = identifier.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>, version: impl Into<String>) -> Self {
        self.product = product.into();
        self.version = version.into();
        self
    }

    pub fn with_device(mut self, device: impl Into<String>, name: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self.device_name = Some(name.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>, version: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self.platform_version = Some(version.into());
        self
    }
}

/// Per-request options for [`Account::fetch`](crate::Account::fetch) and
/// [`Account::fetch_xml`](crate::Account::fetch_xml).
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// HTTP method (GET unless overridden)
    pub method: Method,
    /// Query parameters, serialized in insertion order
    pub params: Vec<(String, String)>,
    /// Extra headers merged over the client's default headers.
    ///
    /// A caller value may replace an identification header, but never the
    /// account's session token or the JSON `Accept` forced by `fetch`.
    pub headers: Headers,
    /// JSON request body
    pub body: Option<Value>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            params: Vec::new(),
            headers: Headers::new(),
            body: None,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append a query parameter. Strings and numbers are both accepted.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Put `params` in front of the caller's parameters.
    pub(crate) fn with_leading_params(mut self, params: &[(&str, &str)]) -> Self {
        let mut merged: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        merged.append(&mut self.params);
        self.params = merged;
        self
    }
}
