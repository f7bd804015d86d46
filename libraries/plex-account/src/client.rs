//! reqwest-backed HTTP client for Plex.tv.

use crate::error::{AccountError, Result};
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::types::{ClientConfig, Headers};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default [`HttpClient`] implementation.
///
/// Sends requests to `config.base_url` and identifies itself to Plex.tv
/// with the `X-Plex-*` client headers built from the configuration.
///
/// # Example
///
/// ```ignore
/// use plex_account::{Account, ClientConfig, ReqwestClient};
///
/// let client = ReqwestClient::new(ClientConfig::default())?;
/// let mut account = Account::new(&client);
/// account.authenticate("user", "password").await?;
/// let servers = account.servers().await?;
/// ```
pub struct ReqwestClient {
    http: Client,
    config: ClientConfig,
}

impl ReqwestClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate URL
        if config.base_url.is_empty() {
            return Err(AccountError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AccountError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&base_url).map_err(|e| AccountError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(format!("{}/{}", config.product, config.version))
            .build()
            .map_err(AccountError::Request)?;

        Ok(Self {
            http,
            config: ClientConfig { base_url, ..config },
        })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    fn headers(&self) -> Headers {
        let config = &self.config;
        let mut headers = Headers::new();

        headers.insert(
            "X-Plex-Client-Identifier".to_string(),
            config.client_identifier.clone(),
        );
        headers.insert("X-Plex-Product".to_string(), config.product.clone());
        headers.insert("X-Plex-Version".to_string(), config.version.clone());

        let optional = [
            ("X-Plex-Device", &config.device),
            ("X-Plex-Device-Name", &config.device_name),
            ("X-Plex-Platform", &config.platform),
            ("X-Plex-Platform-Version", &config.platform_version),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                headers.insert(name.to_string(), value.clone());
            }
        }

        headers
    }

    async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = format!("{}{}", self.config.base_url, request.path_and_query());
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.http.request(request.method.clone(), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                AccountError::Unreachable(e.to_string())
            } else {
                AccountError::Request(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "Received response");

        Ok(HttpResponse { status, body })
    }
}
