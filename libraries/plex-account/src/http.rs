//! The HTTP seam between [`Account`](crate::Account) and the network.

use crate::error::Result;
use crate::types::Headers;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// An outgoing request, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: Headers,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Path with the query parameters appended, form-urlencoded.
    pub fn path_and_query(&self) -> String {
        if self.params.is_empty() {
            return self.path.clone();
        }

        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        let separator = if self.path.contains('?') { '&' } else { '?' };

        format!("{}{}{}", self.path, separator, query)
    }

    /// Look up a header ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A raw response: status and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport used by [`Account`](crate::Account).
///
/// Implementations supply the default headers sent with every request and
/// perform requests. `request` must return the response for every status
/// code and fail only when no response was received; status handling
/// belongs to the account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Headers to merge into every request.
    fn headers(&self) -> Headers;

    /// Perform a request.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse>;
}
