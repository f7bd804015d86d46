//! The Plex.tv account client.

use crate::device::{DeviceCollection, CLIENT_CAPABILITY, SERVER_CAPABILITY};
use crate::error::{AccountError, Result};
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::types::{FetchOptions, Headers, User};
use crate::xml::{self, XmlDocument};
use reqwest::Method;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, info, warn};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "X-Plex-Token";

const ACCEPT: &str = "Accept";
const JSON_MIME: &str = "application/json";

const SIGN_IN_PATH: &str = "/users/sign_in.json";
const USER_PATH: &str = "/api/v2/user";
const RESOURCES_PATH: &str = "/api/resources";
const DEVICES_PATH: &str = "/devices.json";

/// One Plex.tv session, authenticated or anonymous.
///
/// The account borrows its HTTP client; the client supplies the default
/// headers and the transport, the account adds the session token and
/// shapes responses.
///
/// Changing the token takes `&mut self`, so requests in flight on a
/// shared `&Account` always see a consistent token. Callers sharing one
/// account across tasks need their own lock.
pub struct Account<'a, C: HttpClient + ?Sized> {
    client: &'a C,
    auth_token: Option<String>,
}

impl<'a, C: HttpClient + ?Sized> Account<'a, C> {
    /// Create an anonymous account.
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            auth_token: None,
        }
    }

    /// Create an account from a previously obtained token.
    pub fn with_token(client: &'a C, auth_token: impl Into<String>) -> Self {
        Self {
            client,
            auth_token: Some(auth_token.into()),
        }
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Replace or clear the session token.
    pub fn set_auth_token(&mut self, auth_token: Option<String>) {
        self.auth_token = auth_token;
    }

    /// Headers sent with every request: the client's defaults plus the
    /// session token when one is held.
    pub fn headers(&self) -> Headers {
        let mut headers = self.client.headers();
        if let Some(token) = &self.auth_token {
            headers.insert(TOKEN_HEADER.to_string(), token.clone());
        }
        headers
    }

    /// Request `path` and decode the JSON body.
    ///
    /// `Accept: application/json` is always sent, overriding any caller
    /// value. An empty successful body decodes to `Value::Null`.
    pub async fn fetch(&self, path: &str, options: FetchOptions) -> Result<Value> {
        let response = self.execute(path, options, true, true).await?;
        decode_json(&response)
    }

    /// Request `path` and decode the XML body.
    ///
    /// See the [`xml`](crate::xml) module for the decoded shape.
    pub async fn fetch_xml(&self, path: &str, options: FetchOptions) -> Result<XmlDocument> {
        let response = self.execute(path, options, true, false).await?;
        xml::parse(&response.text())
    }

    /// Sign in with username and password.
    ///
    /// The request never carries the current token. On success the token
    /// from the returned user record replaces the held one and the record
    /// is returned; on failure the held token is left untouched.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<User> {
        debug!(username = %username, "Signing in to Plex.tv");

        let options = FetchOptions::new().method(Method::POST).json(json!({
            "username": username,
            "password": password,
        }));

        let response = match self.execute(SIGN_IN_PATH, options, false, true).await {
            Ok(response) => response,
            Err(e) => {
                if let Some(status) = e.status() {
                    warn!(status, "Sign-in rejected");
                }
                return Err(e);
            }
        };

        let body = decode_json(&response)?;
        let user = body.get("user").cloned().unwrap_or(Value::Null);
        let token = user
            .get("authToken")
            .or_else(|| user.get("authentication_token"))
            .and_then(Value::as_str)
            .ok_or(AccountError::MissingToken)?;

        self.auth_token = Some(token.to_string());
        info!(username = %username, "Signed in to Plex.tv");

        Ok(user)
    }

    /// The signed-in user's profile.
    pub async fn info(&self) -> Result<User> {
        self.fetch(USER_PATH, FetchOptions::default()).await
    }

    /// Devices registered on the account, as returned by the JSON endpoint.
    pub async fn devices(&self) -> Result<Value> {
        self.fetch(DEVICES_PATH, FetchOptions::default()).await
    }

    /// Every resource (server, client, player) visible to the account.
    pub async fn resources(&self) -> Result<DeviceCollection> {
        self.resources_with(FetchOptions::default()).await
    }

    /// [`resources`](Self::resources) with extra request options.
    ///
    /// `includeHttps=1&includeRelay=1` always lead the query string.
    pub async fn resources_with(&self, options: FetchOptions) -> Result<DeviceCollection> {
        let options = options.with_leading_params(&[("includeHttps", "1"), ("includeRelay", "1")]);
        let document = self.fetch_xml(RESOURCES_PATH, options).await?;
        let devices = DeviceCollection::from_document(&document);

        debug!(count = devices.len(), "Fetched resources");
        Ok(devices)
    }

    /// Resources providing the `server` capability, in listing order.
    pub async fn servers(&self) -> Result<DeviceCollection> {
        self.servers_with(FetchOptions::default()).await
    }

    pub async fn servers_with(&self, options: FetchOptions) -> Result<DeviceCollection> {
        Ok(self
            .resources_with(options)
            .await?
            .with_capability(SERVER_CAPABILITY))
    }

    /// Resources providing the `client` capability, in listing order.
    pub async fn clients(&self) -> Result<DeviceCollection> {
        self.clients_with(FetchOptions::default()).await
    }

    pub async fn clients_with(&self, options: FetchOptions) -> Result<DeviceCollection> {
        Ok(self
            .resources_with(options)
            .await?
            .with_capability(CLIENT_CAPABILITY))
    }

    /// Unregister a device. Any 2xx status is success.
    pub async fn remove_device(&self, id: impl fmt::Display) -> Result<()> {
        let path = format!("/devices/{}.json", id);
        let options = FetchOptions::new().method(Method::DELETE);

        self.execute(&path, options, true, true).await?;
        info!(device = %id, "Removed device");

        Ok(())
    }

    /// Send a request and reject non-2xx responses.
    ///
    /// Caller headers are merged over the client defaults. A held token
    /// (when `send_token`) and the JSON `Accept` (when `accept_json`) are
    /// applied last and cannot be overridden.
    async fn execute(
        &self,
        path: &str,
        options: FetchOptions,
        send_token: bool,
        accept_json: bool,
    ) -> Result<HttpResponse> {
        let mut headers = self.client.headers();
        headers.extend(options.headers);
        if send_token {
            if let Some(token) = &self.auth_token {
                force_header(&mut headers, TOKEN_HEADER, token);
            }
        }
        if accept_json {
            force_header(&mut headers, ACCEPT, JSON_MIME);
        }

        let request = HttpRequest {
            method: options.method,
            path: path.to_string(),
            headers,
            params: options.params,
            body: options.body,
        };
        debug!(method = %request.method, path = %request.path_and_query(), "Plex.tv request");

        let response = self.client.request(request).await?;

        if response.is_success() {
            Ok(response)
        } else {
            debug!(status = response.status, "Plex.tv request failed");
            Err(AccountError::Http {
                status: response.status,
                response: error_body(&response),
            })
        }
    }
}

impl<C: HttpClient + ?Sized> Clone for Account<'_, C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            auth_token: self.auth_token.clone(),
        }
    }
}

impl<C: HttpClient + ?Sized> fmt::Debug for Account<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Set `name`, replacing any existing value regardless of case.
fn force_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

fn decode_json(response: &HttpResponse) -> Result<Value> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// Best-effort decoding of an error body: JSON, then XML, then raw text.
fn error_body(response: &HttpResponse) -> Value {
    let text = response.text();
    if text.trim().is_empty() {
        return Value::Null;
    }

    if let Ok(value) = serde_json::from_str(&text) {
        return value;
    }
    if let Ok(document) = xml::parse(&text) {
        return document.to_json();
    }

    Value::String(text)
}
