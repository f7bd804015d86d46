//! Plex.tv Account Client
//!
//! Client library for the account side of the Plex.tv cloud API.
//!
//! # Features
//!
//! - **Authentication**: Sign in with username/password, reuse stored tokens
//! - **Profile**: Fetch the signed-in user
//! - **Resources**: List servers, clients and players registered on the account
//! - **Devices**: List and remove registered devices
//! - **Raw access**: `fetch` / `fetch_xml` for any other endpoint
//!
//! # Example
//!
//! ```ignore
//! use plex_account::{Account, ClientConfig, ReqwestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create the transport
//!     let client = ReqwestClient::new(ClientConfig::default())?;
//!
//!     // Sign in
//!     let mut account = Account::new(&client);
//!     let user = account.authenticate("user", "password").await?;
//!     println!("Signed in as {}", user["username"]);
//!
//!     // List servers
//!     for server in &account.servers().await? {
//!         println!("{:?} ({})", server.name, server.client_identifier);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod account;
mod client;
mod device;
mod error;
mod http;
mod types;
pub mod xml;

// Re-export main types
pub use account::{Account, TOKEN_HEADER};
pub use client::ReqwestClient;
pub use device::{Connection, Device, DeviceCollection, CLIENT_CAPABILITY, SERVER_CAPABILITY};
pub use error::{AccountError, Result};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use types::{ClientConfig, FetchOptions, Headers, User};
pub use xml::{XmlDocument, XmlElement, XmlNode};

// Callers building requests need the method type
pub use reqwest::Method;
