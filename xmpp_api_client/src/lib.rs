//! # XMPP API Client
//!
//! Client for the administrative HTTP API of an XMPP server (ejabberd's
//! `mod_http_api`) and its OAuth token endpoint.
//!
//! ## Key Features
//!
//! - **Token acquisition**: password grant (default) or the legacy
//!   redirect-based implicit grant, selected with [`GrantFlow`].
//! - **Token file**: [`OAuthToken`] saves to and loads from the JSON file used
//!   by the command-line tool.
//! - **Commands**: typed `stats`, `register`, `get_offline_count` and
//!   `user_resources` calls plus a raw passthrough. New commands only need to
//!   implement [`Command`].
//! - **Privilege**: calls acting on an account other than the token owner
//!   carry the `X-Admin: true` header.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use xmpp_api_client::{Client, ClientConfig, TokenRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("http://localhost:5281/"))?;
//! let request = TokenRequest::new(
//!     "admin@localhost",
//!     "passw0rd",
//!     "ejabberd:admin",
//!     Duration::from_secs(3600),
//! );
//! let token = client.get_token(&request).await?;
//!
//! let client = client.with_token(token);
//! let users = client.stats("registeredusers").await?;
//! println!("{users}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod commands;
pub mod config;
pub mod endpoint;
/// Error types for API client operations.
pub mod error;
pub mod grant;
pub mod jid;
pub mod token;
pub mod transport;

pub use client::Client;
pub use command::{Command, Parameters, RawResponse, Response};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use grant::{GrantFlow, TokenRequest};
pub use jid::Jid;
pub use token::OAuthToken;
pub use transport::{ApiRequest, HttpTransport, Transport};
