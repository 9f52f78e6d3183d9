//! The contract every API command implements.
//!
//! A command knows how to turn itself into wire [`Parameters`] and how to read
//! the body of a successful (HTTP 200) reply. Everything else (URL, headers,
//! error bodies) is handled once by [`crate::Client`], so new commands can be
//! added without touching the transport.

use crate::error::{ApiError, GENERIC_ERROR_CODE, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// What the client needs to issue a command call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    /// Command name, used as the last path segment of the endpoint.
    pub name: String,
    /// Whether the call must carry the `X-Admin: true` header regardless of
    /// who the command acts on.
    pub admin: bool,
    /// JSON request body.
    pub body: Vec<u8>,
}

impl Parameters {
    pub fn json(name: impl Into<String>, admin: bool, body: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            admin,
            body: serde_json::to_vec(body)?,
        })
    }
}

/// A named remote operation with a typed result.
pub trait Command {
    type Output: Response;

    /// Validates the command and encodes it. Called before any network access.
    fn params(&self) -> Result<Parameters>;

    /// The address this command acts on, if any.
    ///
    /// When it names a different account than the token owner the call is
    /// made with elevated privilege.
    fn subject(&self) -> Option<&str> {
        None
    }

    /// Decodes the body of an HTTP 200 reply.
    fn parse_response(&self, body: &[u8]) -> Result<Self::Output>;
}

/// A decoded command result, printable for humans and as JSON.
pub trait Response: fmt::Display + Serialize {
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Status and body of a call, exactly as the server returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawResponse {
    pub status: u16,
    #[serde(serialize_with = "serialize_body")]
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl Response for RawResponse {}

/// Embeds JSON bodies as JSON and anything else as a string.
fn serialize_body<S: Serializer>(body: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => value.serialize(serializer),
        Err(_) => serializer.serialize_str(&String::from_utf8_lossy(body)),
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Turns a non-200 reply into [`ApiError::Remote`].
pub(crate) fn parse_error(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            code,
            message: Some(message),
        }) => ApiError::Remote {
            status,
            code: code.unwrap_or(GENERIC_ERROR_CODE),
            message,
        },
        _ => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            ApiError::Remote {
                status,
                code: GENERIC_ERROR_CODE,
                message: if text.is_empty() {
                    format!("HTTP status {status}")
                } else {
                    text
                },
            }
        }
    }
}
