use crate::{
    command::{Command, Parameters, Response},
    error::Result,
    jid::Jid,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Create a new account. Always an admin call.
#[derive(Clone, PartialEq, Eq)]
pub struct Register {
    pub jid: String,
    pub password: String,
}

impl Register {
    pub fn new(jid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("jid", &self.jid)
            .finish_non_exhaustive()
    }
}

/// Confirmation message returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegisterResponse(pub String);

impl fmt::Display for RegisterResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Response for RegisterResponse {}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegisterBody {
    Plain(String),
    Wrapped { message: String },
}

impl Command for Register {
    type Output = RegisterResponse;

    fn params(&self) -> Result<Parameters> {
        let jid = Jid::parse(&self.jid)?;
        Parameters::json(
            "register",
            true,
            &json!({
                "user": jid.username,
                "host": jid.domain,
                "password": self.password,
            }),
        )
    }

    fn parse_response(&self, body: &[u8]) -> Result<RegisterResponse> {
        let message = match serde_json::from_slice::<RegisterBody>(body)? {
            RegisterBody::Plain(message) | RegisterBody::Wrapped { message } => message,
        };
        Ok(RegisterResponse(message))
    }
}
