use crate::{
    command::{Command, Parameters, RawResponse},
    error::{ApiError, Result},
};

/// Any server command, with a caller-supplied body sent as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    pub name: String,
    pub body: Vec<u8>,
    pub admin: bool,
}

impl RawCommand {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>, admin: bool) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            admin,
        }
    }
}

impl Command for RawCommand {
    type Output = RawResponse;

    fn params(&self) -> Result<Parameters> {
        if self.name.trim().is_empty() {
            return Err(ApiError::MissingField("name"));
        }
        // The name is a single path segment below the api root.
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(ApiError::InvalidCommandName(self.name.clone()));
        }
        Ok(Parameters {
            name: self.name.clone(),
            admin: self.admin,
            body: self.body.clone(),
        })
    }

    fn parse_response(&self, body: &[u8]) -> Result<RawResponse> {
        Ok(RawResponse {
            status: 200,
            body: body.to_vec(),
        })
    }
}
