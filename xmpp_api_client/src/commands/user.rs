//! Per-account queries. Both commands act on a named account and only need
//! admin rights when that account is not the token owner.

use crate::{
    command::{Command, Parameters, Response},
    error::Result,
    jid::Jid,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

fn user_server_body(jid: &Jid) -> serde_json::Value {
    json!({ "user": jid.username, "server": jid.domain })
}

/// Number of messages waiting in an account's offline store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineCount {
    pub jid: String,
}

impl OfflineCount {
    pub fn new(jid: impl Into<String>) -> Self {
        Self { jid: jid.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineCountResponse {
    pub jid: String,
    pub count: u64,
}

impl fmt::Display for OfflineCountResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.jid, self.count)
    }
}

impl Response for OfflineCountResponse {}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountBody {
    Plain(u64),
    Wrapped { value: u64 },
}

impl Command for OfflineCount {
    type Output = OfflineCountResponse;

    fn params(&self) -> Result<Parameters> {
        let jid = Jid::parse(&self.jid)?;
        Parameters::json("get_offline_count", false, &user_server_body(&jid))
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.jid)
    }

    fn parse_response(&self, body: &[u8]) -> Result<OfflineCountResponse> {
        let count = match serde_json::from_slice::<CountBody>(body)? {
            CountBody::Plain(count) | CountBody::Wrapped { value: count } => count,
        };
        Ok(OfflineCountResponse {
            jid: self.jid.clone(),
            count,
        })
    }
}

/// Resources an account is currently connected with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserResources {
    pub jid: String,
}

impl UserResources {
    pub fn new(jid: impl Into<String>) -> Self {
        Self { jid: jid.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResourcesResponse {
    pub jid: String,
    pub resources: Vec<String>,
}

impl fmt::Display for UserResourcesResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resources.join("\n"))
    }
}

impl Response for UserResourcesResponse {}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResourceEntry {
    Plain(String),
    Wrapped { resource: String },
}

impl Command for UserResources {
    type Output = UserResourcesResponse;

    fn params(&self) -> Result<Parameters> {
        let jid = Jid::parse(&self.jid)?;
        Parameters::json("user_resources", false, &user_server_body(&jid))
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.jid)
    }

    fn parse_response(&self, body: &[u8]) -> Result<UserResourcesResponse> {
        let entries: Vec<ResourceEntry> = serde_json::from_slice(body)?;
        let resources = entries
            .into_iter()
            .map(|entry| match entry {
                ResourceEntry::Plain(resource) | ResourceEntry::Wrapped { resource } => resource,
            })
            .collect();
        Ok(UserResourcesResponse {
            jid: self.jid.clone(),
            resources,
        })
    }
}
