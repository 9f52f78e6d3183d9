use crate::{
    command::{Command, Parameters, Response},
    error::{ApiError, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{fmt, str::FromStr};

/// Statistics the server's `stats` command knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    RegisteredUsers,
    OnlineUsers,
    OnlineUsersNode,
    UptimeSeconds,
    Processes,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::RegisteredUsers,
        Statistic::OnlineUsers,
        Statistic::OnlineUsersNode,
        Statistic::UptimeSeconds,
        Statistic::Processes,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Statistic::RegisteredUsers => "registeredusers",
            Statistic::OnlineUsers => "onlineusers",
            Statistic::OnlineUsersNode => "onlineusersnode",
            Statistic::UptimeSeconds => "uptimeseconds",
            Statistic::Processes => "processes",
        }
    }
}

impl FromStr for Statistic {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| ApiError::UnknownStatistic(s.to_string()))
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query a server-wide statistic. Always an admin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub name: String,
}

impl Stats {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsResponse {
    pub name: String,
    pub value: i64,
}

impl fmt::Display for StatsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Response for StatsResponse {}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatBody {
    Plain(i64),
    Wrapped {
        #[serde(alias = "stat")]
        value: i64,
    },
}

impl Command for Stats {
    type Output = StatsResponse;

    fn params(&self) -> Result<Parameters> {
        let stat: Statistic = self.name.parse()?;
        Parameters::json("stats", true, &json!({ "name": stat.as_str() }))
    }

    fn parse_response(&self, body: &[u8]) -> Result<StatsResponse> {
        let value = match serde_json::from_slice::<StatBody>(body)? {
            StatBody::Plain(value) | StatBody::Wrapped { value } => value,
        };
        Ok(StatsResponse {
            name: self.name.clone(),
            value,
        })
    }
}
