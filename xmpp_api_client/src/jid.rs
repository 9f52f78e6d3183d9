//! XMPP address parsing.
//!
//! Only the split into node, domain and resource is performed. No case folding,
//! stringprep or IDNA normalisation is applied.

use crate::error::{ApiError, Result};
use std::{fmt, str::FromStr};

/// A parsed `user@domain[/resource]` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    pub username: String,
    pub domain: String,
    pub resource: Option<String>,
}

impl Jid {
    /// Parses an address. The resource is everything after the first `/` and
    /// may itself contain `@` or `/`; the part before it must contain exactly
    /// one `@`.
    pub fn parse(s: &str) -> Result<Self> {
        let (node_domain, resource) = match s.split_once('/') {
            Some((head, res)) => (head, Some(res.to_string())),
            None => (s, None),
        };

        let mut parts = node_domain.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(username), Some(domain), None) if !username.is_empty() && !domain.is_empty() => {
                Ok(Self {
                    username: username.to_string(),
                    domain: domain.to_string(),
                    resource,
                })
            }
            _ => Err(ApiError::InvalidJid(s.to_string())),
        }
    }

    /// `user@domain`, without the resource.
    pub fn bare(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }
}

impl FromStr for Jid {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}@{}/{}", self.username, self.domain, resource),
            None => write!(f, "{}@{}", self.username, self.domain),
        }
    }
}

/// Whether two address strings name the same account.
///
/// Resources are ignored. When either side does not parse, the raw strings are
/// compared.
pub(crate) fn same_account(a: &str, b: &str) -> bool {
    match (Jid::parse(a), Jid::parse(b)) {
        (Ok(a), Ok(b)) => a.username == b.username && a.domain == b.domain,
        _ => a == b,
    }
}
