//! OAuth token value and its JSON file form.
//!
//! The file layout is shared with earlier releases of the command-line tool:
//!
//! ```json
//! {"AccessToken":"AaQTb0PUZqeZhFKYoaTQBb4KKkCTAolE",
//!  "Endpoint":"http://localhost:5281/",
//!  "JID":"admin@localhost",
//!  "Scope":"ejabberd:admin",
//!  "Expiration":"2017-07-23T13:53:08.326421575+02:00"}
//! ```

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};
use tracing::debug;

/// An access token together with the parameters it was issued for.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    #[serde(rename = "AccessToken")]
    pub access_token: String,
    /// Base URL of the server that issued the token.
    #[serde(rename = "Endpoint", default)]
    pub endpoint: String,
    /// Bare JID the token was issued for.
    #[serde(rename = "JID", default)]
    pub jid: String,
    #[serde(rename = "Scope", default)]
    pub scope: String,
    #[serde(rename = "Expiration", default)]
    pub expiration: DateTime<Utc>,
}

impl OAuthToken {
    pub fn is_expired(&self) -> bool {
        self.expiration <= Utc::now()
    }

    /// Writes the token as JSON, readable by owner and group only on Unix.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o640);
        }

        let file = options.open(path)?;
        // `mode` only applies on creation; tighten a file that already existed.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o640))?;
        }
        serde_json::to_writer_pretty(file, self)?;
        debug!(path = %path.display(), jid = %self.jid, "saved oauth token");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("jid", &self.jid)
            .field("scope", &self.scope)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Accepts comma separated scopes and returns the space separated OAuth form.
pub fn prepare_scope(scope: &str) -> String {
    scope.replace(',', " ")
}
