//! Token acquisition against the server's OAuth handler.
//!
//! Two grant flows are available. [`GrantFlow::Password`] posts the
//! credentials to `<oauth>/token` and reads a JSON token response.
//! [`GrantFlow::Implicit`] posts to `<oauth>/authorization_token` and reads
//! the token from the query string of the redirect the server answers with;
//! it only works with a client that does not follow redirects.

use crate::{
    config::ClientConfig,
    endpoint::{authorization_token_url, token_url},
    error::{ApiError, Result},
    jid::Jid,
    token::{OAuthToken, prepare_scope},
};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{StatusCode, header::LOCATION};
use serde::Deserialize;
use std::{borrow::Cow, time::Duration};
use tracing::{debug, info, warn};
use url::Url;

/// Which token endpoint protocol to speak.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GrantFlow {
    /// `grant_type=password` against `<oauth>/token`.
    #[default]
    Password,
    /// `response_type=token` against `<oauth>/authorization_token`.
    Implicit { client_id: String },
}

/// Credentials and parameters for a token request.
#[derive(Clone)]
pub struct TokenRequest {
    pub jid: String,
    pub password: String,
    /// Space or comma separated scope list.
    pub scope: String,
    /// Requested token lifetime, sent as whole seconds.
    pub ttl: Duration,
}

impl TokenRequest {
    pub fn new(
        jid: impl Into<String>,
        password: impl Into<String>,
        scope: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            jid: jid.into(),
            password: password.into(),
            scope: scope.into(),
            ttl,
        }
    }
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("jid", &self.jid)
            .field("scope", &self.scope)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct PasswordGrantResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub(crate) async fn acquire(
    http: &reqwest::Client,
    config: &ClientConfig,
    request: &TokenRequest,
    flow: &GrantFlow,
) -> Result<OAuthToken> {
    let jid = Jid::parse(&request.jid)?;
    let scope = prepare_scope(&request.scope);

    let (access_token, expires_in) = match flow {
        GrantFlow::Password => password_grant(http, config, &jid, request, &scope).await?,
        GrantFlow::Implicit { client_id } => {
            implicit_grant(http, config, &jid, request, &scope, client_id).await?
        }
    };

    if access_token.is_empty() {
        return Err(ApiError::MissingAccessToken);
    }

    let lifetime = expires_in.unwrap_or_else(|| request.ttl.as_secs());
    let expiration = expires_at(Utc::now(), lifetime);
    info!(jid = %jid.bare(), %expiration, "obtained oauth token");

    Ok(OAuthToken {
        access_token,
        endpoint: config.base_url.clone(),
        jid: jid.bare(),
        scope,
        expiration,
    })
}

async fn password_grant(
    http: &reqwest::Client,
    config: &ClientConfig,
    jid: &Jid,
    request: &TokenRequest,
    scope: &str,
) -> Result<(String, Option<u64>)> {
    let url = token_url(&config.base_url, config.oauth_path.as_deref())?;
    let form = [
        ("grant_type", "password".to_string()),
        ("username", jid.bare()),
        ("password", request.password.clone()),
        ("scope", scope.to_string()),
        ("ttl", request.ttl.as_secs().to_string()),
    ];

    debug!(url = %url, jid = %jid.bare(), "requesting token with password grant");
    let response = http.post(&url).form(&form).send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::EndpointNotFound);
    }

    let body = response.bytes().await?;

    if status == StatusCode::BAD_REQUEST {
        let parsed: OAuthErrorBody =
            serde_json::from_slice(&body).map_err(|_| ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })?;
        warn!(error = %parsed.error, "token request rejected");
        let description = parsed
            .error_description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| parsed.error.clone());
        return Err(ApiError::OAuth {
            error: parsed.error,
            description,
        });
    }

    if !status.is_success() {
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    let parsed: PasswordGrantResponse = serde_json::from_slice(&body)?;
    debug!(
        token_type = parsed.token_type.as_deref().unwrap_or("bearer"),
        scope = parsed.scope.as_deref().unwrap_or(""),
        "token response parsed"
    );
    Ok((parsed.access_token, parsed.expires_in))
}

async fn implicit_grant(
    http: &reqwest::Client,
    config: &ClientConfig,
    jid: &Jid,
    request: &TokenRequest,
    scope: &str,
    client_id: &str,
) -> Result<(String, Option<u64>)> {
    let url = authorization_token_url(&config.base_url, config.oauth_path.as_deref())?;
    let form = [
        ("response_type", "token".to_string()),
        ("state", String::new()),
        ("client_id", client_id.to_string()),
        ("redirect_uri", String::new()),
        ("scope", scope.to_string()),
        ("username", jid.username.clone()),
        ("server", jid.domain.clone()),
        ("password", request.password.clone()),
        ("ttl", request.ttl.as_secs().to_string()),
    ];

    debug!(url = %url, jid = %jid.bare(), "requesting token with implicit grant");
    let response = http.post(&url).form(&form).send().await?;
    let status = response.status();

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let location = match location {
        Some(location) if status.is_redirection() => location,
        _ => {
            let body = response.text().await?;
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
    };

    let redirect = Url::parse(&url)
        .and_then(|base| base.join(&location))
        .map_err(|_| ApiError::InvalidUrl(location.clone()))?;
    let fields = RedirectFields::from_url(&redirect);

    if let Some(error) = fields.error {
        warn!(error = %error, "token request rejected");
        return Err(ApiError::OAuth {
            description: fields.error_description.unwrap_or_else(|| error.clone()),
            error,
        });
    }

    if status != StatusCode::FOUND {
        return Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            body: location,
        });
    }

    Ok((fields.access_token.unwrap_or_default(), fields.expires_in))
}

#[derive(Debug, Default)]
struct RedirectFields {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    expires_in: Option<u64>,
}

impl RedirectFields {
    /// Reads the query string, falling back to the fragment when the query
    /// carries neither a token nor an error.
    fn from_url(url: &Url) -> Self {
        let from_query = Self::from_pairs(url.query_pairs());
        if from_query.access_token.is_some() || from_query.error.is_some() {
            return from_query;
        }
        match url.fragment() {
            Some(fragment) => Self::from_pairs(url::form_urlencoded::parse(fragment.as_bytes())),
            None => from_query,
        }
    }

    fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut fields = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "access_token" => fields.access_token = Some(value.into_owned()),
                "error" => fields.error = Some(value.into_owned()),
                "error_description" => fields.error_description = Some(value.into_owned()),
                "expires_in" => fields.expires_in = value.parse().ok(),
                _ => {}
            }
        }
        fields
    }
}

fn expires_at(from: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_query_is_parsed() {
        let url = Url::parse("http://localhost/?access_token=abc&expires_in=60").unwrap();
        let fields = RedirectFields::from_url(&url);
        assert_eq!(fields.access_token.as_deref(), Some("abc"));
        assert_eq!(fields.expires_in, Some(60));
        assert!(fields.error.is_none());
    }

    #[test]
    fn redirect_fragment_is_used_when_query_is_empty() {
        let url = Url::parse("http://localhost/cb#access_token=xyz").unwrap();
        assert_eq!(
            RedirectFields::from_url(&url).access_token.as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn expiration_saturates() {
        let now = Utc::now();
        assert_eq!(expires_at(now, 0), now);
        assert_eq!(expires_at(now, u64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expires_at(now, 3600) - now, TimeDelta::hours(1));
    }

    #[test]
    fn token_request_debug_hides_password() {
        let request = TokenRequest::new("a@b", "hunter2", "sasl_auth", Duration::from_secs(1));
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
