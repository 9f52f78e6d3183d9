//! Composition of token and command endpoint URLs from a base URL.

use crate::error::{ApiError, Result};
use url::Url;

const DEFAULT_OAUTH_PATH: &str = "oauth";
const DEFAULT_API_PATH: &str = "api";

/// Joins `suffix` onto the path of `base`.
///
/// `base` must be an absolute `http` or `https` URL. Empty segments are
/// dropped, `.` and `..` are resolved, and a trailing `/` on `suffix` is kept.
pub fn join_url(base: &str, suffix: &str) -> Result<String> {
    let mut url = Url::parse(base).map_err(|_| ApiError::InvalidUrl(base.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::InvalidUrlScheme(url.scheme().to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in url.path().split('/').chain(suffix.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    if suffix.ends_with('/') && !segments.is_empty() {
        path.push('/');
    }
    url.set_path(&path);

    Ok(url.into())
}

/// Token endpoint: `<base>/<oauth_path or "oauth">/token`.
pub fn token_url(base: &str, oauth_path: Option<&str>) -> Result<String> {
    oauth_url(base, oauth_path, "token")
}

/// Legacy implicit-grant endpoint: `<base>/<oauth_path or "oauth">/authorization_token`.
pub fn authorization_token_url(base: &str, oauth_path: Option<&str>) -> Result<String> {
    oauth_url(base, oauth_path, "authorization_token")
}

/// Command endpoint: `<base>/<api_path or "api">/<name>/`.
pub fn api_url(base: &str, api_path: Option<&str>, name: &str) -> Result<String> {
    let root = join_url(base, api_path.unwrap_or(DEFAULT_API_PATH))?;
    join_url(&root, &format!("{name}/"))
}

fn oauth_url(base: &str, oauth_path: Option<&str>, leaf: &str) -> Result<String> {
    let root = join_url(base, oauth_path.unwrap_or(DEFAULT_OAUTH_PATH))?;
    join_url(&root, leaf)
}
