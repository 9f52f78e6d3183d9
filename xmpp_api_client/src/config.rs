use std::time::Duration;

/// Timeout applied to connection setup and TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings shared by token acquisition and command calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://localhost:5281/`.
    pub base_url: String,
    /// Path of the OAuth handler below `base_url`. Defaults to `oauth`.
    pub oauth_path: Option<String>,
    /// Path of the command API handler below `base_url`. Defaults to `api`.
    pub api_path: Option<String>,
    pub connect_timeout: Duration,
    /// Upper bound for a whole request, unset by default.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_oauth_path(mut self, path: impl Into<String>) -> Self {
        self.oauth_path = Some(path.into());
        self
    }

    pub fn with_api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = Some(path.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5281/".to_string(),
            oauth_path: None,
            api_path: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }
}

/// Builds the HTTP client used by [`crate::Client`].
///
/// Redirects are never followed: the implicit grant flow reads the token from
/// the `Location` header of the server's redirect.
pub(crate) fn build_http_client(config: &ClientConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .redirect(reqwest::redirect::Policy::none());
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
