use crate::{
    command::{Command, RawResponse, parse_error},
    commands::{
        OfflineCount, OfflineCountResponse, RawCommand, Register, RegisterResponse, Stats,
        StatsResponse, UserResources, UserResourcesResponse,
    },
    config::{ClientConfig, build_http_client},
    endpoint::api_url,
    error::Result,
    grant::{self, GrantFlow, TokenRequest},
    jid::same_account,
    token::OAuthToken,
    transport::{ApiRequest, HttpTransport, Transport},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Entry point for token acquisition and command calls.
///
/// Holds no per-call state: it can be reused for sequential calls and cloned
/// for concurrent ones.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    token: OAuthToken,
    http: reqwest::Client,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let transport = Arc::new(HttpTransport::new(http.clone()));
        Ok(Self {
            config,
            token: OAuthToken::default(),
            http,
            transport,
        })
    }

    /// Uses `transport` for command calls instead of HTTP.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            config,
            token: OAuthToken::default(),
            http,
            transport,
        })
    }

    pub fn with_token(mut self, token: OAuthToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &OAuthToken {
        &self.token
    }

    /// Requests a token with the password grant.
    pub async fn get_token(&self, request: &TokenRequest) -> Result<OAuthToken> {
        self.get_token_with(request, &GrantFlow::Password).await
    }

    #[instrument(skip(self, request), fields(jid = %request.jid))]
    pub async fn get_token_with(
        &self,
        request: &TokenRequest,
        flow: &GrantFlow,
    ) -> Result<OAuthToken> {
        grant::acquire(&self.http, &self.config, request, flow).await
    }

    /// Runs `command` and decodes its result.
    ///
    /// Any status other than 200 is returned as [`crate::ApiError::Remote`]
    /// built from the error body.
    pub async fn call<C: Command>(&self, command: &C) -> Result<C::Output> {
        let raw = self.call_raw(command).await?;
        if !raw.is_success() {
            let err = parse_error(raw.status, &raw.body);
            warn!(status = raw.status, error = %err, "command failed");
            return Err(err);
        }
        command.parse_response(&raw.body)
    }

    /// Runs `command` and returns the server's status and body untouched.
    #[instrument(skip_all)]
    pub async fn call_raw<C: Command>(&self, command: &C) -> Result<RawResponse> {
        let params = command.params()?;
        let url = api_url(
            &self.config.base_url,
            self.config.api_path.as_deref(),
            &params.name,
        )?;
        let admin = params.admin || self.acts_for_other(command.subject());

        debug!(command = %params.name, url = %url, admin, "calling command");
        let response = self
            .transport
            .execute(ApiRequest {
                url,
                bearer_token: self.token.access_token.clone(),
                admin,
                body: params.body,
            })
            .await?;
        info!(command = %params.name, status = response.status, "command completed");
        Ok(response)
    }

    fn acts_for_other(&self, subject: Option<&str>) -> bool {
        subject.is_some_and(|jid| !same_account(jid, &self.token.jid))
    }

    pub async fn stats(&self, name: &str) -> Result<StatsResponse> {
        self.call(&Stats::new(name)).await
    }

    pub async fn register_user(&self, jid: &str, password: &str) -> Result<RegisterResponse> {
        self.call(&Register::new(jid, password)).await
    }

    pub async fn offline_count(&self, jid: &str) -> Result<OfflineCountResponse> {
        self.call(&OfflineCount::new(jid)).await
    }

    pub async fn user_resources(&self, jid: &str) -> Result<UserResourcesResponse> {
        self.call(&UserResources::new(jid)).await
    }

    /// Calls an arbitrary server command with a raw JSON body.
    pub async fn command(
        &self,
        name: &str,
        body: impl Into<Vec<u8>>,
        admin: bool,
    ) -> Result<RawResponse> {
        self.call_raw(&RawCommand::new(name, body, admin)).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(jid: &str) -> Client {
        Client::new(ClientConfig::default())
            .unwrap()
            .with_token(OAuthToken {
                access_token: "t".to_string(),
                jid: jid.to_string(),
                ..Default::default()
            })
    }

    #[test]
    fn own_account_needs_no_escalation() {
        let client = client_for("alice@example.org");
        assert!(!client.acts_for_other(Some("alice@example.org")));
        assert!(!client.acts_for_other(Some("alice@example.org/phone")));
        assert!(!client.acts_for_other(None));
    }

    #[test]
    fn other_account_needs_escalation() {
        let client = client_for("alice@example.org");
        assert!(client.acts_for_other(Some("bob@example.org")));
        assert!(client_for("").acts_for_other(Some("bob@example.org")));
    }
}
