use crate::{command::RawResponse, error::Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

/// Header marking a call as made with administrative rights.
pub const ADMIN_HEADER: &str = "X-Admin";

/// A fully resolved command call.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub bearer_token: String,
    pub admin: bool,
    pub body: Vec<u8>,
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("url", &self.url)
            .field("admin", &self.admin)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Implementations make a single attempt. Non-200 statuses are not errors at
/// this level.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// [`Transport`] over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(AUTHORIZATION, format!("Bearer {}", request.bearer_token))
            .header(CONTENT_TYPE, "application/json");
        if request.admin {
            builder = builder.header(ADMIN_HEADER, "true");
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(url = %request.url, status, bytes = body.len(), "command response received");

        Ok(RawResponse { status, body })
    }
}
