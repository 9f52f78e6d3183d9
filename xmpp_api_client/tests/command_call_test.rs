//! Command dispatch tests: request shape, privilege header and response
//! decoding, against wiremock and an in-process transport.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xmpp_api_client::{
    ApiError, ApiRequest, Client, ClientConfig, OAuthToken, RawResponse, Response, Transport,
    commands::Stats,
};

fn token_for(jid: &str) -> OAuthToken {
    OAuthToken {
        access_token: "tok".to_string(),
        jid: jid.to_string(),
        ..Default::default()
    }
}

fn client_for(server: &MockServer, jid: &str) -> Client {
    Client::new(ClientConfig::new(server.uri()))
        .unwrap()
        .with_token(token_for(jid))
}

/// Records requests instead of sending them.
#[derive(Default)]
struct RecordingTransport {
    calls: AtomicUsize,
    last: std::sync::Mutex<Option<ApiRequest>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: ApiRequest) -> xmpp_api_client::Result<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request);
        Ok(RawResponse {
            status: 200,
            body: b"7".to_vec(),
        })
    }
}

fn recording_client(jid: &str) -> (Client, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let client = Client::with_transport(ClientConfig::new("http://localhost:5281/"), transport.clone())
        .unwrap()
        .with_token(token_for(jid));
    (client, transport)
}

mod dispatch {
    use super::*;

    #[tokio::test]
    async fn unknown_statistic_never_reaches_transport() {
        let (client, transport) = recording_client("admin@localhost");

        let err = client.stats("not_a_real_stat").await.unwrap_err();

        assert!(matches!(err, ApiError::UnknownStatistic(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn offline_count_for_self_is_not_escalated() {
        let (client, transport) = recording_client("alice@localhost");

        let resp = client.offline_count("alice@localhost").await.unwrap();

        assert_eq!(resp.count, 7);
        let request = transport.last.lock().unwrap().clone().unwrap();
        assert!(!request.admin);
        assert_eq!(request.url, "http://localhost:5281/api/get_offline_count/");
        assert_eq!(request.bearer_token, "tok");
    }

    #[tokio::test]
    async fn offline_count_for_other_user_is_escalated() {
        let (client, transport) = recording_client("admin@localhost");

        let resp = client.offline_count("alice@localhost").await.unwrap();

        assert_eq!(resp.to_string(), "alice@localhost: 7");
        assert!(transport.last.lock().unwrap().as_ref().unwrap().admin);
    }

    #[tokio::test]
    async fn stats_is_always_escalated() {
        let (client, transport) = recording_client("admin@localhost");

        client.call(&Stats::new("processes")).await.unwrap();

        assert!(transport.last.lock().unwrap().as_ref().unwrap().admin);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn command_name_cannot_escape_api_root() {
        let (client, transport) = recording_client("admin@localhost");

        let err = client
            .command("../../oauth/token", Vec::new(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidCommandName(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn api_path_override_is_used() {
        let transport = Arc::new(RecordingTransport::default());
        let config = ClientConfig::new("http://localhost:5281/").with_api_path("rest");
        let client = Client::with_transport(config, transport.clone()).unwrap();

        client.command("status", Vec::new(), false).await.unwrap();

        assert_eq!(
            transport.last.lock().unwrap().as_ref().unwrap().url,
            "http://localhost:5281/rest/status/"
        );
    }
}

mod http {
    use super::*;

    #[tokio::test]
    async fn stats_call_sends_bearer_and_admin_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stats/"))
            .and(header("authorization", "Bearer tok"))
            .and(header("x-admin", "true"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "name": "registeredusers" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "stat": 42 })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server, "admin@localhost")
            .stats("registeredusers")
            .await
            .unwrap();

        assert_eq!(resp.to_string(), "42");
        assert_eq!(resp.to_json().unwrap(), r#"{"name":"registeredusers","value":42}"#);
    }

    #[tokio::test]
    async fn register_sends_user_and_host() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/register/"))
            .and(header("x-admin", "true"))
            .and(body_json(json!({ "user": "bob", "host": "localhost", "password": "pw" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!("User bob@localhost successfully registered")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server, "admin@localhost")
            .register_user("bob@localhost", "pw")
            .await
            .unwrap();

        assert_eq!(resp.to_string(), "User bob@localhost successfully registered");
    }

    #[tokio::test]
    async fn self_query_has_no_admin_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/get_offline_count/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(2)))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server, "alice@localhost")
            .offline_count("alice@localhost")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-admin").is_none());
    }

    #[tokio::test]
    async fn error_body_becomes_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/register/"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "status": "error",
                "code": 10090,
                "message": "User bob@localhost already registered"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, "admin@localhost")
            .register_user("bob@localhost", "pw")
            .await
            .unwrap_err();

        match err {
            ApiError::Remote {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, 10090);
                assert!(message.contains("already registered"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparsable_error_body_uses_generic_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stats/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server, "admin@localhost")
            .stats("onlineusers")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Remote { code: 99, status: 401, .. }));
    }

    #[tokio::test]
    async fn raw_command_returns_status_and_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connected_users_number/"))
            .and(header("x-admin", "true"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(500).set_body_string("{\"status\":\"error\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server, "admin@localhost")
            .command("connected_users_number", b"{}".to_vec(), true)
            .await
            .unwrap();

        assert_eq!(raw.status, 500);
        assert_eq!(raw.text(), "{\"status\":\"error\"}");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/stats/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("forty-two"))
            .mount(&server)
            .await;

        let err = client_for(&server, "admin@localhost")
            .stats("onlineusers")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Json(_)));
    }
}
