//! Machines control-plane client tests.
//!
//! These use wiremock for deterministic HTTP responses, so the client's
//! header handling and status/error mapping can be exercised without a
//! control plane or network access.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wakey::machines::{CheckStatus, ControlPlaneError, MachineState, MachinesApi, MachinesClient};

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> MachinesClient {
    MachinesClient::new(
        server.uri(),
        TOKEN.to_string(),
        "test-app".to_string(),
        "m-123".to_string(),
    )
    .unwrap()
}

fn machine_json() -> serde_json::Value {
    json!({
        "id": "m-123",
        "name": "game-server",
        "state": "started",
        "checks": [
            {"name": "tcp-25565", "output": "connect ok", "status": "passing", "updated_at": "2024-05-01T12:00:00Z"}
        ],
        "config": {
            "services": [
                {
                    "protocol": "tcp",
                    "internal_port": 25565,
                    "ports": [{"port": 25565, "handlers": []}],
                    "checks": [{"type": "tcp", "interval": "15s", "timeout": "2s", "grace_period": "30s"}]
                }
            ]
        },
        "events": []
    })
}

#[tokio::test]
async fn test_start_succeeds_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps/test-app/machines/m-123/start"))
        .and(header("authorization", format!("Bearer {TOKEN}")))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.start().await.is_ok());
}

#[tokio::test]
async fn test_start_succeeds_on_204() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps/test-app/machines/m-123/start"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.start().await.is_ok());
}

#[tokio::test]
async fn test_start_failure_embeds_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apps/test-app/machines/m-123/start"))
        .respond_with(ResponseTemplate::new(500).set_body_string("host unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.start().await.unwrap_err();
    match &err {
        ControlPlaneError::Api { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "host unavailable");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    // The operator-facing message carries both pieces.
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("host unavailable"));
}

#[tokio::test]
async fn test_start_transport_failure_maps_to_transport_error() {
    // Nothing listens here; the connection attempt itself fails.
    let client = MachinesClient::new(
        "http://127.0.0.1:1".to_string(),
        TOKEN.to_string(),
        "test-app".to_string(),
        "m-123".to_string(),
    )
    .unwrap();

    let err = client.start().await.unwrap_err();
    assert!(matches!(err, ControlPlaneError::Transport { .. }));
}

#[tokio::test]
async fn test_describe_parses_machine_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/test-app/machines/m-123"))
        .and(header("authorization", format!("Bearer {TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let machine = client.describe().await.unwrap();
    assert_eq!(machine.id, "m-123");
    assert_eq!(machine.state, MachineState::Started);
    assert!(machine.has_configured_checks());
    assert_eq!(machine.checks.len(), 1);
    assert_eq!(machine.checks[0].status, CheckStatus::Passing);
}

#[tokio::test]
async fn test_describe_non_200_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/test-app/machines/m-123"))
        .respond_with(ResponseTemplate::new(404).set_body_string("machine not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.describe().await.unwrap_err();
    match err {
        ControlPlaneError::Api { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("machine not found"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_describe_malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/test-app/machines/m-123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.describe().await.unwrap_err();
    assert!(matches!(err, ControlPlaneError::Decode { .. }));
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apps/test-app/machines/m-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_json()))
        .mount(&server)
        .await;

    let client = MachinesClient::new(
        format!("{}/", server.uri()),
        TOKEN.to_string(),
        "test-app".to_string(),
        "m-123".to_string(),
    )
    .unwrap();
    assert!(client.describe().await.is_ok());
}
