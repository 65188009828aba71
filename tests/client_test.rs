//! Client behavior against a mock GraphQL endpoint: happy-path decoding,
//! HTTP/GraphQL error mapping, and the coordinator running over the real
//! client.

use secrecy::SecretString;
use std::time::Duration;
use unraid_monitor::config::UnraidConfig;
use unraid_monitor::coordinator::{storage, system, FailureKind};
use unraid_monitor::error::UnraidError;
use unraid_monitor::unraid::{UnraidApi, UnraidClient};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, timeout_seconds: u64) -> UnraidClient {
    let addr = server.address();
    let config = UnraidConfig {
        host: addr.ip().to_string(),
        port: Some(addr.port()),
        api_key: SecretString::from("test-key"),
        use_tls: false,
        verify_ssl: true,
        timeout_seconds,
    };
    UnraidClient::new(&config).unwrap()
}

fn graphql_ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data }))
}

#[tokio::test]
async fn containers_query_decodes_nested_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "test-key"))
        .and(body_string_contains("docker {"))
        .respond_with(graphql_ok(serde_json::json!({
            "docker": { "containers": [
                { "id": "abc", "names": ["/plex"], "state": "RUNNING" }
            ]}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let containers = client.docker_containers().await.unwrap();

    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].display_name(), "plex");
}

#[tokio::test]
async fn http_401_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client.shares().await.unwrap_err();
    assert!(matches!(err, UnraidError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn graphql_errors_map_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Cannot query field \"shares\"" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client.shares().await.unwrap_err();
    match err {
        UnraidError::Api(message) => assert!(message.contains("shares")),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn graphql_error_naming_the_api_key_maps_to_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Invalid API key" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client.shares().await.unwrap_err();
    assert!(matches!(err, UnraidError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_payload_field_maps_to_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(graphql_ok(serde_json::json!({ "unrelated": 1 })))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client.shares().await.unwrap_err();
    assert!(matches!(err, UnraidError::Deserialization(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_server_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            graphql_ok(serde_json::json!({ "shares": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let err = client.shares().await.unwrap_err();
    assert!(
        matches!(err, UnraidError::Timeout { timeout_secs: 1 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unreachable_server_maps_to_connection_error() {
    // Bind and immediately drop a listener to find a port nothing serves.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = UnraidConfig {
        host: "127.0.0.1".into(),
        port: Some(port),
        api_key: SecretString::from("test-key"),
        use_tls: false,
        verify_ssl: true,
        timeout_seconds: 2,
    };
    let client = UnraidClient::new(&config).unwrap();

    let err = client.shares().await.unwrap_err();
    assert!(
        matches!(
            err,
            UnraidError::Connection(_) | UnraidError::Timeout { .. }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn incompatible_version_is_rejected_at_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("info {"))
        .respond_with(graphql_ok(serde_json::json!({
            "info": {
                "os": { "hostname": "tower", "uptimeSeconds": 100.0 },
                "machineId": "a1b2",
                "versions": { "unraid": "3.9.1" }
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let err = client.validate_connection().await.unwrap_err();
    assert!(
        matches!(err, UnraidError::IncompatibleVersion { .. }),
        "got {err:?}"
    );
}

/// Degradation end-to-end over the real client: the Docker sub-query
/// blows up server-side, everything else answers, and the system cycle still
/// publishes with containers defaulted.
#[tokio::test]
async fn system_poll_degrades_docker_over_real_transport() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("info {"))
        .respond_with(graphql_ok(serde_json::json!({
            "info": {
                "os": { "hostname": "tower", "uptimeSeconds": 100.0 },
                "machineId": "a1b2",
                "versions": { "unraid": "7.0.0" }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("metrics {"))
        .respond_with(graphql_ok(serde_json::json!({
            "metrics": {
                "cpu": { "percentTotal": 10.0 },
                "memory": { "total": 1000, "available": 400 }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("notifications {"))
        .respond_with(graphql_ok(serde_json::json!({
            "notifications": { "overview": {
                "unread": { "info": 0, "warning": 0, "alert": 1, "total": 1 },
                "archive": {}
            }}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("docker {"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("vms {"))
        .respond_with(graphql_ok(serde_json::json!({
            "vms": { "domain": [] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("upsDevices {"))
        .respond_with(graphql_ok(serde_json::json!({ "upsDevices": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server, 5);
    let snapshot = system::poll(&client).await.unwrap();

    assert!(snapshot.containers.is_empty());
    assert_eq!(snapshot.server_info.name, "tower");
    assert_eq!(snapshot.unread_count, 1);
}

/// The storage counterpart: a timeout on the required array query aborts the
/// cycle with a connection-kind failure.
#[tokio::test]
async fn storage_poll_aborts_on_array_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("array {"))
        .respond_with(
            graphql_ok(serde_json::json!({ "array": {} }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let err = storage::poll(&client).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Connection);
}
