#![allow(clippy::unwrap_used)]
// Integration tests for `HotspotClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use konnectx_api::{
    ConfigureRequest, ConnectionType, Error, HotspotClient, StaticConfigBody, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HotspotClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
    let client = HotspotClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn configure_request(password: &str) -> ConfigureRequest {
    ConfigureRequest {
        device_id: "dev1".into(),
        session_id: "sess-123".into(),
        ssid: "CafeWifi".into(),
        password: password.into(),
        connection_type: ConnectionType::Dhcp,
        static_config: None,
    }
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_available_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/available"))
        .and(query_param("email", "demo@konnectx.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "devices": [
                    {
                        "id": "dev1",
                        "name": "Hotspot_A",
                        "mac_address": "AA:BB:CC:DD:EE:01",
                        "signal_strength": "Strong",
                        "status": "available",
                        "firmware_version": "2.4.1"
                    },
                    { "id": 7 }
                ]
            }
        })))
        .mount(&server)
        .await;

    let devices = client
        .list_available_devices("demo@konnectx.com")
        .await
        .unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "dev1");
    assert_eq!(devices[0].name.as_deref(), Some("Hotspot_A"));
    assert_eq!(devices[0].signal_strength.as_deref(), Some("Strong"));
    assert_eq!(devices[1].id, "7");
    assert!(devices[1].mac_address.is_none());
}

#[tokio::test]
async fn test_list_devices_missing_list_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/available"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": {} })),
        )
        .mount(&server)
        .await;

    let devices = client.list_available_devices("a@b.c").await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_connect_device() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/devices/connect"))
        .and(body_partial_json(json!({ "device_id": "dev1", "user_id": "u-42" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "session_id": "sess-123", "connected_at": "2026-01-01T10:00:00Z" }
        })))
        .mount(&server)
        .await;

    let resp = client.connect_device("dev1", "u-42").await.unwrap();
    assert_eq!(resp.session_id, "sess-123");
    assert_eq!(resp.connected_at.as_deref(), Some("2026-01-01T10:00:00Z"));
}

#[tokio::test]
async fn test_connect_device_unavailable() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/devices/connect"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": { "code": "DEVICE_UNAVAILABLE", "message": "Device went offline" }
        })))
        .mount(&server)
        .await;

    let err = client.connect_device("dev1", "u-42").await.unwrap_err();
    assert_eq!(err.status(), Some(404), "expected not-found, got: {err:?}");
    assert_eq!(err.api_error_code(), Some("DEVICE_UNAVAILABLE"));
    match err {
        Error::Api { message, .. } => assert_eq!(message, "Device went offline"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_success_false_on_200_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/devices/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "device busy"
        })))
        .mount(&server)
        .await;

    let err = client.connect_device("dev1", "u-42").await.unwrap_err();
    match err {
        Error::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 200);
            assert!(code.is_none());
            assert_eq!(message, "device busy");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Network tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_scan_networks() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/networks/scan"))
        .and(query_param("device_id", "dev1"))
        .and(query_param("session_id", "sess-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "networks": [
                    {
                        "ssid": "CafeWifi",
                        "bssid": "11:22:33:44:55:66",
                        "secured": true,
                        "security_type": "WPA2",
                        "signal_strength": -48,
                        "frequency": "5GHz",
                        "channel": 36
                    },
                    { "ssid": "Guest", "secured": false }
                ],
                "scanned_at": "2026-01-01T10:00:05Z"
            }
        })))
        .mount(&server)
        .await;

    let scan = client.scan_networks("dev1", "sess-123").await.unwrap();
    assert_eq!(scan.networks.len(), 2);
    assert!(scan.networks[0].secured);
    assert_eq!(scan.networks[0].channel, Some(36));
    assert!(!scan.networks[1].secured);
    assert_eq!(scan.scanned_at.as_deref(), Some("2026-01-01T10:00:05Z"));
}

#[tokio::test]
async fn test_configure_network_dhcp() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/networks/configure"))
        .and(body_partial_json(json!({
            "device_id": "dev1",
            "session_id": "sess-123",
            "ssid": "CafeWifi",
            "password": "secret1",
            "connection_type": "dhcp"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "ssid": "CafeWifi",
                "ip_address": "192.168.1.50",
                "gateway": "192.168.1.1",
                "connection_type": "dhcp",
                "lease_time": 86400
            }
        })))
        .mount(&server)
        .await;

    let details = client
        .configure_network(&configure_request("secret1"))
        .await
        .unwrap();
    assert_eq!(details.ip_address.as_deref(), Some("192.168.1.50"));
    assert_eq!(details.extra.get("lease_time"), Some(&json!(86400)));
}

#[tokio::test]
async fn test_configure_network_static_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/networks/configure"))
        .and(body_partial_json(json!({
            "connection_type": "static",
            "static_config": {
                "ip_address": "10.0.0.20",
                "subnet_mask": "255.255.255.0",
                "gateway": "10.0.0.1",
                "dns_primary": "1.1.1.1"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "ip_address": "10.0.0.20" }
        })))
        .mount(&server)
        .await;

    let mut req = configure_request("");
    req.connection_type = ConnectionType::Static;
    req.static_config = Some(StaticConfigBody {
        ip_address: "10.0.0.20".into(),
        subnet_mask: "255.255.255.0".into(),
        gateway: "10.0.0.1".into(),
        dns_primary: "1.1.1.1".into(),
        dns_secondary: None,
    });

    let details = client.configure_network(&req).await.unwrap();
    assert_eq!(details.ip_address.as_deref(), Some("10.0.0.20"));
}

#[tokio::test]
async fn test_configure_invalid_password() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/networks/configure"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": { "code": "INVALID_PASSWORD", "message": "Authentication with AP failed" }
        })))
        .mount(&server)
        .await;

    let err = client
        .configure_network(&configure_request("nope"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.api_error_code(), Some("INVALID_PASSWORD"));
}

// ── Envelope & transport tests ──────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/available"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": { "code": "SESSION_EXPIRED", "message": "Token expired" }
        })))
        .mount(&server)
        .await;

    let err = client.list_available_devices("a@b.c").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!err.is_timeout());
    match err {
        Error::Authentication { message } => assert_eq!(message, "Token expired"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/networks/scan"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.scan_networks("dev1", "sess-123").await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.api_error_code().is_none());
    assert!(err.to_string().contains("Bad Gateway"), "got: {err}");
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/networks/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.scan_networks("dev1", "sess-123").await.unwrap_err();
    assert!(
        matches!(err, Error::Deserialization { ref body, .. } if body.contains("oops")),
        "expected Deserialization error, got: {err:?}"
    );
}

#[tokio::test]
async fn test_success_without_data() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/devices/connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let err = client.connect_device("dev1", "u-42").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/devices/available"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "devices": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport =
        TransportConfig::default().with_bearer_token("tok-abc".to_string().into());
    let client = HotspotClient::from_url(&server.uri(), &transport).unwrap();

    let devices = client.list_available_devices("a@b.c").await.unwrap();
    assert!(devices.is_empty());
}
