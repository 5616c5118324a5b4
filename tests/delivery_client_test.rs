// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the modbus-bridge project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP contract of the delivery client against a mocked remote endpoint

use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modbus_bridge::bridge::run_demo_cycle;
use modbus_bridge::delivery::{CryptoOperation, DeliveryClient, DeliveryError, DEFAULT_TIMEOUT};

/// Base URL of a port nobody listens on
async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_store_data_posts_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/modbus_registers"))
        .and(header("content-type", "text/plain"))
        .and(body_string("[1, 2, 0, 16256]_2025-03-14 15:09:26"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": "Data stored for key: modbus_registers",
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let ack = client
        .store_data("modbus_registers", "[1, 2, 0, 16256]_2025-03-14 15:09:26")
        .await
        .unwrap();

    assert_eq!(ack["success"], json!(true));
    assert_eq!(ack["data"], json!("Data stored for key: modbus_registers"));
}

#[tokio::test]
async fn test_store_data_non_200_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/key"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let err = client.store_data("key", "value").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_store_data_201_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let err = client.store_data("key", "value").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Status { status: 201, .. }));
}

#[tokio::test]
async fn test_store_data_invalid_json_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let err = client.store_data("key", "value").await.unwrap_err();
    assert!(matches!(err, DeliveryError::InvalidBody { .. }));
}

#[tokio::test]
async fn test_store_data_connection_refused_is_failure() {
    let client = DeliveryClient::new(unreachable_url().await, DEFAULT_TIMEOUT);
    let err = client.store_data("key", "value").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Network { .. }));
}

#[tokio::test]
async fn test_store_data_timeout_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), Duration::from_millis(200));
    let err = client.store_data("key", "value").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Network { .. }));
}

#[tokio::test]
async fn test_health_check_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"status": "healthy", "timestamp": 0, "version": "0.1.0"},
            "error": null
        })))
        .mount(&server)
        .await;
    assert!(DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT).health_check().await);

    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&down)
        .await;
    assert!(!DeliveryClient::new(down.uri(), DEFAULT_TIMEOUT).health_check().await);

    let client = DeliveryClient::new(unreachable_url().await, DEFAULT_TIMEOUT);
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_crypto_operation_sends_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crypto"))
        .and(body_json(json!({"operation": "random_hex", "length": 16})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"result": "00112233445566778899aabbccddeeff", "operation": "random_hex"},
            "error": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let response = client
        .crypto_operation(CryptoOperation::RandomHex, None, Some(16))
        .await
        .unwrap();

    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data.operation, "random_hex");
    assert_eq!(data.result.len(), 32);
}

#[tokio::test]
async fn test_crypto_operation_reported_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/crypto"))
        .and(body_json(json!({"operation": "sha256"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": null,
            "error": "No data provided for hash"
        })))
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let response = client
        .crypto_operation(CryptoOperation::Sha256, None, None)
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.data.is_none());
    assert_eq!(response.error.as_deref(), Some("No data provided for hash"));
}

#[tokio::test]
async fn test_demo_cycle_exercises_every_endpoint() {
    let server = MockServer::start().await;
    let timestamp = "2025-03-14 15:09:26";
    let digest = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    Mock::given(method("POST"))
        .and(path("/data/demo"))
        .and(body_string(format!("Hello from bridge at {}", timestamp)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/crypto"))
        .and(body_json(json!({"operation": "random_hex", "length": 16})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"result": "ab".repeat(16), "operation": "random_hex"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/crypto"))
        .and(body_json(json!({"operation": "sha256", "data": timestamp})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"result": digest, "operation": "sha256"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(server.uri(), DEFAULT_TIMEOUT);
    let report = run_demo_cycle(&client, "demo", timestamp).await;

    assert!(report.all_succeeded());
    assert_eq!(report.random_hex.as_deref(), Some("ab".repeat(16).as_str()));
    assert_eq!(report.timestamp_hash.as_deref(), Some(digest));
}

#[tokio::test]
async fn test_demo_cycle_survives_unreachable_endpoint() {
    let client = DeliveryClient::new(unreachable_url().await, DEFAULT_TIMEOUT);
    let report = run_demo_cycle(&client, "demo", "2025-03-14 15:09:26").await;

    assert!(report.stored_message.is_none());
    assert!(report.random_hex.is_none());
    assert!(report.timestamp_hash.is_none());
}
