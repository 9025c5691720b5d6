mod support;

use serde_json::{json, Value};

use support::{artemis_config, spawn_gateway, unreachable_addr, MockBroker};

#[tokio::test]
async fn health_reports_service_up() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "UP");
    assert_eq!(body["service"], "vehicle-gateway");
}

#[tokio::test]
async fn status_is_disconnected_before_any_connection_attempt() {
    let broker = MockBroker::spawn().await;
    let config = artemis_config(broker.addr);
    let (addr, _) = spawn_gateway(config.clone()).await;

    let body: Value = reqwest::get(format!("http://{addr}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["artemis_connected"], json!(false));
    assert_eq!(body["artemis_host"], "127.0.0.1");
    assert_eq!(body["artemis_port"], json!(config.port));
    assert_eq!(body["queue"], "test.events");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn single_send_returns_the_canonical_event() {
    let broker = MockBroker::spawn().await;
    let (addr, connection) = spawn_gateway(artemis_config(broker.addr)).await;
    connection.connect().await.unwrap();

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/send"))
        .json(&json!({"licensePlate": "ABC123", "speed": 45}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], "Event sent successfully");
    assert_eq!(body["event"]["licensePlate"], "ABC123");
    assert_eq!(body["event"]["vehicleType"], "CAR");
    assert_eq!(body["event"]["eventType"], "DETECTION");
    assert_eq!(body["event"]["speed"], json!(45));
    assert!(body["event"].get("latitude").is_none());

    broker.wait_for("SEND", 1).await;

    // Status now reflects the established connection.
    let status: Value = reqwest::get(format!("http://{addr}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["artemis_connected"], json!(true));
}

#[tokio::test]
async fn alternate_key_names_are_accepted_over_http() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{addr}/api/send"))
        .json(&json!({"license_plate": "XYZ789", "vehicle_type": "TRUCK"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["event"]["licensePlate"], "XYZ789");
    assert_eq!(body["event"]["vehicleType"], "TRUCK");
}

#[tokio::test]
async fn single_send_failure_is_a_json_500() {
    let addr = unreachable_addr().await;
    let (gateway_addr, _) = spawn_gateway(artemis_config(addr)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{gateway_addr}/api/send"))
        .json(&json!({"licensePlate": "ABC123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn batch_forwards_every_element() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    let body: Value = client
        .post(format!("http://{addr}/api/send/batch"))
        .json(&json!([{"licensePlate": "A1"}, {"licensePlate": "B2"}]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["total"], json!(2));
    assert_eq!(body["successful"], json!(2));
    assert_eq!(body["results"][0]["licensePlate"], "A1");
    assert_eq!(body["results"][1]["licensePlate"], "B2");
    broker.wait_for("SEND", 2).await;
}

#[tokio::test]
async fn batch_with_unreachable_broker_reports_every_failure() {
    let addr = unreachable_addr().await;
    let (gateway_addr, _) = spawn_gateway(artemis_config(addr)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{gateway_addr}/api/send/batch"))
        .json(&json!([{"licensePlate": "A1"}, {"licensePlate": "B2"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], json!(2));
    assert_eq!(body["successful"], json!(0));
    assert_eq!(body["results"][0]["success"], json!(false));
    assert_eq!(body["results"][1]["success"], json!(false));
}

#[tokio::test]
async fn batch_level_bad_input_is_a_500() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/send/batch"))
        .json(&json!("not a batch"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_json_single_send_is_rejected_without_publishing() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/send"))
        .header("content-type", "application/json")
        .body("{not valid json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());

    // No defaulted event may reach the broker.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(broker.count("SEND"), 0);
}

#[tokio::test]
async fn malformed_json_batch_is_a_hard_failure() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/send/batch"))
        .header("content-type", "application/json")
        .body("{not valid json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(body.get("results").is_none());

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(broker.count("SEND"), 0);
}

#[tokio::test]
async fn absent_body_still_produces_a_defaulted_event() {
    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/send"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["event"]["licensePlate"], "UNKNOWN");
    broker.wait_for("SEND", 1).await;
}

#[tokio::test]
async fn metrics_exposes_sender_counters() {
    vehicle_gateway::metrics::init_metrics();

    let broker = MockBroker::spawn().await;
    let (addr, _) = spawn_gateway(artemis_config(broker.addr)).await;

    let client = reqwest::Client::new();
    client
        .post(format!("http://{addr}/api/send"))
        .json(&json!({"licensePlate": "METRIC1"}))
        .send()
        .await
        .unwrap();

    let response = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.unwrap();
    assert!(body.contains("vgw_sender_messages_sent_total"));
    assert!(body.contains("vgw_broker_connects_total"));
}
