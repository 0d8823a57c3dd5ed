//! End-to-end tests against a minimal in-process stand-in for the remote
//! query proxy.
//!
//! The stand-in server does exactly what a compatible proxy must: parse the
//! JSON envelope, re-derive the key from the plaintext `companyRef`, decrypt
//! both encrypted fields, and act on the result. Running the real client
//! against it proves wire compatibility in both directions.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::post, Json, Router};
use common::Envelope;
use proxy_client::crypto::cipher;
use proxy_client::{
    KeyProvider, RequestError, SecureRequestClient, Sha256KeyProvider, TransportError, Url,
};
use serde_json::{json, Value};

/// Serve `router` on an ephemeral loopback port.
async fn spawn_proxy(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn endpoint_for(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}/query")).unwrap()
}

/// Proxy-side handler: open the envelope and echo what was inside.
async fn open_envelope(Json(envelope): Json<Envelope>) -> Json<Value> {
    let key = Sha256KeyProvider.derive_key(&envelope.company_ref).unwrap();
    let selector = cipher::decrypt(&envelope.encrypted_selector, &key).unwrap();
    let payload = cipher::decrypt(&envelope.encrypted_payload, &key).unwrap();
    Json(json!({
        "companyRef": envelope.company_ref,
        "selector": String::from_utf8(selector).unwrap(),
        "payload": serde_json::from_slice::<Value>(&payload).unwrap(),
        "token": envelope.request_token,
    }))
}

#[tokio::test]
async fn proxy_can_open_what_the_client_seals() {
    let addr = spawn_proxy(Router::new().route("/query", post(open_envelope))).await;
    let client = SecureRequestClient::new();

    let payload = json!({"query": "SELECT name FROM customers WHERE id = ?", "params": [42]});
    let response = client
        .request(
            "acme-co",
            "offline",
            &payload,
            &endpoint_for(addr),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let echoed: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(echoed["companyRef"], "acme-co");
    assert_eq!(echoed["selector"], "offline");
    assert_eq!(echoed["payload"], payload);
    // Advisory token made it across unmodified.
    assert_eq!(echoed["token"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn envelope_arrives_with_the_exact_wire_fields() {
    async fn check_shape(Json(body): Json<Value>) -> Json<Value> {
        let obj = body.as_object().unwrap();
        let ok = obj.len() == 5
            && obj.contains_key("companyRef")
            && obj.contains_key("encryptedConnectionType")
            && obj.contains_key("encryptedPayload")
            && obj["timestamp"].is_i64()
            && obj["nonce"].is_string();
        Json(json!({"shape_ok": ok}))
    }

    let addr = spawn_proxy(Router::new().route("/query", post(check_shape))).await;
    let client = SecureRequestClient::new();
    let response = client
        .request(
            "1",
            "live",
            &json!({}),
            &endpoint_for(addr),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    let verdict: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(verdict["shape_ok"], true);
}

#[tokio::test]
async fn non_2xx_responses_are_returned_verbatim() {
    async fn unavailable() -> (axum::http::StatusCode, Json<Value>) {
        (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"code": "erp_offline", "message": "connection pool exhausted"})),
        )
    }

    let addr = spawn_proxy(Router::new().route("/query", post(unavailable))).await;
    let client = SecureRequestClient::new();
    let response = client
        .request(
            "1",
            "live",
            &json!({}),
            &endpoint_for(addr),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    // Not an error: the response is handed back uninterpreted.
    assert_eq!(response.status, 503);
    assert!(response
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["code"], "erp_offline");
}

#[tokio::test]
async fn slow_proxy_hits_the_timeout() {
    async fn very_slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({}))
    }

    let addr = spawn_proxy(Router::new().route("/query", post(very_slow))).await;
    let client = SecureRequestClient::new();
    let err = client
        .request(
            "1",
            "live",
            &json!({}),
            &endpoint_for(addr),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

    match err {
        RequestError::Transport(TransportError::Timeout { timeout_ms, .. }) => {
            assert_eq!(timeout_ms, 100);
        }
        other => panic!("expected timeout, got: {other:?}"),
    }
}
