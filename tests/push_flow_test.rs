//! End-to-end tests for the STK push flow and the SMS relay.
//!
//! Each test spins a local stub gateway on an ephemeral port and points the
//! real clients at it, so the full request path (normalization, signing,
//! token fetch, submission, classification) is exercised without touching
//! the real upstream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use moshi_pay::api::{self, AppState};
use moshi_pay::config::{Config, ServerConfig};
use moshi_pay::payments::providers::mpesa::{MpesaConfig, MpesaProvider};
use moshi_pay::payments::traits::PushProvider;
use moshi_pay::payments::types::{PushOutcome, PushRequest};
use moshi_pay::sms::{SmsConfig, SmsRelay};
use moshi_pay::PaymentError;

/// What the stub gateway answers and what it saw.
#[derive(Clone)]
struct GatewayStub {
    token_body: Value,
    push_body: Value,
    push_hits: Arc<AtomicUsize>,
    last_push_payload: Arc<Mutex<Option<Value>>>,
}

impl GatewayStub {
    fn new(token_body: Value, push_body: Value) -> Self {
        Self {
            token_body,
            push_body,
            push_hits: Arc::new(AtomicUsize::new(0)),
            last_push_payload: Arc::new(Mutex::new(None)),
        }
    }
}

async fn stub_token(State(stub): State<GatewayStub>) -> Json<Value> {
    Json(stub.token_body.clone())
}

async fn stub_push(State(stub): State<GatewayStub>, Json(payload): Json<Value>) -> Json<Value> {
    stub.push_hits.fetch_add(1, Ordering::SeqCst);
    *stub.last_push_payload.lock().unwrap() = Some(payload);
    Json(stub.push_body.clone())
}

/// Serve the stub gateway; returns its base URL.
async fn spawn_gateway(stub: GatewayStub) -> String {
    let app = Router::new()
        .route("/oauth/generate", get(stub_token))
        .route("/stkpush/processrequest", post(stub_push))
        .with_state(stub);

    spawn_server(app).await
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn provider_for(base_url: String) -> MpesaProvider {
    MpesaProvider::new(MpesaConfig {
        consumer_key: "test_key".to_string(),
        consumer_secret: "test_secret".to_string(),
        shortcode: "174379".to_string(),
        passkey: "test_passkey".to_string(),
        callback_url: "https://example.com/mpesa/callback".to_string(),
        base_url,
        ..Default::default()
    })
}

#[tokio::test]
async fn accepted_flow_through_the_api() {
    let stub = GatewayStub::new(
        json!({"access_token": "abc"}),
        json!({"ResponseCode": "0", "CustomerMessage": "Success. Request accepted for processing"}),
    );
    let gateway_url = spawn_gateway(stub.clone()).await;

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: "development".to_string(),
        },
        mpesa: MpesaConfig {
            consumer_key: "test_key".to_string(),
            consumer_secret: "test_secret".to_string(),
            shortcode: "174379".to_string(),
            passkey: "test_passkey".to_string(),
            callback_url: "https://example.com/mpesa/callback".to_string(),
            base_url: gateway_url.clone(),
            ..Default::default()
        },
        sms: SmsConfig {
            api_key: "sms_key".to_string(),
            ..Default::default()
        },
    };

    let state = AppState {
        provider: Arc::new(provider_for(gateway_url)),
        relay: Arc::new(SmsRelay::new(config.sms.clone())),
        config,
    };
    let service_url = spawn_server(api::router(state)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{service_url}/payments/push"))
        .json(&json!({"phone": "0747914720", "amount": 10, "reference": "Coffee Tour"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["accepted"], json!(true));

    // The gateway saw exactly one submission with the normalized number
    // used as both payer and prompt target.
    assert_eq!(stub.push_hits.load(Ordering::SeqCst), 1);
    let payload = stub.last_push_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload["PhoneNumber"], json!("255747914720"));
    assert_eq!(payload["PartyA"], json!("255747914720"));
    assert_eq!(payload["PartyB"], json!("174379"));
    assert_eq!(payload["TransactionType"], json!("CustomerPayBillOnline"));
    assert_eq!(payload["Amount"], json!(10));
    assert_eq!(payload["AccountReference"], json!("Coffee Tour"));
}

#[tokio::test]
async fn missing_access_token_fails_before_submission() {
    let stub = GatewayStub::new(json!({}), json!({"ResponseCode": "0"}));
    let gateway_url = spawn_gateway(stub.clone()).await;

    let provider = provider_for(gateway_url);
    let result = provider
        .push(PushRequest {
            phone: "0747914720".to_string(),
            amount: 10,
            reference: "Coffee Tour".to_string(),
        })
        .await;

    assert!(matches!(result, Err(PaymentError::AuthenticationFailed)));
    assert_eq!(stub.push_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn gateway_decline_carries_its_error_message() {
    let stub = GatewayStub::new(
        json!({"access_token": "abc"}),
        json!({"ResponseCode": "1", "errorMessage": "Insufficient funds"}),
    );
    let gateway_url = spawn_gateway(stub).await;

    let provider = provider_for(gateway_url);
    let outcome = provider
        .push(PushRequest {
            phone: "255747914720".to_string(),
            amount: 10,
            reference: "Coffee Tour".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PushOutcome::Rejected {
            message: "Insufficient funds".to_string()
        }
    );
}

#[tokio::test]
async fn non_json_push_response_is_a_transport_error() {
    async fn token_ok() -> Json<Value> {
        Json(json!({"access_token": "abc"}))
    }

    // An HTML error page from a proxy in front of the gateway, with a 200
    // status. Classification must not mistake it for a decline.
    async fn html_push() -> &'static str {
        "<html><body>Service temporarily unavailable</body></html>"
    }

    let gateway_url = spawn_server(
        Router::new()
            .route("/oauth/generate", get(token_ok))
            .route("/stkpush/processrequest", post(html_push)),
    )
    .await;

    let provider = provider_for(gateway_url);
    let result = provider
        .push(PushRequest {
            phone: "0747914720".to_string(),
            amount: 10,
            reference: "Coffee Tour".to_string(),
        })
        .await;

    assert!(matches!(result, Err(PaymentError::Transport(_))));
}

#[tokio::test]
async fn non_2xx_decline_with_json_body_still_classifies() {
    async fn token_ok() -> Json<Value> {
        Json(json!({"access_token": "abc"}))
    }

    async fn bad_request_push() -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"errorMessage": "Bad Request - Invalid Amount"})),
        )
    }

    let gateway_url = spawn_server(
        Router::new()
            .route("/oauth/generate", get(token_ok))
            .route("/stkpush/processrequest", post(bad_request_push)),
    )
    .await;

    let provider = provider_for(gateway_url);
    let outcome = provider
        .push(PushRequest {
            phone: "0747914720".to_string(),
            amount: 10,
            reference: "Coffee Tour".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PushOutcome::Rejected {
            message: "Bad Request - Invalid Amount".to_string()
        }
    );
}

#[tokio::test]
async fn truncated_token_body_is_a_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Raw TCP stub that advertises a longer body than it sends, then closes
    // the connection, so the body read fails after a successful status.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-length: 512\r\n\r\n{\"access_token\"",
                )
                .await;
        }
    });

    let provider = provider_for(format!("http://{addr}"));
    let result = provider
        .push(PushRequest {
            phone: "0747914720".to_string(),
            amount: 10,
            reference: "Coffee Tour".to_string(),
        })
        .await;

    assert!(matches!(result, Err(PaymentError::Transport(_))));
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
    // Bind and drop a listener so the port is closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = provider_for(format!("http://{addr}"));
    let result = provider
        .push(PushRequest {
            phone: "0747914720".to_string(),
            amount: 10,
            reference: "Coffee Tour".to_string(),
        })
        .await;

    assert!(matches!(result, Err(PaymentError::Transport(_))));
}

async fn failing_sms_upstream() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "upstream exploded"})),
    )
}

#[tokio::test]
async fn sms_relay_reports_upstream_failure_without_panicking() {
    let upstream =
        spawn_server(Router::new().route("/api/sms/v2/text/single", post(failing_sms_upstream)))
            .await;

    let sms_config = SmsConfig {
        api_key: "sms_key".to_string(),
        endpoint_url: format!("{upstream}/api/sms/v2/text/single"),
        ..Default::default()
    };

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: "development".to_string(),
        },
        mpesa: MpesaConfig {
            consumer_key: "test_key".to_string(),
            consumer_secret: "test_secret".to_string(),
            shortcode: "174379".to_string(),
            passkey: "test_passkey".to_string(),
            callback_url: "https://example.com/mpesa/callback".to_string(),
            ..Default::default()
        },
        sms: sms_config.clone(),
    };

    let state = AppState {
        provider: Arc::new(provider_for("http://127.0.0.1:9".to_string())),
        relay: Arc::new(SmsRelay::new(sms_config)),
        config,
    };
    let service_url = spawn_server(api::router(state)).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{service_url}/send-sms"))
        .json(&json!({"phone": "747914720", "otp": "123456"}))
        .send()
        .await
        .unwrap();

    // Same-shape answer on failure: HTTP 200 with success=false.
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn sms_relay_delivers_and_normalizes_destination() {
    #[derive(Clone, Default)]
    struct SmsSpy(Arc<Mutex<Option<Value>>>);

    async fn record(State(spy): State<SmsSpy>, Json(body): Json<Value>) -> Json<Value> {
        *spy.0.lock().unwrap() = Some(body);
        Json(json!({"messages": [{"status": "PENDING"}]}))
    }

    let spy = SmsSpy::default();
    let upstream = spawn_server(
        Router::new()
            .route("/api/sms/v2/text/single", post(record))
            .with_state(spy.clone()),
    )
    .await;

    let relay = SmsRelay::new(SmsConfig {
        api_key: "sms_key".to_string(),
        endpoint_url: format!("{upstream}/api/sms/v2/text/single"),
        ..Default::default()
    });

    relay.send_login_code("0747914720", "123456").await.unwrap();

    let seen = spy.0.lock().unwrap().clone().unwrap();
    assert_eq!(seen["from"], json!("INFO"));
    assert_eq!(seen["to"], json!("255747914720"));
    assert_eq!(
        seen["text"],
        json!("Your Moshi Today login code is 123456\nValid for 5 minutes.")
    );
}
