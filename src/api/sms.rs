//! Login-code SMS endpoint
//!
//! `POST /send-sms` forwards a one-time code to the messaging gateway and
//! always answers HTTP 200 with the fixed `{success, error?}` shape, so the
//! login screen only has to look at one flag.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct SendSmsBody {
    pub phone: String,
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendSmsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn send_sms(
    State(state): State<AppState>,
    Json(body): Json<SendSmsBody>,
) -> Json<SendSmsResponse> {
    match state.relay.send_login_code(&body.phone, &body.otp).await {
        Ok(()) => Json(SendSmsResponse {
            success: true,
            error: None,
        }),
        Err(e) => {
            error!("SMS relay error: {}", e);
            Json(SendSmsResponse {
                success: false,
                error: Some(e.to_string()),
            })
        }
    }
}
