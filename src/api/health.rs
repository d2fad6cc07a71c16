use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub gateway_configured: bool,
    pub sms_configured: bool,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let version = env!("CARGO_PKG_VERSION").to_string();

    let gateway_configured = !state.config.mpesa.consumer_key.is_empty()
        && !state.config.mpesa.shortcode.is_empty()
        && !state.config.mpesa.passkey.is_empty();

    let sms_configured = !state.config.sms.api_key.is_empty();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version,
        environment: state.config.server.environment.clone(),
        gateway_configured,
        sms_configured,
    };

    Ok(Json(response))
}
