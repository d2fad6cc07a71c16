//! Service error types
//!
//! One error enum covers the payment initiation flow and the SMS relay.
//! Handlers convert every variant into a JSON body; nothing panics on the
//! request path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Result type for payment and relay operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Local validation failure; blocks the flow before any network call.
    #[error("Wrong phone format. Use 0712... or 255712...")]
    InvalidPhoneFormat,

    /// Amount must be a positive whole number of shillings.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Gateway did not return a usable access token.
    #[error("Gateway authentication failed — check consumer key and secret")]
    AuthenticationFailed,

    /// Network, timeout, or serialization failure talking to the gateway.
    #[error("Gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The SMS relay could not reach or was rejected by its upstream.
    #[error("SMS relay failed: {message}")]
    RelayFailed { message: String },

    /// Missing or malformed configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PaymentError {
    fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidPhoneFormat | PaymentError::InvalidAmount => {
                StatusCode::BAD_REQUEST
            }
            PaymentError::AuthenticationFailed
            | PaymentError::Transport(_)
            | PaymentError::RelayFailed { .. } => StatusCode::BAD_GATEWAY,
            PaymentError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
