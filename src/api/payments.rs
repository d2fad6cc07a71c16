//! Booking payment initiation endpoint
//!
//! `POST /payments/push` takes the phone, amount, and booking reference,
//! runs one STK push attempt, and answers with a synchronous outcome. The
//! gateway's asynchronous confirmation callback is not handled here; an
//! accepted answer only means the customer's phone was prompted.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::PaymentError;
use crate::payments::types::{PushOutcome, PushRequest};

#[derive(Debug, Deserialize)]
pub struct PushPaymentBody {
    pub phone: String,
    pub amount: u64,
    pub reference: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PushPaymentResponse {
    pub accepted: bool,
    pub message: String,
}

pub async fn push_payment(
    State(state): State<AppState>,
    Json(body): Json<PushPaymentBody>,
) -> Result<Json<PushPaymentResponse>, PaymentError> {
    let outcome = state
        .provider
        .push(PushRequest {
            phone: body.phone,
            amount: body.amount,
            reference: body.reference,
        })
        .await?;

    let response = match outcome {
        PushOutcome::Accepted { description } => PushPaymentResponse {
            accepted: true,
            message: description,
        },
        PushOutcome::Rejected { message } => PushPaymentResponse {
            accepted: false,
            message,
        },
    };

    Ok(Json(response))
}
