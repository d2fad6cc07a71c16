//! Push-payment types
//!
//! Common request/response types shared by the provider trait and the API
//! layer. Nothing here is persisted; every value lives for one request.

use serde::{Deserialize, Serialize};

/// A single push-payment attempt, created per booking click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    /// Customer phone number as typed (normalized by the provider).
    pub phone: String,
    /// Amount in whole shillings; must be positive.
    pub amount: u64,
    /// Free-text merchant reference (e.g. the tour title).
    pub reference: String,
}

/// OAuth access token from the gateway; obtained per attempt, never cached.
#[derive(Debug, Clone)]
pub struct GatewayToken(String);

impl GatewayToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Terminal outcome of one push-payment attempt.
///
/// `Accepted` only means the gateway queued the customer prompt; the actual
/// payment confirmation arrives later on the callback URL, which this service
/// does not consume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PushOutcome {
    /// Gateway accepted the request (`ResponseCode == "0"`).
    Accepted {
        /// Gateway's customer-facing message, if any.
        description: String,
    },
    /// Gateway declined the request.
    Rejected {
        /// Gateway error message, or a generic failure text.
        message: String,
    },
}
