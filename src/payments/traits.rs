//! Push-payment provider trait
//!
//! Defines the interface the API layer depends on, so handlers can be
//! exercised against a stub provider in tests.

use async_trait::async_trait;

use crate::error::PaymentResult;
use crate::payments::types::{PushOutcome, PushRequest};

/// Trait for push-payment provider implementations.
///
/// A provider takes one request, runs the full normalize → authenticate →
/// submit sequence, and reports a terminal outcome. One attempt per call:
/// no retries, no token reuse across calls.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Initiate a push payment.
    ///
    /// Returns `Ok(PushOutcome)` when the gateway answered (accepted or
    /// rejected), `Err` for local validation failures, authentication
    /// failures, and transport errors.
    async fn push(&self, request: PushRequest) -> PaymentResult<PushOutcome>;
}
