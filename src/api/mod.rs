//! HTTP API layer
//!
//! Three routes: a health probe, the booking payment initiation endpoint,
//! and the login-code SMS relay. Handlers hold no state beyond the shared
//! provider/relay clients and the loaded configuration.

pub mod health;
pub mod payments;
pub mod sms;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::payments::traits::PushProvider;
use crate::sms::SmsRelay;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn PushProvider>,
    pub relay: Arc<SmsRelay>,
    pub config: Config,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/payments/push", post(payments::push_payment))
        .route("/send-sms", post(sms::send_sms))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
