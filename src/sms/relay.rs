//! One-time-code SMS relay
//!
//! Thin proxy in front of the messaging gateway: composes the login-code
//! text, attaches the bearer credential, and forwards a single send request.
//! No retry, no queueing, no delivery tracking; the caller gets a terminal
//! success-or-failure answer per message.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{PaymentError, PaymentResult};
use crate::phone::NormalizedPhone;

/// Messaging gateway configuration
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Static bearer credential for the messaging gateway
    pub api_key: String,
    /// Sender label shown on the handset
    pub sender: String,
    /// Gateway single-text endpoint URL
    pub endpoint_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender: "INFO".to_string(),
            endpoint_url: "https://messaging-service.co.tz/api/sms/v2/text/single".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SmsConfig {
    /// Create config from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let api_key = std::env::var("SMS_API_KEY").map_err(|_| PaymentError::Configuration {
            message: "SMS_API_KEY environment variable is required".to_string(),
        })?;

        let sender = std::env::var("SMS_SENDER").unwrap_or_else(|_| "INFO".to_string());

        let endpoint_url = std::env::var("SMS_ENDPOINT_URL").unwrap_or_else(|_| {
            "https://messaging-service.co.tz/api/sms/v2/text/single".to_string()
        });

        let timeout_secs = std::env::var("SMS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            api_key,
            sender,
            endpoint_url,
            timeout_secs,
        })
    }
}

/// SMS relay client
pub struct SmsRelay {
    config: SmsConfig,
    client: Client,
}

impl SmsRelay {
    /// Create a new relay instance
    pub fn new(config: SmsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create relay from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = SmsConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// The one-line login-code message, with its validity window.
    fn login_code_text(otp: &str) -> String {
        format!("Your Moshi Today login code is {otp}\nValid for 5 minutes.")
    }

    /// Send a login code to the given phone number.
    ///
    /// Every failure mode (bad number, unreachable upstream, non-2xx
    /// answer) comes back as `RelayFailed` so the handler can report it in
    /// the fixed `{success, error}` shape.
    pub async fn send_login_code(&self, phone: &str, otp: &str) -> PaymentResult<()> {
        let to = NormalizedPhone::parse(phone).map_err(|e| PaymentError::RelayFailed {
            message: e.to_string(),
        })?;

        let message = SmsMessage {
            from: self.config.sender.clone(),
            to: to.as_str().to_string(),
            text: Self::login_code_text(otp),
        };

        let response = self
            .client
            .post(&self.config.endpoint_url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&message)
            .send()
            .await
            .map_err(|e| PaymentError::RelayFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("SMS upstream returned {}: {}", status, body);
            return Err(PaymentError::RelayFailed {
                message: format!("Messaging gateway returned HTTP {status}"),
            });
        }

        info!("SMS sent from {} to {}", self.config.sender, to);
        Ok(())
    }
}

// Gateway single-text request body
#[derive(Debug, Serialize)]
struct SmsMessage {
    from: String,
    to: String,
    text: String,
}
