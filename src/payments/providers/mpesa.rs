//! M-Pesa push-payment provider (STK push)
//!
//! Implements the two-call gateway sequence used by the booking flow:
//! fetch an OAuth access token with basic auth, then POST the STK push
//! request carrying the token. Credentials are signed per attempt from the
//! merchant shortcode, passkey, and a 14-digit UTC timestamp.
//!
//! One attempt per user click: no retries, no token caching. A double-click
//! issues two independent authentications, matching the gateway's contract
//! that every push request carries a fresh password/timestamp pair.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{PaymentError, PaymentResult};
use crate::payments::traits::PushProvider;
use crate::payments::types::{GatewayToken, PushOutcome, PushRequest};
use crate::phone::NormalizedPhone;

const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const TRANSACTION_DESC: &str = "Moshi Today Booking";

/// M-Pesa gateway configuration
#[derive(Debug, Clone)]
pub struct MpesaConfig {
    /// OAuth consumer key
    pub consumer_key: String,
    /// OAuth consumer secret
    pub consumer_secret: String,
    /// Merchant shortcode (paybill number)
    pub shortcode: String,
    /// Passkey used to derive the per-request password
    pub passkey: String,
    /// Gateway base URL (defaults to the Safaricom sandbox)
    pub base_url: String,
    /// URL the gateway notifies asynchronously; no handler in this service
    pub callback_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            shortcode: String::new(),
            passkey: String::new(),
            base_url: "https://sandbox.safaricom.co.ke".to_string(),
            callback_url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl MpesaConfig {
    /// Create config from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let require = |name: &str| {
            std::env::var(name).map_err(|_| PaymentError::Configuration {
                message: format!("{name} environment variable is required"),
            })
        };

        let consumer_key = require("MPESA_CONSUMER_KEY")?;
        let consumer_secret = require("MPESA_CONSUMER_SECRET")?;
        let shortcode = require("MPESA_SHORTCODE")?;
        let passkey = require("MPESA_PASSKEY")?;
        let callback_url = require("MPESA_CALLBACK_URL")?;

        let base_url = std::env::var("MPESA_BASE_URL")
            .unwrap_or_else(|_| "https://sandbox.safaricom.co.ke".to_string());

        let timeout_secs = std::env::var("MPESA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            consumer_key,
            consumer_secret,
            shortcode,
            passkey,
            base_url,
            callback_url,
            timeout_secs,
        })
    }
}

/// M-Pesa push-payment provider
pub struct MpesaProvider {
    config: MpesaConfig,
    client: Client,
}

impl MpesaProvider {
    /// Create a new provider instance
    pub fn new(config: MpesaConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create provider from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = MpesaConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Gateway timestamp: UTC now as `YYYYMMDDHHMMSS`.
    fn timestamp_at(now: DateTime<Utc>) -> String {
        now.format("%Y%m%d%H%M%S").to_string()
    }

    /// Per-request password: `base64(shortcode + passkey + timestamp)`.
    fn password(&self, timestamp: &str) -> String {
        let material = format!("{}{}{}", self.config.shortcode, self.config.passkey, timestamp);
        BASE64.encode(material)
    }

    /// Basic-auth credential for the token endpoint: `base64(key:secret)`.
    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.config.consumer_key, self.config.consumer_secret);
        BASE64.encode(credentials)
    }

    /// Fetch an OAuth access token. Single attempt; an absent or empty
    /// `access_token` field fails the whole flow before submission.
    async fn access_token(&self) -> PaymentResult<GatewayToken> {
        let url = format!(
            "{}/oauth/generate?grant_type=client_credentials",
            self.config.base_url
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Basic {}", self.basic_auth()))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Token endpoint returned {}: {}", status, body);
            return Err(PaymentError::AuthenticationFailed);
        }

        let token: TokenResponse = serde_json::from_str(&body).unwrap_or_default();
        match token.access_token {
            Some(token) if !token.is_empty() => Ok(GatewayToken::new(token)),
            _ => {
                warn!("Token response carried no access_token: {}", body);
                Err(PaymentError::AuthenticationFailed)
            }
        }
    }

    /// Map the gateway's STK push response to a terminal outcome.
    fn classify(response: StkPushResponse) -> PushOutcome {
        match response.response_code.as_deref() {
            Some("0") => PushOutcome::Accepted {
                description: response
                    .customer_message
                    .unwrap_or_else(|| "STK push sent. Check your phone now.".to_string()),
            },
            _ => PushOutcome::Rejected {
                message: response
                    .error_message
                    .or(response.response_description)
                    .unwrap_or_else(|| "Payment request was declined".to_string()),
            },
        }
    }
}

#[async_trait]
impl PushProvider for MpesaProvider {
    async fn push(&self, request: PushRequest) -> PaymentResult<PushOutcome> {
        if request.amount == 0 {
            return Err(PaymentError::InvalidAmount);
        }

        // Normalization failures abort before any network call.
        let phone = NormalizedPhone::parse(&request.phone)?;

        info!(
            "Initiating STK push: phone={} amount={} reference={}",
            phone, request.amount, request.reference
        );

        let token = self.access_token().await?;

        let timestamp = Self::timestamp_at(Utc::now());
        let payload = StkPushPayload {
            business_short_code: self.config.shortcode.clone(),
            password: self.password(&timestamp),
            timestamp,
            transaction_type: TRANSACTION_TYPE.to_string(),
            amount: request.amount,
            party_a: phone.as_str().to_string(),
            party_b: self.config.shortcode.clone(),
            phone_number: phone.as_str().to_string(),
            callback_url: self.config.callback_url.clone(),
            account_reference: request.reference,
            transaction_desc: TRANSACTION_DESC.to_string(),
        };

        let url = format!("{}/stkpush/processrequest", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token.as_str()))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        // The gateway reports declines both as non-2xx statuses and as
        // ResponseCode != "0" bodies; classification keys on the JSON body.
        // A body that fails to decode is a transport fault, not a decline.
        let parsed: StkPushResponse = response.json().await?;

        let outcome = Self::classify(parsed);
        match &outcome {
            PushOutcome::Accepted { .. } => {
                info!("STK push accepted: phone={}", phone);
            }
            PushOutcome::Rejected { message } => {
                warn!("STK push rejected: phone={} message={}", phone, message);
            }
        }

        Ok(outcome)
    }
}

// Token endpoint response
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

// STK push request body; field names are fixed by the gateway.
#[derive(Debug, Serialize)]
struct StkPushPayload {
    #[serde(rename = "BusinessShortCode")]
    business_short_code: String,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "TransactionType")]
    transaction_type: String,
    #[serde(rename = "Amount")]
    amount: u64,
    #[serde(rename = "PartyA")]
    party_a: String,
    #[serde(rename = "PartyB")]
    party_b: String,
    #[serde(rename = "PhoneNumber")]
    phone_number: String,
    #[serde(rename = "CallBackURL")]
    callback_url: String,
    #[serde(rename = "AccountReference")]
    account_reference: String,
    #[serde(rename = "TransactionDesc")]
    transaction_desc: String,
}

// STK push response; only the code and messages matter to the caller.
#[derive(Debug, Default, Deserialize)]
struct StkPushResponse {
    #[serde(rename = "ResponseCode", default)]
    response_code: Option<String>,
    #[serde(rename = "ResponseDescription", default)]
    response_description: Option<String>,
    #[serde(rename = "CustomerMessage", default)]
    customer_message: Option<String>,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}
