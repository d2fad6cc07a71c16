use anyhow::{anyhow, Context, Result};
use std::env;

use crate::payments::providers::mpesa::MpesaConfig;
use crate::sms::SmsConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub mpesa: MpesaConfig,
    pub sms: SmsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        };

        let mpesa = MpesaConfig::from_env().context("M-Pesa gateway configuration")?;
        let sms = SmsConfig::from_env().context("SMS gateway configuration")?;

        let config = Config { server, mpesa, sms };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Validate port range
        if self.server.port < 1024 {
            return Err(anyhow!(
                "Port must be at least 1024, got {}",
                self.server.port
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(anyhow!(
                "Environment must be one of: {:?}, got {}",
                valid_environments,
                self.server.environment
            ));
        }

        // Validate gateway credentials are not empty
        if self.mpesa.consumer_key.trim().is_empty() {
            return Err(anyhow!("MPESA_CONSUMER_KEY cannot be empty"));
        }

        if self.mpesa.consumer_secret.trim().is_empty() {
            return Err(anyhow!("MPESA_CONSUMER_SECRET cannot be empty"));
        }

        if self.mpesa.shortcode.trim().is_empty() {
            return Err(anyhow!("MPESA_SHORTCODE cannot be empty"));
        }

        if self.mpesa.passkey.trim().is_empty() {
            return Err(anyhow!("MPESA_PASSKEY cannot be empty"));
        }

        if self.mpesa.callback_url.trim().is_empty() {
            return Err(anyhow!("MPESA_CALLBACK_URL cannot be empty"));
        }

        if self.mpesa.base_url.trim().is_empty() {
            return Err(anyhow!("MPESA_BASE_URL cannot be empty"));
        }

        // Validate SMS configuration
        if self.sms.api_key.trim().is_empty() {
            return Err(anyhow!("SMS_API_KEY cannot be empty"));
        }

        if self.sms.sender.trim().is_empty() {
            return Err(anyhow!("SMS_SENDER cannot be empty"));
        }

        if self.sms.endpoint_url.trim().is_empty() {
            return Err(anyhow!("SMS_ENDPOINT_URL cannot be empty"));
        }

        Ok(())
    }
}
