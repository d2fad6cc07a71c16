//! Tanzanian MSISDN normalization
//!
//! Subscribers type numbers as `0712...`, `255712...`, `+255 712 ...` or with
//! arbitrary separators. Every external call (gateway and SMS upstream) wants
//! the canonical 12-digit `255XXXXXXXXX` form, so normalization happens once,
//! up front, and a failure here aborts the flow before any network traffic.

use std::fmt;

use crate::error::{PaymentError, PaymentResult};

const COUNTRY_PREFIX: &str = "255";
const MSISDN_LEN: usize = 12;

/// A phone number in canonical `255XXXXXXXXX` form.
///
/// The only way to obtain one is [`NormalizedPhone::parse`], so holding a
/// value is proof the number is exactly 12 digits with the country prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Normalize arbitrary user input to canonical form.
    ///
    /// Strips every non-digit character, keeps an existing `255` prefix,
    /// otherwise drops one leading `0` (if present) and prepends `255`.
    /// Anything that does not end up as exactly 12 digits is rejected.
    pub fn parse(raw: &str) -> PaymentResult<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        let msisdn = if digits.starts_with(COUNTRY_PREFIX) {
            digits
        } else {
            let subscriber = digits.strip_prefix('0').unwrap_or(&digits);
            format!("{COUNTRY_PREFIX}{subscriber}")
        };

        if msisdn.len() != MSISDN_LEN {
            return Err(PaymentError::InvalidPhoneFormat);
        }

        Ok(Self(msisdn))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
