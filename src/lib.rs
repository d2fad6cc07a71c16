//! moshi-pay — payment and SMS backend for the Moshi Today storefront
//!
//! Holds the M-Pesa gateway credentials server-side and exposes the two
//! flows the browser client needs: STK push initiation for bookings and
//! one-time-code SMS delivery for guide logins.

pub mod api;
pub mod config;
pub mod error;
pub mod payments;
pub mod phone;
pub mod sms;

pub use config::Config;
pub use error::{PaymentError, PaymentResult};
pub use phone::NormalizedPhone;
