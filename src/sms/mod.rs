//! SMS delivery module
//!
//! Relays one-time login codes to the third-party messaging gateway.

pub mod relay;

pub use relay::{SmsConfig, SmsRelay};
