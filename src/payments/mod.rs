//! Push-payment integration module
//!
//! Unified interface for mobile-money push payments (M-Pesa STK push)
//! used by the booking flow.

pub mod providers;
pub mod traits;
pub mod types;
