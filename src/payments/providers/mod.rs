//! Push-payment provider implementations

pub mod mpesa;

pub use mpesa::MpesaProvider;
