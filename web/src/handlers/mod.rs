//! HTTP request handlers that do not touch the credential domain.

pub mod health;

pub use health::health_check;
