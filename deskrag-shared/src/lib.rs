//! Shared types and helpers used across all deskrag services.

mod config;
pub mod text;

pub use self::config::ServiceConfig;

/// RFC 3339 timestamp for response bodies and log records.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Clamps a confidence value into [0, 1].
pub fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
