//! HTTP request handlers.

pub mod health;
pub mod signal;

pub use health::{health_check, liveness_check};
pub use signal::serve_signal;
