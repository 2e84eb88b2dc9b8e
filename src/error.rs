//! Error types for beacon operations.
//!
//! Every error here is absorbed inside the signal handler: the caller always
//! receives a valid image response, so these types exist for logging and
//! internal control flow rather than HTTP error mapping.

use thiserror::Error;

/// Result type alias using `BeaconError`.
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Error types for notification delivery and image fetching.
#[derive(Debug, Error)]
pub enum BeaconError {
    /// Notification request failed at the network level.
    #[error("notification request failed: {message}")]
    NotifyNetwork {
        /// Error message describing the failure
        message: String,
    },

    /// Notification endpoint answered with a non-2xx status.
    #[error("notification endpoint returned HTTP {status}")]
    NotifyStatus {
        /// HTTP status code returned by the endpoint
        status: u16,
    },

    /// Image origin fetch failed at the network level.
    #[error("image origin fetch failed: {message}")]
    FetchNetwork {
        /// Error message describing the failure
        message: String,
    },

    /// Image origin answered with a non-2xx status.
    #[error("image origin returned HTTP {status}")]
    FetchStatus {
        /// HTTP status code returned by the origin
        status: u16,
    },

    /// HTTP client could not be constructed from configuration.
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl BeaconError {
    /// Creates a notification network error from a message.
    pub fn notify_network(message: impl Into<String>) -> Self {
        Self::NotifyNetwork { message: message.into() }
    }

    /// Creates a notification status error from an HTTP response.
    pub fn notify_status(status: u16) -> Self {
        Self::NotifyStatus { status }
    }

    /// Creates a fetch network error from a message.
    pub fn fetch_network(message: impl Into<String>) -> Self {
        Self::FetchNetwork { message: message.into() }
    }

    /// Creates a fetch status error from an HTTP response.
    pub fn fetch_status(status: u16) -> Self {
        Self::FetchStatus { status }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}
