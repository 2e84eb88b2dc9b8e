//! Beacon tracking-pixel service.
//!
//! A single HTTP endpoint accepts a payload embedded in its request path,
//! forwards it to a notification service, and always answers with image
//! bytes: either a lazily cached remote image or an embedded 1x1
//! transparent GIF.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod image;
pub mod notify;
pub mod pixel;
pub mod server;

pub use config::Config;
pub use error::{BeaconError, Result};
pub use server::{create_router, start_server, AppState};
