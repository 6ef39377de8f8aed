//! Common error types for FarmVision services
//!
//! Service crates define their own request-level error enums; this type
//! covers the shared concerns (currently configuration loading).

use thiserror::Error;

/// Common result type for FarmVision operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across FarmVision services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
