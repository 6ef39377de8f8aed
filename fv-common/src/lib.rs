//! # FarmVision Common Library
//!
//! Shared code for FarmVision backend services:
//! - Common error type and `Result` alias
//! - TOML + environment configuration loading

pub mod config;
pub mod error;

pub use error::{Error, Result};
