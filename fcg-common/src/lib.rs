//! # FCG Common Library
//!
//! Shared code for the French card generator tools:
//! - Error types
//! - TOML configuration loading and config file discovery
//! - Logging configuration

pub mod config;
pub mod error;

pub use error::{Error, Result};
