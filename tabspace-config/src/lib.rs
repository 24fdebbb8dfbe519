//! Configuration system for the tabspace workspace engine.
//!
//! This crate provides configuration loading, saving, and default values.
//! It includes:
//!
//! - The [`Config`] struct and its YAML persistence
//! - Default value functions used by serde
//! - Typed [`ConfigError`] variants
//! - Shared enums such as [`LogLevel`]

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::LogLevel;
