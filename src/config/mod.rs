//! Configuration module for field validation.
//!
//! This module loads TOML-based settings for the remote validation endpoint.

mod config;

pub use config::{ConfigError, Settings, UniquenessSettings};
