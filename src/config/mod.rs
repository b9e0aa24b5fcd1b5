//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, LogConfig, RegistryConfig, MetricsConfig)
//! - [`steps`]: Scripted registry events replayed by `arbiterd`
//! - [`validation`]: Up-front checks collecting every error found
//! - [`defaults`]: serde default value functions

mod defaults;
mod steps;
mod types;
mod validation;

pub use steps::{AddStep, Step};
pub use types::{Config, ConfigError, LogConfig, MetricsConfig, RegistryConfig};
pub use validation::{ValidationError, validate};
