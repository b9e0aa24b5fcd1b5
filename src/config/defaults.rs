//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

pub fn default_log_filter() -> String {
    "info".to_string()
}

pub fn default_slow_activation_warn_ms() -> u64 {
    250
}
