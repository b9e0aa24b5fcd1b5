//! Configuration validation.
//!
//! Validates a replay configuration up front so malformed registrations are
//! reported before any handler is touched.

use super::{Config, Step};
use crate::error::RegistrationError;
use crate::registry::Registration;
use std::collections::HashSet;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("log.filter is not a valid filter directive: {0}")]
    InvalidLogFilter(String),
    #[error("step {index}: registration {id} is invalid: {source}")]
    InvalidRegistration {
        index: usize,
        id: u64,
        #[source]
        source: RegistrationError,
    },
    #[error("step {index}: registration {id} added twice without a remove")]
    DuplicateAdd { index: usize, id: u64 },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = EnvFilter::try_new(&config.log.filter) {
        errors.push(ValidationError::InvalidLogFilter(e.to_string()));
    }

    // Ids registered at each point of the replay.
    let mut live: HashSet<u64> = HashSet::new();
    for (index, step) in config.steps.iter().enumerate() {
        match step {
            Step::Add(add) => {
                if let Err(source) = Registration::new(add.id, add.ranking, add.paths.iter().cloned()) {
                    errors.push(ValidationError::InvalidRegistration {
                        index,
                        id: add.id,
                        source,
                    });
                }
                if !live.insert(add.id) {
                    errors.push(ValidationError::DuplicateAdd { index, id: add.id });
                }
            }
            Step::Remove { id, .. } => {
                live.remove(id);
            }
            Step::Retry { .. } => {}
            Step::Clear { .. } => live.clear(),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
