//! Scripted registry events for replay.
//!
//! ```toml
//! [[step]]
//! op = "add"
//! id = 1
//! ranking = 10
//! paths = ["/foo"]
//!
//! [[step]]
//! op = "remove"
//! id = 1
//! ```

use serde::Deserialize;

use super::defaults::default_true;

/// One registry event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    /// Register a binding backed by a scripted handler.
    Add(AddStep),
    /// Remove a registration.
    Remove {
        id: u64,
        /// Tear the handler down (default: true).
        #[serde(default = "default_true")]
        destroy: bool,
    },
    /// Retry failed activations of a registration.
    Retry { id: u64 },
    /// Remove everything.
    Clear {
        #[serde(default = "default_true")]
        destroy: bool,
    },
}

/// Parameters of an `add` step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddStep {
    pub id: u64,
    #[serde(default)]
    pub ranking: i32,
    #[serde(default)]
    pub context: u64,
    pub paths: Vec<String>,
    /// Scripted handler refuses setup.
    #[serde(default)]
    pub fail_activation: bool,
    /// Scripted handler reports a teardown failure.
    #[serde(default)]
    pub fail_deactivation: bool,
}
