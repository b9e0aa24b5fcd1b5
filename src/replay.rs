//! Replay of scripted registry events.
//!
//! Drives a [`Registry`] from [`Step`]s using [`ScriptedHandler`]s whose
//! setup/teardown outcome is fixed by the step. Used by `arbiterd` to
//! reproduce conflict scenarios outside a host server.

use crate::config::{AddStep, Step};
use crate::error::HandlerError;
use crate::registry::{ContextId, HandlerBinding, PathHandler, Registration, RegistrationId, Registry};
use serde::Serialize;
use tracing::{info, warn};

/// Handler that succeeds or fails setup/teardown as scripted.
#[derive(Debug, Default)]
pub struct ScriptedHandler {
    pub fail_activation: bool,
    pub fail_deactivation: bool,
    pub activations: usize,
    pub deactivations: usize,
}

impl PathHandler<()> for ScriptedHandler {
    fn activate(&mut self, _setup: &()) -> Result<(), HandlerError> {
        if self.fail_activation {
            return Err(HandlerError::Setup("scripted setup failure".into()));
        }
        self.activations += 1;
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), HandlerError> {
        self.deactivations += 1;
        if self.fail_deactivation {
            return Err(HandlerError::Teardown("scripted teardown failure".into()));
        }
        Ok(())
    }
}

/// What happened while replaying one step, when it did not go cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepIssue {
    pub index: usize,
    pub message: String,
}

/// Build a binding for an `add` step.
pub fn binding_for(add: &AddStep) -> Result<HandlerBinding<()>, crate::error::RegistrationError> {
    let registration = Registration::new(add.id, add.ranking, add.paths.iter().cloned())?;
    let handler = ScriptedHandler {
        fail_activation: add.fail_activation,
        fail_deactivation: add.fail_deactivation,
        ..ScriptedHandler::default()
    };
    Ok(HandlerBinding::new(
        registration,
        ContextId(add.context),
        Box::new(handler),
        (),
    ))
}

/// Apply `steps` in order. Failures are collected, never fatal.
pub fn run(registry: &Registry<()>, steps: &[Step]) -> Vec<StepIssue> {
    let mut issues = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        let outcome: Result<(), String> = match step {
            Step::Add(add) => binding_for(add)
                .map_err(|e| e.to_string())
                .and_then(|binding| registry.add(binding).map_err(|e| e.to_string())),
            Step::Remove { id, destroy } => registry
                .remove(RegistrationId(*id), *destroy)
                .map(|_| ())
                .ok_or_else(|| format!("registration {id} not found")),
            Step::Retry { id } => registry.retry(RegistrationId(*id)).map_err(|e| e.to_string()),
            Step::Clear { destroy } => {
                let removed = registry.clear(*destroy);
                info!(count = removed.len(), "Cleared registry");
                Ok(())
            }
        };

        if let Err(message) = outcome {
            warn!(step = index, error = %message, "Step did not complete cleanly");
            issues.push(StepIssue { index, message });
        }
    }
    issues
}
