//! Handler bindings: a registration coupled to a live handler instance.
//!
//! A binding is created by the caller, already bound to its handler, and
//! handed to the [`Registry`](super::Registry). From then on only the registry
//! drives its setup/teardown.
//!
//! ## Use counting
//!
//! One handler serves every path its registration claims. The binding counts
//! the paths it currently holds:
//!
//! ```text
//! held 0 ──acquire──► held 1   (handler.activate runs)
//! held n ──acquire──► held n+1
//! held n ──release──► held n-1
//! held 1 ──release──► held 0   (handler.deactivate runs, if requested)
//! ```

use super::registration::{ContextId, Registration, RegistrationId};
use crate::error::HandlerError;
use std::fmt;
use std::sync::Arc;

/// Setup/teardown capability of a request handler.
///
/// `S` is the setup context supplied with the binding; the registry passes it
/// through without interpreting it.
pub trait PathHandler<S>: Send {
    /// Prepare the handler to serve requests.
    fn activate(&mut self, setup: &S) -> Result<(), HandlerError>;

    /// Tear the handler down. Called at most once per successful `activate`.
    fn deactivate(&mut self) -> Result<(), HandlerError>;
}

/// Outcome of releasing one held path.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Release {
    /// The binding still holds other paths, or teardown was not requested.
    Retained,
    /// The last path was released and the handler was torn down.
    TornDown(Result<(), HandlerError>),
}

/// A registration plus its handler and activation state.
pub struct HandlerBinding<S> {
    registration: Arc<Registration>,
    context: ContextId,
    handler: Box<dyn PathHandler<S>>,
    setup: S,
    /// Paths this binding currently serves.
    held: usize,
    activated: bool,
}

impl<S> HandlerBinding<S> {
    pub fn new(
        registration: Registration,
        context: ContextId,
        handler: Box<dyn PathHandler<S>>,
        setup: S,
    ) -> Self {
        Self {
            registration: Arc::new(registration),
            context,
            handler,
            setup,
            held: 0,
            activated: false,
        }
    }

    #[inline]
    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    #[inline]
    pub fn id(&self) -> RegistrationId {
        self.registration.id()
    }

    #[inline]
    pub fn context(&self) -> ContextId {
        self.context
    }

    #[inline]
    pub fn setup(&self) -> &S {
        &self.setup
    }

    /// True between a successful setup and the matching teardown.
    #[inline]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Number of paths this binding currently serves.
    #[inline]
    pub fn held_paths(&self) -> usize {
        self.held
    }

    /// Tear the handler down if it is still set up.
    ///
    /// Intended for bindings returned by `remove(id, false)`, whose handler
    /// was intentionally left running.
    pub fn shutdown(&mut self) -> Result<(), HandlerError> {
        self.held = 0;
        if !self.activated {
            return Ok(());
        }
        self.activated = false;
        self.handler.deactivate()
    }

    /// Consume the binding and return its handler.
    pub fn into_handler(self) -> Box<dyn PathHandler<S>> {
        self.handler
    }

    /// Forget every held path without touching the handler.
    pub(crate) fn detach(&mut self) {
        self.held = 0;
    }

    /// Claim one more path. Runs setup when this is the first held path and
    /// the handler is not already set up.
    pub(crate) fn acquire(&mut self) -> Result<(), HandlerError> {
        if !self.activated {
            self.handler.activate(&self.setup)?;
            self.activated = true;
        }
        self.held += 1;
        Ok(())
    }

    /// Give up one held path. Runs teardown when the last path is released
    /// and `teardown` is set.
    pub(crate) fn release(&mut self, teardown: bool) -> Release {
        debug_assert!(self.held > 0, "release without a held path");
        self.held = self.held.saturating_sub(1);
        if self.held > 0 || !teardown || !self.activated {
            return Release::Retained;
        }
        // Teardown failures still leave the handler out of the active role.
        self.activated = false;
        Release::TornDown(self.handler.deactivate())
    }
}

impl<S> fmt::Debug for HandlerBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("registration", &self.registration)
            .field("context", &self.context)
            .field("held", &self.held)
            .field("activated", &self.activated)
            .finish_non_exhaustive()
    }
}
