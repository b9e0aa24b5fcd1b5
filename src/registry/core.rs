//! The registry: conflict resolution and lifecycle driving.
//!
//! Every mutation runs under one registry-wide lock, including the
//! setup/teardown calls it triggers, so the win/lose decision for a path and
//! the matching handler call commit atomically with respect to other
//! operations. Snapshots are copies taken under the same lock.

use super::binding::{HandlerBinding, Release};
use super::path_table::PathTable;
use super::priority::Priority;
use super::registration::{ContextId, Registration, RegistrationId};
use super::status::{Candidate, FailureReason, PathReport, StatusCode, StatusModel, StatusSnapshot};
use crate::config::RegistryConfig;
use crate::error::{HandlerError, RegistryError, RegistryResult};
use crate::metrics;
use crate::telemetry::{ActivationTimer, spans};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path conflict registry.
///
/// Holds [`HandlerBinding`]s, keeps at most one of them active per
/// `(context, path)` and reports per-path status for every registration.
pub struct Registry<S> {
    inner: Mutex<Inner<S>>,
    slow_activation: Duration,
}

struct Inner<S> {
    bindings: HashMap<RegistrationId, HandlerBinding<S>>,
    paths: PathTable,
    status: StatusModel,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                bindings: HashMap::new(),
                paths: PathTable::default(),
                status: StatusModel::default(),
            }),
            slow_activation: Duration::from_millis(config.slow_activation_warn_ms),
        }
    }

    /// Register a binding on every path it claims.
    ///
    /// The binding becomes active on each path where it is the highest
    /// priority candidate, displacing (and tearing down) the previous winner,
    /// and shadowed everywhere else.
    ///
    /// If setup fails on a won path, the whole add is still committed: the
    /// binding keeps the head position with an activation failure status and
    /// the first failure is returned. No lower candidate is promoted in its
    /// place; see [`Registry::retry`]. When setup fails on one path but
    /// succeeds on a later one, the earlier paths are picked up by the now
    /// running handler before returning.
    ///
    /// A binding handed back by `remove(id, false)` may be added again; its
    /// handler is reused as is.
    pub fn add(&self, mut binding: HandlerBinding<S>) -> RegistryResult {
        binding.detach();
        let id = binding.id();
        let context = binding.context();
        let registration = Arc::clone(binding.registration());
        let _span = spans::add(id, context, registration.ranking()).entered();

        let mut inner = self.inner.lock();
        if inner.bindings.contains_key(&id) {
            warn!(registration = %id, "Registration already present, ignoring add");
            return Err(RegistryError::DuplicateRegistration(id));
        }

        inner.bindings.insert(id, binding);
        metrics::add_registrations(1);

        let priority = Priority::of(&registration);
        let mut failures = Vec::new();
        for path in registration.paths() {
            let insertion = inner.paths.insert(context, path, priority);
            if !insertion.is_head {
                inner.status.set(&registration, context, path, StatusCode::SHADOWED);
                metrics::record_shadowed();
                debug!(path = %path, "Shadowed by higher-priority binding");
                continue;
            }

            if let Some(displaced) = insertion.displaced() {
                inner.demote(displaced.id, path);
            }

            if let Err(source) = inner.activate_on(id, path, self.slow_activation) {
                failures.push((path, source));
            }
        }

        // Setup succeeded on a later path: the running handler takes the rest.
        if !failures.is_empty() && inner.is_activated(id) {
            failures.retain(|(path, _)| inner.activate_on(id, path, self.slow_activation).is_err());
        }

        match failures.into_iter().next() {
            Some((path, source)) => Err(RegistryError::Activation {
                id,
                path: path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Remove a binding from every path it claims.
    ///
    /// When the binding was serving a path, the next candidate is promoted
    /// within this call. With `destroy_handler` set, the handler is torn down
    /// if it was set up; otherwise it is left running. Either way the binding
    /// is handed back. Unknown ids are a no-op returning `None`.
    pub fn remove(&self, id: RegistrationId, destroy_handler: bool) -> Option<HandlerBinding<S>> {
        let _span = spans::remove(id, destroy_handler).entered();

        let mut inner = self.inner.lock();
        let Some((registration, context)) = inner
            .bindings
            .get(&id)
            .map(|b| (Arc::clone(b.registration()), b.context()))
        else {
            debug!(registration = %id, "Remove of unknown registration ignored");
            return None;
        };

        let priority = Priority::of(&registration);
        for path in registration.paths() {
            let held = inner.status.get(id, path) == Some(StatusCode::Active);
            let Some(removal) = inner.paths.remove(context, path, priority) else {
                continue;
            };

            if held {
                inner.release_on(id, path, destroy_handler);
            }

            if removal.was_head
                && let Some(next) = removal.new_head
            {
                // Failures stay in the status model; remove never errors.
                let _ = inner.activate_on(next.id, path, self.slow_activation);
            }
        }

        inner.status.drop_registration(id);
        let mut binding = inner.bindings.remove(&id);
        metrics::add_registrations(-1);

        // A handler can be running without holding a path, e.g. after an
        // earlier hand-back and re-add that only shadowed it.
        if destroy_handler
            && let Some(binding) = binding.as_mut()
            && binding.is_activated()
        {
            match binding.shutdown() {
                Ok(()) => {
                    metrics::record_deactivation();
                    debug!(registration = %id, "Idle handler torn down");
                }
                Err(e) => {
                    metrics::record_deactivation_failure(e.error_code());
                    warn!(registration = %id, error = %e, "Handler teardown failed");
                }
            }
        }
        binding
    }

    /// Re-attempt setup on every path where the binding is head but failed
    /// to activate.
    ///
    /// Returns the first failure; paths that succeed become active even if
    /// others fail again.
    pub fn retry(&self, id: RegistrationId) -> RegistryResult {
        let _span = spans::retry(id).entered();

        let mut inner = self.inner.lock();
        let Some((registration, context)) = inner
            .bindings
            .get(&id)
            .map(|b| (Arc::clone(b.registration()), b.context()))
        else {
            return Err(RegistryError::NotFound(id));
        };

        let mut first_failure = None;
        for path in registration.paths() {
            if inner.status.get(id, path) != Some(StatusCode::ACTIVATION_FAILED) {
                continue;
            }
            if inner.paths.head(context, path).map(|p| p.id) != Some(id) {
                continue;
            }
            if let Err(source) = inner.activate_on(id, path, self.slow_activation)
                && first_failure.is_none()
            {
                first_failure = Some(RegistryError::Activation {
                    id,
                    path: path.clone(),
                    source,
                });
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Remove every binding, tearing down activated handlers when
    /// `destroy_handlers` is set. Returns the removed bindings.
    pub fn clear(&self, destroy_handlers: bool) -> Vec<HandlerBinding<S>> {
        let mut inner = self.inner.lock();
        let active = inner.status.active_count() as i64;

        let mut drained: Vec<HandlerBinding<S>> = inner.bindings.drain().map(|(_, b)| b).collect();
        if destroy_handlers {
            for binding in &mut drained {
                let was_activated = binding.is_activated();
                match binding.shutdown() {
                    Ok(()) if was_activated => metrics::record_deactivation(),
                    Ok(()) => {}
                    Err(e) => {
                        metrics::record_deactivation_failure(e.error_code());
                        warn!(registration = %binding.id(), error = %e, "Handler teardown failed during clear");
                    }
                }
            }
        } else {
            drained.iter_mut().for_each(HandlerBinding::detach);
        }

        let paths = inner.paths.len();
        inner.paths.clear();
        inner.status.clear();
        metrics::add_registrations(-(drained.len() as i64));
        metrics::add_active_paths(-active);
        info!(count = drained.len(), paths, "Registry cleared");
        drained
    }

    /// Immutable copy of the full status model.
    pub fn snapshot_status(&self) -> StatusSnapshot {
        self.inner.lock().status.snapshot()
    }

    /// Candidates per `(context, path)`, head first, sorted by context then path.
    pub fn path_report(&self) -> Vec<PathReport> {
        let inner = self.inner.lock();
        let mut reports: Vec<PathReport> = inner
            .paths
            .iter()
            .map(|((context, path), candidates)| PathReport {
                context: *context,
                path: path.clone(),
                candidates: candidates
                    .iter()
                    .map(|c| Candidate {
                        id: c.id,
                        ranking: c.ranking,
                        status: inner
                            .status
                            .get(c.id, path)
                            .unwrap_or(StatusCode::Failed(FailureReason::Unknown)),
                    })
                    .collect(),
            })
            .collect();
        reports.sort_by(|a, b| (a.context, &a.path).cmp(&(b.context, &b.path)));
        reports
    }

    /// Registration currently serving `path` in `context`, if any.
    pub fn active_registration(&self, context: ContextId, path: &str) -> Option<RegistrationId> {
        let inner = self.inner.lock();
        let head = inner.paths.head(context, path)?;
        (inner.status.get(head.id, path) == Some(StatusCode::Active)).then_some(head.id)
    }

    /// Registration metadata of a registered binding.
    pub fn registration(&self, id: RegistrationId) -> Option<Arc<Registration>> {
        let inner = self.inner.lock();
        inner.bindings.get(&id).map(|b| Arc::clone(b.registration()))
    }

    /// Whether the binding's handler is currently set up.
    pub fn is_activated(&self, id: RegistrationId) -> Option<bool> {
        self.inner.lock().bindings.get(&id).map(HandlerBinding::is_activated)
    }

    pub fn contains(&self, id: RegistrationId) -> bool {
        self.inner.lock().bindings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().bindings.is_empty()
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Inner<S> {
    fn is_activated(&self, id: RegistrationId) -> bool {
        self.bindings.get(&id).is_some_and(HandlerBinding::is_activated)
    }

    /// Make `id` serve `path`. Records the outcome in the status model.
    fn activate_on(&mut self, id: RegistrationId, path: &str, slow: Duration) -> Result<(), HandlerError> {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return Ok(());
        };
        let registration = Arc::clone(binding.registration());
        let context = binding.context();

        let result = if binding.is_activated() {
            binding.acquire()
        } else {
            let _timer = ActivationTimer::new(path, slow);
            binding.acquire().inspect(|_| metrics::record_activation())
        };

        match result {
            Ok(()) => {
                self.status.set(&registration, context, path, StatusCode::Active);
                metrics::add_active_paths(1);
                debug!(registration = %id, path = %path, "Binding active");
                Ok(())
            }
            Err(e) => {
                self.status
                    .set(&registration, context, path, StatusCode::ACTIVATION_FAILED);
                metrics::record_activation_failure(e.error_code());
                warn!(registration = %id, path = %path, error = %e, "Handler activation failed");
                Err(e)
            }
        }
    }

    /// Push the current head of `path` behind a new winner.
    fn demote(&mut self, id: RegistrationId, path: &str) {
        if self.status.get(id, path) == Some(StatusCode::Active) {
            self.release_on(id, path, true);
        }
        if let Some(binding) = self.bindings.get(&id) {
            let registration = Arc::clone(binding.registration());
            self.status
                .set(&registration, binding.context(), path, StatusCode::SHADOWED);
            metrics::record_shadowed();
            debug!(registration = %id, path = %path, "Binding demoted");
        }
    }

    /// Give up `path` on behalf of `id`, tearing down on the last held path.
    fn release_on(&mut self, id: RegistrationId, path: &str, teardown: bool) {
        let Some(binding) = self.bindings.get_mut(&id) else {
            return;
        };
        metrics::add_active_paths(-1);
        match binding.release(teardown) {
            Release::Retained => {}
            Release::TornDown(Ok(())) => {
                metrics::record_deactivation();
                debug!(registration = %id, path = %path, "Handler torn down");
            }
            Release::TornDown(Err(e)) => {
                metrics::record_deactivation_failure(e.error_code());
                warn!(registration = %id, path = %path, error = %e, "Handler teardown failed");
            }
        }
    }
}
