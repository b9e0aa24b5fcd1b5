//! Shared test infrastructure for registry integration tests.
//!
//! Provides a `RecordingHandler` whose setup/teardown calls are counted
//! through shared atomics, so a test can keep observing a handler after the
//! registry has taken ownership of it.

#![allow(dead_code)]

use route_arbiter::{ContextId, HandlerBinding, HandlerError, PathHandler, Registration};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Call counters and failure switches shared with a `RecordingHandler`.
#[derive(Debug, Default)]
pub struct HandlerLog {
    setups: AtomicUsize,
    teardowns: AtomicUsize,
    fail_setup: AtomicBool,
    fail_teardown: AtomicBool,
    /// Setups still to refuse before succeeding.
    refuse_next: AtomicUsize,
}

impl HandlerLog {
    pub fn setups(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    pub fn fail_setup(&self, fail: bool) {
        self.fail_setup.store(fail, Ordering::SeqCst);
    }

    /// Refuse the next `n` setups, then succeed.
    pub fn refuse_next_setups(&self, n: usize) {
        self.refuse_next.store(n, Ordering::SeqCst);
    }

    pub fn fail_teardown(&self, fail: bool) {
        self.fail_teardown.store(fail, Ordering::SeqCst);
    }

    /// Setups minus teardowns: 1 while the handler is running.
    pub fn running(&self) -> isize {
        self.setups() as isize - self.teardowns() as isize
    }
}

pub struct RecordingHandler {
    log: Arc<HandlerLog>,
}

impl PathHandler<()> for RecordingHandler {
    fn activate(&mut self, _: &()) -> Result<(), HandlerError> {
        let refused = self
            .log
            .refuse_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused || self.log.fail_setup.load(Ordering::SeqCst) {
            return Err(HandlerError::Setup("handler refused setup".into()));
        }
        self.log.setups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), HandlerError> {
        self.log.teardowns.fetch_add(1, Ordering::SeqCst);
        if self.log.fail_teardown.load(Ordering::SeqCst) {
            return Err(HandlerError::Teardown("handler refused teardown".into()));
        }
        Ok(())
    }
}

/// Build a binding in context 0 plus the log observing its handler.
pub fn binding(id: u64, ranking: i32, paths: &[&str]) -> (HandlerBinding<()>, Arc<HandlerLog>) {
    binding_in(ContextId(0), id, ranking, paths)
}

pub fn binding_in(
    context: ContextId,
    id: u64,
    ranking: i32,
    paths: &[&str],
) -> (HandlerBinding<()>, Arc<HandlerLog>) {
    let log = Arc::new(HandlerLog::default());
    let registration =
        Registration::new(id, ranking, paths.iter().copied()).expect("valid registration");
    let handler = RecordingHandler {
        log: Arc::clone(&log),
    };
    (
        HandlerBinding::new(registration, context, Box::new(handler), ()),
        log,
    )
}

/// Like `binding`, but the handler refuses setup until told otherwise.
pub fn failing_binding(id: u64, ranking: i32, paths: &[&str]) -> (HandlerBinding<()>, Arc<HandlerLog>) {
    let (b, log) = binding(id, ranking, paths);
    log.fail_setup(true);
    (b, log)
}
