//! route-arbiter - path conflict resolution for HTTP handler registries.
//!
//! When several independently registered handlers claim the same path
//! pattern, exactly one of them serves it. The [`Registry`] picks the winner
//! per `(context, path)` (highest ranking, then lowest registration id), sets
//! it up, keeps the others registered but dormant, and promotes the next
//! candidate when the winner goes away.
//!
//! ```
//! use route_arbiter::{ContextId, HandlerBinding, HandlerError, PathHandler, Registration, RegistrationId, Registry, StatusCode};
//!
//! struct Hello;
//!
//! impl PathHandler<()> for Hello {
//!     fn activate(&mut self, _: &()) -> Result<(), HandlerError> { Ok(()) }
//!     fn deactivate(&mut self) -> Result<(), HandlerError> { Ok(()) }
//! }
//!
//! let registry = Registry::new();
//! let high = Registration::new(1, 10, ["/hello"]).unwrap();
//! let low = Registration::new(2, 0, ["/hello"]).unwrap();
//! registry.add(HandlerBinding::new(high, ContextId(0), Box::new(Hello), ())).unwrap();
//! registry.add(HandlerBinding::new(low, ContextId(0), Box::new(Hello), ())).unwrap();
//!
//! let status = registry.snapshot_status();
//! assert_eq!(status.status(RegistrationId(1), "/hello"), Some(StatusCode::Active));
//! assert_eq!(status.status(RegistrationId(2), "/hello"), Some(StatusCode::SHADOWED));
//!
//! registry.remove(RegistrationId(1), true);
//! assert_eq!(registry.active_registration(ContextId(0), "/hello"), Some(RegistrationId(2)));
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod replay;
pub mod telemetry;

pub use error::{HandlerError, RegistrationError, RegistryError, RegistryResult};
pub use registry::{
    ACTIVE_CODE, Candidate, ContextId, FailureReason, HandlerBinding, PathHandler, PathReport,
    Priority, Registration, RegistrationId, RegistrationStatus, Registry, StatusCode,
    StatusSnapshot,
};
