//! Path conflict resolution and handler lifecycle.
//!
//! This module is split into:
//! - [`registration`]: immutable identity/priority/paths of a candidate
//! - [`priority`]: winner ordering (ranking desc, id asc)
//! - [`binding`]: handler bindings and the [`PathHandler`] capability
//! - [`path_table`]: ordered candidates per `(context, path)`
//! - [`status`]: status codes, snapshots and per-path reports
//! - [`core`]: the [`Registry`] driving all of the above

mod binding;
mod core;
mod path_table;
mod priority;
mod registration;
mod status;

pub use binding::{HandlerBinding, PathHandler};
pub use core::Registry;
pub use priority::Priority;
pub use registration::{ContextId, Registration, RegistrationId};
pub use status::{
    ACTIVE_CODE, Candidate, FailureReason, PathReport, RegistrationStatus, StatusCode,
    StatusSnapshot,
};
